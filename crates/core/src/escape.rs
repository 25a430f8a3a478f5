//! Entity escaping for text and attribute values.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static XML_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|amp|lt|gt|quot|apos);")
        .expect("invalid xml entity regex")
});

/// Escapes the characters that carry meaning in HTML text and attribute values.
///
/// | Char | Entity   |
/// |------|----------|
/// | `&`  | `&amp;`  |
/// | `"`  | `&quot;` |
/// | `<`  | `&lt;`   |
/// | `>`  | `&gt;`   |
/// | `'`  | `&#39;`  |
pub fn escape_html(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut result = String::with_capacity(s.len());
    let mut start = 0;

    for (index, &byte) in bytes.iter().enumerate() {
        let replacement = match byte {
            b'&' => "&amp;",
            b'"' => "&quot;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'\'' => "&#39;",
            _ => continue,
        };

        result.push_str(&s[start..index]);
        result.push_str(replacement);
        start = index + 1;
    }

    if start == 0 {
        return s.to_string();
    }

    result.push_str(&s[start..]);
    result
}

/// Decodes the five predefined XML entities plus decimal and hexadecimal
/// character references. Unknown or out-of-range references are kept as-is.
pub fn decode_xml_entities(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    XML_ENTITY.replace_all(s, |caps: &Captures| {
        let entity = &caps[1];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => decode_char_reference(entity),
        };

        match decoded {
            Some(ch) => ch.to_string(),
            None => caps[0].to_string(),
        }
    })
}

fn decode_char_reference(entity: &str) -> Option<char> {
    let reference = entity.strip_prefix('#')?;
    let code = match reference.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => reference.parse::<u32>().ok()?,
    };
    char::from_u32(code)
}
