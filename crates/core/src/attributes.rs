//! Attribute lists parsed out of raw tag-open strings.
//!
//! The report passes run over serialized HTML, so attributes are read from the
//! text between the tag name and the closing `>`. Values are kept in their
//! escaped form and written back untouched unless changed.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::escape::{decode_xml_entities, escape_html};

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("invalid attribute regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
struct Attribute {
    name: String,
    /// Escaped value, ready to be written between double quotes.
    value: Option<String>,
}

/// Ordered attribute list of a single tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagAttributes {
    attrs: Vec<Attribute>,
}

impl TagAttributes {
    /// Parses the attribute portion of a tag, e.g. ` class="a b" data-lang=css`.
    pub fn parse(raw: &str) -> Self {
        let attrs = ATTRIBUTE
            .captures_iter(raw)
            .map(|caps| {
                let value = if let Some(double) = caps.get(2) {
                    Some(double.as_str().to_string())
                } else if let Some(single) = caps.get(3) {
                    Some(single.as_str().replace('"', "&quot;"))
                } else {
                    caps.get(4).map(|bare| bare.as_str().to_string())
                };
                Attribute {
                    name: caps[1].to_ascii_lowercase(),
                    value,
                }
            })
            .collect();
        Self { attrs }
    }

    /// Returns the entity-decoded value. Boolean attributes yield `""`.
    pub fn get(&self, name: &str) -> Option<String> {
        self.attrs
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| match &attr.value {
                Some(value) => decode_xml_entities(value).into_owned(),
                None => String::new(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attrs.iter().any(|attr| attr.name == name)
    }

    /// Sets `name` to the (unescaped) `value`, replacing in place or appending.
    pub fn set(&mut self, name: &str, value: &str) {
        let escaped = Some(escape_html(value));
        match self.attrs.iter_mut().find(|attr| attr.name == name) {
            Some(attr) => attr.value = escaped,
            None => self.attrs.push(Attribute {
                name: name.to_string(),
                value: escaped,
            }),
        }
    }

    /// Whitespace-separated tokens of the `class` attribute.
    pub fn classes(&self) -> Vec<String> {
        self.get("class")
            .map(|class| class.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().iter().any(|token| token == class)
    }

    /// Appends each token of `class` that is not present yet.
    pub fn add_class(&mut self, class: &str) {
        let mut classes = self.classes();
        let mut changed = false;
        for token in class.split_whitespace() {
            if !classes.iter().any(|existing| existing == token) {
                classes.push(token.to_string());
                changed = true;
            }
        }
        if changed {
            self.set("class", &classes.join(" "));
        }
    }
}

impl fmt::Display for TagAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for attr in &self.attrs {
            match &attr.value {
                Some(value) => write!(f, " {}=\"{}\"", attr.name, value)?,
                None => write!(f, " {}", attr.name)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_quoted_bare_and_boolean_attributes() {
        let attrs = TagAttributes::parse(r#" class="a b" data-lang=css readonly title='x "y"'"#);

        assert_eq!(attrs.get("class").as_deref(), Some("a b"));
        assert_eq!(attrs.get("data-lang").as_deref(), Some("css"));
        assert_eq!(attrs.get("readonly").as_deref(), Some(""));
        assert_eq!(attrs.get("title").as_deref(), Some("x \"y\""));
        assert_eq!(attrs.get("missing"), None);
    }

    #[test]
    fn reserializes_in_original_order() {
        let attrs = TagAttributes::parse(r#" id="c1" class="language-css" readonly"#);
        assert_eq!(attrs.to_string(), r#" id="c1" class="language-css" readonly"#);
    }

    #[test]
    fn keeps_escaped_values_verbatim() {
        let attrs = TagAttributes::parse(r#" title="a &amp; b""#);

        assert_eq!(attrs.get("title").as_deref(), Some("a & b"));
        assert_eq!(attrs.to_string(), r#" title="a &amp; b""#);
    }

    #[test]
    fn set_replaces_in_place_and_escapes() {
        let mut attrs = TagAttributes::parse(r#" a="1" b="2""#);
        attrs.set("a", "<x>");
        attrs.set("c", "3");

        assert_eq!(attrs.to_string(), r#" a="&lt;x&gt;" b="2" c="3""#);
    }

    #[test]
    fn add_class_is_idempotent() {
        let mut attrs = TagAttributes::parse(r#" class="language-css""#);
        attrs.add_class("code-block");
        attrs.add_class("code-block");

        assert_eq!(attrs.to_string(), r#" class="language-css code-block""#);
        assert!(attrs.has_class("code-block"));
        assert!(!attrs.has_class("code"));
    }

    #[test]
    fn add_class_creates_attribute() {
        let mut attrs = TagAttributes::default();
        attrs.add_class("inline-code");

        assert_eq!(attrs.to_string(), r#" class="inline-code""#);
    }
}
