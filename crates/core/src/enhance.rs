//! String-level passes over report HTML.
//!
//! These run on the serialized fragment rather than the source tree because
//! highlighter output is opaque markup that never existed in the document.
//! Each pass leaves anything it cannot match untouched and is idempotent on
//! its own output.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::attributes::TagAttributes;
use crate::escape::decode_xml_entities;
use crate::options::ReportOptions;

static PRE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<pre\b([^>]*)>(.*?)</pre>").expect("invalid pre regex"));

static CODE_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<code\b([^>]*)>").expect("invalid code open regex"));

static CODE_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</code\s*>").expect("invalid code close regex"));

const LANGUAGE_ATTRIBUTES: [&str; 3] = ["data-lang", "data-language", "data-code-lang"];

/// Runs pre normalization, code-block enhancement and inline-code enhancement
/// in that order.
pub fn enhance_report_html(html: &str, options: &ReportOptions) -> String {
    let html = normalize_pre_blocks(html);
    let html = enhance_code_blocks(&html, options);
    enhance_inline_code(&html, options)
}

/// Collapses a `pre` holding several `code` elements into one `code` that
/// keeps the first element's attributes.
pub fn normalize_pre_blocks(html: &str) -> String {
    PRE_BLOCK
        .replace_all(html, |caps: &Captures| {
            let inner = &caps[2];
            let mut opens = CODE_OPEN.captures_iter(inner);
            let (Some(first), Some(_)) = (opens.next(), opens.next()) else {
                return caps[0].to_string();
            };

            let first_attrs = first.get(1).map_or("", |m| m.as_str());
            let without_opens = CODE_OPEN.replace_all(inner, "");
            let content = CODE_CLOSE.replace_all(&without_opens, "");
            format!("<pre{}><code{first_attrs}>{content}</code></pre>", &caps[1])
        })
        .into_owned()
}

/// Adds block classes and `data-code-lang` to every `pre` and its first
/// `code`, and runs the configured highlighter over that code's text.
///
/// Markup around the block code inside the `pre` (a leading or trailing cloze
/// marker) is kept as is. A `pre` without `code` is left untouched.
pub fn enhance_code_blocks(html: &str, options: &ReportOptions) -> String {
    PRE_BLOCK
        .replace_all(html, |caps: &Captures| {
            let inner = caps.get(2).map_or("", |m| m.as_str());
            let Some(open) = CODE_OPEN.captures(inner) else {
                return caps[0].to_string();
            };
            let Some(open_match) = open.get(0) else {
                return caps[0].to_string();
            };
            let Some(close) = CODE_CLOSE.find_at(inner, open_match.end()) else {
                return caps[0].to_string();
            };

            let mut pre = TagAttributes::parse(&caps[1]);
            let mut code = TagAttributes::parse(&open[1]);
            let original = &inner[open_match.end()..close.start()];

            let explicit = detect_language(&code);
            let (language, content) = highlight_block(&code, original, explicit, options);

            pre.add_class(&options.code_block_class);
            code.add_class(&options.block_code_class);
            if let Some(language) = &language {
                pre.set("data-code-lang", language);
                code.set("data-code-lang", language);
            }

            format!(
                "<pre{pre}>{}<code{code}>{content}</code>{}</pre>",
                &inner[..open_match.start()],
                &inner[close.end()..]
            )
        })
        .into_owned()
}

fn highlight_block(
    code: &TagAttributes,
    original: &str,
    explicit: Option<String>,
    options: &ReportOptions,
) -> (Option<String>, String) {
    let Some(highlight) = &options.highlighter else {
        return (explicit, original.to_string());
    };
    if code.has_class(&options.block_code_class) {
        tracing::trace!("code block already enhanced, skipping highlighter");
        return (explicit, original.to_string());
    }
    if original.contains('<') {
        tracing::trace!("code block contains markup, skipping highlighter");
        return (explicit, original.to_string());
    }

    let source = decode_xml_entities(original);
    let highlighted = highlight(&source, explicit.as_deref());
    let language = highlighted
        .language
        .as_deref()
        .map(str::trim)
        .filter(|language| !language.is_empty())
        .map(normalize_language)
        .or(explicit);
    let content = if highlighted.html.is_empty() {
        original.to_string()
    } else {
        highlighted.html
    };

    (language, content)
}

/// Marks every `<code>` that is not block code as inline code.
pub fn enhance_inline_code(html: &str, options: &ReportOptions) -> String {
    CODE_OPEN
        .replace_all(html, |caps: &Captures| {
            let mut attrs = TagAttributes::parse(&caps[1]);
            if attrs.has_class(&options.block_code_class) {
                return caps[0].to_string();
            }

            attrs.add_class(&options.inline_code_class);
            if let Some(language) = detect_language(&attrs) {
                attrs.set("data-code-lang", &language);
            }
            format!("<code{attrs}>")
        })
        .into_owned()
}

/// Language named by a `data-*` attribute or a `language-X` / `lang-X` class.
pub fn detect_language(attrs: &TagAttributes) -> Option<String> {
    let from_attribute = LANGUAGE_ATTRIBUTES.iter().find_map(|name| {
        attrs
            .get(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    });

    from_attribute
        .or_else(|| {
            attrs.classes().into_iter().find_map(|class| {
                class
                    .strip_prefix("language-")
                    .or_else(|| class.strip_prefix("lang-"))
                    .filter(|language| !language.is_empty())
                    .map(str::to_string)
            })
        })
        .map(|language| normalize_language(&language))
}

pub fn normalize_language(language: &str) -> String {
    let language = language.trim().to_ascii_lowercase();
    match language.as_str() {
        "xml" => "html".to_string(),
        "plaintext" => "plain".to_string(),
        _ => language,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Highlighted;
    use pretty_assertions::assert_eq;

    fn css_highlighter() -> ReportOptions {
        ReportOptions {
            highlighter: Some(Box::new(|_code: &str, _language: Option<&str>| Highlighted {
                language: Some("css".to_string()),
                html: "<span>css</span>".to_string(),
            })),
            ..ReportOptions::default()
        }
    }

    #[test]
    fn merges_split_code_fragments() {
        let html = r#"<pre><code class="language-js">a =</code><input class="cloze" /><code class="x">+ 1</code></pre>"#;
        assert_eq!(
            normalize_pre_blocks(html),
            r#"<pre><code class="language-js">a =<input class="cloze" />+ 1</code></pre>"#
        );
    }

    #[test]
    fn single_code_pre_is_untouched() {
        let html = "<pre class=\"p\">\n<code>x</code>\n</pre><pre>plain</pre>";
        assert_eq!(normalize_pre_blocks(html), html);
    }

    #[test]
    fn detects_language_from_attributes_and_classes() {
        let attrs = TagAttributes::parse(r#" data-language="XML""#);
        assert_eq!(detect_language(&attrs).as_deref(), Some("html"));

        let attrs = TagAttributes::parse(r#" class="hl lang-plaintext""#);
        assert_eq!(detect_language(&attrs).as_deref(), Some("plain"));

        let attrs = TagAttributes::parse(r#" class="language-rust" data-lang="python""#);
        assert_eq!(detect_language(&attrs).as_deref(), Some("python"));

        assert_eq!(detect_language(&TagAttributes::parse(r#" class="x""#)), None);
    }

    #[test]
    fn highlighter_output_replaces_code() {
        let options = css_highlighter();
        let html = enhance_code_blocks(
            r#"<pre><code class="language-css">.modal{opacity:.5}</code></pre>"#,
            &options,
        );
        assert_eq!(
            html,
            r#"<pre class="code-block" data-code-lang="css"><code class="language-css code-block-code" data-code-lang="css"><span>css</span></code></pre>"#
        );
    }

    #[test]
    fn highlighter_receives_decoded_code_and_explicit_language() {
        let options = ReportOptions {
            highlighter: Some(Box::new(|code: &str, language: Option<&str>| Highlighted {
                language: None,
                html: format!("[{}|{}]", code, language.unwrap_or("none")),
            })),
            ..ReportOptions::default()
        };
        let html = enhance_code_blocks(
            r#"<pre><code data-lang="xml">&lt;a&gt; &amp;&amp;</code></pre>"#,
            &options,
        );
        assert!(html.contains("[<a> &&|html]"));
        assert!(html.contains(r#"data-code-lang="html""#));
    }

    #[test]
    fn empty_highlight_keeps_original_code() {
        let options = ReportOptions {
            highlighter: Some(Box::new(|_: &str, _: Option<&str>| Highlighted::default())),
            ..ReportOptions::default()
        };
        let html = enhance_code_blocks("<pre><code>x &lt; y</code></pre>", &options);
        assert_eq!(
            html,
            r#"<pre class="code-block"><code class="code-block-code">x &lt; y</code></pre>"#
        );
    }

    #[test]
    fn code_with_markup_skips_highlighter() {
        let options = css_highlighter();
        let html = enhance_code_blocks(
            r#"<pre><code class="language-js">a = <input class="cloze" /></code></pre>"#,
            &options,
        );
        assert!(html.contains(r#"a = <input class="cloze" />"#));
        assert!(html.contains(r#"data-code-lang="js""#));
    }

    #[test]
    fn inline_code_gets_class_and_language() {
        let options = ReportOptions::default();
        let html = enhance_inline_code(
            r#"<p><code>x</code> <code class="lang-XML">y</code></p><pre><code class="code-block-code">z</code></pre>"#,
            &options,
        );
        assert_eq!(
            html,
            r#"<p><code class="inline-code">x</code> <code class="lang-XML inline-code" data-code-lang="html">y</code></p><pre><code class="code-block-code">z</code></pre>"#
        );
    }

    #[test]
    fn trailing_blank_does_not_swallow_next_block() {
        let options = css_highlighter();
        let html = enhance_report_html(
            r#"<pre><code>x = </code><input class="cloze" /></pre><p>between</p><pre><code class="language-css">a{}</code></pre>"#,
            &options,
        );
        assert_eq!(
            html,
            r#"<pre class="code-block" data-code-lang="css"><code class="code-block-code" data-code-lang="css"><span>css</span></code><input class="cloze" /></pre><p>between</p><pre class="code-block" data-code-lang="css"><code class="language-css code-block-code" data-code-lang="css"><span>css</span></code></pre>"#
        );
        assert!(!html.contains("inline-code"));
    }

    #[test]
    fn leading_blank_still_enhances_block_code() {
        let options = css_highlighter();
        let html = enhance_report_html(
            r#"<pre><input class="cloze" /><code class="language-js">= 1</code></pre><pre><code class="language-css">a{}</code></pre>"#,
            &options,
        );
        assert!(html.starts_with(r#"<pre class="code-block" data-code-lang="css"><input class="cloze" /><code class="language-js code-block-code" data-code-lang="css">"#));
        assert_eq!(html.matches("<span>css</span>").count(), 2);
        assert!(!html.contains("inline-code"));
    }

    #[test]
    fn pre_without_code_is_untouched() {
        let options = css_highlighter();
        let html = "<pre class=\"p\">plain</pre>";
        assert_eq!(enhance_code_blocks(html, &options), html);
    }

    #[test]
    fn passes_are_idempotent() {
        let options = css_highlighter();
        let source = r#"<p><code>k</code></p><pre><code class="language-css">a{}</code></pre><pre><code>b = </code><input /><code> 1</code></pre>"#;

        let once = enhance_report_html(source, &options);
        let twice = enhance_report_html(&once, &options);
        assert_eq!(once, twice);
        assert_eq!(once.matches("data-code-lang=\"css\"").count(), 2);
    }
}
