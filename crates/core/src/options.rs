//! Per-mode rendering options.
//!
//! Every field has a default, so hosts can deserialize partial option objects.
//! Callback fields cannot cross a serialization boundary and are skipped.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A blank about to be rendered by the scoring renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlankSlot<'a> {
    /// 1-based position of the blank in document order.
    pub index: usize,
    pub response_identifier: Option<&'a str>,
}

/// Output of a syntax highlighter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlighted {
    /// Language the highlighter settled on, if any.
    #[serde(default)]
    pub language: Option<String>,
    /// Highlighted markup. Empty means "keep the original code".
    #[serde(default)]
    pub html: String,
}

pub type BlankRenderer = Box<dyn Fn(&BlankSlot<'_>) -> String>;
/// Receives the response identifier of the extended-text interaction.
pub type PlaceholderRenderer = Box<dyn Fn(Option<&str>) -> String>;
/// Receives the entity-decoded code and the explicit language, if any.
pub type Highlighter = Box<dyn Fn(&str, Option<&str>) -> Highlighted>;

/// Options for [`crate::parse_item_for_scoring`].
#[derive(Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoringOptions {
    /// Class of the `<ol>` that lists a choice interaction's options.
    pub choice_list_class: String,
    /// Extra class on `<pre>` elements that contain a blank.
    pub pre_blank_class: String,
    /// Class of the default blank input.
    pub blank_class: String,
    /// `size` of the default blank input.
    pub blank_size: usize,
    /// Label of the default long-answer placeholder.
    pub long_answer_label: String,
    #[serde(skip)]
    pub blank_renderer: Option<BlankRenderer>,
    #[serde(skip)]
    pub long_answer_renderer: Option<PlaceholderRenderer>,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        Self {
            choice_list_class: "choice-list".to_string(),
            pre_blank_class: "has-blank".to_string(),
            blank_class: "blank-input".to_string(),
            blank_size: 6,
            long_answer_label: "Long answer".to_string(),
            blank_renderer: None,
            long_answer_renderer: None,
        }
    }
}

impl fmt::Debug for ScoringOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoringOptions")
            .field("choice_list_class", &self.choice_list_class)
            .field("pre_blank_class", &self.pre_blank_class)
            .field("blank_class", &self.blank_class)
            .field("blank_size", &self.blank_size)
            .field("long_answer_label", &self.long_answer_label)
            .field("blank_renderer", &self.blank_renderer.is_some())
            .field("long_answer_renderer", &self.long_answer_renderer.is_some())
            .finish()
    }
}

/// Default report-mode stand-in for a blank.
pub const DEFAULT_CLOZE_HTML: &str =
    r#"<input type="text" class="cloze-blank" readonly tabindex="-1" aria-label="blank" />"#;

/// Options for [`crate::parse_item_for_report`].
#[derive(Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportOptions {
    /// Class of the `<div>` wrapping a choice interaction.
    pub choice_wrapper_class: String,
    /// Markup emitted in place of every blank.
    pub cloze_html: String,
    /// Class added to `<pre>` of an enhanced code block.
    pub code_block_class: String,
    /// Class added to `<code>` of an enhanced code block. Also marks a code
    /// element as already enhanced.
    pub block_code_class: String,
    /// Class added to inline `<code>` elements.
    pub inline_code_class: String,
    #[serde(skip)]
    pub highlighter: Option<Highlighter>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            choice_wrapper_class: "choice-interaction".to_string(),
            cloze_html: DEFAULT_CLOZE_HTML.to_string(),
            code_block_class: "code-block".to_string(),
            block_code_class: "code-block-code".to_string(),
            inline_code_class: "inline-code".to_string(),
            highlighter: None,
        }
    }
}

impl fmt::Debug for ReportOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportOptions")
            .field("choice_wrapper_class", &self.choice_wrapper_class)
            .field("cloze_html", &self.cloze_html)
            .field("code_block_class", &self.code_block_class)
            .field("block_code_class", &self.block_code_class)
            .field("inline_code_class", &self.inline_code_class)
            .field("highlighter", &self.highlighter.is_some())
            .finish()
    }
}
