//! Renders QTI 3.0 assessment items into HTML.
//!
//! Two renderings come out of the same item document:
//!
//! - [`parse_item_for_scoring`] produces interactive markup: numbered blank
//!   inputs, choice lists, the scorer rubric and the candidate explanation.
//! - [`parse_item_for_report`] produces static markup: cloze markers,
//!   enhanced (optionally highlighted) code blocks and the item's max score.
//!
//! Rendered scoring HTML can later be filled with a candidate's answers via
//! [`apply_responses_to_prompt_html`], and any rendered HTML can have its
//! relative image sources rewritten via [`rewrite_html_image_sources`].

mod attributes;
mod enhance;
mod error;
mod escape;
mod images;
mod item;
mod options;
mod report;
mod responses;
mod rewriter;
mod rubric;
mod scoring;
mod tree;

pub use roxmltree;

pub use crate::attributes::TagAttributes;
pub use crate::enhance::{
    detect_language, enhance_code_blocks, enhance_inline_code, enhance_report_html,
    normalize_language, normalize_pre_blocks,
};
pub use crate::error::{Error, Result};
pub use crate::escape::{decode_xml_entities, escape_html};
pub use crate::images::{
    ExternalDetector, ImageRewriteOptions, PathResolver, UrlResolver, is_external_source,
    resolve_relative_path, rewrite_html_image_sources,
};
pub use crate::item::{
    ParsedItemForReport, ParsedItemForScoring, parse_item_for_report, parse_item_for_scoring,
};
pub use crate::options::{
    BlankRenderer, BlankSlot, DEFAULT_CLOZE_HTML, Highlighted, Highlighter, PlaceholderRenderer,
    ReportOptions, ScoringOptions,
};
pub use crate::responses::{CandidateResponse, ResponseOptions, apply_responses_to_prompt_html};
pub use crate::rubric::{
    ChoiceOption, RubricCriterion, extract_choices, extract_rubric_criteria, max_score,
    parse_rubric_line,
};
pub use crate::tree::{find_element, find_elements};

/// Version of this crate.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_package_version() {
        assert_eq!(version(), env!("CARGO_PKG_VERSION"));
    }
}
