//! Entry points that turn an assessment item document into rendered records.

use roxmltree::{Document, Node};
use serde::Serialize;

use crate::enhance::enhance_report_html;
use crate::error::{Error, Result};
use crate::options::{ReportOptions, ScoringOptions};
use crate::report::ReportRenderer;
use crate::rubric::{ChoiceOption, RubricCriterion, extract_choices, extract_rubric_criteria, max_score};
use crate::scoring::ScoringRenderer;
use crate::tree::{RenderState, find_element};

/// An item rendered for the interactive scoring UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedItemForScoring {
    pub identifier: String,
    pub title: String,
    pub prompt_html: String,
    pub rubric_criteria: Vec<RubricCriterion>,
    pub choices: Vec<ChoiceOption>,
    pub candidate_explanation_html: Option<String>,
}

/// An item rendered for static reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedItemForReport {
    pub identifier: String,
    pub title: String,
    pub question_html: String,
    pub rubric_criteria: Vec<RubricCriterion>,
    pub item_max_score: f64,
    pub choices: Vec<ChoiceOption>,
}

/// Renders `xml` with blanks as numbered inputs.
///
/// Blank numbering runs through the item body and then the `EXPLANATION`
/// feedback, so every input in both outputs has a distinct `data-blank`.
pub fn parse_item_for_scoring(xml: &str, options: &ScoringOptions) -> Result<ParsedItemForScoring> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();
    let (identifier, title) = identity(root);
    let body = find_element(root, "qti-item-body").ok_or(Error::MissingItemBody)?;

    let mut renderer = ScoringRenderer::new(options);
    let prompt_html = renderer.render_children(body, RenderState::default());
    let candidate_explanation_html = renderer.render_explanation(root);

    let item = ParsedItemForScoring {
        identifier,
        title,
        prompt_html,
        rubric_criteria: extract_rubric_criteria(body),
        choices: extract_choices(body),
        candidate_explanation_html,
    };
    tracing::debug!(
        identifier = %item.identifier,
        blanks = renderer.blank_count(),
        criteria = item.rubric_criteria.len(),
        choices = item.choices.len(),
        "rendered item for scoring"
    );
    Ok(item)
}

/// Renders `xml` as static report markup.
///
/// Fails with [`Error::MissingIdentifier`] when the item has no identifier and
/// with [`Error::IdentifierMismatch`] when it is not `expected_identifier`.
pub fn parse_item_for_report(
    xml: &str,
    expected_identifier: &str,
    options: &ReportOptions,
) -> Result<ParsedItemForReport> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();
    let (identifier, title) = identity(root);
    if identifier.is_empty() {
        return Err(Error::MissingIdentifier);
    }
    if identifier != expected_identifier {
        return Err(Error::IdentifierMismatch {
            expected: expected_identifier.to_string(),
            found: identifier,
        });
    }
    let body = find_element(root, "qti-item-body").ok_or(Error::MissingItemBody)?;

    let rendered = ReportRenderer::new(options).render_children(body, RenderState::default());
    let question_html = enhance_report_html(&rendered, options);
    let rubric_criteria = extract_rubric_criteria(body);

    let item = ParsedItemForReport {
        identifier,
        title,
        question_html,
        item_max_score: max_score(&rubric_criteria),
        rubric_criteria,
        choices: extract_choices(body),
    };
    tracing::debug!(
        identifier = %item.identifier,
        max_score = item.item_max_score,
        criteria = item.rubric_criteria.len(),
        "rendered item for report"
    );
    Ok(item)
}

/// Identifier and title of the item; the title falls back to the identifier.
fn identity(root: Node<'_, '_>) -> (String, String) {
    let identifier = root.attribute("identifier").unwrap_or_default().trim().to_string();
    let title = root
        .attribute("title")
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map_or_else(|| identifier.clone(), str::to_string);
    (identifier, title)
}
