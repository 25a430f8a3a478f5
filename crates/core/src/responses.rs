//! Fills rendered blank inputs with a candidate's answers.

use std::cell::Cell;

use lol_html::element;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::rewriter::rewrite_fragment;

/// Marker attribute carried by every rendered blank input.
const BLANK_MARKER: &str = "data-blank";

/// A candidate's answer: one string, or one string per blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CandidateResponse {
    Single(String),
    Multiple(Vec<String>),
}

impl CandidateResponse {
    /// Values in blank order. An empty single answer counts as no answer.
    pub fn values(&self) -> Vec<&str> {
        match self {
            CandidateResponse::Single(value) if value.is_empty() => Vec::new(),
            CandidateResponse::Single(value) => vec![value.as_str()],
            CandidateResponse::Multiple(values) => values.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for CandidateResponse {
    fn from(value: &str) -> Self {
        CandidateResponse::Single(value.to_string())
    }
}

impl From<Vec<String>> for CandidateResponse {
    fn from(values: Vec<String>) -> Self {
        CandidateResponse::Multiple(values)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResponseOptions {
    /// Smallest `size` given to a filled blank.
    pub min_size: usize,
}

impl Default for ResponseOptions {
    fn default() -> Self {
        Self { min_size: 6 }
    }
}

/// Sets `value` and `size` on each `input[data-blank]` of `html`, pairing the
/// n-th input in document order with the n-th response value.
///
/// Returns `html` unchanged when it has no blanks or there is nothing to fill.
pub fn apply_responses_to_prompt_html(
    html: &str,
    response: Option<&CandidateResponse>,
    options: &ResponseOptions,
) -> Result<String> {
    let values = response.map(CandidateResponse::values).unwrap_or_default();
    if values.is_empty() || !html.contains(BLANK_MARKER) {
        tracing::debug!("no responses to apply, returning prompt unchanged");
        return Ok(html.to_string());
    }

    let position = Cell::new(0usize);
    let handlers = vec![element!("input[data-blank]", |el| {
        let index = position.get();
        position.set(index + 1);

        if let Some(value) = values.get(index) {
            let size = value.chars().count().max(options.min_size);
            el.set_attribute("value", value)?;
            el.set_attribute("size", &size.to_string())?;
        }
        Ok(())
    })];

    let filled = rewrite_fragment(html, handlers)?;
    tracing::debug!(
        blanks = position.get(),
        responses = values.len(),
        "applied responses to prompt"
    );
    Ok(filled)
}
