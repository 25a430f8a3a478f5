//! Scoring metadata pulled out of an item body, independent of render mode.

use std::sync::LazyLock;

use regex::Regex;
use roxmltree::Node;
use serde::{Deserialize, Serialize};

use crate::tree::{find_elements, text_content};

static RUBRIC_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\[(\d*\.?\d+)\]\s*(.*)$").expect("invalid rubric line regex")
});

/// One scored line of the scorer rubric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricCriterion {
    /// 1-based position among the scorer rubric lines.
    pub index: usize,
    pub points: f64,
    pub text: String,
}

/// An answer option of a choice interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub identifier: String,
    pub text: String,
}

/// Criteria of the rubric block whose `view` is `scorer`, one per line.
pub fn extract_rubric_criteria(item_body: Node<'_, '_>) -> Vec<RubricCriterion> {
    let Some(block) = find_elements(item_body, "qti-rubric-block")
        .into_iter()
        .find(|block| block.attribute("view") == Some("scorer"))
    else {
        return Vec::new();
    };

    find_elements(block, "p")
        .into_iter()
        .enumerate()
        .map(|(position, line)| parse_rubric_line(position + 1, &text_content(line)))
        .collect()
}

/// Parses `"[2] Good"` into 2 points and `"Good"`. Lines without the marker
/// are worth 0 points.
pub fn parse_rubric_line(index: usize, line: &str) -> RubricCriterion {
    let line = line.trim();
    let (points, text) = RUBRIC_LINE
        .captures(line)
        .and_then(|caps| {
            let points = caps[1].parse::<f64>().ok()?;
            Some((points, caps[2].trim().to_string()))
        })
        .unwrap_or_else(|| (0.0, line.to_string()));

    RubricCriterion {
        index,
        points,
        text,
    }
}

/// Every simple choice under the item body, nested interactions included.
pub fn extract_choices(item_body: Node<'_, '_>) -> Vec<ChoiceOption> {
    find_elements(item_body, "qti-simple-choice")
        .into_iter()
        .map(|choice| ChoiceOption {
            identifier: choice.attribute("identifier").unwrap_or_default().to_string(),
            text: text_content(choice).trim().to_string(),
        })
        .collect()
}

/// Sum of all criterion points.
pub fn max_score(criteria: &[RubricCriterion]) -> f64 {
    criteria.iter().map(|criterion| criterion.points).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn with_body<T>(xml: &str, f: impl FnOnce(Node<'_, '_>) -> T) -> T {
        let doc = roxmltree::Document::parse(xml).unwrap();
        f(doc.root_element())
    }

    #[test]
    fn parses_point_marker() {
        let criterion = parse_rubric_line(1, "[2] Good");
        assert_eq!(criterion.points, 2.0);
        assert_eq!(criterion.text, "Good");

        let criterion = parse_rubric_line(2, "  [1.5]   Mentions caching  ");
        assert_eq!(criterion.points, 1.5);
        assert_eq!(criterion.text, "Mentions caching");
    }

    #[test]
    fn marker_without_leading_digit() {
        let criterion = parse_rubric_line(1, "[.5] Names the unit");
        assert_eq!(criterion.points, 0.5);
        assert_eq!(criterion.text, "Names the unit");
    }

    #[test]
    fn line_without_marker_is_worth_nothing() {
        let criterion = parse_rubric_line(3, "  Partial credit at discretion ");
        assert_eq!(criterion.points, 0.0);
        assert_eq!(criterion.text, "Partial credit at discretion");
        assert_eq!(criterion.index, 3);
    }

    #[test]
    fn negative_marker_is_not_a_marker() {
        let criterion = parse_rubric_line(1, "[-1] Penalty");
        assert_eq!(criterion.points, 0.0);
        assert_eq!(criterion.text, "[-1] Penalty");
    }

    #[test]
    fn only_scorer_rubric_counts() {
        let xml = r#"<qti-item-body>
            <qti-rubric-block view="candidate"><p>[5] Hidden</p></qti-rubric-block>
            <qti-rubric-block view="scorer">
                <p>[2] Correct term</p>
                <p>Explains <em>why</em></p>
            </qti-rubric-block>
        </qti-item-body>"#;

        let criteria = with_body(xml, extract_rubric_criteria);
        assert_eq!(
            criteria,
            vec![
                RubricCriterion {
                    index: 1,
                    points: 2.0,
                    text: "Correct term".to_string()
                },
                RubricCriterion {
                    index: 2,
                    points: 0.0,
                    text: "Explains why".to_string()
                },
            ]
        );
        assert_eq!(max_score(&criteria), 2.0);
    }

    #[test]
    fn no_scorer_rubric_means_no_criteria() {
        let xml = r#"<qti-item-body><qti-rubric-block view="candidate"><p>[1] x</p></qti-rubric-block></qti-item-body>"#;

        let criteria = with_body(xml, extract_rubric_criteria);
        assert!(criteria.is_empty());
        assert_eq!(max_score(&criteria), 0.0);
    }

    #[test]
    fn extracts_nested_choices() {
        let xml = r#"<qti-item-body>
            <qti-choice-interaction>
                <qti-simple-choice identifier="A"> <code>let</code> binding </qti-simple-choice>
                <qti-simple-choice>Const</qti-simple-choice>
            </qti-choice-interaction>
        </qti-item-body>"#;

        let choices = with_body(xml, extract_choices);
        assert_eq!(
            choices,
            vec![
                ChoiceOption {
                    identifier: "A".to_string(),
                    text: "let binding".to_string()
                },
                ChoiceOption {
                    identifier: String::new(),
                    text: "Const".to_string()
                },
            ]
        );
    }
}
