//! Interactive rendering used by the scoring UI.

use roxmltree::Node;

use crate::escape::escape_html;
use crate::options::{BlankSlot, ScoringOptions};
use crate::tree::{
    RenderState, find_element, find_elements, is_named, is_whitespace_text, pre_children,
    render_text, structural_name, trim_blank_gap,
};

/// Recursive renderer that numbers blanks across one render call.
pub(crate) struct ScoringRenderer<'o> {
    options: &'o ScoringOptions,
    blanks: usize,
}

impl<'o> ScoringRenderer<'o> {
    pub(crate) fn new(options: &'o ScoringOptions) -> Self {
        Self { options, blanks: 0 }
    }

    /// Number of blanks rendered so far.
    pub(crate) fn blank_count(&self) -> usize {
        self.blanks
    }

    pub(crate) fn render_children(&mut self, node: Node<'_, '_>, state: RenderState) -> String {
        let mut html = String::new();
        for child in node.children() {
            html.push_str(&self.render_node(child, state));
        }
        html
    }

    fn render_node(&mut self, node: Node<'_, '_>, state: RenderState) -> String {
        if node.is_text() {
            return render_text(node.text().unwrap_or_default(), state);
        }
        if !node.is_element() {
            return String::new();
        }

        match structural_name(node) {
            tag @ ("p" | "h3" | "h4" | "h5" | "h6" | "em" | "strong" | "del" | "ul" | "li"
            | "table" | "thead" | "tbody" | "tr" | "th" | "td" | "blockquote") => {
                self.wrap(tag, "", node, state)
            }
            "a" => {
                let attrs = pick_attributes(node, &["href", "title"]);
                self.wrap("a", &attrs, node, state)
            }
            "ol" => {
                let attrs = pick_attributes(node, &["start"]);
                self.wrap("ol", &attrs, node, state)
            }
            "code" => format!("<code>{}</code>", self.render_children(node, state.preserving())),
            "pre" => self.render_pre(node, state),
            "hr" => "<hr />".to_string(),
            "img" => render_img(node),
            "text-entry-interaction" => self.render_blank(node),
            "extended-text-interaction" => self.render_long_answer(node),
            "choice-interaction" => self.render_choices(node, state),
            "rubric-block" => String::new(),
            _ => self.render_children(node, state),
        }
    }

    fn wrap(&mut self, tag: &str, attrs: &str, node: Node<'_, '_>, state: RenderState) -> String {
        format!("<{tag}{attrs}>{}</{tag}>", self.render_children(node, state))
    }

    fn render_pre(&mut self, pre: Node<'_, '_>, state: RenderState) -> String {
        let (children, has_blank) = pre_children(pre);
        let inner_state = state.inside_pre();

        let mut inner = String::new();
        for child in children {
            if is_named(child.node, "code") {
                let code = self.render_children(child.node, inner_state);
                let code = trim_blank_gap(&code, child.blank_before, child.blank_after);
                inner.push_str("<code>");
                inner.push_str(code);
                inner.push_str("</code>");
            } else {
                inner.push_str(&self.render_node(child.node, inner_state));
            }
        }

        if has_blank {
            format!(
                "<pre class=\"{}\">{inner}</pre>",
                escape_html(&self.options.pre_blank_class)
            )
        } else {
            format!("<pre>{inner}</pre>")
        }
    }

    fn render_blank(&mut self, node: Node<'_, '_>) -> String {
        self.blanks += 1;
        let slot = BlankSlot {
            index: self.blanks,
            response_identifier: node.attribute("response-identifier"),
        };

        match &self.options.blank_renderer {
            Some(render) => render(&slot),
            None => format!(
                "<input type=\"text\" class=\"{}\" data-blank=\"{index}\" size=\"{}\" aria-label=\"Blank {index}\" disabled />",
                escape_html(&self.options.blank_class),
                self.options.blank_size,
                index = slot.index,
            ),
        }
    }

    fn render_long_answer(&self, node: Node<'_, '_>) -> String {
        let response_identifier = node.attribute("response-identifier");
        match &self.options.long_answer_renderer {
            Some(render) => render(response_identifier),
            None => format!(
                "<span class=\"long-answer-placeholder\">{}</span>",
                escape_html(&self.options.long_answer_label)
            ),
        }
    }

    fn render_choices(&mut self, interaction: Node<'_, '_>, state: RenderState) -> String {
        let mut lead = String::new();
        let mut items = String::new();

        // Walk in document order so blank numbering follows the source.
        for child in interaction.children() {
            if is_named(child, "simple-choice") {
                let identifier = child.attribute("identifier").unwrap_or_default();
                items.push_str(&format!(
                    "<li data-choice=\"{}\">{}</li>",
                    escape_html(identifier),
                    self.render_children(child, state)
                ));
            } else {
                lead.push_str(&self.render_node(child, state));
            }
        }

        format!(
            "{lead}<ol class=\"{}\">{items}</ol>",
            escape_html(&self.options.choice_list_class)
        )
    }

    /// Renders the content body of the `EXPLANATION` modal feedback, if any,
    /// continuing this renderer's blank numbering.
    pub(crate) fn render_explanation(&mut self, root: Node<'_, '_>) -> Option<String> {
        let feedbacks: Vec<Node<'_, '_>> = find_elements(root, "qti-modal-feedback")
            .into_iter()
            .filter(|feedback| feedback.attribute("identifier") == Some("EXPLANATION"))
            .collect();
        let feedback = feedbacks
            .iter()
            .find(|feedback| feedback.attribute("outcome-identifier") == Some("FEEDBACK"))
            .or_else(|| feedbacks.first())?;
        let body = find_element(*feedback, "qti-content-body")?;

        let mut html = String::new();
        for child in body.children().filter(|child| !is_whitespace_text(*child)) {
            html.push_str(&self.render_node(child, RenderState::default()));
        }
        Some(html)
    }
}

/// ` name="value"` pairs for the listed attributes that are present.
fn pick_attributes(node: Node<'_, '_>, names: &[&str]) -> String {
    names
        .iter()
        .filter_map(|name| {
            node.attribute(*name)
                .map(|value| format!(" {name}=\"{}\"", escape_html(value)))
        })
        .collect()
}

fn render_img(node: Node<'_, '_>) -> String {
    let src = node.attribute("src").unwrap_or_default();
    let alt = node.attribute("alt").unwrap_or_default();
    format!(
        "<img src=\"{}\" alt=\"{}\"{} />",
        escape_html(src),
        escape_html(alt),
        pick_attributes(node, &["title"])
    )
}
