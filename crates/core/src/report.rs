//! Static rendering used by reports.

use roxmltree::Node;

use crate::escape::escape_html;
use crate::options::ReportOptions;
use crate::tree::{
    RenderState, is_named, pre_children, render_text, structural_name, trim_blank_gap,
};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub(crate) struct ReportRenderer<'o> {
    options: &'o ReportOptions,
}

impl<'o> ReportRenderer<'o> {
    pub(crate) fn new(options: &'o ReportOptions) -> Self {
        Self { options }
    }

    pub(crate) fn render_children(&self, node: Node<'_, '_>, state: RenderState) -> String {
        node.children()
            .map(|child| self.render_node(child, state))
            .collect()
    }

    fn render_node(&self, node: Node<'_, '_>, state: RenderState) -> String {
        if node.is_text() {
            return render_text(node.text().unwrap_or_default(), state);
        }
        if !node.is_element() {
            return String::new();
        }

        match structural_name(node) {
            "rubric-block" | "extended-text-interaction" => String::new(),
            "text-entry-interaction" => self.options.cloze_html.clone(),
            "choice-interaction" => format!(
                "<div class=\"{}\">{}</div>",
                escape_html(&self.options.choice_wrapper_class),
                self.render_children(node, state)
            ),
            "pre" => self.render_pre(node, state),
            "code" => self.render_code(node, state.preserving(), false, false),
            tag if VOID_ELEMENTS.contains(&tag) => format!("<{tag}{} />", copy_attributes(node)),
            tag => format!(
                "<{tag}{}>{}</{tag}>",
                copy_attributes(node),
                self.render_children(node, state)
            ),
        }
    }

    fn render_pre(&self, pre: Node<'_, '_>, state: RenderState) -> String {
        let (children, _) = pre_children(pre);
        let inner_state = state.inside_pre();

        let inner: String = children
            .iter()
            .map(|child| {
                if is_named(child.node, "code") {
                    self.render_code(child.node, inner_state, child.blank_before, child.blank_after)
                } else {
                    self.render_node(child.node, inner_state)
                }
            })
            .collect();

        format!("<pre{}>{inner}</pre>", copy_attributes(pre))
    }

    fn render_code(
        &self,
        code: Node<'_, '_>,
        state: RenderState,
        trim_start: bool,
        trim_end: bool,
    ) -> String {
        let inner = self.render_children(code, state.preserving());
        format!(
            "<code{}>{}</code>",
            copy_attributes(code),
            trim_blank_gap(&inner, trim_start, trim_end)
        )
    }
}

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Re-serializes every attribute in source order. Namespace declarations are
/// not attributes in the parsed tree and never appear; namespaced attributes
/// keep their prefix.
fn copy_attributes(node: Node<'_, '_>) -> String {
    node.attributes()
        .map(|attr| {
            let prefix = match attr.namespace() {
                Some(XML_NAMESPACE) => Some("xml"),
                Some(uri) => node.lookup_prefix(uri),
                None => None,
            };
            let value = escape_html(attr.value());
            match prefix {
                Some(prefix) => format!(" {prefix}:{}=\"{value}\"", attr.name()),
                None => format!(" {}=\"{value}\"", attr.name()),
            }
        })
        .collect()
}
