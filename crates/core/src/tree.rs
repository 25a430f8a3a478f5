//! Element lookup and traversal helpers shared by both renderers.

use roxmltree::Node;

use crate::escape::escape_html;

/// Structural prefix carried by QTI 3 element names.
pub(crate) const QTI_PREFIX: &str = "qti-";

/// Returns every descendant element of `root` (excluding `root`) whose local
/// name is `name`, in document order.
///
/// Local names are matched in any namespace first. When nothing matches, the
/// search is repeated with the `qti-` prefix toggled so documents written with
/// unprefixed names (`item-body`) resolve the same as QTI 3 ones
/// (`qti-item-body`).
pub fn find_elements<'a, 'input>(root: Node<'a, 'input>, name: &str) -> Vec<Node<'a, 'input>> {
    let found = descendants_named(root, name);
    if !found.is_empty() {
        return found;
    }

    let fallback = match name.strip_prefix(QTI_PREFIX) {
        Some(bare) => bare.to_string(),
        None => format!("{QTI_PREFIX}{name}"),
    };
    descendants_named(root, &fallback)
}

/// First match of [`find_elements`].
pub fn find_element<'a, 'input>(root: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    find_elements(root, name).into_iter().next()
}

fn descendants_named<'a, 'input>(root: Node<'a, 'input>, name: &str) -> Vec<Node<'a, 'input>> {
    root.descendants()
        .skip(1)
        .filter(|node| node.is_element() && node.tag_name().name() == name)
        .collect()
}

/// Concatenated text of all descendant text nodes.
pub(crate) fn text_content(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

/// Local name with the `qti-` prefix removed; the key both dispatch tables use.
pub(crate) fn structural_name<'a>(node: Node<'a, '_>) -> &'a str {
    let name = node.tag_name().name();
    name.strip_prefix(QTI_PREFIX).unwrap_or(name)
}

pub(crate) fn is_named(node: Node<'_, '_>, structural: &str) -> bool {
    node.is_element() && structural_name(node) == structural
}

pub(crate) fn is_blank(node: Node<'_, '_>) -> bool {
    is_named(node, "text-entry-interaction")
}

pub(crate) fn is_whitespace_text(node: Node<'_, '_>) -> bool {
    node.is_text() && node.text().is_none_or(|text| text.trim().is_empty())
}

/// Whitespace handling threaded through the recursive renderers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RenderState {
    pub in_pre: bool,
    pub preserve_whitespace: bool,
}

impl RenderState {
    pub(crate) fn preserving(self) -> Self {
        Self {
            preserve_whitespace: true,
            ..self
        }
    }

    pub(crate) fn inside_pre(self) -> Self {
        Self {
            in_pre: true,
            preserve_whitespace: true,
        }
    }
}

/// Escapes a text node. Whitespace-only text outside preformatted contexts is
/// trimmed: indentation spanning a line break disappears, inline spacing
/// collapses to one space.
pub(crate) fn render_text(text: &str, state: RenderState) -> String {
    if state.in_pre || state.preserve_whitespace || !text.trim().is_empty() {
        return escape_html(text);
    }
    if text.is_empty() || text.contains(['\n', '\r']) {
        String::new()
    } else {
        " ".to_string()
    }
}

/// A significant child of a `pre` element and the sides of it that abut a blank.
pub(crate) struct PreChild<'a, 'input> {
    pub node: Node<'a, 'input>,
    pub blank_before: bool,
    pub blank_after: bool,
}

/// Significant children of `pre` (whitespace-only text dropped) and whether
/// any of them is a blank.
pub(crate) fn pre_children<'a, 'input>(pre: Node<'a, 'input>) -> (Vec<PreChild<'a, 'input>>, bool) {
    let significant: Vec<Node<'a, 'input>> = pre
        .children()
        .filter(|child| child.is_element() || (child.is_text() && !is_whitespace_text(*child)))
        .collect();
    let has_blank = significant.iter().any(|node| is_blank(*node));

    let children = significant
        .iter()
        .enumerate()
        .map(|(index, node)| PreChild {
            node: *node,
            blank_before: index > 0 && is_blank(significant[index - 1]),
            blank_after: significant.get(index + 1).is_some_and(|next| is_blank(*next)),
        })
        .collect();

    (children, has_blank)
}

/// Strips the whitespace run that abuts a blank, unless it spans a line break.
pub(crate) fn trim_blank_gap(rendered: &str, start: bool, end: bool) -> &str {
    let mut out = rendered;
    if start {
        let gap = out.len() - out.trim_start().len();
        if !out[..gap].contains(['\n', '\r']) {
            out = &out[gap..];
        }
    }
    if end {
        let kept = out.trim_end().len();
        if !out[kept..].contains(['\n', '\r']) {
            out = &out[..kept];
        }
    }
    out
}
