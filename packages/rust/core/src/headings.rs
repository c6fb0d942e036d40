//! Heading anchors.
//!
//! A heading ending in `{{Anker|name}}` gets `anchor = "name"`; the macro is
//! removed from the heading text.

use mfnf_rewrite::{KindRewriter, Rewritten, check};
use mfnf_shared::{Header, Node, NodeKind};

const ANCHOR_TEMPLATE: &str = "Anker";

pub(crate) fn heading_anchors() -> KindRewriter {
    KindRewriter::new("heading-anchors", NodeKind::Header, |_, node| match node {
        Node::Header(header) => Ok(hoist_anchor(header)),
        other => Ok(Rewritten::NotInterested(other)),
    })
}

fn hoist_anchor(mut header: Header) -> Rewritten {
    let anchor = match header.children.last() {
        Some(last @ Node::Template(t)) if check(last).template(ANCHOR_TEMPLATE).passed() => {
            t.text_param("1").map(str::to_string)
        }
        _ => None,
    };
    let Some(anchor) = anchor else {
        return Rewritten::NotInterested(Node::Header(header));
    };

    header.children.pop();
    if let Some(Node::Text { data }) = header.children.last_mut() {
        let len = data.trim_end().len();
        data.truncate(len);
    }
    header.anchor = Some(anchor);
    Rewritten::Replaced(Node::Header(header))
}
