//! Block structure: lists, figures, tables.

use tracing::debug;

use mfnf_rewrite::{Rules, Walk, check};
use mfnf_shared::{Element, Image, List, Node, Result};

/// Resource prefix of embedded files.
const FILE_PREFIX: &str = "./Datei:";

/// `<ul>`/`<ol>` to `list`, one item per `<li>`.
pub(crate) fn lists() -> Rules {
    Rules::new("lists").rule(
        "list",
        |node| check(node).element_of(&["ul", "ol"]).passed(),
        |walk, node| match node {
            Node::Element(el) => list(walk, el),
            other => Ok(other),
        },
    )
}

fn list(walk: &Walk<'_>, el: Element) -> Result<Node> {
    let mut items = Vec::with_capacity(el.children.len());
    for child in el.children {
        let item = match child {
            Node::Element(li) => li.children,
            other => vec![other],
        };
        items.push(walk.nodes(item)?);
    }
    Ok(Node::List(List {
        ordered: el.name == "ol",
        children: items,
    }))
}

/// `<figure typeof="mw:Image[/Thumb]">` to `image`.
pub(crate) fn figures() -> Rules {
    Rules::new("figures").rule(
        "figure",
        |node| {
            check(node)
                .element("figure")
                .attr_of("typeof", &["mw:Image", "mw:Image/Thumb"])
                .passed()
        },
        |walk, node| match node {
            Node::Element(el) => figure(walk, el),
            other => Ok(other),
        },
    )
}

fn figure(walk: &Walk<'_>, el: Element) -> Result<Node> {
    let thumbnail = el.attrs.get("typeof").is_some_and(|t| t == "mw:Image/Thumb");

    // <figure><a><img resource=… src=…/></a>…</figure>
    let img = el
        .children
        .iter()
        .find(|child| matches!(child, Node::Element(_)))
        .and_then(Node::children)
        .and_then(|children| children.first());
    let (Some(resource), Some(src)) = (
        img.and_then(|img| img.attr("resource")),
        img.and_then(|img| img.attr("src")),
    ) else {
        debug!("figure without embedded file");
        return Ok(Node::error("Figure does not embed a file"));
    };
    let name = resource.strip_prefix(FILE_PREFIX).unwrap_or(resource).to_string();
    let url = src.to_string();

    let caption = el
        .children
        .into_iter()
        .find_map(|child| match child {
            Node::Element(c) if c.name == "figcaption" => Some(c.children),
            _ => None,
        })
        .unwrap_or_default();

    Ok(Node::Image(Image {
        name,
        url,
        thumbnail,
        caption: walk.nodes(caption)?,
    }))
}

/// Inline images are not part of the document model.
pub(crate) fn inline_figures() -> Rules {
    Rules::new("inline-figures").rule(
        "inline-image",
        |node| check(node).element("span").attr("typeof", "mw:Image").passed(),
        |_, node| {
            debug!(src = ?node.attr("resource"), "inline image rejected");
            Ok(Node::error("Inline images are not allowed"))
        },
    )
}

/// `<table>` (optionally through `<tbody>`) to `table` over its rows.
pub(crate) fn tables() -> Rules {
    Rules::new("tables").rule(
        "table",
        |node| check(node).element("table").passed(),
        |walk, node| match node {
            Node::Element(el) => table(walk, el),
            other => Ok(other),
        },
    )
}

fn table(walk: &Walk<'_>, el: Element) -> Result<Node> {
    let mut rows = el.children;
    if rows.first().and_then(Node::name) == Some("tbody") {
        rows = match rows.swap_remove(0) {
            Node::Element(tbody) => tbody.children,
            _ => Vec::new(),
        };
    }
    Ok(Node::Table {
        children: walk.nodes(rows)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Identity, element};
    use mfnf_rewrite::{Context, NodeRewriter};

    fn run(rewriter: &dyn NodeRewriter, nodes: Vec<Node>) -> Vec<Node> {
        Walk::new(rewriter, Context::new(&Identity, "Test"))
            .nodes(nodes)
            .unwrap()
    }

    fn figure_node(typeof_: &str, caption: Option<Vec<Node>>) -> Node {
        let img = element("img", &[("resource", "./Datei:Folge.svg"), ("src", "//up/Folge.svg")], vec![]);
        let mut children = vec![element("a", &[("href", "./Datei:Folge.svg")], vec![img])];
        if let Some(caption) = caption {
            children.push(Node::element("figcaption", caption));
        }
        element("figure", &[("typeof", typeof_)], children)
    }

    #[test]
    fn lists_keep_order_and_rewrite_items() {
        let input = vec![Node::element(
            "ol",
            vec![
                Node::element("li", vec![Node::text("a")]),
                Node::element("li", vec![Node::element("ul", vec![Node::element("li", vec![Node::text("b")])])]),
            ],
        )];
        let output = run(&lists(), input);
        assert_eq!(
            output,
            vec![Node::List(List {
                ordered: true,
                children: vec![
                    vec![Node::text("a")],
                    vec![Node::List(List {
                        ordered: false,
                        children: vec![vec![Node::text("b")]],
                    })],
                ],
            })]
        );
    }

    #[test]
    fn thumbnail_figure_with_caption() {
        let node = figure_node("mw:Image/Thumb", Some(vec![Node::text("Graph")]));
        let output = run(&figures(), vec![node]);
        assert_eq!(
            output,
            vec![Node::Image(Image {
                name: "Folge.svg".into(),
                url: "//up/Folge.svg".into(),
                thumbnail: true,
                caption: vec![Node::text("Graph")],
            })]
        );
    }

    #[test]
    fn plain_figure_without_caption() {
        let output = run(&figures(), vec![figure_node("mw:Image", None)]);
        let Node::Image(image) = &output[0] else {
            panic!("expected image")
        };
        assert!(!image.thumbnail);
        assert!(image.caption.is_empty());
    }

    #[test]
    fn figure_with_other_typeof_is_left_alone() {
        let node = figure_node("mw:Video", None);
        assert_eq!(run(&figures(), vec![node.clone()]), vec![node]);
    }

    #[test]
    fn figure_without_file_becomes_error() {
        let node = element("figure", &[("typeof", "mw:Image")], vec![]);
        assert_eq!(
            run(&figures(), vec![node]),
            vec![Node::error("Figure does not embed a file")]
        );
    }

    #[test]
    fn inline_images_become_errors() {
        let span = element("span", &[("typeof", "mw:Image")], vec![]);
        let output = run(&inline_figures(), vec![Node::element("p", vec![Node::text("x"), span])]);
        assert_eq!(
            output,
            vec![Node::element(
                "p",
                vec![Node::text("x"), Node::error("Inline images are not allowed")]
            )]
        );
    }

    #[test]
    fn tables_unwrap_tbody() {
        let row = Node::element("tr", vec![Node::element("td", vec![Node::text("1")])]);
        let with_tbody = Node::element("table", vec![Node::element("tbody", vec![row.clone()])]);
        let without = Node::element("table", vec![row.clone()]);

        let expected = Node::Table {
            children: vec![row],
        };
        assert_eq!(run(&tables(), vec![with_tbody]), vec![expected.clone()]);
        assert_eq!(run(&tables(), vec![without]), vec![expected]);
    }
}
