//! Final mapping of the remaining HTML elements to document node types.

use tracing::debug;

use mfnf_rewrite::{KindRewriter, Rewritten, Walk};
use mfnf_shared::{Element, Header, Node, NodeKind, Result};

pub(crate) fn fix_node_types() -> KindRewriter {
    KindRewriter::new("fix-node-types", NodeKind::Element, |walk, node| match node {
        Node::Element(el) => Ok(Rewritten::Replaced(convert(walk, el)?)),
        other => Ok(Rewritten::NotInterested(other)),
    })
}

fn convert(walk: &Walk<'_>, el: Element) -> Result<Node> {
    let node = match el.name.as_str() {
        "p" => Node::Paragraph {
            children: walk.nodes(el.children)?,
        },
        "dfn" | "i" => Node::I {
            children: walk.nodes(el.children)?,
        },
        "b" => Node::B {
            children: walk.nodes(el.children)?,
        },
        "tr" => Node::Tr {
            children: walk.nodes(el.children)?,
        },
        "td" => Node::Td {
            children: walk.nodes(el.children)?,
        },
        "th" => Node::Th {
            children: walk.nodes(el.children)?,
        },
        "h2" | "h3" => Node::Header(Header {
            depth: heading_level(&el.name) - 1,
            anchor: None,
            children: walk.nodes(el.children)?,
        }),
        "h1" | "h4" | "h5" | "h6" => {
            let level = heading_level(&el.name);
            debug!(level, "heading depth not allowed");
            Node::error(format!("Heading of depth {level} is not allowed"))
        }
        _ => {
            debug!(element = %el.name, "no rule for element");
            Node::not_implemented(Node::Element(el))
        }
    };
    Ok(node)
}

/// Numeral of an `h1`..`h6` tag name.
fn heading_level(name: &str) -> u8 {
    name.strip_prefix('h')
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Identity, element};
    use mfnf_rewrite::Context;

    fn run(nodes: Vec<Node>) -> Vec<Node> {
        let rewriter = fix_node_types();
        Walk::new(&rewriter, Context::new(&Identity, "Test"))
            .nodes(nodes)
            .unwrap()
    }

    #[test]
    fn heading_depth_law() {
        for level in 1..=6u8 {
            let output = run(vec![Node::element(format!("h{level}"), vec![Node::text("T")])]);
            match level {
                2 | 3 => assert_eq!(
                    output,
                    vec![Node::Header(Header {
                        depth: level - 1,
                        anchor: None,
                        children: vec![Node::text("T")],
                    })]
                ),
                _ => {
                    let Node::Error { message } = &output[0] else {
                        panic!("h{level} should become an error, got {output:?}")
                    };
                    assert!(message.contains(&level.to_string()), "{message}");
                }
            }
        }
    }

    #[test]
    fn inline_tags_are_renamed() {
        let input = vec![Node::element(
            "p",
            vec![
                Node::element("dfn", vec![Node::text("Folge")]),
                Node::element("b", vec![Node::element("i", vec![Node::text("x")])]),
            ],
        )];
        assert_eq!(
            run(input),
            vec![Node::Paragraph {
                children: vec![
                    Node::I {
                        children: vec![Node::text("Folge")]
                    },
                    Node::B {
                        children: vec![Node::I {
                            children: vec![Node::text("x")]
                        }]
                    },
                ]
            }]
        );
    }

    #[test]
    fn table_cells_are_renamed() {
        let input = vec![Node::Table {
            children: vec![Node::element(
                "tr",
                vec![
                    Node::element("th", vec![Node::text("n")]),
                    Node::element("td", vec![Node::text("1")]),
                ],
            )],
        }];
        assert_eq!(
            run(input),
            vec![Node::Table {
                children: vec![Node::Tr {
                    children: vec![
                        Node::Th {
                            children: vec![Node::text("n")]
                        },
                        Node::Td {
                            children: vec![Node::text("1")]
                        },
                    ]
                }]
            }]
        );
    }

    #[test]
    fn unknown_elements_keep_the_raw_node() {
        let div = element("div", &[("class", "box")], vec![Node::element("p", vec![])]);
        let output = run(vec![div.clone()]);
        assert_eq!(output, vec![Node::not_implemented(div)]);
    }
}
