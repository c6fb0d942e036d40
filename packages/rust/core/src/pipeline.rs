//! The article content pipeline.
//!
//! Markup is rendered and parsed into a deincluded tree (see
//! [`mfnf_markup::parse_content`]), then a fixed chain of rewriters turns the
//! HTML-shaped nodes into document nodes. Stage order matters: later stages
//! rely on the output of earlier ones (for example `fix-node-types` maps
//! whatever elements the structural stages did not claim).

use tracing::{debug, instrument};

use mfnf_rewrite::{Chain, Context, DeleteRewriter, check};
use mfnf_shared::{Node, NodeKind, PipelineConfig, Result};

use crate::{blocks, headings, math, node_types, templates};

/// Runs the ordered rewrite chain over parsed article content.
pub struct ArticleContentParser {
    chain: Chain,
}

impl ArticleContentParser {
    pub fn new(config: &PipelineConfig) -> Self {
        let strip_fragments = config.strip_transclusion_fragments;

        let chain = Chain::new("article-content")
            .rewrite(templates::merge_list_params())
            .rewrite(blocks::lists())
            .rewrite(blocks::figures())
            .rewrite(blocks::inline_figures())
            .rewrite(blocks::tables())
            .rewrite(math::inline_math())
            .rewrite(math::wrong_inline_math())
            .rewrite(DeleteRewriter::new("transclusion-fragments", move |node| {
                strip_fragments && is_transclusion_fragment(node)
            }))
            .rewrite(templates::semantic_templates())
            .rewrite(templates::delete_header_and_footer())
            .rewrite(node_types::fix_node_types())
            .rewrite(headings::heading_anchors());

        Self { chain }
    }

    /// Stage names in execution order.
    pub fn stages(&self) -> Vec<&str> {
        self.chain.names()
    }

    /// Render, parse and rewrite article markup.
    #[instrument(skip_all, fields(title = %ctx.title))]
    pub fn parse(&self, ctx: Context<'_>, text: &str) -> Result<Vec<Node>> {
        let nodes = mfnf_markup::parse_content(ctx, text)?;
        self.rewrite(ctx, nodes)
    }

    /// Parse already rendered HTML and rewrite it.
    #[instrument(skip_all, fields(title = %ctx.title))]
    pub fn parse_rendered(&self, ctx: Context<'_>, html: &str) -> Result<Vec<Node>> {
        let nodes = mfnf_markup::parse_rendered(ctx, html)?;
        self.rewrite(ctx, nodes)
    }

    /// Run the rewrite chain over a deincluded tree.
    pub fn rewrite(&self, ctx: Context<'_>, nodes: Vec<Node>) -> Result<Vec<Node>> {
        let nodes = self.chain.run(ctx, nodes)?;
        debug!(nodes = nodes.len(), "article content rewritten");
        Ok(nodes)
    }
}

impl Default for ArticleContentParser {
    fn default() -> Self {
        Self::new(&PipelineConfig::default())
    }
}

/// An element that still carries a transclusion group marker after the
/// group's top element was deincluded.
fn is_transclusion_fragment(node: &Node) -> bool {
    check(node).kind(NodeKind::Element).has_attr("about").passed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Identity, fixture};
    use mfnf_shared::{GalleryItem, Header, Image, List, Template};

    fn ctx() -> Context<'static> {
        Context::new(&Identity, "Mathe für Nicht-Freaks: Folgen")
    }

    fn children_of(node: &Node) -> Vec<Node> {
        node.children().map(<[Node]>::to_vec).unwrap_or_default()
    }

    #[test]
    fn stages_run_in_declared_order() {
        let parser = ArticleContentParser::default();
        assert_eq!(
            parser.stages(),
            vec![
                "merge-list-params",
                "lists",
                "figures",
                "inline-figures",
                "tables",
                "inline-math",
                "wrong-inline-math",
                "transclusion-fragments",
                "templates",
                "delete-header-and-footer",
                "fix-node-types",
                "heading-anchors",
            ]
        );
    }

    #[test]
    fn heading_and_paragraph() {
        let parser = ArticleContentParser::default();
        let output = parser.parse(ctx(), "<h2>Intro</h2><p>Text</p>").unwrap();
        assert_eq!(
            output,
            vec![
                Node::Header(Header {
                    depth: 1,
                    anchor: None,
                    children: vec![Node::text("Intro")],
                }),
                Node::Paragraph {
                    children: vec![Node::text("Text")],
                },
            ]
        );

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"type": "header", "depth": 1, "children": [{"type": "text", "data": "Intro"}]},
                {"type": "paragraph", "children": [{"type": "text", "data": "Text"}]}
            ])
        );
    }

    #[test]
    fn simple_fixture_matches_inline_markup() {
        let parser = ArticleContentParser::default();
        let from_fixture = parser.parse_rendered(ctx(), &fixture("simple.html")).unwrap();
        let inline = parser.parse(ctx(), "<h2>Intro</h2><p>Text</p>").unwrap();
        assert_eq!(from_fixture, inline);
    }

    #[test]
    fn fixture_article_end_to_end() {
        let parser = ArticleContentParser::default();
        let output = parser.parse_rendered(ctx(), &fixture("article.html")).unwrap();
        assert_eq!(output.len(), 12, "{output:#?}");

        // Header anchor hoisted, #invoke header dropped before it.
        assert_eq!(
            output[0],
            Node::Header(Header {
                depth: 1,
                anchor: Some("folgen".into()),
                children: vec![Node::text("Folgen")],
            })
        );

        assert_eq!(
            output[1],
            Node::Paragraph {
                children: vec![
                    Node::text("Eine "),
                    Node::I {
                        children: vec![Node::text("Folge")]
                    },
                    Node::text(" ist eine Abbildung "),
                    Node::InlineMath {
                        formula: "a\\colon\\N\\to\\R".into()
                    },
                    Node::text("."),
                ]
            }
        );

        // Unknown macro stays a template; its content param is rewritten.
        let Node::Template(Template { name, params }) = &output[2] else {
            panic!("expected template, got {:?}", output[2])
        };
        assert_eq!(name, "Definition");
        assert_eq!(
            params["definition"].clone().into_nodes(),
            vec![Node::Paragraph {
                children: vec![
                    Node::text("Eine "),
                    Node::B {
                        children: vec![Node::text("Folge")]
                    },
                    Node::text(" ordnet jeder Zahl ein Glied zu."),
                ]
            }]
        );

        // Fragments of the transclusion survive unless stripping is enabled.
        assert_eq!(children_of(&output[3]), vec![Node::text("Fortsetzung der Definition")]);

        assert!(matches!(&output[4], Node::Header(h) if h.depth == 2));

        assert_eq!(
            output[5],
            Node::List(List {
                ordered: true,
                children: vec![
                    vec![Node::Paragraph {
                        children: vec![Node::text("eins")]
                    }],
                    vec![Node::Paragraph {
                        children: vec![Node::text("zwei")]
                    }],
                ],
            })
        );

        assert_eq!(
            output[6],
            Node::Image(Image {
                name: "Folge.svg".into(),
                url: "//upload.wikimedia.org/Folge.svg".into(),
                thumbnail: true,
                caption: vec![
                    Node::text("Graph einer "),
                    Node::I {
                        children: vec![Node::text("Folge")]
                    },
                ],
            })
        );

        let Node::Gallery(gallery) = &output[7] else {
            panic!("expected gallery, got {:?}", output[7])
        };
        assert_eq!((gallery.widths, gallery.heights), (200, 120));
        assert_eq!(
            gallery.children,
            vec![
                Node::GalleryItem(GalleryItem {
                    name: "Datei:a.png".into(),
                    caption: vec![Node::text("Erste")],
                }),
                Node::error("Gallery item needs a caption"),
            ]
        );

        let Node::Table { children: rows } = &output[8] else {
            panic!("expected table, got {:?}", output[8])
        };
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| matches!(row, Node::Tr { .. })));

        assert_eq!(
            output[9],
            Node::Equation {
                formula: "a_n = \\frac 1n".into()
            }
        );
        assert_eq!(output[10], Node::error("Heading of depth 4 is not allowed"));
        assert!(matches!(&output[11], Node::List(l) if !l.ordered && l.children.len() == 2));
    }

    #[test]
    fn fragment_stripping_is_opt_in() {
        let parser = ArticleContentParser::new(&PipelineConfig {
            strip_transclusion_fragments: true,
        });
        let output = parser.parse_rendered(ctx(), &fixture("article.html")).unwrap();
        assert_eq!(output.len(), 11);
        assert!(!output.iter().any(|node| {
            children_of(node) == vec![Node::text("Fortsetzung der Definition")]
        }));
    }

    #[test]
    fn list_macro_end_to_end() {
        let html = r#"<div typeof="mw:Transclusion" data-mw='{"parts":[{"template":{"target":{"wt":"Liste"},"params":{"item3":{"wt":"<p>c</p>"},"item1":{"wt":"<p>a</p>"},"item2":{"wt":"<p>b</p>"}}}}]}'></div>"#;
        let output = ArticleContentParser::default()
            .parse_rendered(ctx(), html)
            .unwrap();

        let items: Vec<Vec<Node>> = ["a", "b", "c"]
            .iter()
            .map(|s| {
                vec![Node::Paragraph {
                    children: vec![Node::text(*s)],
                }]
            })
            .collect();
        assert_eq!(
            output,
            vec![Node::List(List {
                ordered: false,
                children: items,
            })]
        );
    }

    #[test]
    fn fatal_markup_aborts_the_article() {
        let err = ArticleContentParser::default()
            .parse(ctx(), "<h2>Intro</p>")
            .unwrap_err();
        assert!(matches!(err, mfnf_shared::MfnfError::Markup { .. }));
    }
}
