//! Recovered macro calls to document nodes.

use tracing::{debug, trace};

use mfnf_markup::templates::list_param_prefixes;
use mfnf_rewrite::{DeleteRewriter, KindRewriter, Rewritten, Walk};
use mfnf_shared::{List, Node, NodeKind, ParamValue, Result, Template};

use crate::math::display_formula;

/// Editorial control invocations (page header/footer bookkeeping).
const INVOKE_PREFIX: &str = "#invoke:";

/// Merge `item1`, `item2`, … into a single `item_list` parameter.
pub(crate) fn merge_list_params() -> KindRewriter {
    KindRewriter::new("merge-list-params", NodeKind::Template, |walk, node| match node {
        Node::Template(template) if !list_param_prefixes(&template.name).is_empty() => {
            let prefixes = list_param_prefixes(&template.name);
            let merged = Node::Template(merge_numbered(template, prefixes));
            let merged = merged.map_children(&mut |children| walk.nodes(children))?;
            Ok(Rewritten::Replaced(merged))
        }
        other => Ok(Rewritten::NotInterested(other)),
    })
}

fn merge_numbered(mut template: Template, prefixes: &[&str]) -> Template {
    for prefix in prefixes {
        let mut items = Vec::new();
        for n in 1.. {
            match template.params.remove(&format!("{prefix}{n}")) {
                Some(value) => items.push(value),
                None => break,
            }
        }
        trace!(template = %template.name, prefix, items = items.len(), "merged list parameters");
        template
            .params
            .insert(format!("{prefix}_list"), ParamValue::List(items));
    }
    template
}

/// `Liste` to `list`, `Formel` to `equation`; other macros stay templates.
pub(crate) fn semantic_templates() -> KindRewriter {
    KindRewriter::new("templates", NodeKind::Template, |walk, node| match node {
        Node::Template(t) if t.name == "Liste" => Ok(Rewritten::Replaced(list(walk, t)?)),
        Node::Template(t) if t.name == "Formel" => Ok(Rewritten::Replaced(equation(&t))),
        other => Ok(Rewritten::NotInterested(other)),
    })
}

fn list(walk: &Walk<'_>, mut template: Template) -> Result<Node> {
    let ordered = template.text_param("type") == Some("ol");
    let items = match template.params.remove("item_list") {
        Some(ParamValue::List(items)) => items,
        Some(other) => vec![other],
        None => Vec::new(),
    };

    let mut children = Vec::with_capacity(items.len());
    for item in items {
        children.push(walk.nodes(item.into_nodes())?);
    }
    Ok(Node::List(List { ordered, children }))
}

fn equation(template: &Template) -> Node {
    match template.text_param("1").and_then(display_formula) {
        Some(formula) => Node::Equation { formula },
        None => {
            debug!(params = ?template.params.keys().collect::<Vec<_>>(), "Formel without <math> argument");
            Node::error("Formel needs a <math> formula as its first parameter")
        }
    }
}

/// Drop `#invoke:` templates; they carry no document content.
pub(crate) fn delete_header_and_footer() -> DeleteRewriter {
    DeleteRewriter::new("delete-header-and-footer", |node| {
        matches!(node, Node::Template(t) if t.name.starts_with(INVOKE_PREFIX))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Identity, template};
    use mfnf_rewrite::{Context, NodeRewriter};

    fn run(rewriter: &dyn NodeRewriter, nodes: Vec<Node>) -> Vec<Node> {
        Walk::new(rewriter, Context::new(&Identity, "Test"))
            .nodes(nodes)
            .unwrap()
    }

    fn text(s: &str) -> ParamValue {
        ParamValue::Text(s.into())
    }

    #[test]
    fn numbered_params_merge_in_order() {
        let node = template(
            "Liste",
            vec![
                ("item2", text("b")),
                ("item1", text("a")),
                ("item3", text("c")),
                ("type", text("ol")),
            ],
        );
        let output = run(&merge_list_params(), vec![node]);
        let Node::Template(t) = &output[0] else {
            panic!("expected template")
        };
        assert_eq!(
            t.params["item_list"],
            ParamValue::List(vec![text("a"), text("b"), text("c")])
        );
        assert!(!t.params.contains_key("item1"));
        assert!(!t.params.contains_key("item3"));
        assert_eq!(t.text_param("type"), Some("ol"));
    }

    #[test]
    fn merge_stops_at_first_gap() {
        let node = template("Liste", vec![("item1", text("a")), ("item3", text("c"))]);
        let output = run(&merge_list_params(), vec![node]);
        let Node::Template(t) = &output[0] else {
            panic!("expected template")
        };
        assert_eq!(t.params["item_list"], ParamValue::List(vec![text("a")]));
        assert_eq!(t.text_param("item3"), Some("c"));
    }

    #[test]
    fn nested_lists_in_params_are_merged_too() {
        let inner = template("Liste", vec![("item1", text("x"))]);
        let outer = template(
            "Definition",
            vec![("definition", ParamValue::Content(vec![inner]))],
        );
        let output = run(&merge_list_params(), vec![outer]);
        let Node::Template(t) = &output[0] else {
            panic!("expected template")
        };
        let ParamValue::Content(content) = &t.params["definition"] else {
            panic!("expected content")
        };
        assert!(matches!(&content[0], Node::Template(inner) if inner.params.contains_key("item_list")));
    }

    #[test]
    fn other_templates_keep_their_params() {
        let node = template("Definition", vec![("item1", text("a"))]);
        assert_eq!(run(&merge_list_params(), vec![node.clone()]), vec![node]);
    }

    #[test]
    fn liste_becomes_list() {
        let node = template(
            "Liste",
            vec![
                ("type", text("ol")),
                (
                    "item_list",
                    ParamValue::List(vec![
                        ParamValue::Content(vec![Node::text("eins")]),
                        ParamValue::Content(vec![Node::text("zwei")]),
                    ]),
                ),
            ],
        );
        let output = run(&semantic_templates(), vec![node]);
        assert_eq!(
            output,
            vec![Node::List(List {
                ordered: true,
                children: vec![vec![Node::text("eins")], vec![Node::text("zwei")]],
            })]
        );
    }

    #[test]
    fn liste_without_type_is_unordered() {
        let node = template("Liste", vec![("item_list", ParamValue::List(vec![]))]);
        let output = run(&semantic_templates(), vec![node]);
        assert_eq!(
            output,
            vec![Node::List(List {
                ordered: false,
                children: vec![],
            })]
        );
    }

    #[test]
    fn formel_becomes_equation() {
        let node = template(
            "Formel",
            vec![("1", text("<math>\\begin{align} x = 1 \\end{align}</math>"))],
        );
        let output = run(&semantic_templates(), vec![node]);
        assert_eq!(output, vec![Node::Equation { formula: "x = 1".into() }]);
    }

    #[test]
    fn formel_without_math_becomes_error() {
        let node = template("Formel", vec![("1", text("x = 1"))]);
        let output = run(&semantic_templates(), vec![node]);
        assert!(matches!(&output[0], Node::Error { message } if message.starts_with("Formel")));
    }

    #[test]
    fn unknown_templates_pass_through_with_params_rewritten() {
        let inner = template("Formel", vec![("1", text("<math>y</math>"))]);
        let node = template(
            "Aufgabe",
            vec![
                ("aufgabe", ParamValue::Content(vec![inner])),
                ("titel", text("Grenzwert")),
            ],
        );
        let output = run(&semantic_templates(), vec![node]);
        let Node::Template(t) = &output[0] else {
            panic!("expected template")
        };
        assert_eq!(t.name, "Aufgabe");
        assert_eq!(
            t.params["aufgabe"],
            ParamValue::Content(vec![Node::Equation { formula: "y".into() }])
        );
    }

    #[test]
    fn invoke_templates_are_deleted() {
        let header = template("#invoke:Mathe für Nicht-Freaks/Seite|oben", vec![]);
        let keep = template("Definition", vec![]);
        let output = run(&delete_header_and_footer(), vec![header, keep.clone()]);
        assert_eq!(output, vec![keep]);
    }
}
