//! Formulas: inline math markers and the `Formel` macro.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use mfnf_rewrite::{KindRewriter, Rewritten, Rules, check};
use mfnf_shared::{Node, NodeKind};

const ALIGN_BEGIN: &str = "\\begin{align}";
const ALIGN_END: &str = "\\end{align}";

#[derive(Debug, Deserialize)]
struct MathData {
    body: MathBody,
}

#[derive(Debug, Deserialize)]
struct MathBody {
    extsrc: String,
}

/// Elements marked `typeof="mw:Extension/math"` to `inlinemath`.
pub(crate) fn inline_math() -> Rules {
    Rules::new("inline-math").rule(
        "math-extension",
        |node| check(node).attr("typeof", "mw:Extension/math").passed(),
        |_, node| {
            let data = node
                .attr("data-mw")
                .and_then(|raw| serde_json::from_str::<MathData>(raw).ok());
            Ok(match data {
                Some(data) => Node::InlineMath {
                    formula: data.body.extsrc,
                },
                None => {
                    debug!("math extension without readable data-mw");
                    Node::error("Math metadata is malformed")
                }
            })
        },
    )
}

/// Inline math must be a single expression.
pub(crate) fn wrong_inline_math() -> KindRewriter {
    KindRewriter::new("wrong-inline-math", NodeKind::InlineMath, |_, node| {
        let multi_line =
            matches!(&node, Node::InlineMath { formula } if formula.contains(ALIGN_BEGIN));
        if !multi_line {
            return Ok(Rewritten::NotInterested(node));
        }
        debug!(?node, "multi-line formula in inline math");
        Ok(Rewritten::Replaced(Node::error(
            "\\begin{align} not allowed in inline math",
        )))
    })
}

/// Formula source of a `Formel` argument: the body of its `<math>` wrapper
/// without an `align` environment.
pub(crate) fn display_formula(argument: &str) -> Option<String> {
    static MATH_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)^<math>(.*)</math>").expect("valid regex"));

    let caps = MATH_RE.captures(argument.trim())?;
    let formula = caps[1].trim();
    let formula = formula.strip_prefix(ALIGN_BEGIN).unwrap_or(formula);
    let formula = formula.strip_suffix(ALIGN_END).unwrap_or(formula);
    Some(formula.trim().to_string())
}
