//! Template deinclusion.
//!
//! The renderer marks the top element of every macro expansion with
//! `typeof="mw:Transclusion"` and stores the original call as JSON in
//! `data-mw`. That element (with its whole subtree) is replaced by a
//! [`Node::Template`]. Content parameters are rendered and parsed again
//! through [`crate::parse_content`], so nested macros are recovered as well.
//!
//! Secondary elements of the same expansion share the `about` marker and are
//! left alone here.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::debug;

use mfnf_rewrite::{Context, Rules, check};
use mfnf_shared::{MfnfError, Node, NodeKind, ParamValue, Result, Template};

use crate::templates;

/// Shape of `data-mw.parts[0].template`.
#[derive(Debug, Deserialize)]
struct TemplateCall {
    target: Wikitext,
    #[serde(default)]
    params: BTreeMap<String, Wikitext>,
}

#[derive(Debug, Deserialize)]
struct Wikitext {
    wt: String,
}

pub(crate) fn rewriter() -> Rules {
    Rules::new("template-deinclusion").rule(
        "transclusion",
        |node| {
            check(node)
                .kind(NodeKind::Element)
                .attr("typeof", "mw:Transclusion")
                .passed()
        },
        |walk, node| deinclude(walk.ctx(), &node),
    )
}

fn deinclude(ctx: Context<'_>, node: &Node) -> Result<Node> {
    let raw = node
        .attr("data-mw")
        .ok_or_else(|| MfnfError::metadata("transclusion without data-mw"))?;
    let call = decode_call(raw)?;
    let name = templates::macro_name(&call.target.wt).to_string();

    let mut params = BTreeMap::new();
    for (key, value) in call.params {
        let value = if templates::is_content_param(&name, &key) {
            ParamValue::Content(crate::parse_content(ctx, &value.wt)?)
        } else {
            ParamValue::Text(value.wt)
        };
        params.insert(key, value);
    }

    debug!(template = %name, params = params.len(), "deincluded template");
    Ok(Node::Template(Template { name, params }))
}

fn decode_call(raw: &str) -> Result<TemplateCall> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| MfnfError::metadata(format!("data-mw is not JSON: {e}")))?;
    let template = value
        .pointer("/parts/0/template")
        .ok_or_else(|| MfnfError::metadata("data-mw has no parts[0].template"))?;
    TemplateCall::deserialize(template)
        .map_err(|e| MfnfError::metadata(format!("unexpected template call in data-mw: {e}")))
}
