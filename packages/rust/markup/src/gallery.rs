//! Gallery extension blocks.
//!
//! `<ul typeof="mw:Extension/gallery">` carries its source in
//! `data-mw.body.extsrc`, one `File|caption` line per item. Problems with a
//! gallery become visible `error` nodes; they never abort the article.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::{debug, warn};

use mfnf_rewrite::{Context, Rules, check};
use mfnf_shared::{Gallery, GalleryItem, Node, Result};

/// Thumbnail size used when the gallery does not set one.
const DEFAULT_GALLERY_SIZE: u32 = 120;

#[derive(Debug, Deserialize)]
struct GalleryData {
    body: GalleryBody,
    #[serde(default)]
    attrs: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GalleryBody {
    extsrc: String,
}

pub(crate) fn rewriter() -> Rules {
    Rules::new("galleries").rule(
        "gallery",
        |node| {
            check(node)
                .element("ul")
                .attr("typeof", "mw:Extension/gallery")
                .passed()
        },
        |walk, node| gallery(walk.ctx(), &node),
    )
}

fn gallery(ctx: Context<'_>, node: &Node) -> Result<Node> {
    let data = node
        .attr("data-mw")
        .and_then(|raw| serde_json::from_str::<GalleryData>(raw).ok());
    let Some(data) = data else {
        warn!(title = ctx.title, "gallery metadata is malformed");
        return Ok(Node::error("Gallery metadata is malformed"));
    };

    let mut children = Vec::new();
    for line in data.body.extsrc.trim().lines() {
        if line.trim().is_empty() {
            continue;
        }
        children.push(gallery_item(ctx, line)?);
    }

    Ok(Node::Gallery(Gallery {
        widths: dimension(&data.attrs, "widths"),
        heights: dimension(&data.attrs, "heights"),
        children,
    }))
}

fn gallery_item(ctx: Context<'_>, line: &str) -> Result<Node> {
    let Some((name, caption)) = line.split_once('|') else {
        debug!(line, "gallery item without caption");
        return Ok(Node::error("Gallery item needs a caption"));
    };

    match crate::parse_inline_content(ctx, caption) {
        Ok(caption) => Ok(Node::GalleryItem(GalleryItem {
            name: name.trim().to_string(),
            caption,
        })),
        Err(e) if e.is_structural() => {
            debug!(error = %e, "gallery caption is not inline content");
            Ok(Node::error(format!("Gallery caption must be inline content: {e}")))
        }
        Err(e) => Err(e),
    }
}

/// `"200"`, `"200px"` or `200`; anything else falls back to the default.
fn dimension(attrs: &BTreeMap<String, serde_json::Value>, key: &str) -> u32 {
    let parsed = match attrs.get(key) {
        Some(serde_json::Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(serde_json::Value::String(s)) => s.trim().trim_end_matches("px").parse().ok(),
        _ => None,
    };
    parsed.unwrap_or(DEFAULT_GALLERY_SIZE)
}
