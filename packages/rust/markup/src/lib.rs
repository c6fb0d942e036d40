//! Markup parsing: rendered HTML to a deincluded tree.
//!
//! [`parse_content`] asks the content service to render markup, builds the
//! generic tree with [`parse_html`], then runs the markup chain (template
//! deinclusion, galleries). Deinclusion calls back into [`parse_content`]
//! for content parameters, so nested macros are handled by plain recursion
//! with the same read-only [`Context`].

mod deinclusion;
mod gallery;
mod html;
pub mod templates;

use std::sync::LazyLock;

use tracing::instrument;

use mfnf_rewrite::{Chain, Context, check};
use mfnf_shared::{MfnfError, Node, Result};

pub use html::parse_html;

static MARKUP_CHAIN: LazyLock<Chain> = LazyLock::new(|| {
    Chain::new("markup")
        .rewrite(deinclusion::rewriter())
        .rewrite(gallery::rewriter())
});

/// Render `text` through the content service and parse the result.
#[instrument(skip_all, fields(title = %ctx.title, len = text.len()))]
pub fn parse_content(ctx: Context<'_>, text: &str) -> Result<Vec<Node>> {
    let html = ctx.api.render_html(ctx.title, text)?;
    parse_rendered(ctx, &html)
}

/// Parse already rendered HTML and run the markup chain over it.
pub fn parse_rendered(ctx: Context<'_>, html: &str) -> Result<Vec<Node>> {
    let nodes = parse_html(html)?;
    MARKUP_CHAIN.run(ctx, nodes)
}

/// Parse `text` that must render to exactly one paragraph; returns the
/// paragraph's children.
pub fn parse_inline_content(ctx: Context<'_>, text: &str) -> Result<Vec<Node>> {
    let mut content = parse_content(ctx, text)?;
    if content.len() != 1 {
        return Err(MfnfError::structural(format!(
            "expected a single paragraph, found {} nodes",
            content.len()
        )));
    }
    check(&content[0]).element("p").ensure()?;

    match content.pop() {
        Some(Node::Element(paragraph)) => Ok(paragraph.children),
        _ => Err(MfnfError::structural("expected a single paragraph")),
    }
}
