//! Article conversion for the mfnf converter.
//!
//! [`ArticleContentParser`] owns the ordered rewrite chain that turns a
//! deincluded markup tree into document nodes; [`load_article`] fetches and
//! converts a single article through a [`mfnf_shared::ContentService`].

mod article;
mod blocks;
mod headings;
mod math;
mod node_types;
mod pipeline;
mod templates;

pub use article::load_article;
pub use pipeline::ArticleContentParser;
