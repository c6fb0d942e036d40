//! The content-service seam.
//!
//! The converter never talks to the wiki directly. It goes through a
//! [`ContentService`], which the CLI backs with the HTTP client (optionally
//! wrapped in the memoizing cache) and tests back with in-process fakes.

use std::sync::Arc;

use crate::error::Result;

/// Source retrieval and HTML rendering for wiki articles.
///
/// Both calls must be deterministic for a given input, otherwise memoizing
/// them would change pipeline output.
pub trait ContentService: Send + Sync {
    /// Fetch the markup source of the article `title`.
    fn get_content(&self, title: &str) -> Result<String>;

    /// Render `text` to HTML in the context of the article `title`.
    fn render_html(&self, title: &str, text: &str) -> Result<String>;
}

impl<T: ContentService + ?Sized> ContentService for &T {
    fn get_content(&self, title: &str) -> Result<String> {
        (**self).get_content(title)
    }

    fn render_html(&self, title: &str, text: &str) -> Result<String> {
        (**self).render_html(title, text)
    }
}

impl<T: ContentService + ?Sized> ContentService for Box<T> {
    fn get_content(&self, title: &str) -> Result<String> {
        (**self).get_content(title)
    }

    fn render_html(&self, title: &str, text: &str) -> Result<String> {
        (**self).render_html(title, text)
    }
}

impl<T: ContentService + ?Sized> ContentService for Arc<T> {
    fn get_content(&self, title: &str) -> Result<String> {
        (**self).get_content(title)
    }

    fn render_html(&self, title: &str, text: &str) -> Result<String> {
        (**self).render_html(title, text)
    }
}
