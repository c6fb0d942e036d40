//! Loading whole articles through a content service.

use tracing::{info, instrument};

use mfnf_rewrite::Context;
use mfnf_shared::{Article, ContentService, Result};

use crate::pipeline::ArticleContentParser;

impl ArticleContentParser {
    /// Fetch the source of `title` and convert it.
    #[instrument(skip(self, api))]
    pub fn load(&self, api: &dyn ContentService, title: &str) -> Result<Article> {
        let text = api.get_content(title)?;
        let content = self.parse(Context::new(api, title), &text)?;
        info!(nodes = content.len(), "article converted");
        Ok(Article {
            title: title.to_string(),
            content,
        })
    }
}

/// Load `title` with the default pipeline configuration.
pub fn load_article(api: &dyn ContentService, title: &str) -> Result<Article> {
    ArticleContentParser::default().load(api, title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mfnf_shared::{MfnfError, Node};
    use std::collections::HashMap;

    /// Serves fixed sources; renders by identity.
    struct Pages(HashMap<&'static str, &'static str>);

    impl ContentService for Pages {
        fn get_content(&self, title: &str) -> Result<String> {
            self.0
                .get(title)
                .map(|s| s.to_string())
                .ok_or_else(|| MfnfError::not_found(title))
        }

        fn render_html(&self, _title: &str, text: &str) -> Result<String> {
            Ok(text.to_string())
        }
    }

    #[test]
    fn article_is_fetched_and_converted() {
        let api = Pages(HashMap::from([("Folgen", "<h3>Definition</h3>")]));
        let article = load_article(&api, "Folgen").unwrap();
        assert_eq!(article.title, "Folgen");
        assert!(matches!(&article.content[..], [Node::Header(h)] if h.depth == 2));
    }

    #[test]
    fn missing_article_is_fatal() {
        let api = Pages(HashMap::new());
        let err = load_article(&api, "Fehlt").unwrap_err();
        assert!(matches!(err, MfnfError::NotFound { ref title } if title == "Fehlt"));
    }
}
