//! HTTP content service backed by a MediaWiki installation.
//!
//! Article source comes from the action API (`action=query`, latest revision
//! of the main slot); rendering goes through the REST transform endpoint,
//! which returns the same Parsoid HTML the wiki serves, including the
//! transclusion metadata the converter needs.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use mfnf_shared::{ContentService, MediaWikiConfig, MfnfError, Result};

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 3;

/// User-Agent string for all requests.
const USER_AGENT: &str = concat!("mfnf/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct QueryResponse {
    query: Option<Query>,
}

#[derive(Debug, Deserialize)]
struct Query {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    revisions: Vec<Revision>,
}

#[derive(Debug, Deserialize)]
struct Revision {
    slots: Slots,
}

#[derive(Debug, Deserialize)]
struct Slots {
    main: Slot,
}

#[derive(Debug, Deserialize)]
struct Slot {
    content: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Blocking MediaWiki client implementing [`ContentService`].
#[derive(Debug, Clone)]
pub struct MediaWikiClient {
    client: Client,
    api_url: Url,
    rest_url: Url,
}

impl MediaWikiClient {
    pub fn new(config: &MediaWikiConfig) -> Result<Self> {
        config.validate()?;
        let api_url = parse_url("api_url", &config.api_url)?;
        let rest_url = parse_url("rest_url", &config.rest_url)?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MfnfError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url,
            rest_url,
        })
    }

    /// `{rest_url}/transform/wikitext/to/html/{title}`
    fn transform_url(&self, title: &str) -> Result<Url> {
        let mut url = self.rest_url.clone();
        url.path_segments_mut()
            .map_err(|()| MfnfError::config(format!("rest_url {} cannot be a base", self.rest_url)))?
            .pop_if_empty()
            .extend(["transform", "wikitext", "to", "html", title]);
        Ok(url)
    }
}

fn parse_url(field: &str, value: &str) -> Result<Url> {
    Url::parse(value)
        .map_err(|e| MfnfError::config(format!("mediawiki.{field} '{value}' is not a URL: {e}")))
}

impl ContentService for MediaWikiClient {
    #[instrument(skip(self))]
    fn get_content(&self, title: &str) -> Result<String> {
        let response = self
            .client
            .get(self.api_url.clone())
            .query(&[
                ("action", "query"),
                ("prop", "revisions"),
                ("rvprop", "content"),
                ("rvslots", "main"),
                ("format", "json"),
                ("formatversion", "2"),
                ("titles", title),
            ])
            .send()
            .map_err(|e| MfnfError::Network(format!("{}: {e}", self.api_url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MfnfError::Network(format!("{}: HTTP {status}", self.api_url)));
        }

        let body: QueryResponse = response
            .json()
            .map_err(|e| MfnfError::Network(format!("{}: unexpected response: {e}", self.api_url)))?;

        let page = body
            .query
            .and_then(|q| q.pages.into_iter().next())
            .filter(|page| !page.missing)
            .ok_or_else(|| MfnfError::not_found(title))?;
        let revision = page
            .revisions
            .into_iter()
            .next()
            .ok_or_else(|| MfnfError::not_found(title))?;

        debug!(len = revision.slots.main.content.len(), "fetched article source");
        Ok(revision.slots.main.content)
    }

    #[instrument(skip(self, text), fields(len = text.len()))]
    fn render_html(&self, title: &str, text: &str) -> Result<String> {
        let url = self.transform_url(title)?;
        let response = self
            .client
            .post(url.clone())
            .form(&[("wikitext", text), ("body_only", "true")])
            .send()
            .map_err(|e| MfnfError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MfnfError::Network(format!("{url}: HTTP {status}")));
        }

        let html = response
            .text()
            .map_err(|e| MfnfError::Network(format!("{url}: failed to read body: {e}")))?;
        debug!(html_len = html.len(), "rendered wikitext");
        Ok(html)
    }
}
