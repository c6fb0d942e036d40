use mfnf_shared::ContentService;

/// Ambient, read-only state shared by every stage of one conversion.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    /// Content service used for rendering nested markup.
    pub api: &'a dyn ContentService,
    /// Title of the article being converted.
    pub title: &'a str,
}

impl<'a> Context<'a> {
    pub fn new(api: &'a dyn ContentService, title: &'a str) -> Self {
        Self { api, title }
    }
}

impl std::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}
