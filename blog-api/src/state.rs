use crate::services::ArticleService;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState<S, R> {
    pub articles: ArticleService<S, R>,
}

impl<S, R> AppState<S, R> {
    pub fn new(articles: ArticleService<S, R>) -> Self {
        Self { articles }
    }
}
