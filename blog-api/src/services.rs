use blog_core::ApiError;
use blog_data::bson::oid::ObjectId;
use blog_data::{DocumentStore, Repository};
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::models::{Article, CreateArticleRequest, ListArticlesQuery};
use crate::revalidate::{RevalidateTarget, Revalidator};

/// Frontend paths rebuilt after every publish.
pub const REVALIDATED_PATHS: [&str; 2] = ["/", "/posts"];

const PUBLISH_FAILED: &str = "Failed to publish article";
const LIST_FAILED: &str = "Failed to list articles";

/// Publishes and lists articles.
#[derive(Clone)]
pub struct ArticleService<S, R> {
    articles: Repository<Article, S>,
    revalidator: R,
}

impl<S: DocumentStore, R: Revalidator> ArticleService<S, R> {
    pub fn new(store: S, revalidator: R) -> Self {
        Self {
            articles: Repository::new(store),
            revalidator,
        }
    }

    /// Validate and store a new article, then ask the frontend to rebuild
    /// the home and list pages. Revalidation failures are logged only.
    pub async fn create(&self, request: CreateArticleRequest) -> Result<ObjectId, ApiError> {
        let article = request.into_article(Utc::now())?;
        info!(title = %article.title, tags = article.tags.len(), "publishing article");

        let id = self
            .articles
            .insert(&article)
            .await
            .map_err(|e| ApiError::internal(PUBLISH_FAILED, e))?;
        info!(article_id = %id, "article stored");

        let [home, list] = REVALIDATED_PATHS;
        let (home_result, list_result) = tokio::join!(
            self.revalidator.revalidate(RevalidateTarget::path(home)),
            self.revalidator.revalidate(RevalidateTarget::path(list)),
        );
        for (path, result) in [(home, home_result), (list, list_result)] {
            if let Err(e) = result {
                warn!(path, error = %e, "frontend revalidation failed");
            }
        }

        Ok(id)
    }

    /// Articles matching `params`, newest first.
    pub async fn list(&self, params: &ListArticlesQuery) -> Result<Vec<Article>, ApiError> {
        let query = params.to_query();
        debug!(filter = %query.filter_document(), limit = params.limit(), "listing articles");

        let articles = self
            .articles
            .find(&query)
            .await
            .map_err(|e| ApiError::internal(LIST_FAILED, e))?;
        info!(count = articles.len(), "articles listed");
        Ok(articles)
    }
}
