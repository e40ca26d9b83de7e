use blog_core::{validate, ApiError};
use blog_data::bson::oid::ObjectId;
use blog_data::bson::DateTime;
use blog_data::{Entity, Query};
use chrono::Utc;
use garde::Validate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_STATUS: &str = "published";
pub const DEFAULT_KIND: &str = "technology";
pub const DEFAULT_LIMIT: i64 = 100;

/// `createdAt` is stored as wall-clock time in UTC+8, not as a zone-aware instant.
pub const CREATED_AT_OFFSET_HOURS: i64 = 8;

const MISSING_REQUIRED: &str = "title and content are required";

/// A persisted blog article, as stored in the `articles` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub content: String,
    #[serde(default)]
    pub view_count: i64,
    pub status: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub created_at: DateTime,
    #[serde(default)]
    pub cover_image: String,
}

impl Entity for Article {
    fn collection_name() -> &'static str {
        "articles"
    }

    fn id(&self) -> Option<&ObjectId> {
        self.id.as_ref()
    }
}

/// JSON representation of an [`Article`] in API responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleView {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub content: String,
    pub view_count: i64,
    pub status: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub created_at: chrono::DateTime<Utc>,
    pub cover_image: String,
}

impl From<Article> for ArticleView {
    fn from(article: Article) -> Self {
        Self {
            id: article.id.map(|id| id.to_hex()),
            title: article.title,
            summary: article.summary,
            tags: article.tags,
            content: article.content,
            view_count: article.view_count,
            status: article.status,
            kind: article.kind,
            created_at: to_utc(article.created_at),
            cover_image: article.cover_image,
        }
    }
}

fn to_utc(date: DateTime) -> chrono::DateTime<Utc> {
    let millis = date.timestamp_millis();
    chrono::DateTime::from_timestamp_millis(millis).unwrap_or_else(|| {
        tracing::warn!(millis, "createdAt out of range, rendering as the Unix epoch");
        chrono::DateTime::<Utc>::default()
    })
}

/// Body of `POST /articles`. Every field is optional on the wire so that
/// missing and empty required fields are reported the same way.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticleRequest {
    #[garde(required, length(min = 1))]
    pub title: Option<String>,
    #[garde(required, length(min = 1))]
    pub content: Option<String>,
    #[garde(skip)]
    pub summary: Option<String>,
    #[garde(skip)]
    pub tags: Option<Vec<String>>,
    #[garde(skip)]
    pub view_count: Option<i64>,
    #[garde(skip)]
    pub status: Option<String>,
    #[serde(rename = "type")]
    #[garde(skip)]
    pub kind: Option<String>,
    #[garde(skip)]
    pub cover_image: Option<String>,
}

impl CreateArticleRequest {
    /// Validate the request and fill every omitted field with its default.
    ///
    /// `now` is the request instant; the stored `createdAt` is shifted
    /// forward by [`CREATED_AT_OFFSET_HOURS`].
    pub fn into_article(self, now: chrono::DateTime<Utc>) -> Result<Article, ApiError> {
        validate(&self, MISSING_REQUIRED)?;
        let (Some(title), Some(content)) = (self.title, self.content) else {
            return Err(ApiError::BadRequest(MISSING_REQUIRED.to_string()));
        };

        let created_at = now + chrono::Duration::hours(CREATED_AT_OFFSET_HOURS);
        Ok(Article {
            id: None,
            title,
            summary: or_default(self.summary, ""),
            tags: self.tags.unwrap_or_default(),
            content,
            view_count: self.view_count.unwrap_or(0),
            status: or_default(self.status, DEFAULT_STATUS),
            kind: or_default(self.kind, DEFAULT_KIND),
            created_at: DateTime::from_millis(created_at.timestamp_millis()),
            cover_image: or_default(self.cover_image, ""),
        })
    }
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Query string of `GET /articles`. Values are kept raw so a malformed
/// `limit` falls back to the default instead of rejecting the request.
#[derive(Debug, Default)]
pub struct ListArticlesQuery {
    pub limit: Option<String>,
    pub status: Option<String>,
    pub tag: Option<String>,
}

impl ListArticlesQuery {
    /// Parse a raw query string. Unknown keys are ignored and a repeated key
    /// keeps its first value.
    pub fn from_query_string(raw: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            let slot = match key.as_ref() {
                "limit" => &mut params.limit,
                "status" => &mut params.status,
                "tag" => &mut params.tag,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }

    pub fn limit(&self) -> i64 {
        parse_limit(self.limit.as_deref())
    }

    /// Newest first, filtered by status and tag when given.
    pub fn to_query(&self) -> Query {
        let mut query = Query::new();
        if let Some(status) = self.status.as_deref().filter(|s| !s.is_empty()) {
            query = query.where_eq("status", status);
        }
        if let Some(tag) = self.tag.as_deref().filter(|t| !t.is_empty()) {
            query = query.where_contains("tags", tag);
        }
        query.order_by("createdAt", false).limit(self.limit())
    }
}

/// Leading-integer parse: `"5"`, `" 5"` and `"5abc"` all give 5. Anything
/// without leading digits gives [`DEFAULT_LIMIT`].
fn parse_limit(raw: Option<&str>) -> i64 {
    let Some(raw) = raw.map(str::trim_start).filter(|s| !s.is_empty()) else {
        return DEFAULT_LIMIT;
    };
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    match digits[..end].parse::<i64>() {
        Ok(n) if negative => -n,
        Ok(n) => n,
        Err(_) => DEFAULT_LIMIT,
    }
}
