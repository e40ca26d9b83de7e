use std::future::Future;
use std::time::Duration;

use blog_core::{BlogConfig, ConfigError, ConfigProperties};
use serde::Serialize;

/// A frontend path whose cached pages should be rebuilt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevalidateTarget {
    pub path: String,
    pub post_id: Option<String>,
}

impl RevalidateTarget {
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            post_id: None,
        }
    }
}

#[derive(Debug)]
pub enum RevalidateError {
    /// The request never got a response (connect failure, timeout).
    Transport(String),
    /// The frontend answered with a non-success status.
    Status(u16),
}

impl std::fmt::Display for RevalidateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RevalidateError::Transport(msg) => write!(f, "revalidation request failed: {msg}"),
            RevalidateError::Status(code) => write!(f, "revalidation endpoint returned {code}"),
        }
    }
}

impl std::error::Error for RevalidateError {}

/// Signals the frontend that cached pages for a path are stale.
pub trait Revalidator: Clone + Send + Sync + 'static {
    fn revalidate(
        &self,
        target: RevalidateTarget,
    ) -> impl Future<Output = Result<(), RevalidateError>> + Send;
}

/// `revalidate.*` configuration section.
#[derive(Debug, Clone)]
pub struct RevalidateSettings {
    pub url: Option<String>,
    pub secret: Option<String>,
    pub timeout: Duration,
}

impl ConfigProperties for RevalidateSettings {
    fn prefix() -> &'static str {
        "revalidate"
    }

    fn from_config(config: &BlogConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            url: config.get_opt(&Self::key("url"))?,
            secret: config.get_opt(&Self::key("secret"))?,
            timeout: Duration::from_millis(config.get_or(&Self::key("timeout"), 5000u64)?),
        })
    }
}

/// Calls the frontend revalidation endpoint over HTTP.
///
/// Sends `POST {url}` with a `{ "path", "postId" }` JSON body. Without a
/// configured URL every call is skipped.
#[derive(Clone)]
pub struct HttpRevalidator {
    client: reqwest::Client,
    url: Option<String>,
    secret: Option<String>,
}

impl HttpRevalidator {
    pub fn new(settings: RevalidateSettings) -> Result<Self, RevalidateError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| RevalidateError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            url: settings.url,
            secret: settings.secret,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.url.is_some()
    }
}

impl Revalidator for HttpRevalidator {
    fn revalidate(
        &self,
        target: RevalidateTarget,
    ) -> impl Future<Output = Result<(), RevalidateError>> + Send {
        async move {
            let Some(url) = self.url.as_deref() else {
                tracing::debug!(path = %target.path, "revalidation disabled, skipping");
                return Ok(());
            };

            let mut request = self.client.post(url).json(&target);
            if let Some(secret) = &self.secret {
                request = request.header("x-revalidate-secret", secret);
            }

            let resp = request
                .send()
                .await
                .map_err(|e| RevalidateError::Transport(e.to_string()))?;
            if !resp.status().is_success() {
                return Err(RevalidateError::Status(resp.status().as_u16()));
            }
            tracing::debug!(path = %target.path, "frontend revalidated");
            Ok(())
        }
    }
}
