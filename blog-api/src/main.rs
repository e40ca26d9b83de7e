use std::sync::Arc;

use blog_api::revalidate::{HttpRevalidator, RevalidateSettings};
use blog_api::services::ArticleService;
use blog_api::settings::{DatabaseSettings, ServerSettings};
use blog_api::state::AppState;
use blog_api::app_builder;
use blog_core::{init_tracing, BlogConfig, LogFormat};
use blog_data::{InMemoryStore, MongoConnector, MongoStore};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = BlogConfig::load("dev")?;
    init_tracing(config.get_or("log.format", LogFormat::default())?);
    info!(profile = config.profile(), "configuration loaded");

    let server = config.section::<ServerSettings>()?;
    let database = config.section::<DatabaseSettings>()?;
    let revalidator = HttpRevalidator::new(config.section::<RevalidateSettings>()?)?;
    if !revalidator.is_enabled() {
        warn!("revalidate.url is not set, frontend revalidation is disabled");
    }

    if database.is_in_memory() {
        info!("using in-memory article store");
        let service = ArticleService::new(InMemoryStore::new(), revalidator);
        app_builder(AppState::new(service)).serve(&server.addr).await?;
    } else {
        info!(database = %database.name, "using MongoDB article store");
        let connector = Arc::new(MongoConnector::new(database.url, database.name));
        let service = ArticleService::new(MongoStore::new(connector), revalidator);
        app_builder(AppState::new(service)).serve(&server.addr).await?;
    }
    Ok(())
}
