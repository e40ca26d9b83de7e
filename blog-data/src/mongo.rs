use std::future::Future;
use std::sync::Arc;

use futures_util::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::{Client, Database};
use tokio::sync::OnceCell;

use crate::entity::Entity;
use crate::error::DataError;
use crate::query::Query;
use crate::store::DocumentStore;

/// Lazily-initialized handle to one MongoDB database.
///
/// The client is created on first use and reused by every later call. A
/// failed initialization leaves the cell empty, so the next call tries again.
pub struct MongoConnector {
    uri: String,
    database: String,
    handle: OnceCell<Database>,
}

impl MongoConnector {
    pub fn new(uri: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database: database.into(),
            handle: OnceCell::new(),
        }
    }

    /// The database handle, connecting on first call.
    pub async fn database(&self) -> Result<&Database, DataError> {
        self.handle
            .get_or_try_init(|| async {
                let client = Client::with_uri_str(&self.uri)
                    .await
                    .map_err(|e| DataError::Connection(e.to_string()))?;
                tracing::info!(database = %self.database, "MongoDB client initialized");
                Ok(client.database(&self.database))
            })
            .await
    }
}

/// [`DocumentStore`] backed by MongoDB; collections are named by
/// [`Entity::collection_name`].
#[derive(Clone)]
pub struct MongoStore {
    connector: Arc<MongoConnector>,
}

impl MongoStore {
    pub fn new(connector: Arc<MongoConnector>) -> Self {
        Self { connector }
    }
}

impl DocumentStore for MongoStore {
    fn insert_one<T: Entity>(
        &self,
        entity: &T,
    ) -> impl Future<Output = Result<ObjectId, DataError>> + Send {
        async move {
            let db = self.connector.database().await?;
            let result = db
                .collection::<T>(T::collection_name())
                .insert_one(entity)
                .await
                .map_err(DataError::database)?;
            result.inserted_id.as_object_id().ok_or_else(|| {
                DataError::Other(format!("unexpected _id type: {}", result.inserted_id))
            })
        }
    }

    fn find<T: Entity>(
        &self,
        query: &Query,
    ) -> impl Future<Output = Result<Vec<T>, DataError>> + Send {
        async move {
            let db = self.connector.database().await?;
            let collection = db.collection::<T>(T::collection_name());

            let mut action = collection.find(query.filter_document());
            if let Some(sort) = query.sort_document() {
                action = action.sort(sort);
            }
            if let Some(limit) = query.limit_value() {
                action = action.limit(limit);
            }

            let cursor = action.await.map_err(DataError::database)?;
            cursor.try_collect().await.map_err(DataError::database)
        }
    }
}
