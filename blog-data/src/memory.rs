use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use mongodb::bson::oid::ObjectId;
use mongodb::bson::{self, Bson, Document};
use tokio::sync::RwLock;

use crate::entity::Entity;
use crate::error::DataError;
use crate::query::Query;
use crate::store::DocumentStore;

/// A process-local document store.
///
/// Documents are kept in their BSON form so that queries are evaluated with
/// the same matching and ordering rules as MongoDB. Clones share the same data.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

#[derive(Default)]
struct State {
    collections: HashMap<String, Vec<Document>>,
    failure: Option<String>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test hook: make every subsequent operation fail with a connection
    /// error carrying `message`. Nothing on the serving path calls it.
    pub async fn fail_with(&self, message: impl Into<String>) {
        self.state.write().await.failure = Some(message.into());
    }

    /// Test hook: undo [`fail_with`](Self::fail_with).
    pub async fn recover(&self) {
        self.state.write().await.failure = None;
    }

    /// Number of documents stored in `collection`.
    pub async fn len(&self, collection: &str) -> usize {
        self.state
            .read()
            .await
            .collections
            .get(collection)
            .map_or(0, Vec::len)
    }

    /// Raw stored documents of `collection`, in insertion order.
    pub async fn documents(&self, collection: &str) -> Vec<Document> {
        self.state
            .read()
            .await
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }
}

impl DocumentStore for InMemoryStore {
    fn insert_one<T: Entity>(
        &self,
        entity: &T,
    ) -> impl Future<Output = Result<ObjectId, DataError>> + Send {
        let serialized = bson::to_document(entity);
        let state = self.state.clone();
        async move {
            let mut state = state.write().await;
            if let Some(message) = &state.failure {
                return Err(DataError::Connection(message.clone()));
            }
            let mut document = serialized?;
            let id = match document.get("_id") {
                Some(Bson::ObjectId(id)) => *id,
                _ => {
                    let id = ObjectId::new();
                    document.insert("_id", id);
                    id
                }
            };
            state
                .collections
                .entry(T::collection_name().to_string())
                .or_default()
                .push(document);
            Ok(id)
        }
    }

    fn find<T: Entity>(
        &self,
        query: &Query,
    ) -> impl Future<Output = Result<Vec<T>, DataError>> + Send {
        let query = query.clone();
        let state = self.state.clone();
        async move {
            let state = state.read().await;
            if let Some(message) = &state.failure {
                return Err(DataError::Connection(message.clone()));
            }
            let mut matched: Vec<&Document> = state
                .collections
                .get(T::collection_name())
                .map(|docs| docs.iter().filter(|d| query.matches(d)).collect())
                .unwrap_or_default();
            // Stable, so ties keep insertion order and repeated reads agree.
            matched.sort_by(|a, b| query.compare(a, b));
            if let Some(max) = query.max_results() {
                matched.truncate(max);
            }
            matched
                .into_iter()
                .map(|d| bson::from_document(d.clone()).map_err(DataError::from))
                .collect()
        }
    }
}
