use std::marker::PhantomData;

use mongodb::bson::oid::ObjectId;

use crate::entity::Entity;
use crate::error::DataError;
use crate::query::Query;
use crate::store::DocumentStore;

/// Typed access to the collection of one entity type.
///
/// # Example
///
/// ```ignore
/// let repo = Repository::<Article, _>::new(store.clone());
/// let id = repo.insert(&article).await?;
/// let latest = repo.find(&Query::new().order_by("createdAt", false).limit(10)).await?;
/// ```
pub struct Repository<T, S> {
    store: S,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Entity, S: DocumentStore> Repository<T, S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    pub async fn insert(&self, entity: &T) -> Result<ObjectId, DataError> {
        self.store.insert_one(entity).await
    }

    pub async fn find(&self, query: &Query) -> Result<Vec<T>, DataError> {
        self.store.find(query).await
    }
}

impl<T, S: Clone> Clone for Repository<T, S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _marker: PhantomData,
        }
    }
}
