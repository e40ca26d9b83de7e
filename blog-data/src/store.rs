use std::future::Future;

use mongodb::bson::oid::ObjectId;

use crate::entity::Entity;
use crate::error::DataError;
use crate::query::Query;

/// A document database holding one collection per entity type.
///
/// Uses RPITIT (return-position `impl Trait` in traits), so stores are
/// passed around as generic parameters rather than trait objects.
pub trait DocumentStore: Clone + Send + Sync + 'static {
    /// Insert `entity` into its collection and return the stored identifier.
    fn insert_one<T: Entity>(
        &self,
        entity: &T,
    ) -> impl Future<Output = Result<ObjectId, DataError>> + Send;

    /// Return the entities matching `query`, in query order, capped by its limit.
    fn find<T: Entity>(
        &self,
        query: &Query,
    ) -> impl Future<Output = Result<Vec<T>, DataError>> + Send;
}
