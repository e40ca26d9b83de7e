use mongodb::bson::oid::ObjectId;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A type persisted as a document in a named collection.
///
/// The identifier lives in the `_id` field and is assigned by the store on
/// insert when the entity does not carry one.
///
/// # Example
///
/// ```ignore
/// impl Entity for Article {
///     fn collection_name() -> &'static str { "articles" }
///     fn id(&self) -> Option<&ObjectId> { self.id.as_ref() }
/// }
/// ```
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + Unpin + 'static {
    fn collection_name() -> &'static str;
    fn id(&self) -> Option<&ObjectId>;
}
