/// Errors that can occur in the data layer.
#[derive(Debug)]
pub enum DataError {
    /// The store could not be reached or the handle could not be initialized.
    Connection(String),
    /// The driver rejected an operation.
    Database(Box<dyn std::error::Error + Send + Sync>),
    /// A document could not be converted to or from its stored form.
    Serialization(String),
    Other(String),
}

impl DataError {
    /// Construct a `Database` variant from any driver error.
    pub fn database(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        DataError::Database(Box::new(err))
    }
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::Connection(msg) => write!(f, "Connection error: {msg}"),
            DataError::Database(err) => write!(f, "Database error: {err}"),
            DataError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            DataError::Other(msg) => write!(f, "Data error: {msg}"),
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::Database(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<mongodb::bson::ser::Error> for DataError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        DataError::Serialization(err.to_string())
    }
}

impl From<mongodb::bson::de::Error> for DataError {
    fn from(err: mongodb::bson::de::Error) -> Self {
        DataError::Serialization(err.to_string())
    }
}

impl From<DataError> for blog_core::ApiError {
    fn from(err: DataError) -> Self {
        blog_core::ApiError::internal("Data access failed", err)
    }
}
