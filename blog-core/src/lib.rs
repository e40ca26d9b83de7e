pub mod builder;
pub mod config;
pub mod error;
pub mod layers;
pub mod validation;

pub use builder::AppBuilder;
pub use config::{BlogConfig, ConfigError, ConfigProperties, ConfigValue, FromConfigValue};
pub use error::{error_response, ApiError};
pub use layers::{catch_panic_layer, default_cors, default_trace, init_tracing, LogFormat};
pub use validation::{validate, FieldError, ValidationErrorResponse};
