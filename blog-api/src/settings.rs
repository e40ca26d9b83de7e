use blog_core::{BlogConfig, ConfigError, ConfigProperties};

/// Scheme of `database.url` that selects the in-memory store.
pub const MEMORY_URL: &str = "memory://";

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: String,
}

impl ConfigProperties for ServerSettings {
    fn prefix() -> &'static str {
        "server"
    }

    fn from_config(config: &BlogConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            addr: config.get_or(&Self::key("addr"), "0.0.0.0:3000".to_string())?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub name: String,
}

impl DatabaseSettings {
    pub fn is_in_memory(&self) -> bool {
        self.url.starts_with(MEMORY_URL)
    }
}

impl ConfigProperties for DatabaseSettings {
    fn prefix() -> &'static str {
        "database"
    }

    fn from_config(config: &BlogConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            url: config.get_or(&Self::key("url"), "mongodb://localhost:27017".to_string())?,
            name: config.get_or(&Self::key("name"), "blogs".to_string())?,
        })
    }
}
