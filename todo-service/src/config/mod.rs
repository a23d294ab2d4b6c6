use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct TodoConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub store: StoreConfig,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub uri: Option<String>,
    pub database: String,
    pub collection: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    MongoDb,
    Memory,
}

impl TodoConfig {
    pub fn load() -> Result<Self, AppError> {
        // APP__ prefixed variables; main has already loaded .env.
        let common_config = core_config::Config::load()?;

        let backend: StoreBackend = get_env("STORE_BACKEND", Some("mongodb"))?
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let uri = env::var("MONGO_URI").ok().filter(|uri| !uri.is_empty());
        if backend == StoreBackend::MongoDb && uri.is_none() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "Set your 'MONGO_URI' environment variable"
            )));
        }

        Ok(TodoConfig {
            common: common_config,
            store: StoreConfig {
                backend,
                uri,
                database: get_env("MONGO_DATABASE", Some("todo-app"))?,
                collection: get_env("MONGO_COLLECTION", Some("todo"))?,
            },
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|e| !e.is_empty()),
        })
    }

    /// Configuration for an in-memory store on an ephemeral port.
    pub fn in_memory() -> Self {
        TodoConfig {
            common: core_config::Config { port: 0 },
            store: StoreConfig {
                backend: StoreBackend::Memory,
                uri: None,
                database: "todo-app".to_string(),
                collection: "todo".to_string(),
            },
            otlp_endpoint: None,
        }
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(StoreBackend::MongoDb),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(format!("Invalid store backend: {}", s)),
        }
    }
}

fn get_env(key: &str, default: Option<&str>) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => match default {
            Some(def) => Ok(def.to_string()),
            None => Err(AppError::ConfigError(anyhow::anyhow!(format!(
                "{} is required but not set",
                key
            )))),
        },
    }
}
