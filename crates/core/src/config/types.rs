use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::dispatcher::WorkflowDispatcherConfig;
use crate::episode::{CategoryGroup, CategoryTree, CategoryTreeError};
use crate::orchestrator::{OrchestratorConfig, ScheduleConfig};
use crate::publisher::MediaHostConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub content: ContentConfig,
    pub dispatcher: WorkflowDispatcherConfig,
    pub publisher: MediaHostConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

impl Config {
    /// Build the category tree from the configured groups.
    pub fn category_tree(&self) -> Result<CategoryTree, CategoryTreeError> {
        CategoryTree::new(self.content.categories.clone())
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("showrunner.db")
}

/// Content catalogue: the ordered category groups the sequencer walks.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContentConfig {
    pub categories: Vec<CategoryGroup>,
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub content: ContentConfig,
    pub dispatcher: SanitizedDispatcherConfig,
    pub publisher: SanitizedPublisherConfig,
    pub schedule: ScheduleConfig,
    pub orchestrator: OrchestratorConfig,
}

/// Sanitized dispatcher config (token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedDispatcherConfig {
    pub url: String,
    pub git_ref: String,
    pub token_configured: bool,
    pub timeout_secs: u64,
}

/// Sanitized publisher config (API token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedPublisherConfig {
    pub api_base: String,
    pub api_token_configured: bool,
    pub timeout_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            content: config.content.clone(),
            dispatcher: SanitizedDispatcherConfig {
                url: config.dispatcher.url.clone(),
                git_ref: config.dispatcher.git_ref.clone(),
                token_configured: !config.dispatcher.token.is_empty(),
                timeout_secs: config.dispatcher.timeout_secs,
            },
            publisher: SanitizedPublisherConfig {
                api_base: config.publisher.api_base.clone(),
                api_token_configured: !config.publisher.api_token.is_empty(),
                timeout_secs: config.publisher.timeout_secs,
            },
            schedule: config.schedule.clone(),
            orchestrator: config.orchestrator.clone(),
        }
    }
}
