//! Layered application configuration.
//!
//! Sources, lowest to highest priority:
//! 1. Built-in defaults
//! 2. `analyst-copilot.toml` in the working directory
//! 3. Environment variables with the `ANALYST_` prefix (`__` separates sections),
//!    e.g. `ANALYST_SERVER__PORT=8080` or `ANALYST_KNOWLEDGE_BASE__MIN_CONFIDENCE=0.3`

use crate::domain::error::{AppError, Result};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const CONFIG_FILE: &str = "analyst-copilot.toml";
pub const ENV_PREFIX: &str = "ANALYST_";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub knowledge_base: KnowledgeBaseConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory where uploads are saved before parsing
    pub upload_dir: PathBuf,
    /// Request body cap for uploads (default: 16MB)
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBaseConfig {
    /// JSON corpus of knowledge-base entries
    pub corpus_path: PathBuf,
    /// Similarity below this is reported as "not confident" (default: 0.22)
    pub min_confidence: f32,
    /// Confidence attached to tool-specific rule answers (default: 0.65)
    pub rule_confidence: f32,
    /// Build the engine during startup so a missing corpus aborts the process
    pub eager_load: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Seconds an uploaded dataset stays available to its session
    pub ttl_secs: u64,
    /// Upper bound on cached sessions; the oldest upload is evicted first
    pub max_sessions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default `tracing` filter when `RUST_LOG` is not set
    pub filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            corpus_path: PathBuf::from("data/knowledge_base.json"),
            min_confidence: 0.22,
            rule_confidence: 0.65,
            eager_load: true,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 24 * 60 * 60,
            max_sessions: 10_000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load `.env`, then defaults, TOML file and environment variables
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let config: AppConfig = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Provider chain used by [`AppConfig::load`]
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push("server.port must be greater than 0".to_string());
        }
        if self.server.max_upload_bytes == 0 {
            errors.push("server.max_upload_bytes must be greater than 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.knowledge_base.min_confidence) {
            errors.push("knowledge_base.min_confidence must be between 0.0 and 1.0".to_string());
        }
        if !(0.0..=1.0).contains(&self.knowledge_base.rule_confidence) {
            errors.push("knowledge_base.rule_confidence must be between 0.0 and 1.0".to_string());
        }
        if self.session.ttl_secs == 0 {
            errors.push("session.ttl_secs must be greater than 0".to_string());
        }
        if self.session.max_sessions == 0 {
            errors.push("session.max_sessions must be at least 1".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Config(errors.join("; ")))
        }
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }
}
