//! Request-facing dispatcher.
//!
//! `AppContext` owns the process-wide state handed to every request: the
//! session dataset cache and the knowledge-base engine, which is built at
//! most once.
//!
//! - Upload path: file on disk → table → profile → cache entry
//! - Chat path: dataset intents first, knowledge base as fallback

use crate::application::use_cases::dataset_profiler::{profile, render_text};
use crate::application::use_cases::dataset_qa;
use crate::application::use_cases::knowledge_base::KnowledgeBaseEngine;
use crate::application::use_cases::session_cache::{SessionDatasetCache, SessionEntry};
use crate::domain::error::{AppError, Result};
use crate::domain::profile::DatasetProfile;
use crate::infrastructure::config::{KnowledgeBaseConfig, SessionConfig};
use crate::infrastructure::loader;
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Where a chat reply came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    Dataset,
    KnowledgeBase,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub reply: String,
    pub source: ReplySource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadOutcome {
    pub profile: DatasetProfile,
    pub summary: String,
}

pub struct AppContext {
    sessions: SessionDatasetCache,
    kb_config: KnowledgeBaseConfig,
    knowledge_base: OnceCell<KnowledgeBaseEngine>,
}

impl AppContext {
    pub fn new(kb_config: KnowledgeBaseConfig, session_config: &SessionConfig) -> Self {
        Self {
            sessions: SessionDatasetCache::new(
                Duration::from_secs(session_config.ttl_secs),
                session_config.max_sessions,
            ),
            kb_config,
            knowledge_base: OnceCell::new(),
        }
    }

    /// Context with a prebuilt engine
    pub fn with_engine(engine: KnowledgeBaseEngine, session_config: &SessionConfig) -> Self {
        let context = Self::new(KnowledgeBaseConfig::default(), session_config);
        let _ = context.knowledge_base.set(engine);
        context
    }

    /// Engine, built from the corpus on first use
    pub fn knowledge_base(&self) -> Result<&KnowledgeBaseEngine> {
        self.knowledge_base
            .get_or_try_init(|| KnowledgeBaseEngine::from_config(&self.kb_config))
    }

    pub fn sessions(&self) -> &SessionDatasetCache {
        &self.sessions
    }

    pub fn dataset(&self, session_id: Option<&str>) -> Option<Arc<SessionEntry>> {
        self.sessions.get(session_id)
    }

    /// Load and profile an uploaded file, then remember it for the session.
    ///
    /// Nothing is cached when loading fails.
    pub fn upload(&self, session_id: Option<&str>, path: &Path) -> Result<UploadOutcome> {
        let table = loader::load(path)?;
        let profile = profile(&table);
        let summary = render_text(&profile);

        info!(
            session_id = session_id.unwrap_or_default(),
            rows = profile.rows,
            columns = profile.columns,
            "Dataset uploaded"
        );

        if let Some(id) = session_id {
            self.sessions.set(id, table, profile.clone());
        }

        Ok(UploadOutcome { profile, summary })
    }

    pub fn chat(&self, session_id: Option<&str>, message: &str) -> Result<ChatReply> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::ValidationError(
                "Please enter a question to analyze.".to_string(),
            ));
        }
        debug!(question = %message, "Chat question received");

        if let Some(entry) = self.sessions.get(session_id) {
            if let Some(reply) = dataset_qa::answer(message, &entry.table, &entry.profile) {
                info!(source = "dataset", "Chat answered");
                return Ok(ChatReply {
                    reply,
                    source: ReplySource::Dataset,
                    confidence: None,
                });
            }
        }

        let result = self.knowledge_base()?.answer(message);
        info!(
            source = "knowledge_base",
            confidence = result.confidence,
            "Chat answered"
        );

        Ok(ChatReply {
            reply: result.display_text(),
            source: ReplySource::KnowledgeBase,
            confidence: Some(result.confidence),
        })
    }
}
