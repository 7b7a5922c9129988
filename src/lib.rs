pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;

mod app;

pub use app::run;
pub use application::{AppContext, ChatReply, KnowledgeBaseEngine, ReplySource, UploadOutcome};
pub use domain::error::{AppError, Result};
pub use infrastructure::config::AppConfig;
