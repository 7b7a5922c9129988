pub mod use_cases;

pub use use_cases::chat_service::{AppContext, ChatReply, ReplySource, UploadOutcome};
pub use use_cases::knowledge_base::KnowledgeBaseEngine;
pub use use_cases::session_cache::{SessionDatasetCache, SessionEntry};
