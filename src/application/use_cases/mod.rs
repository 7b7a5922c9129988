pub mod chat_service;
pub mod dataset_profiler;
pub mod dataset_qa;
pub mod knowledge_base;
pub mod session_cache;
