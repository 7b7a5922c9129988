//! Analytics knowledge base
//!
//! Questions the dataset could not answer land here. Two lookup stages run
//! in order: tool-specific rules (fixed confidence), then TF-IDF cosine
//! similarity over the curated corpus with a confidence floor.

mod engine;
mod rules;
mod stop_words;
mod tfidf;

pub use engine::KnowledgeBaseEngine;
pub use rules::{match_rule, ToolRule, TOOL_RULES};
pub use tfidf::{cosine_similarity, SparseVector, TfidfVectorizer};
