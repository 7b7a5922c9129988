use super::rules::match_rule;
use super::tfidf::{cosine_similarity, SparseVector, TfidfVectorizer};
use crate::domain::error::{AppError, Result};
use crate::domain::knowledge::{KbEntry, QaResult};
use crate::infrastructure::config::KnowledgeBaseConfig;
use std::path::Path;
use tracing::{debug, info};

const EMPTY_QUESTION: &str = "Please provide a question to analyze.";
const NOT_READY: &str =
    "The knowledge base is not ready yet. Please upload data or ask again later.";
const NOT_CONFIDENT: &str =
    "I do not have a confident answer yet. Try rephrasing or provide more detail.";

/// Two-stage retriever over the analytics corpus: tool rules, then TF-IDF similarity
pub struct KnowledgeBaseEngine {
    entries: Vec<KbEntry>,
    vectorizer: TfidfVectorizer,
    document_vectors: Vec<SparseVector>,
    min_confidence: f32,
    rule_confidence: f32,
}

impl KnowledgeBaseEngine {
    /// Load the JSON corpus and fit the index
    pub fn from_config(config: &KnowledgeBaseConfig) -> Result<Self> {
        let entries = load_corpus(&config.corpus_path)?;
        Ok(Self::from_entries(
            entries,
            config.min_confidence,
            config.rule_confidence,
        ))
    }

    pub fn from_entries(entries: Vec<KbEntry>, min_confidence: f32, rule_confidence: f32) -> Self {
        let documents: Vec<String> = entries.iter().map(KbEntry::document).collect();
        let (vectorizer, document_vectors) = TfidfVectorizer::fit_transform(&documents);

        info!(
            entries = entries.len(),
            vocabulary = vectorizer.vocabulary_size(),
            "Knowledge base index built"
        );

        Self {
            entries,
            vectorizer,
            document_vectors,
            min_confidence,
            rule_confidence,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn answer(&self, question: &str) -> QaResult {
        let question = question.trim();
        if question.is_empty() {
            return QaResult::new(EMPTY_QUESTION, 0.0);
        }

        if let Some(rule) = match_rule(question) {
            debug!(rule = rule.name, "Tool rule matched");
            return QaResult::new(rule.tip, self.rule_confidence);
        }

        if self.document_vectors.is_empty() {
            return QaResult::new(NOT_READY, 0.0);
        }

        let query = self.vectorizer.transform(question);
        let (best_idx, best_score) = self.best_match(&query);
        debug!(index = best_idx, confidence = best_score, "Similarity search finished");

        if best_score < self.min_confidence {
            return QaResult::new(NOT_CONFIDENT, best_score);
        }

        let entry = &self.entries[best_idx];
        let result = QaResult::new(entry.answer.clone(), best_score);
        if entry.topic.is_empty() {
            result
        } else {
            result.with_topic(entry.topic.clone())
        }
    }

    /// Highest-scoring document; ties keep the lowest index
    fn best_match(&self, query: &SparseVector) -> (usize, f32) {
        self.document_vectors
            .iter()
            .enumerate()
            .map(|(idx, doc)| (idx, cosine_similarity(query, doc)))
            .fold((0, f32::MIN), |best, current| {
                if current.1 > best.1 {
                    current
                } else {
                    best
                }
            })
    }
}

fn load_corpus(path: &Path) -> Result<Vec<KbEntry>> {
    if !path.exists() {
        return Err(AppError::ResourceMissing(format!(
            "Knowledge base file not found: {}",
            path.display()
        )));
    }
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| AppError::InvalidCorpus(format!("{}: {}", path.display(), e)))
}
