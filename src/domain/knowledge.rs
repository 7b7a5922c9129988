use serde::{Deserialize, Serialize};

/// One curated knowledge-base entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KbEntry {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub questions: Vec<String>,
    pub answer: String,
}

impl KbEntry {
    /// Text indexed for similarity search: topic, example questions, answer
    pub fn document(&self) -> String {
        format!(
            "{}. {}. {}",
            self.topic,
            self.questions.join(" "),
            self.answer
        )
    }
}

/// Answer produced by the knowledge-base engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaResult {
    pub answer: String,
    pub topic: Option<String>,
    /// Similarity or rule confidence in [0, 1]
    pub confidence: f32,
}

impl QaResult {
    pub fn new(answer: impl Into<String>, confidence: f32) -> Self {
        Self {
            answer: answer.into(),
            topic: None,
            confidence,
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Topic rendered as a title, e.g. `data_cleaning` -> `Data Cleaning`
    pub fn topic_title(&self) -> Option<String> {
        let topic = self.topic.as_deref()?.trim();
        if topic.is_empty() {
            return None;
        }
        Some(
            topic
                .replace('_', " ")
                .split_whitespace()
                .map(title_case)
                .collect::<Vec<_>>()
                .join(" "),
        )
    }

    /// Reply text with the topic title header when a topic is present
    pub fn display_text(&self) -> String {
        match self.topic_title() {
            Some(title) => format!("[{}]\n{}", title, self.answer),
            None => self.answer.clone(),
        }
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
