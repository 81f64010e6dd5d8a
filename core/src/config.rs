use crate::types::DEFAULT_QUIZ_SIZE;
use serde::{Deserialize, Serialize};

/// Runtime configuration for quiz assembly and address generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizConfig {
    /// Upper bound on questions per assembled quiz.
    #[serde(default = "default_target_count")]
    pub target_question_count: usize,
    /// First path segment of canonical question addresses.
    #[serde(default = "default_namespace")]
    pub address_namespace: String,
}

fn default_target_count() -> usize {
    DEFAULT_QUIZ_SIZE
}

fn default_namespace() -> String {
    "questions".into()
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            target_question_count: default_target_count(),
            address_namespace:     default_namespace(),
        }
    }
}

impl QuizConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: QuizConfig = serde_json::from_str(&content)?;
        if config.target_question_count == 0 {
            anyhow::bail!("{path}: target_question_count must be > 0");
        }
        Ok(config)
    }

    pub fn locator(&self) -> crate::locator::QuestionLocator {
        crate::locator::QuestionLocator::new(self.address_namespace.as_str())
    }
}
