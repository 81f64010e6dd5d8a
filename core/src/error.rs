use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuizError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid parameters: year={year}, paper={paper:?}, number={number}")]
    InvalidAddress {
        year:   i64,
        paper:  String,
        number: i64,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No eligible questions for topic '{topic}'{}", tag_suffix(.tag))]
    NoEligibleQuestions {
        topic: String,
        tag:   Option<String>,
    },

    #[error("Store returned no questions for {requested} selected ids")]
    EmptyFetch { requested: usize },

    #[error("Quiz '{quiz_id}' not found")]
    QuizNotFound { quiz_id: String },

    #[error("Store error: {0}")]
    Store(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn tag_suffix(tag: &Option<String>) -> String {
    tag.as_deref().map(|t| format!(", tag '{t}'")).unwrap_or_default()
}

pub type QuizResult<T> = Result<T, QuizError>;
