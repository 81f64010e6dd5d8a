//! Shared primitive types used across the quiz engine.

/// Stable identifier of a question in the store of record.
pub type QuestionId = String;

/// Identity of the viewer a quiz is assembled for.
pub type ViewerId = String;

/// Identifier of a persisted quiz.
pub type QuizId = String;

/// Default number of questions in an assembled quiz.
pub const DEFAULT_QUIZ_SIZE: usize = 10;
