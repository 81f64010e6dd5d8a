//! Question store collaborator and its SQLite implementation.
//!
//! RULE: Only the store talks to the database.
//! Assembly calls the `QuestionStore` / `QuizLedger` traits and never
//! executes SQL directly. Errors are returned as-is; retries and
//! timeouts belong to whoever owns the connection.

pub mod question;
pub mod quiz;

use crate::{
    answer::GradedAnswer,
    error::QuizResult,
    question::Question,
    types::{QuestionId, QuizId},
};
use rusqlite::Connection;

pub use quiz::QuizRecord;

/// Read side used by quiz assembly.
pub trait QuestionStore {
    /// Ids classified under `topic` (and `tag`, when given) in the tag index.
    fn list_ids_by_tag_index(&self, topic: &str, tag: Option<&str>) -> QuizResult<Vec<QuestionId>>;

    /// Ids whose subject area contains `topic_substring`, case-insensitively.
    fn list_ids_by_subject_area(&self, topic_substring: &str) -> QuizResult<Vec<QuestionId>>;

    /// Ids whose free-form tags contain `topic` (and `tag`, when given).
    fn list_ids_by_free_tags(&self, topic: &str, tag: Option<&str>) -> QuizResult<Vec<QuestionId>>;

    /// Active records for `ids`, in request order. Unknown or inactive ids are skipped.
    fn fetch_by_ids(&self, ids: &[QuestionId]) -> QuizResult<Vec<Question>>;
}

/// Write side: quiz provenance and submitted answers.
pub trait QuizLedger {
    fn save_quiz(&self, record: &QuizRecord) -> QuizResult<()>;

    fn load_quiz(&self, quiz_id: &str) -> QuizResult<Option<QuizRecord>>;

    /// Persist one attempt atomically: either every answer is stored or none.
    fn record_attempt(
        &self,
        quiz_id:   &QuizId,
        viewer_id: Option<&str>,
        answers:   &[GradedAnswer],
    ) -> QuizResult<()>;
}

impl<S: QuestionStore + ?Sized> QuestionStore for &S {
    fn list_ids_by_tag_index(&self, topic: &str, tag: Option<&str>) -> QuizResult<Vec<QuestionId>> {
        (**self).list_ids_by_tag_index(topic, tag)
    }

    fn list_ids_by_subject_area(&self, topic_substring: &str) -> QuizResult<Vec<QuestionId>> {
        (**self).list_ids_by_subject_area(topic_substring)
    }

    fn list_ids_by_free_tags(&self, topic: &str, tag: Option<&str>) -> QuizResult<Vec<QuestionId>> {
        (**self).list_ids_by_free_tags(topic, tag)
    }

    fn fetch_by_ids(&self, ids: &[QuestionId]) -> QuizResult<Vec<Question>> {
        (**self).fetch_by_ids(ids)
    }
}

impl<S: QuizLedger + ?Sized> QuizLedger for &S {
    fn save_quiz(&self, record: &QuizRecord) -> QuizResult<()> {
        (**self).save_quiz(record)
    }

    fn load_quiz(&self, quiz_id: &str) -> QuizResult<Option<QuizRecord>> {
        (**self).load_quiz(quiz_id)
    }

    fn record_attempt(
        &self,
        quiz_id:   &QuizId,
        viewer_id: Option<&str>,
        answers:   &[GradedAnswer],
    ) -> QuizResult<()> {
        (**self).record_attempt(quiz_id, viewer_id, answers)
    }
}

pub struct SqliteQuestionStore {
    conn: Connection,
}

impl SqliteQuestionStore {
    /// Open (or create) the database at `path`.
    pub fn open(path: &str) -> QuizResult<Self> {
        let conn = Connection::open(path)?;
        // WAL only matters for real files; in-memory databases ignore it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> QuizResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> QuizResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_questions.sql"))?;
        Ok(())
    }

    /// In-memory store with the schema applied.
    pub fn in_memory_migrated() -> QuizResult<Self> {
        let store = Self::in_memory()?;
        store.migrate()?;
        Ok(store)
    }
}
