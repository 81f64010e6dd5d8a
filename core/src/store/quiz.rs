//! Store methods for quiz provenance and submitted answers.
//!
//! A quiz row keeps which questions were selected and for whom. The
//! displayed option order is never stored.

use super::{QuizLedger, SqliteQuestionStore};
use crate::{
    answer::GradedAnswer,
    error::{QuizError, QuizResult},
    types::{QuestionId, QuizId, ViewerId},
};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

/// Persisted form of a quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizRecord {
    pub quiz_id:      QuizId,
    pub title:        String,
    pub topic:        String,
    pub tag:          Option<String>,
    pub viewer_id:    Option<ViewerId>,
    pub created_at:   DateTime<Utc>,
    pub question_ids: Vec<QuestionId>,
}

impl SqliteQuestionStore {
    /// (correct, answered) for one viewer's attempt at a quiz.
    pub fn attempt_tally(&self, quiz_id: &str, viewer_id: Option<&str>) -> QuizResult<(i64, i64)> {
        let tally = self.conn.query_row(
            "SELECT COALESCE(SUM(is_correct), 0), COUNT(*) FROM attempt_answer
             WHERE quiz_id = ?1 AND viewer_id IS ?2",
            params![quiz_id, viewer_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(tally)
    }

    /// Stored original labels for one viewer's attempt, in submission order.
    pub fn attempt_labels(
        &self,
        quiz_id:   &str,
        viewer_id: Option<&str>,
    ) -> QuizResult<Vec<(QuestionId, String)>> {
        let mut stmt = self.conn.prepare(
            "SELECT question_id, original_label FROM attempt_answer
             WHERE quiz_id = ?1 AND viewer_id IS ?2
             ORDER BY id ASC",
        )?;
        let rows = stmt
            .query_map(params![quiz_id, viewer_id], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

impl QuizLedger for SqliteQuestionStore {
    fn save_quiz(&self, record: &QuizRecord) -> QuizResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO quiz (quiz_id, title, topic, tag, viewer_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.quiz_id,
                record.title,
                record.topic,
                record.tag,
                record.viewer_id,
                record.created_at.to_rfc3339(),
            ],
        )?;
        for (position, question_id) in record.question_ids.iter().enumerate() {
            tx.execute(
                "INSERT INTO quiz_question (quiz_id, position, question_id) VALUES (?1, ?2, ?3)",
                params![record.quiz_id, position as i64, question_id],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn load_quiz(&self, quiz_id: &str) -> QuizResult<Option<QuizRecord>> {
        let header = self
            .conn
            .query_row(
                "SELECT quiz_id, title, topic, tag, viewer_id, created_at
                 FROM quiz WHERE quiz_id = ?1",
                params![quiz_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                },
            )
            .optional()?;
        let Some((quiz_id, title, topic, tag, viewer_id, created_at)) = header else {
            return Ok(None);
        };

        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| QuizError::Other(anyhow::anyhow!("quiz {quiz_id}: bad created_at: {e}")))?
            .with_timezone(&Utc);

        let mut stmt = self.conn.prepare(
            "SELECT question_id FROM quiz_question WHERE quiz_id = ?1 ORDER BY position ASC",
        )?;
        let question_ids = stmt
            .query_map(params![quiz_id], |row| row.get(0))?
            .collect::<Result<Vec<QuestionId>, _>>()?;

        Ok(Some(QuizRecord {
            quiz_id,
            title,
            topic,
            tag,
            viewer_id,
            created_at,
            question_ids,
        }))
    }

    fn record_attempt(
        &self,
        quiz_id:   &QuizId,
        viewer_id: Option<&str>,
        answers:   &[GradedAnswer],
    ) -> QuizResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for answer in answers {
            tx.execute(
                "INSERT INTO attempt_answer
                 (quiz_id, viewer_id, question_id, submitted_label, original_label, is_correct)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    quiz_id,
                    viewer_id,
                    answer.question_id,
                    answer.submitted_label,
                    answer.original_label,
                    answer.is_correct as i64,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}
