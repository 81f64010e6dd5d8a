//! Store methods for canonical questions and the topic/tag index.

use super::{QuestionStore, SqliteQuestionStore};
use crate::{
    error::QuizResult,
    locator::{Paper, QuestionAddress},
    question::{AnswerOption, OptionLabel, Question},
    types::QuestionId,
};
use rusqlite::{params, params_from_iter, types::Type, OptionalExtension, Row};
use std::collections::HashMap;

const QUESTION_COLUMNS: &str =
    "id, body, option_a, option_b, option_c, option_d,
     diagram_a, diagram_b, diagram_c, diagram_d,
     correct_answer, solution, topic, tag, subject_area, tags_json,
     year, paper, number, active";

fn conversion_error(idx: usize, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, msg.into())
}

fn question_from_row(row: &Row<'_>) -> rusqlite::Result<Question> {
    let option = |text_idx: usize| -> rusqlite::Result<AnswerOption> {
        Ok(AnswerOption {
            text:    row.get(text_idx)?,
            diagram: row.get(text_idx + 4)?,
        })
    };

    let correct: String = row.get(10)?;
    let correct_answer = OptionLabel::parse(&correct)
        .ok_or_else(|| conversion_error(10, format!("bad correct_answer {correct:?}")))?;

    let tags_json: String = row.get(15)?;
    let tags: Vec<String> = serde_json::from_str(&tags_json)
        .map_err(|e| conversion_error(15, format!("bad tags_json: {e}")))?;

    let year: Option<i64> = row.get(16)?;
    let paper: Option<String> = row.get(17)?;
    let number: Option<i64> = row.get(18)?;
    let address = match (year, paper, number) {
        (Some(y), Some(p), Some(n)) => Paper::parse(&p).and_then(|p| {
            QuestionAddress::new(u32::try_from(y).ok()?, p, u32::try_from(n).ok()?)
        }),
        _ => None,
    };

    Ok(Question {
        id:             row.get(0)?,
        body:           row.get(1)?,
        options:        [option(2)?, option(3)?, option(4)?, option(5)?],
        correct_answer,
        solution:       row.get(11)?,
        topic:          row.get(12)?,
        tag:            row.get(13)?,
        subject_area:   row.get(14)?,
        tags,
        address,
        active:         row.get::<_, i64>(19)? != 0,
    })
}

impl SqliteQuestionStore {
    /// Insert a canonical question. When it carries a topic it is also
    /// entered into the topic/tag index.
    pub fn insert_question(&self, q: &Question) -> QuizResult<()> {
        q.validate()?;
        let [a, b, c, d] = &q.options;
        self.conn.execute(
            "INSERT INTO question (
                id, body, option_a, option_b, option_c, option_d,
                diagram_a, diagram_b, diagram_c, diagram_d,
                correct_answer, solution, topic, tag, subject_area, tags_json,
                year, paper, number, active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                      ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)",
            params![
                q.id,
                q.body,
                a.text, b.text, c.text, d.text,
                a.diagram, b.diagram, c.diagram, d.diagram,
                q.correct_answer.as_str(),
                q.solution,
                q.topic,
                q.tag,
                q.subject_area,
                serde_json::to_string(&q.tags)?,
                q.address.map(|addr| addr.year() as i64),
                q.address.map(|addr| addr.paper().as_str()),
                q.address.map(|addr| addr.number() as i64),
                q.active as i64,
            ],
        )?;
        if let Some(topic) = q.topic.as_deref() {
            self.index_question(&q.id, topic, q.tag.as_deref())?;
        }
        Ok(())
    }

    /// Classify a question under `topic` / `tag` in the tag index.
    pub fn index_question(&self, question_id: &str, topic: &str, tag: Option<&str>) -> QuizResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO question_topic (question_id, topic, tag) VALUES (?1, ?2, ?3)",
            params![question_id, topic, tag],
        )?;
        Ok(())
    }

    pub fn set_question_active(&self, question_id: &str, active: bool) -> QuizResult<()> {
        self.conn.execute(
            "UPDATE question SET active = ?1 WHERE id = ?2",
            params![active as i64, question_id],
        )?;
        Ok(())
    }

    /// Look up the active question at a past-paper address.
    pub fn question_by_address(&self, addr: &QuestionAddress) -> QuizResult<Option<Question>> {
        let sql = format!(
            "SELECT {QUESTION_COLUMNS} FROM question
             WHERE year = ?1 AND paper = ?2 AND number = ?3 AND active = 1"
        );
        let question = self
            .conn
            .query_row(
                &sql,
                params![addr.year() as i64, addr.paper().as_str(), addr.number() as i64],
                question_from_row,
            )
            .optional()?;
        Ok(question)
    }

    /// Total number of questions, active or not (for tests and summaries).
    pub fn question_count(&self) -> QuizResult<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM question", [], |row| row.get(0))?;
        Ok(count)
    }

    fn query_ids(&self, sql: &str, params: impl rusqlite::Params) -> QuizResult<Vec<QuestionId>> {
        let mut stmt = self.conn.prepare(sql)?;
        let ids = stmt
            .query_map(params, |row| row.get(0))?
            .collect::<Result<Vec<QuestionId>, _>>()?;
        Ok(ids)
    }
}

impl QuestionStore for SqliteQuestionStore {
    fn list_ids_by_tag_index(&self, topic: &str, tag: Option<&str>) -> QuizResult<Vec<QuestionId>> {
        self.query_ids(
            "SELECT DISTINCT qt.question_id
             FROM question_topic qt
             JOIN question q ON q.id = qt.question_id
             WHERE q.active = 1 AND qt.topic = ?1 AND (?2 IS NULL OR qt.tag = ?2)
             ORDER BY qt.question_id",
            params![topic, tag],
        )
    }

    fn list_ids_by_subject_area(&self, topic_substring: &str) -> QuizResult<Vec<QuestionId>> {
        // SQLite's lower() folds ASCII only; compare with Unicode case folding here.
        let needle = topic_substring.to_lowercase();
        let mut stmt = self.conn.prepare(
            "SELECT id, subject_area FROM question
             WHERE active = 1 AND subject_area IS NOT NULL
             ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .filter(|(_, area)| area.to_lowercase().contains(&needle))
            .map(|(id, _)| id)
            .collect())
    }

    fn list_ids_by_free_tags(&self, topic: &str, tag: Option<&str>) -> QuizResult<Vec<QuestionId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, tags_json FROM question WHERE active = 1 ORDER BY id")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut ids = Vec::new();
        for (id, tags_json) in rows {
            let tags: Vec<String> = serde_json::from_str(&tags_json)?;
            let has = |t: &str| tags.iter().any(|x| x == t);
            if has(topic) && tag.map_or(true, has) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    fn fetch_by_ids(&self, ids: &[QuestionId]) -> QuizResult<Vec<Question>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = (1..=ids.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {QUESTION_COLUMNS} FROM question
             WHERE active = 1 AND id IN ({placeholders})"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut by_id: HashMap<QuestionId, Question> = stmt
            .query_map(params_from_iter(ids.iter()), question_from_row)?
            .map(|r| r.map(|q| (q.id.clone(), q)))
            .collect::<Result<_, _>>()?;

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }
}
