//! Quiz assembly.
//!
//! STEPS (fixed order, one store round-trip each, never parallel):
//!   1. Resolve a candidate pool, first non-empty of:
//!        a. tag index        (topic, tag)
//!        b. subject area     (topic substring)
//!        c. free-form tags   (topic, tag)
//!   2. Select up to `target` ids; larger pools are sampled with a fresh shuffle.
//!   3. Fetch the full records.
//!   4. Randomize options: deterministic per (viewer, question) when a viewer
//!      is known, fresh otherwise.
//!   5. Package as a `Quiz`.
//!
//! Selection is never tied to the viewer; only option order is.
//! Store errors propagate unchanged.

use crate::{
    answer::GradedAnswer,
    config::QuizConfig,
    error::{QuizError, QuizResult},
    question::Question,
    randomizer::{randomize, RandomizeMode, RandomizedQuestion},
    rng::{RandomSource, ThreadRandom},
    seed::randomization_key,
    shuffle::shuffle_with,
    store::{QuestionStore, QuizLedger, QuizRecord},
    types::{QuestionId, QuizId, ViewerId, DEFAULT_QUIZ_SIZE},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Which lookup produced the candidate pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolSource {
    TagIndex,
    SubjectArea,
    FreeTags,
}

/// An assembled quiz: ids for persistence, randomized views for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub quiz_id:      QuizId,
    pub title:        String,
    pub topic:        String,
    pub tag:          Option<String>,
    pub viewer_id:    Option<ViewerId>,
    pub created_at:   DateTime<Utc>,
    /// Selected ids as persisted. Can outnumber `questions` when the store
    /// no longer returns some of them.
    pub question_ids: Vec<QuestionId>,
    pub questions:    Vec<RandomizedQuestion>,
}

impl Quiz {
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn question(&self, question_id: &str) -> Option<&RandomizedQuestion> {
        self.questions.iter().find(|q| q.question_id() == question_id)
    }

    /// The persisted form: no display permutation.
    pub fn record(&self) -> QuizRecord {
        QuizRecord {
            quiz_id:      self.quiz_id.clone(),
            title:        self.title.clone(),
            topic:        self.topic.clone(),
            tag:          self.tag.clone(),
            viewer_id:    self.viewer_id.clone(),
            created_at:   self.created_at,
            question_ids: self.question_ids.clone(),
        }
    }
}

/// Score of one submitted attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptScore {
    pub correct:  usize,
    pub answered: usize,
    pub total:    usize,
    pub answers:  Vec<GradedAnswer>,
}

pub fn quiz_title(topic: &str, tag: Option<&str>, count: usize) -> String {
    let noun = if count == 1 { "question" } else { "questions" };
    match tag {
        Some(tag) => format!("{topic} - {tag} Quiz ({count} {noun})"),
        None => format!("{topic} Quiz ({count} {noun})"),
    }
}

pub struct QuizAssembler<S, R = ThreadRandom> {
    store:  S,
    rng:    R,
    target: usize,
}

impl<S: QuestionStore> QuizAssembler<S, ThreadRandom> {
    /// Assembler with a thread-local fresh source and the default quiz size.
    pub fn new(store: S) -> Self {
        Self::with_rng(store, ThreadRandom::new())
    }
}

impl<S: QuestionStore, R: RandomSource> QuizAssembler<S, R> {
    pub fn with_rng(store: S, rng: R) -> Self {
        Self { store, rng, target: DEFAULT_QUIZ_SIZE }
    }

    pub fn with_config(store: S, rng: R, config: &QuizConfig) -> Self {
        Self { store, rng, target: config.target_question_count.max(1) }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn target(&self) -> usize {
        self.target
    }

    /// Step 1: first non-empty lookup wins.
    pub fn candidate_pool(
        &self,
        topic: &str,
        tag:   Option<&str>,
    ) -> QuizResult<(PoolSource, Vec<QuestionId>)> {
        let ids = self.store.list_ids_by_tag_index(topic, tag)?;
        if !ids.is_empty() {
            log::debug!("assembly: tag index matched {} ids for {topic:?}/{tag:?}", ids.len());
            return Ok((PoolSource::TagIndex, dedup(ids)));
        }

        log::debug!("assembly: tag index empty for {topic:?}/{tag:?}, trying subject area");
        let ids = self.store.list_ids_by_subject_area(topic)?;
        if !ids.is_empty() {
            log::debug!("assembly: subject area matched {} ids for {topic:?}", ids.len());
            return Ok((PoolSource::SubjectArea, dedup(ids)));
        }

        log::debug!("assembly: subject area empty for {topic:?}, trying free tags");
        let ids = self.store.list_ids_by_free_tags(topic, tag)?;
        if !ids.is_empty() {
            log::debug!("assembly: free tags matched {} ids for {topic:?}/{tag:?}", ids.len());
            return Ok((PoolSource::FreeTags, dedup(ids)));
        }

        Err(QuizError::NoEligibleQuestions {
            topic: topic.to_string(),
            tag:   tag.map(str::to_string),
        })
    }

    /// Step 2: the whole pool when it fits, otherwise a uniform sample.
    pub fn select(&mut self, pool: Vec<QuestionId>) -> Vec<QuestionId> {
        if pool.len() <= self.target {
            return pool;
        }
        let mut picked = shuffle_with(&pool, &mut self.rng);
        picked.truncate(self.target);
        picked
    }

    /// Step 4 for a batch of fetched records.
    pub fn randomize_all(
        &mut self,
        questions: &[Question],
        viewer_id: Option<&str>,
    ) -> Vec<RandomizedQuestion> {
        questions
            .iter()
            .map(|q| {
                let mode = match viewer_id {
                    Some(viewer) => RandomizeMode::Deterministic {
                        key: randomization_key(viewer, &q.id),
                    },
                    None => RandomizeMode::Fresh,
                };
                randomize(q, &mode, &mut self.rng)
            })
            .collect()
    }

    pub fn assemble(
        &mut self,
        topic:     &str,
        tag:       Option<&str>,
        viewer_id: Option<&str>,
    ) -> QuizResult<Quiz> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(QuizError::InvalidInput("topic must not be empty".into()));
        }
        let tag = tag.map(str::trim).filter(|t| !t.is_empty());
        let viewer_id = viewer_id.map(str::trim).filter(|v| !v.is_empty());

        let (source, pool) = self.candidate_pool(topic, tag)?;
        let pool_size = pool.len();
        let selected = self.select(pool);

        let questions = self.store.fetch_by_ids(&selected)?;
        if questions.is_empty() {
            return Err(QuizError::EmptyFetch { requested: selected.len() });
        }
        if questions.len() < selected.len() {
            log::debug!(
                "assembly: store returned {} of {} selected questions",
                questions.len(),
                selected.len()
            );
        }

        let randomized = self.randomize_all(&questions, viewer_id);
        let quiz = Quiz {
            quiz_id:      uuid::Uuid::new_v4().to_string(),
            title:        quiz_title(topic, tag, randomized.len()),
            topic:        topic.to_string(),
            tag:          tag.map(str::to_string),
            viewer_id:    viewer_id.map(str::to_string),
            created_at:   Utc::now(),
            question_ids: selected,
            questions:    randomized,
        };

        log::info!(
            "assembly: quiz {} for {topic:?}/{tag:?}: {} questions from a pool of {pool_size} via {source:?}",
            quiz.quiz_id,
            quiz.len(),
        );
        Ok(quiz)
    }
}

impl<S: QuestionStore + QuizLedger, R: RandomSource> QuizAssembler<S, R> {
    /// Assemble and persist the question ids and provenance.
    pub fn assemble_and_save(
        &mut self,
        topic:     &str,
        tag:       Option<&str>,
        viewer_id: Option<&str>,
    ) -> QuizResult<Quiz> {
        let quiz = self.assemble(topic, tag, viewer_id)?;
        self.store.save_quiz(&quiz.record())?;
        Ok(quiz)
    }

    /// Rebuild a saved quiz for `viewer_id`. Deterministic mode reproduces
    /// the same option order the viewer saw before.
    pub fn reopen(&mut self, quiz_id: &str, viewer_id: Option<&str>) -> QuizResult<Quiz> {
        let record = self
            .store
            .load_quiz(quiz_id)?
            .ok_or_else(|| QuizError::QuizNotFound { quiz_id: quiz_id.to_string() })?;

        let questions = self.store.fetch_by_ids(&record.question_ids)?;
        if questions.is_empty() {
            return Err(QuizError::EmptyFetch { requested: record.question_ids.len() });
        }
        let viewer_id = viewer_id.map(str::trim).filter(|v| !v.is_empty());
        let randomized = self.randomize_all(&questions, viewer_id);

        Ok(Quiz {
            quiz_id:      record.quiz_id,
            title:        record.title,
            topic:        record.topic,
            tag:          record.tag,
            viewer_id:    viewer_id.map(str::to_string),
            created_at:   record.created_at,
            question_ids: record.question_ids,
            questions:    randomized,
        })
    }

    /// Grade `(question_id, displayed_label)` pairs and persist them in the
    /// canonical labeling as one attempt. Answers for questions not in the
    /// quiz are skipped. A repeated question id keeps its last answer.
    pub fn submit(
        &self,
        quiz:      &Quiz,
        viewer_id: Option<&str>,
        answers:   &[(QuestionId, String)],
    ) -> QuizResult<AttemptScore> {
        let mut graded: Vec<GradedAnswer> = Vec::with_capacity(answers.len());
        let mut slot: HashMap<&str, usize> = HashMap::new();
        for (question_id, submitted) in answers {
            let Some(rq) = quiz.question(question_id) else {
                log::warn!("submit: question {question_id} is not part of quiz {}", quiz.quiz_id);
                continue;
            };
            let answer = rq.grade(submitted);
            match slot.get(question_id.as_str()) {
                Some(&i) => {
                    log::debug!("submit: question {question_id} answered again; keeping the last answer");
                    graded[i] = answer;
                }
                None => {
                    slot.insert(question_id.as_str(), graded.len());
                    graded.push(answer);
                }
            }
        }

        self.store.record_attempt(&quiz.quiz_id, viewer_id, &graded)?;

        Ok(AttemptScore {
            correct:  graded.iter().filter(|a| a.is_correct).count(),
            answered: graded.len(),
            total:    quiz.len(),
            answers:  graded,
        })
    }
}

fn dedup(ids: Vec<QuestionId>) -> Vec<QuestionId> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_names_topic_tag_and_count() {
        assert_eq!(quiz_title("Algebra", None, 3), "Algebra Quiz (3 questions)");
        assert_eq!(quiz_title("Algebra", Some("Surds"), 1), "Algebra - Surds Quiz (1 question)");
    }

    #[test]
    fn dedup_keeps_first_occurrence_order() {
        let ids = vec!["b".to_string(), "a".into(), "b".into(), "c".into(), "a".into()];
        assert_eq!(dedup(ids), vec!["b", "a", "c"]);
    }
}
