//! Answer reverse-mapping and grading.
//!
//! Submissions arrive in displayed labels. Before they are scored or
//! persisted they are converted back to the question's canonical labels.
//!
//! Fail-open: a submitted label that is not in the mapping is returned
//! unchanged and logged. Scoring never hard-fails on one bad answer.

use crate::{
    question::{OptionLabel, Question},
    randomizer::{LabelMapping, RandomizedQuestion},
    types::QuestionId,
};
use serde::{Deserialize, Serialize};

/// Map a displayed label back to the original label.
///
/// Without a mapping (never randomized) the input is returned as is.
pub fn to_original_label(submitted: &str, mapping: Option<&LabelMapping>) -> String {
    let Some(mapping) = mapping else {
        return submitted.to_string();
    };
    match OptionLabel::parse(submitted).and_then(|shown| mapping.original_of(shown)) {
        Some(original) => original.to_string(),
        None => {
            log::warn!("answer: label {submitted:?} not found in mapping; passing through unchanged");
            submitted.to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradedAnswer {
    pub question_id:     QuestionId,
    /// Label as the viewer saw it.
    pub submitted_label: String,
    /// Label in the canonical labeling.
    pub original_label:  String,
    pub is_correct:      bool,
}

/// Grade a submission against the canonical correct answer.
pub fn grade_answer(
    question:  &Question,
    submitted: &str,
    mapping:   Option<&LabelMapping>,
) -> GradedAnswer {
    let original_label = to_original_label(submitted, mapping);
    let is_correct = OptionLabel::parse(&original_label) == Some(question.correct_answer);
    GradedAnswer {
        question_id: question.id.clone(),
        submitted_label: submitted.to_string(),
        original_label,
        is_correct,
    }
}

impl RandomizedQuestion {
    pub fn grade(&self, submitted: &str) -> GradedAnswer {
        grade_answer(&self.question, submitted, Some(&self.label_mapping))
    }
}
