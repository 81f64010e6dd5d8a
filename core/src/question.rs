//! Canonical multiple-choice question records.
//!
//! A `Question` is what the store of record holds. It is never mutated by
//! randomization: shuffled views live in `randomizer::RandomizedQuestion`.

use crate::{
    error::{QuizError, QuizResult},
    locator::QuestionAddress,
    types::QuestionId,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the four fixed option labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OptionLabel {
    A,
    B,
    C,
    D,
}

impl OptionLabel {
    /// Canonical order.
    pub const ALL: [OptionLabel; 4] = [Self::A, Self::B, Self::C, Self::D];

    pub fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
            Self::D => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }

    /// Lenient parse used on user submissions: trims, ignores case.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "A" | "a" => Some(Self::A),
            "B" | "b" => Some(Self::B),
            "C" | "c" => Some(Self::C),
            "D" | "d" => Some(Self::D),
            _ => None,
        }
    }
}

impl fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionLabel {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| QuizError::InvalidInput(format!("unknown option label {s:?}")))
    }
}

/// Text and optional diagram payload of one option slot.
/// The diagram is opaque to the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    #[serde(default)]
    pub text:    Option<String>,
    #[serde(default)]
    pub diagram: Option<String>,
}

impl AnswerOption {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), diagram: None }
    }

    pub fn is_present(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        filled(&self.text) || filled(&self.diagram)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id:             QuestionId,
    pub body:           String,
    /// Option slots in canonical A, B, C, D order.
    pub options:        [AnswerOption; 4],
    pub correct_answer: OptionLabel,
    #[serde(default)]
    pub solution:       Option<String>,
    /// Coarse taxonomy label.
    #[serde(default)]
    pub topic:          Option<String>,
    /// Fine taxonomy label under `topic`.
    #[serde(default)]
    pub tag:            Option<String>,
    #[serde(default)]
    pub subject_area:   Option<String>,
    /// Free-form tags.
    #[serde(default)]
    pub tags:           Vec<String>,
    /// Past-paper position, when the question came from one.
    #[serde(default)]
    pub address:        Option<QuestionAddress>,
    #[serde(default = "default_active")]
    pub active:         bool,
}

fn default_active() -> bool {
    true
}

impl Question {
    pub fn option(&self, label: OptionLabel) -> &AnswerOption {
        &self.options[label.index()]
    }

    /// Check the record invariant: the correct answer must name a populated option.
    pub fn validate(&self) -> QuizResult<()> {
        if self.id.trim().is_empty() {
            return Err(QuizError::InvalidInput("question id is empty".into()));
        }
        if !self.option(self.correct_answer).is_present() {
            return Err(QuizError::InvalidInput(format!(
                "question {}: correct answer {} has no option content",
                self.id, self.correct_answer
            )));
        }
        Ok(())
    }
}
