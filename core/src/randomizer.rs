//! Option randomizer.
//!
//! Permutes the four option slots of a question and records where each
//! original label landed. Two modes:
//!   - Deterministic: seeded by `derive_seed(key)`, key is usually
//!     `"<viewer>-<question>"`. Same key, same order, every time.
//!   - Fresh: draws from an injected `RandomSource`; varies per call.
//!
//! All four slots are shuffled even when some are empty. Option presence
//! is the question's own invariant, not checked here.

use crate::{
    question::{AnswerOption, OptionLabel, Question},
    rng::RandomSource,
    seed::derive_seed,
    shuffle::{shuffle_seeded, shuffle_with},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bijection from original option label to displayed option label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<OptionLabel, OptionLabel>",
    into = "BTreeMap<OptionLabel, OptionLabel>"
)]
pub struct LabelMapping {
    /// Indexed by original label.
    targets: [OptionLabel; 4],
}

impl LabelMapping {
    pub fn identity() -> Self {
        Self { targets: OptionLabel::ALL }
    }

    /// Build from per-original targets, rejecting anything that is not a bijection.
    pub fn from_targets(targets: [OptionLabel; 4]) -> Option<Self> {
        let mut seen = [false; 4];
        for t in targets {
            if std::mem::replace(&mut seen[t.index()], true) {
                return None;
            }
        }
        Some(Self { targets })
    }

    /// Displayed label of the content originally under `original`.
    pub fn mapped(&self, original: OptionLabel) -> OptionLabel {
        self.targets[original.index()]
    }

    /// Original label whose content is displayed under `shown`.
    pub fn original_of(&self, shown: OptionLabel) -> Option<OptionLabel> {
        OptionLabel::ALL
            .into_iter()
            .find(|orig| self.targets[orig.index()] == shown)
    }

    /// (original, displayed) pairs in canonical order.
    pub fn pairs(&self) -> impl Iterator<Item = (OptionLabel, OptionLabel)> + '_ {
        OptionLabel::ALL.into_iter().map(move |orig| (orig, self.mapped(orig)))
    }

    pub fn is_identity(&self) -> bool {
        self.targets == OptionLabel::ALL
    }
}

impl TryFrom<BTreeMap<OptionLabel, OptionLabel>> for LabelMapping {
    type Error = String;

    fn try_from(map: BTreeMap<OptionLabel, OptionLabel>) -> Result<Self, Self::Error> {
        let mut targets = OptionLabel::ALL;
        for orig in OptionLabel::ALL {
            targets[orig.index()] = *map
                .get(&orig)
                .ok_or_else(|| format!("label mapping has no entry for {orig}"))?;
        }
        Self::from_targets(targets).ok_or_else(|| "label mapping is not a bijection".to_string())
    }
}

impl From<LabelMapping> for BTreeMap<OptionLabel, OptionLabel> {
    fn from(mapping: LabelMapping) -> Self {
        mapping.pairs().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RandomizeMode {
    /// Shuffle with the injected fresh source.
    Fresh,
    /// Shuffle seeded from `key`.
    Deterministic { key: String },
}

/// A question as one viewer sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomizedQuestion {
    /// The canonical record, untouched.
    pub question:                Question,
    /// Displayed option slots, A..D.
    pub options:                 [AnswerOption; 4],
    pub label_mapping:           LabelMapping,
    pub original_correct_answer: OptionLabel,
    pub shifted_correct_answer:  OptionLabel,
}

impl RandomizedQuestion {
    pub fn question_id(&self) -> &str {
        &self.question.id
    }

    pub fn displayed(&self, label: OptionLabel) -> &AnswerOption {
        &self.options[label.index()]
    }
}

/// Randomize `question` in the given mode. `fresh` is only drawn from in fresh mode.
pub fn randomize<R: RandomSource + ?Sized>(
    question: &Question,
    mode:     &RandomizeMode,
    fresh:    &mut R,
) -> RandomizedQuestion {
    match mode {
        RandomizeMode::Fresh => randomize_fresh(question, fresh),
        RandomizeMode::Deterministic { key } => randomize_deterministic(question, key),
    }
}

pub fn randomize_deterministic(question: &Question, key: &str) -> RandomizedQuestion {
    let order = shuffle_seeded(&OptionLabel::ALL, derive_seed(key));
    apply_order(question, order)
}

pub fn randomize_fresh<R: RandomSource + ?Sized>(question: &Question, rng: &mut R) -> RandomizedQuestion {
    let order = shuffle_with(&OptionLabel::ALL, rng);
    apply_order(question, order)
}

/// `order[pos]` is the original label whose content is displayed at `pos`.
fn apply_order(question: &Question, order: Vec<OptionLabel>) -> RandomizedQuestion {
    let mut options: [AnswerOption; 4] = Default::default();
    let mut targets = OptionLabel::ALL;
    for (pos, orig) in order.into_iter().enumerate() {
        options[pos] = question.option(orig).clone();
        targets[orig.index()] = OptionLabel::ALL[pos];
    }

    let label_mapping = LabelMapping { targets };
    RandomizedQuestion {
        question: question.clone(),
        options,
        label_mapping,
        original_correct_answer: question.correct_answer,
        shifted_correct_answer: label_mapping.mapped(question.correct_answer),
    }
}
