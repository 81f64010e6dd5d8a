//! Quiz assembly and deterministic answer randomization for past-paper
//! multiple-choice questions, plus the question address codec.

pub mod answer;
pub mod assembly;
pub mod config;
pub mod error;
pub mod locator;
pub mod question;
pub mod randomizer;
pub mod rng;
pub mod seed;
pub mod shuffle;
pub mod store;
pub mod types;

pub use assembly::{Quiz, QuizAssembler};
pub use error::{QuizError, QuizResult};
pub use locator::{Paper, QuestionAddress, QuestionLocator};
pub use question::{AnswerOption, OptionLabel, Question};
pub use randomizer::{LabelMapping, RandomizeMode, RandomizedQuestion};
