//! Structured question locator.
//!
//! Bidirectional codec between a (year, paper, number) triple and the
//! canonical address `/<namespace>/<year>/<PAPER>/<number>`.
//!
//! Domain:
//!   year   in [2012, 2025]
//!   paper  "I" (numbers 1..=20) or "II" (numbers 1..=45), case-insensitive on input
//!
//! Malformed input is an expected case: `from_address` returns `None`
//! and `is_valid` returns false. Only `to_address` reports an error.

use crate::error::{QuizError, QuizResult};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_YEAR: u32 = 2012;
pub const MAX_YEAR: u32 = 2025;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Paper {
    I,
    II,
}

impl Paper {
    pub const ALL: [Paper; 2] = [Self::I, Self::II];

    /// Case-insensitive parse of a paper designator.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_uppercase().as_str() {
            "I"  => Some(Self::I),
            "II" => Some(Self::II),
            _    => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::I  => "I",
            Self::II => "II",
        }
    }

    /// Highest question number on this paper.
    pub fn max_number(self) -> u32 {
        match self {
            Self::I  => 20,
            Self::II => 45,
        }
    }
}

impl fmt::Display for Paper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated (year, paper, number) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawAddress")]
pub struct QuestionAddress {
    year:   u32,
    paper:  Paper,
    number: u32,
}

impl QuestionAddress {
    /// Build an address, or `None` when the triple is out of domain.
    pub fn new(year: u32, paper: Paper, number: u32) -> Option<Self> {
        let ok = (MIN_YEAR..=MAX_YEAR).contains(&year) && (1..=paper.max_number()).contains(&number);
        ok.then_some(Self { year, paper, number })
    }

    pub fn year(&self) -> u32 {
        self.year
    }

    pub fn paper(&self) -> Paper {
        self.paper
    }

    pub fn number(&self) -> u32 {
        self.number
    }
}

#[derive(Deserialize)]
struct RawAddress {
    year:   u32,
    paper:  String,
    number: u32,
}

impl TryFrom<RawAddress> for QuestionAddress {
    type Error = String;

    fn try_from(raw: RawAddress) -> Result<Self, Self::Error> {
        Paper::parse(&raw.paper)
            .and_then(|paper| QuestionAddress::new(raw.year, paper, raw.number))
            .ok_or_else(|| format!("invalid address {}/{}/{}", raw.year, raw.paper, raw.number))
    }
}

/// Locator bound to one address namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionLocator {
    namespace: String,
}

impl QuestionLocator {
    pub fn new(namespace: impl Into<String>) -> Self {
        let namespace = namespace.into().trim_matches('/').to_string();
        Self { namespace }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Validate a raw triple. `paper` may be absent.
    pub fn is_valid(year: i64, paper: Option<&str>, number: i64) -> bool {
        Self::resolve(year, paper, number).is_some()
    }

    fn resolve(year: i64, paper: Option<&str>, number: i64) -> Option<QuestionAddress> {
        let paper = Paper::parse(paper?)?;
        let year = u32::try_from(year).ok()?;
        let number = u32::try_from(number).ok()?;
        QuestionAddress::new(year, paper, number)
    }

    /// Canonical address for a raw triple. Never clamps: out-of-domain
    /// input is an `InvalidAddress` error.
    pub fn to_address(&self, year: i64, paper: Option<&str>, number: i64) -> QuizResult<String> {
        match Self::resolve(year, paper, number) {
            Some(addr) => Ok(self.address_of(&addr)),
            None => {
                log::debug!("locator: rejected year={year} paper={paper:?} number={number}");
                Err(QuizError::InvalidAddress {
                    year,
                    paper: paper.unwrap_or_default().to_string(),
                    number,
                })
            }
        }
    }

    /// Canonical address for an already validated triple.
    pub fn address_of(&self, addr: &QuestionAddress) -> String {
        format!("/{}/{}/{}/{}", self.namespace, addr.year, addr.paper, addr.number)
    }

    /// Parse an address of the exact shape `/<ns>/DDDD/(I|II)/D+`.
    /// Syntactically valid addresses outside the domain parse to `None`.
    pub fn from_address(&self, address: &str) -> Option<QuestionAddress> {
        let rest = address
            .strip_prefix('/')?
            .strip_prefix(self.namespace.as_str())?
            .strip_prefix('/')?;

        let mut segments = rest.split('/');
        let (year, paper, number) = (segments.next()?, segments.next()?, segments.next()?);
        if segments.next().is_some() {
            return None;
        }

        if year.len() != 4 || !all_digits(year) || !all_digits(number) {
            return None;
        }
        let paper = match paper {
            "I"  => Paper::I,
            "II" => Paper::II,
            _    => return None,
        };

        QuestionAddress::new(year.parse().ok()?, paper, number.parse().ok()?)
    }

    /// All valid years, ascending.
    pub fn valid_years() -> Vec<u32> {
        (MIN_YEAR..=MAX_YEAR).collect()
    }

    /// All valid question numbers on `paper`, ascending.
    pub fn valid_numbers(paper: Paper) -> Vec<u32> {
        (1..=paper.max_number()).collect()
    }

    /// Every valid triple, ordered by year, paper, number.
    pub fn all_triples() -> Vec<QuestionAddress> {
        let mut out = Vec::new();
        for year in Self::valid_years() {
            for paper in Paper::ALL {
                for number in Self::valid_numbers(paper) {
                    out.push(QuestionAddress { year, paper, number });
                }
            }
        }
        out
    }

    /// Every valid canonical address (prerendering, exhaustive tests).
    pub fn all_addresses(&self) -> Vec<String> {
        Self::all_triples().iter().map(|a| self.address_of(a)).collect()
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
