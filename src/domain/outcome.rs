//! Build outcomes and the worse-of fold used for status aggregation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Result of a finished run, ordered by severity.
///
/// The derived `Ord` follows declaration order, so `Success` is the least
/// severe and `Aborted` the most.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Unstable,
    Failure,
    Aborted,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Unstable => "unstable",
            Outcome::Failure => "failure",
            Outcome::Aborted => "aborted",
        }
    }

    /// The more severe of two outcomes.
    pub fn worse(self, other: Outcome) -> Outcome {
        self.max(other)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "success" => Ok(Outcome::Success),
            "unstable" => Ok(Outcome::Unstable),
            "failure" => Ok(Outcome::Failure),
            "aborted" => Ok(Outcome::Aborted),
            other => Err(format!("unknown outcome: {other}")),
        }
    }
}

/// Worse-of over optional outcomes; `None` means "no opinion" and is the
/// identity element, so the fold is associative and commutative.
pub fn worse_of(a: Option<Outcome>, b: Option<Outcome>) -> Option<Outcome> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.worse(y)),
        (Some(x), None) | (None, Some(x)) => Some(x),
        (None, None) => None,
    }
}
