//! Academic term types for fee periods.
//!
//! An invoice belongs to one (class, academic year, term) scope; balance
//! carry-forward moves unpaid amounts from one scope to another.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::id::{AcademicYearId, ClassId};

/// A school term within an academic year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Term {
    /// First term.
    First,
    /// Second term.
    Second,
    /// Third term.
    Third,
}

impl Term {
    /// Returns the string representation of the term.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Second => "second",
            Self::Third => "third",
        }
    }

    /// Parses a term from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "first" => Some(Self::First),
            "second" => Some(Self::Second),
            "third" => Some(Self::Third),
            _ => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The (class, academic year, term) scope a fee obligation belongs to.
///
/// Carry-forward consumes a source scope and produces items in a
/// destination scope. The core never interprets the class or year IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TermScope {
    /// The class the student is enrolled in.
    pub class_id: ClassId,
    /// The academic year.
    pub academic_year_id: AcademicYearId,
    /// The term within the academic year.
    pub term: Term,
}

impl TermScope {
    /// Creates a new term scope.
    #[must_use]
    pub const fn new(class_id: ClassId, academic_year_id: AcademicYearId, term: Term) -> Self {
        Self {
            class_id,
            academic_year_id,
            term,
        }
    }
}
