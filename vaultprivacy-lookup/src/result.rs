use crate::error::LookupError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Privacy grade assigned by ToS;DR. Anything outside `A`..`E` is `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
    Unknown,
}

impl Grade {
    /// All grades in report order.
    pub const ALL: [Grade; 6] = [
        Grade::A,
        Grade::B,
        Grade::C,
        Grade::D,
        Grade::E,
        Grade::Unknown,
    ];

    pub fn from_letter(letter: &str) -> Self {
        match letter {
            "A" => Grade::A,
            "B" => Grade::B,
            "C" => Grade::C,
            "D" => Grade::D,
            "E" => Grade::E,
            _ => Grade::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::E => "E",
            Grade::Unknown => "Unknown",
        }
    }

    /// Sort rank: A < B < C < D < E < Unknown.
    pub fn rank(&self) -> usize {
        *self as usize
    }

    pub fn is_known(&self) -> bool {
        *self != Grade::Unknown
    }

    pub fn is_risky(&self) -> bool {
        matches!(self, Grade::D | Grade::E)
    }
}

impl From<String> for Grade {
    fn from(value: String) -> Self {
        Grade::from_letter(&value)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rating for one normalized domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingRecord {
    pub domain: String,
    pub grade: Grade,
    pub service_id: Option<i64>,
    pub name: String,
}

impl RatingRecord {
    /// The record used whenever a lookup fails or finds no candidate.
    pub fn unknown(domain: &str) -> Self {
        Self {
            domain: domain.to_string(),
            grade: Grade::Unknown,
            service_id: None,
            name: domain.to_string(),
        }
    }

    pub fn status(&self) -> &'static str {
        if self.grade.is_known() {
            "Found"
        } else {
            "Unknown"
        }
    }
}

/// Result of querying the search endpoint, before it is folded into a record.
#[derive(Debug)]
pub enum LookupOutcome {
    Found(RatingRecord),
    NoMatch,
    Failed(LookupError),
}

impl LookupOutcome {
    pub fn into_record(self, domain: &str) -> RatingRecord {
        match self {
            LookupOutcome::Found(record) => record,
            LookupOutcome::NoMatch | LookupOutcome::Failed(_) => RatingRecord::unknown(domain),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_from_letter_rejects_lowercase_and_garbage() {
        assert_eq!(Grade::from_letter("C"), Grade::C);
        assert_eq!(Grade::from_letter("c"), Grade::Unknown);
        assert_eq!(Grade::from_letter("F"), Grade::Unknown);
        assert_eq!(Grade::from_letter(""), Grade::Unknown);
    }

    #[test]
    fn test_grade_rank_orders_unknown_last() {
        let mut grades = vec![Grade::Unknown, Grade::E, Grade::A, Grade::C];
        grades.sort_by_key(Grade::rank);
        assert_eq!(grades, vec![Grade::A, Grade::C, Grade::E, Grade::Unknown]);
    }

    #[test]
    fn test_grade_deserializes_invalid_letter_as_unknown() {
        let grade: Grade = serde_json::from_str("\"Z\"").unwrap();
        assert_eq!(grade, Grade::Unknown);
        let grade: Grade = serde_json::from_str("\"Unknown\"").unwrap();
        assert_eq!(grade, Grade::Unknown);
        assert_eq!(serde_json::to_string(&Grade::B).unwrap(), "\"B\"");
    }

    #[test]
    fn test_failed_outcome_folds_to_unknown_record() {
        let record = LookupOutcome::Failed(LookupError::Status(503)).into_record("test.org");
        assert_eq!(record, RatingRecord::unknown("test.org"));
        assert_eq!(record.status(), "Unknown");
        assert_eq!(record.name, "test.org");
    }
}
