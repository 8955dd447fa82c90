use std::fmt;

use thiserror::Error;

/// Where a rejected match record came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordContext {
    pub line: usize,
    pub summary: String,
}

impl RecordContext {
    pub fn new(line: usize, summary: impl Into<String>) -> Self {
        Self {
            line,
            summary: summary.into(),
        }
    }
}

impl fmt::Display for RecordContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} [{}]", self.line, self.summary)
    }
}

/// A single match record was rejected. Already-applied state is untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("{context}: malformed score '{raw}', expected 'W-L'")]
    MalformedScore { context: RecordContext, raw: String },

    #[error("{context}: winner score {winner} is lower than loser score {loser}")]
    InvertedScore {
        context: RecordContext,
        winner: u32,
        loser: u32,
    },

    #[error("{context}: score 0-0 records no games")]
    EmptyScore { context: RecordContext },

    #[error("{context}: unknown venue '{raw}'")]
    UnknownVenue { context: RecordContext, raw: String },

    #[error("{context}: username '{name}' is shorter than {min_len} characters")]
    NameTooShort {
        context: RecordContext,
        name: String,
        min_len: usize,
    },

    #[error("{context}: player '{name}' appears more than once")]
    DuplicateParticipant { context: RecordContext, name: String },

    #[error("{context}: invalid date '{raw}'")]
    InvalidDate { context: RecordContext, raw: String },
}

/// A numeric argument fell outside the valid domain of a model or formula.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("{model}: {parameter} must be positive and finite, got {value}")]
    NonPositive {
        model: &'static str,
        parameter: &'static str,
        value: f64,
    },

    #[error("{model}: {parameter} must be finite, got {value}")]
    NonFinite {
        model: &'static str,
        parameter: &'static str,
        value: f64,
    },

    #[error("{function}: probability must lie in [0, 1], got {value}")]
    ProbabilityOutOfRange { function: &'static str, value: f64 },

    #[error("{function}: k must satisfy 0 <= k <= {n}, got k = {k}")]
    KOutOfRange { function: &'static str, k: u32, n: u32 },

    #[error("{function}: n must be at least 1, got {n}")]
    EmptyTrials { function: &'static str, n: u32 },

    #[error("volatility iteration did not converge after {iterations} steps")]
    VolatilityDiverged { iterations: usize },
}

/// The matchup enumeration lost or double counted candidates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "{search}: {evaluated} evaluated + {skipped} skipped != {expected} possible matchups"
)]
pub struct ConsistencyError {
    pub search: &'static str,
    pub evaluated: u64,
    pub skipped: u64,
    pub expected: u64,
}

/// Anything that can stop a single record from being rated
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RatingError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("{context}: {source}")]
    Domain {
        context: RecordContext,
        #[source]
        source: DomainError,
    },
}

/// Add context to fetch errors
pub fn fetch_context(url: &str) -> String {
    format!("Failed to fetch from: {}", url)
}

/// Add context to parse errors
pub fn parse_context(data_type: &str) -> String {
    format!("Failed to parse {}", data_type)
}

/// Add context to cache errors
pub fn cache_context(operation: &str, key: &str) -> String {
    format!("Failed to {} cache for key: {}", operation, key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_names_the_record() {
        let err = InputError::InvertedScore {
            context: RecordContext::new(7, "2023-02-01 alice,bob 1-3"),
            winner: 1,
            loser: 3,
        };
        let message = err.to_string();
        assert!(message.contains("line 7"));
        assert!(message.contains("winner score 1"));
    }

    #[test]
    fn test_consistency_error_reports_counts() {
        let err = ConsistencyError {
            search: "doubles",
            evaluated: 40,
            skipped: 3,
            expected: 45,
        };
        assert_eq!(
            err.to_string(),
            "doubles: 40 evaluated + 3 skipped != 45 possible matchups"
        );
    }
}
