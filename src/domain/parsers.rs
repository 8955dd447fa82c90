use anyhow::{Context, Result};
use chrono::NaiveDate;
use regex::Regex;

use crate::domain::Score;
use crate::errors::{InputError, RecordContext};

const SCORE_PATTERN: &str = r"^\s*(\d{1,3})\s*-\s*(\d{1,3})\s*$";
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Parses the free-text fields of a match row
pub struct FieldParser {
    score_regex: Regex,
}

impl FieldParser {
    pub fn new() -> Result<Self> {
        let score_regex = Regex::new(SCORE_PATTERN).context("Failed to compile score regex")?;
        Ok(Self { score_regex })
    }

    /// Parses "W-L". Order is preserved; an inverted score is rejected later by validation.
    pub fn parse_score(&self, raw: &str, context: &RecordContext) -> Result<Score, InputError> {
        let malformed = || InputError::MalformedScore {
            context: context.clone(),
            raw: raw.to_string(),
        };

        let captures = self.score_regex.captures(raw).ok_or_else(malformed)?;
        let winner = captures[1].parse::<u32>().map_err(|_| malformed())?;
        let loser = captures[2].parse::<u32>().map_err(|_| malformed())?;

        Ok(Score::new(winner, loser))
    }
}

pub fn parse_date(raw: &str, context: &RecordContext) -> Result<NaiveDate, InputError> {
    let trimmed = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| InputError::InvalidDate {
            context: context.clone(),
            raw: raw.to_string(),
        })
}

pub fn normalize_username(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RecordContext {
        RecordContext::new(2, "test")
    }

    #[test]
    fn test_parse_score() {
        let parser = FieldParser::new().unwrap();
        assert_eq!(parser.parse_score("3-2", &ctx()).unwrap(), Score::new(3, 2));
        assert_eq!(parser.parse_score(" 2 - 0 ", &ctx()).unwrap(), Score::new(2, 0));
        // inverted scores parse; validation owns that rule
        assert_eq!(parser.parse_score("1-3", &ctx()).unwrap(), Score::new(1, 3));
    }

    #[test]
    fn test_parse_score_rejects_garbage() {
        let parser = FieldParser::new().unwrap();
        for raw in ["3:2", "3-", "-2", "three-two", "3-2-1", ""] {
            let err = parser.parse_score(raw, &ctx()).unwrap_err();
            assert!(matches!(err, InputError::MalformedScore { .. }), "{raw}");
        }
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 1, 25).unwrap();
        assert_eq!(parse_date("2023-01-25", &ctx()).unwrap(), expected);
        assert_eq!(parse_date("1/25/2023", &ctx()).unwrap(), expected);
        assert!(parse_date("25th of January", &ctx()).is_err());
    }

    #[test]
    fn test_normalize_username() {
        assert_eq!(normalize_username("  Shane "), "shane");
    }
}
