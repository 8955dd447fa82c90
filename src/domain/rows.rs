use std::io::Read;

use anyhow::{Context, Result};
use csv::StringRecord;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::config::canonicalize_venue;
use crate::domain::parsers::{normalize_username, parse_date, FieldParser};
use crate::domain::{MatchRecord, Participants};
use crate::errors::{parse_context, InputError, RecordContext};

/// A raw log row that can be turned into a `MatchRecord`
pub trait MatchRow {
    fn line(&self) -> usize;
    fn set_line(&mut self, line: usize);
    fn summary(&self) -> String;
    fn to_record(&self, parser: &FieldParser) -> Result<MatchRecord, InputError>;

    fn context(&self) -> RecordContext {
        RecordContext::new(self.line(), self.summary())
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SinglesRow {
    #[serde(skip)]
    pub line: usize,
    pub date: String,
    pub winner: String,
    pub loser: String,
    pub score: String,
    pub venue: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct DoublesRow {
    #[serde(skip)]
    pub line: usize,
    pub date: String,
    pub winner1: String,
    pub winner2: String,
    pub loser1: String,
    pub loser2: String,
    pub score: String,
    pub venue: String,
}

impl MatchRow for SinglesRow {
    fn line(&self) -> usize {
        self.line
    }

    fn set_line(&mut self, line: usize) {
        self.line = line;
    }

    fn summary(&self) -> String {
        format!("{} {} d. {} {} @ {}", self.date, self.winner, self.loser, self.score, self.venue)
    }

    fn to_record(&self, parser: &FieldParser) -> Result<MatchRecord, InputError> {
        let context = self.context();
        let participants = Participants::Singles {
            winner: normalize_username(&self.winner),
            loser: normalize_username(&self.loser),
        };
        build_record(parser, context, &self.date, &self.score, &self.venue, participants)
    }
}

impl MatchRow for DoublesRow {
    fn line(&self) -> usize {
        self.line
    }

    fn set_line(&mut self, line: usize) {
        self.line = line;
    }

    fn summary(&self) -> String {
        format!(
            "{} {} & {} d. {} & {} {} @ {}",
            self.date, self.winner1, self.winner2, self.loser1, self.loser2, self.score, self.venue
        )
    }

    fn to_record(&self, parser: &FieldParser) -> Result<MatchRecord, InputError> {
        let context = self.context();
        let participants = Participants::Doubles {
            winners: [normalize_username(&self.winner1), normalize_username(&self.winner2)],
            losers: [normalize_username(&self.loser1), normalize_username(&self.loser2)],
        };
        build_record(parser, context, &self.date, &self.score, &self.venue, participants)
    }
}

fn build_record(
    parser: &FieldParser,
    context: RecordContext,
    raw_date: &str,
    raw_score: &str,
    raw_venue: &str,
    participants: Participants,
) -> Result<MatchRecord, InputError> {
    let date = parse_date(raw_date, &context)?;
    let score = parser.parse_score(raw_score, &context)?;
    let venue = canonicalize_venue(raw_venue).ok_or_else(|| InputError::UnknownVenue {
        context: context.clone(),
        raw: raw_venue.to_string(),
    })?;

    Ok(MatchRecord {
        context,
        date,
        participants,
        score,
        venue,
    })
}

pub fn read_singles_rows<R: Read>(input: R) -> Result<Vec<SinglesRow>> {
    read_rows(input, "singles match log")
}

pub fn read_doubles_rows<R: Read>(input: R) -> Result<Vec<DoublesRow>> {
    read_rows(input, "doubles match log")
}

/// Reads every non-blank row. Headers are matched after trimming and lowercasing.
fn read_rows<R, T>(input: R, data_type: &str) -> Result<Vec<T>>
where
    R: Read,
    T: DeserializeOwned + MatchRow,
{
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let raw_headers = reader
        .headers()
        .with_context(|| format!("Failed to read {} headers", data_type))?;
    let headers = normalize_headers(raw_headers);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.with_context(|| parse_context(data_type))?;
        if is_blank(&record) {
            continue;
        }

        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        let mut row: T = record
            .deserialize(Some(&headers))
            .with_context(|| format!("Failed to parse {} at line {}", data_type, line))?;
        row.set_line(line);
        rows.push(row);
    }

    Ok(rows)
}

fn normalize_headers(headers: &StringRecord) -> StringRecord {
    headers
        .iter()
        .map(|h| h.trim().to_lowercase().replace(' ', ""))
        .collect()
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|field| field.trim().is_empty())
}
