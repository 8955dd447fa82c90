use std::fmt;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::errors::RecordContext;

/// Singles (one-on-one, Glicko-2) or doubles (two-on-two, TrueSkill)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Singles,
    Doubles,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Singles => "singles",
            Mode::Doubles => "doubles",
        }
    }

    pub fn participant_count(&self) -> usize {
        match self {
            Mode::Singles => 2,
            Mode::Doubles => 4,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical venue. Raw location strings are folded in `config::venues`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Venue {
    PongDetroit,
    VietDetroit,
    Mtta,
    Norms,
    NewWay,
}

impl Venue {
    pub const ALL: [Venue; 5] = [
        Venue::PongDetroit,
        Venue::VietDetroit,
        Venue::Mtta,
        Venue::Norms,
        Venue::NewWay,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Venue::PongDetroit => "Pong Detroit",
            Venue::VietDetroit => "Viet Detroit",
            Venue::Mtta => "MTTA",
            Venue::Norms => "Norm's",
            Venue::NewWay => "New Way",
        }
    }

    /// Short label used in ranking tables
    pub fn abbrev(&self) -> &'static str {
        match self {
            Venue::PongDetroit => "Pong Det",
            Venue::VietDetroit => "Viet",
            Venue::Mtta => "MTTA",
            Venue::Norms => "Norm's",
            Venue::NewWay => "New way",
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Games won by each side, winner first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub winner_games: u32,
    pub loser_games: u32,
}

impl Score {
    pub fn new(winner_games: u32, loser_games: u32) -> Self {
        Self {
            winner_games,
            loser_games,
        }
    }

    /// Net margin of victory; zero for an inverted score
    pub fn margin(&self) -> u32 {
        self.winner_games.saturating_sub(self.loser_games)
    }

    pub fn total_games(&self) -> u32 {
        self.winner_games + self.loser_games
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.winner_games, self.loser_games)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Participants {
    Singles {
        winner: String,
        loser: String,
    },
    Doubles {
        winners: [String; 2],
        losers: [String; 2],
    },
}

impl Participants {
    pub fn mode(&self) -> Mode {
        match self {
            Participants::Singles { .. } => Mode::Singles,
            Participants::Doubles { .. } => Mode::Doubles,
        }
    }

    /// Winners first, then losers
    pub fn names(&self) -> Vec<&str> {
        match self {
            Participants::Singles { winner, loser } => vec![winner.as_str(), loser.as_str()],
            Participants::Doubles { winners, losers } => winners
                .iter()
                .chain(losers.iter())
                .map(String::as_str)
                .collect(),
        }
    }
}

/// One row of the match log, parsed. Consumed once by the rating engine.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub context: RecordContext,
    pub date: NaiveDate,
    pub participants: Participants,
    pub score: Score,
    pub venue: Venue,
}

impl MatchRecord {
    pub fn mode(&self) -> Mode {
        self.participants.mode()
    }
}
