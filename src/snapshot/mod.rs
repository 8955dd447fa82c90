//! Flat CSV snapshot of final ratings, reloadable without replaying the log

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::config::canonicalize_venue;
use crate::domain::{Mode, PlayerRating, Venue};
use crate::matchups::{DoublesEntry, SinglesEntry};
use crate::rating::{Glicko2Rating, RatingState, TrueSkillRating};

const VENUE_SEPARATOR: &str = "|";

#[derive(Debug, Serialize, Deserialize)]
struct SinglesSnapshotRow {
    username: String,
    mu: f64,
    phi: f64,
    sigma: f64,
    history: String,
    venues: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct DoublesSnapshotRow {
    username: String,
    mu: f64,
    sigma: f64,
    history: String,
    venues: String,
}

/// One player's current rating in one mode, as stored on disk
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub username: String,
    pub rating: RatingState,
    pub mu_history: Vec<f64>,
    pub venues: BTreeSet<Venue>,
}

impl PlayerSnapshot {
    pub fn from_player(player: &PlayerRating, mode: Mode) -> Self {
        let rating = match mode {
            Mode::Singles => RatingState::from(player.rating_singles()),
            Mode::Doubles => RatingState::from(player.rating_doubles()),
        };
        Self {
            username: player.username.clone(),
            rating,
            mu_history: player.mu_history(mode),
            venues: player.stats(mode).venue_appearances.keys().copied().collect(),
        }
    }

    pub fn singles_entry(&self) -> Option<SinglesEntry> {
        match self.rating {
            RatingState::Pairwise(rating) => Some(SinglesEntry {
                username: self.username.clone(),
                rating,
            }),
            RatingState::Team(_) => None,
        }
    }

    pub fn doubles_entry(&self) -> Option<DoublesEntry> {
        match self.rating {
            RatingState::Team(rating) => Some(DoublesEntry {
                username: self.username.clone(),
                rating,
            }),
            RatingState::Pairwise(_) => None,
        }
    }
}

/// Writes `players` in the order given, one row each
pub fn save_snapshot<'a, I>(players: I, mode: Mode, path: &Path) -> Result<()>
where
    I: IntoIterator<Item = &'a PlayerRating>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let written = write_snapshot(players, mode, file)?;
    info!("  → Saved {} {} ratings to {}", written, mode, path.display());
    Ok(())
}

pub fn write_snapshot<'a, I, W>(players: I, mode: Mode, writer: W) -> Result<usize>
where
    I: IntoIterator<Item = &'a PlayerRating>,
    W: Write,
{
    let mut writer = csv::Writer::from_writer(writer);
    let mut written = 0;

    for player in players {
        let snapshot = PlayerSnapshot::from_player(player, mode);
        let history = format_history(&snapshot.mu_history);
        let venues = format_venues(&snapshot.venues);

        let result = match snapshot.rating {
            RatingState::Pairwise(r) => writer.serialize(SinglesSnapshotRow {
                username: snapshot.username,
                mu: r.mu,
                phi: r.phi,
                sigma: r.sigma,
                history,
                venues,
            }),
            RatingState::Team(r) => writer.serialize(DoublesSnapshotRow {
                username: snapshot.username,
                mu: r.mu,
                sigma: r.sigma,
                history,
                venues,
            }),
        };
        result.with_context(|| format!("Failed to write snapshot row for {}", player.username))?;
        written += 1;
    }

    writer.flush().context("Failed to flush snapshot")?;
    Ok(written)
}

pub fn load_snapshot(path: &Path, mode: Mode) -> Result<BTreeMap<String, PlayerSnapshot>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let players =
        read_snapshot(file, mode).with_context(|| format!("Failed to load {}", path.display()))?;
    info!("  → Loaded {} {} ratings from {}", players.len(), mode, path.display());
    Ok(players)
}

pub fn read_snapshot<R: Read>(reader: R, mode: Mode) -> Result<BTreeMap<String, PlayerSnapshot>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut players = BTreeMap::new();

    match mode {
        Mode::Singles => {
            for row in reader.deserialize::<SinglesSnapshotRow>() {
                let row = row.context("Failed to parse singles snapshot row")?;
                let rating = Glicko2Rating::new(row.mu, row.phi, row.sigma);
                let snapshot =
                    build_snapshot(row.username, rating.into(), &row.history, &row.venues)?;
                players.insert(snapshot.username.clone(), snapshot);
            }
        }
        Mode::Doubles => {
            for row in reader.deserialize::<DoublesSnapshotRow>() {
                let row = row.context("Failed to parse doubles snapshot row")?;
                let rating = TrueSkillRating::new(row.mu, row.sigma);
                let snapshot =
                    build_snapshot(row.username, rating.into(), &row.history, &row.venues)?;
                players.insert(snapshot.username.clone(), snapshot);
            }
        }
    }

    Ok(players)
}

fn build_snapshot(
    username: String,
    rating: RatingState,
    history: &str,
    venues: &str,
) -> Result<PlayerSnapshot> {
    let mu_history =
        parse_history(history).with_context(|| format!("Bad history for {}", username))?;
    let venues = parse_venues(venues).with_context(|| format!("Bad venues for {}", username))?;
    Ok(PlayerSnapshot {
        username,
        rating,
        mu_history,
        venues,
    })
}

/// `Display` for f64 is the shortest string that parses back to the same value
fn format_history(history: &[f64]) -> String {
    history.iter().map(f64::to_string).collect::<Vec<_>>().join(" ")
}

fn parse_history(raw: &str) -> Result<Vec<f64>> {
    raw.split_whitespace()
        .map(|v| v.parse::<f64>().with_context(|| format!("invalid mu sample '{}'", v)))
        .collect()
}

fn format_venues(venues: &BTreeSet<Venue>) -> String {
    venues.iter().map(Venue::name).collect::<Vec<_>>().join(VENUE_SEPARATOR)
}

fn parse_venues(raw: &str) -> Result<BTreeSet<Venue>> {
    raw.split(VENUE_SEPARATOR)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| canonicalize_venue(v).ok_or_else(|| anyhow!("unknown venue '{}'", v)))
        .collect()
}
