use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};

use crate::config::settings::AppConfig;
use crate::domain::parsers::normalize_username;
use crate::domain::Mode;
use crate::matchups::{
    doubles_detail, search_doubles_matchups, search_singles_matchups, singles_detail, DoublesEntry,
    MatchupDetail, MatchupReport, SinglesEntry, Thresholds,
};
use crate::output::{render_detail, render_matchups};
use crate::probability::{PointProbabilityTable, POINTS_PER_GAME};
use crate::rating::{Glicko2, TrueSkill};
use crate::snapshot::{load_snapshot, PlayerSnapshot};

/// Matchup search and odds over already-rated players. Never touches ratings.
pub struct MatchupService<'a> {
    config: &'a AppConfig,
    glicko: Glicko2,
    trueskill: TrueSkill,
}

impl<'a> MatchupService<'a> {
    pub fn new(config: &'a AppConfig) -> Self {
        Self {
            config,
            glicko: Glicko2::new(&config.singles),
            trueskill: TrueSkill::new(&config.doubles),
        }
    }

    /// `pong matchups`: reads the snapshot, ranks the roster, and details the named pairing
    pub fn run(&self, mode: Mode, names: &[String]) -> Result<()> {
        let path = self.config.paths.ratings_csv(mode);
        let snapshot =
            load_snapshot(&path, mode).context("Run `pong rank` first to write the snapshot")?;

        let roster = self.select_roster(&snapshot, names)?;
        self.print_search(mode, &roster)?;

        if names.len() == mode.participant_count() {
            let detail = self.detail(mode, &roster)?;
            print!("{}", render_detail(&detail));
        }
        Ok(())
    }

    pub fn print_search(&self, mode: Mode, roster: &[PlayerSnapshot]) -> Result<()> {
        let report = self.search(mode, roster)?;
        print!("{}", render_matchups(&report, mode));
        Ok(())
    }

    pub fn search(&self, mode: Mode, roster: &[PlayerSnapshot]) -> Result<MatchupReport> {
        let settings = &self.config.matchups;
        let report = match mode {
            Mode::Singles => search_singles_matchups(
                &self.glicko,
                &singles_entries(roster)?,
                settings.top_n,
                settings.singles_sort,
            )?,
            Mode::Doubles => search_doubles_matchups(
                &self.trueskill,
                &doubles_entries(roster)?,
                Thresholds::from_settings(settings),
                settings.top_n,
                settings.doubles_sort,
            )?,
        };
        Ok(report)
    }

    /// Singles: first player against the second. Doubles: first two against the last two.
    pub fn detail(&self, mode: Mode, players: &[PlayerSnapshot]) -> Result<MatchupDetail> {
        if players.len() != mode.participant_count() {
            bail!(
                "{} detail needs exactly {} players, got {}",
                mode,
                mode.participant_count(),
                players.len()
            );
        }

        let table = PointProbabilityTable::new(POINTS_PER_GAME)?;
        let detail = match mode {
            Mode::Singles => {
                let entries = singles_entries(players)?;
                singles_detail(&self.glicko, &table, &entries[0], &entries[1])?
            }
            Mode::Doubles => {
                let entries = doubles_entries(players)?;
                doubles_detail(
                    &self.trueskill,
                    &table,
                    &[entries[0].clone(), entries[1].clone()],
                    &[entries[2].clone(), entries[3].clone()],
                )?
            }
        };
        Ok(detail)
    }

    /// Named players in the order given; otherwise everyone, narrowed by `PLAYERS`
    fn select_roster(
        &self,
        snapshot: &BTreeMap<String, PlayerSnapshot>,
        names: &[String],
    ) -> Result<Vec<PlayerSnapshot>> {
        if names.is_empty() {
            let present = &self.config.players_present;
            return Ok(snapshot
                .values()
                .filter(|p| present.is_empty() || present.contains(&p.username))
                .cloned()
                .collect());
        }

        names
            .iter()
            .map(|name| {
                snapshot
                    .get(&normalize_username(name))
                    .cloned()
                    .with_context(|| format!("Player '{}' is not in the snapshot", name))
            })
            .collect()
    }
}

fn singles_entries(roster: &[PlayerSnapshot]) -> Result<Vec<SinglesEntry>> {
    roster
        .iter()
        .map(|p| {
            p.singles_entry()
                .with_context(|| format!("{} has no singles rating", p.username))
        })
        .collect()
}

fn doubles_entries(roster: &[PlayerSnapshot]) -> Result<Vec<DoublesEntry>> {
    roster
        .iter()
        .map(|p| {
            p.doubles_entry()
                .with_context(|| format!("{} has no doubles rating", p.username))
        })
        .collect()
}
