use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;
use log::{info, warn};

use super::glicko2::Glicko2;
use super::trueskill::TrueSkill;
use super::types::{Glicko2Rating, RatingModel, Team, TrueSkillRating};
use crate::config::settings::{AppConfig, EngineSettings};
use crate::domain::games_expansion::count_total_games;
use crate::domain::parsers::FieldParser;
use crate::domain::rows::MatchRow;
use crate::domain::{
    expand_score_to_games, GameOrder, GameStep, MatchRecord, Mode, Participants, PlayerRating,
    Venue,
};
use crate::errors::{DomainError, InputError, RatingError};

/// What to do when a record is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Log it, keep it in `ProcessedLog::rejected`, carry on with the next record
    #[default]
    SkipRecord,
    /// Stop at the first rejected record
    Abort,
}

/// Result of folding a match log into ratings
#[derive(Debug, Clone, Default)]
pub struct ProcessedLog {
    pub players: BTreeMap<String, PlayerRating>,
    pub matches: Vec<MatchRecord>,
    pub venues: BTreeSet<Venue>,
    pub rejected: Vec<RatingError>,
}

impl ProcessedLog {
    /// Players who played `mode`, strongest mean first, ties by username
    pub fn sorted_players(&self, mode: Mode) -> Vec<&PlayerRating> {
        let mut players: Vec<&PlayerRating> =
            self.players.values().filter(|p| p.has_played(mode)).collect();
        players.sort_by(|a, b| {
            b.mu(mode)
                .total_cmp(&a.mu(mode))
                .then_with(|| a.username.cmp(&b.username))
        });
        players
    }
}

/// One game's effect: both sides before and after, oriented winner-of-match first
struct StepResult<S> {
    step: GameStep,
    before: (S, S),
    after: (S, S),
}

/// Everything one participant gains from a record, held back until the record is fully rated
struct PendingPlayer<R> {
    username: String,
    snapshots: Vec<R>,
    on_win: Vec<f64>,
    on_loss: Vec<f64>,
    partners: Vec<f64>,
}

impl<R> PendingPlayer<R> {
    fn new(username: &str) -> Self {
        Self {
            username: username.to_string(),
            snapshots: Vec::new(),
            on_win: Vec::new(),
            on_loss: Vec::new(),
            partners: Vec::new(),
        }
    }
}

/// Replays match records into per-player rating histories.
///
/// Each record goes VALIDATE -> ALTERNATE-APPLY -> FINALIZE. Nothing is written
/// to a player until every game of the record has been rated, so a rejected
/// record leaves earlier state untouched.
pub struct RatingEngine {
    glicko: Glicko2,
    trueskill: TrueSkill,
    game_order: GameOrder,
    min_username_len: usize,
    parser: FieldParser,
    log: ProcessedLog,
}

impl RatingEngine {
    pub fn new(config: &AppConfig) -> Result<Self> {
        Self::with_models(
            Glicko2::new(&config.singles),
            TrueSkill::new(&config.doubles),
            &config.engine,
        )
    }

    pub fn with_models(
        glicko: Glicko2,
        trueskill: TrueSkill,
        settings: &EngineSettings,
    ) -> Result<Self> {
        Ok(Self {
            glicko,
            trueskill,
            game_order: settings.game_order,
            min_username_len: settings.min_username_len,
            parser: FieldParser::new()?,
            log: ProcessedLog::default(),
        })
    }

    pub fn players(&self) -> &BTreeMap<String, PlayerRating> {
        &self.log.players
    }

    pub fn into_log(self) -> ProcessedLog {
        self.log
    }

    /// Parses and applies every row in order
    pub fn process_rows<R: MatchRow>(
        &mut self,
        rows: &[R],
        policy: FailurePolicy,
    ) -> Result<(), RatingError> {
        let applied_before = self.log.matches.len();
        let rejected_before = self.log.rejected.len();

        for row in rows {
            let outcome = row
                .to_record(&self.parser)
                .map_err(RatingError::from)
                .and_then(|record| self.apply(record));

            if let Err(e) = outcome {
                match policy {
                    FailurePolicy::Abort => return Err(e),
                    FailurePolicy::SkipRecord => {
                        warn!("Skipping record: {}", e);
                        self.log.rejected.push(e);
                    }
                }
            }
        }

        let applied = &self.log.matches[applied_before..];
        let scores: Vec<_> = applied.iter().map(|m| m.score).collect();
        info!(
            "  → Rated {} matches ({} games), rejected {}",
            applied.len(),
            count_total_games(&scores),
            self.log.rejected.len() - rejected_before
        );
        Ok(())
    }

    /// Applies one record. On error the engine state is exactly as before the call.
    pub fn apply(&mut self, record: MatchRecord) -> Result<(), RatingError> {
        self.validate(&record)?;
        let steps = expand_score_to_games(record.score, self.game_order);

        let domain_error = |source: DomainError| RatingError::Domain {
            context: record.context.clone(),
            source,
        };

        match &record.participants {
            Participants::Singles { winner, loser } => {
                let pending = self.replay_singles(winner, loser, &steps).map_err(domain_error)?;
                self.commit_singles(pending, record.venue);
            }
            Participants::Doubles { winners, losers } => {
                let pending = self.replay_doubles(winners, losers, &steps).map_err(domain_error)?;
                self.commit_doubles(pending, record.venue);
            }
        }

        self.log.venues.insert(record.venue);
        self.log.matches.push(record);
        Ok(())
    }

    fn validate(&self, record: &MatchRecord) -> Result<(), InputError> {
        let context = &record.context;
        let score = record.score;

        if score.winner_games < score.loser_games {
            return Err(InputError::InvertedScore {
                context: context.clone(),
                winner: score.winner_games,
                loser: score.loser_games,
            });
        }
        if score.total_games() == 0 {
            return Err(InputError::EmptyScore { context: context.clone() });
        }

        let names = record.participants.names();
        let mut seen = BTreeSet::new();
        for name in names {
            if name.chars().count() < self.min_username_len {
                return Err(InputError::NameTooShort {
                    context: context.clone(),
                    name: name.to_string(),
                    min_len: self.min_username_len,
                });
            }
            if !seen.insert(name) {
                return Err(InputError::DuplicateParticipant {
                    context: context.clone(),
                    name: name.to_string(),
                });
            }
        }

        Ok(())
    }

    fn current_singles(&self, username: &str) -> Glicko2Rating {
        self.log
            .players
            .get(username)
            .map(PlayerRating::rating_singles)
            .unwrap_or_else(|| self.glicko.default_rating())
    }

    fn current_doubles(&self, username: &str) -> TrueSkillRating {
        self.log
            .players
            .get(username)
            .map(PlayerRating::rating_doubles)
            .unwrap_or_else(|| self.trueskill.default_rating())
    }

    fn replay_singles(
        &self,
        winner: &str,
        loser: &str,
        steps: &[GameStep],
    ) -> Result<[PendingPlayer<Glicko2Rating>; 2], DomainError> {
        let results = replay(
            &self.glicko,
            self.current_singles(winner),
            self.current_singles(loser),
            steps,
        )?;

        let mut pending = [PendingPlayer::new(winner), PendingPlayer::new(loser)];
        for result in results {
            let (w_before, l_before) = result.before;
            pending[0].snapshots.push(result.after.0);
            pending[1].snapshots.push(result.after.1);

            match result.step {
                GameStep::WinnerWins => {
                    pending[0].on_win.push(l_before.mu);
                    pending[1].on_loss.push(w_before.mu);
                }
                GameStep::LoserWins => {
                    pending[1].on_win.push(w_before.mu);
                    pending[0].on_loss.push(l_before.mu);
                }
            }
        }

        Ok(pending)
    }

    fn replay_doubles(
        &self,
        winners: &[String; 2],
        losers: &[String; 2],
        steps: &[GameStep],
    ) -> Result<[PendingPlayer<TrueSkillRating>; 4], DomainError> {
        let winning_team: Team = [
            self.current_doubles(&winners[0]),
            self.current_doubles(&winners[1]),
        ];
        let losing_team: Team = [
            self.current_doubles(&losers[0]),
            self.current_doubles(&losers[1]),
        ];

        let results = replay(&self.trueskill, winning_team, losing_team, steps)?;

        let mut pending = [
            PendingPlayer::new(&winners[0]),
            PendingPlayer::new(&winners[1]),
            PendingPlayer::new(&losers[0]),
            PendingPlayer::new(&losers[1]),
        ];

        for result in results {
            let (w_before, l_before) = result.before;
            let (w_after, l_after) = result.after;
            let w_strength = team_strength(&w_before);
            let l_strength = team_strength(&l_before);

            for i in 0..2 {
                let (winner, loser) = (i, i + 2);
                pending[winner].snapshots.push(w_after[i]);
                pending[loser].snapshots.push(l_after[i]);
                pending[winner].partners.push(w_before[1 - i].mu);
                pending[loser].partners.push(l_before[1 - i].mu);

                match result.step {
                    GameStep::WinnerWins => {
                        pending[winner].on_win.push(l_strength);
                        pending[loser].on_loss.push(w_strength);
                    }
                    GameStep::LoserWins => {
                        pending[loser].on_win.push(w_strength);
                        pending[winner].on_loss.push(l_strength);
                    }
                }
            }
        }

        Ok(pending)
    }

    fn commit_singles(&mut self, pending: [PendingPlayer<Glicko2Rating>; 2], venue: Venue) {
        for p in pending {
            let player = self.get_or_create_player(&p.username);
            for snapshot in p.snapshots {
                player.push_singles(snapshot);
            }
            append_stats(&mut player.singles, p.on_win, p.on_loss, p.partners, venue);
        }
    }

    fn commit_doubles(&mut self, pending: [PendingPlayer<TrueSkillRating>; 4], venue: Venue) {
        for p in pending {
            let player = self.get_or_create_player(&p.username);
            for snapshot in p.snapshots {
                player.push_doubles(snapshot);
            }
            append_stats(&mut player.doubles, p.on_win, p.on_loss, p.partners, venue);
        }
    }

    fn get_or_create_player(&mut self, username: &str) -> &mut PlayerRating {
        let singles_prior = self.glicko.default_rating();
        let doubles_prior = self.trueskill.default_rating();
        self.log
            .players
            .entry(username.to_string())
            .or_insert_with(|| PlayerRating::new(username, singles_prior, doubles_prior))
    }
}

/// Applies the steps in order with the model's two-sided update
fn replay<M: RatingModel>(
    model: &M,
    winner: M::Side,
    loser: M::Side,
    steps: &[GameStep],
) -> Result<Vec<StepResult<M::Side>>, DomainError> {
    let mut current = (winner, loser);
    let mut results = Vec::with_capacity(steps.len());

    for &step in steps {
        let after = match step {
            GameStep::WinnerWins => model.update(&current.0, &current.1)?,
            GameStep::LoserWins => {
                let (new_loser, new_winner) = model.update(&current.1, &current.0)?;
                (new_winner, new_loser)
            }
        };
        results.push(StepResult {
            step,
            before: current.clone(),
            after: after.clone(),
        });
        current = after;
    }

    Ok(results)
}

fn team_strength(team: &Team) -> f64 {
    (team[0].mu + team[1].mu) / 2.0
}

fn append_stats(
    stats: &mut crate::domain::ModeStats,
    on_win: Vec<f64>,
    on_loss: Vec<f64>,
    partners: Vec<f64>,
    venue: Venue,
) {
    stats.opponent_strength_on_win.extend(on_win);
    stats.opponent_strength_on_loss.extend(on_loss);
    stats.partner_strength.extend(partners);
    stats.record_venue(venue);
}

/// Folds a whole match log into ratings with a fresh engine
pub fn process_match_log<R: MatchRow>(
    rows: &[R],
    config: &AppConfig,
    policy: FailurePolicy,
) -> Result<ProcessedLog> {
    let mut engine = RatingEngine::new(config)?;
    engine.process_rows(rows, policy)?;
    Ok(engine.into_log())
}
