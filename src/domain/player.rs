use std::collections::BTreeMap;

use crate::domain::{Mode, Venue};
use crate::rating::{Glicko2Rating, TrueSkillRating};

/// Per-mode aggregates collected while the log is replayed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModeStats {
    /// Opposing mean (averaged over the opposing team) before each game won
    pub opponent_strength_on_win: Vec<f64>,
    /// Opposing mean before each game lost
    pub opponent_strength_on_loss: Vec<f64>,
    /// Teammate's mean before each doubles game
    pub partner_strength: Vec<f64>,
    pub venue_appearances: BTreeMap<Venue, u32>,
}

impl ModeStats {
    pub fn wins(&self) -> usize {
        self.opponent_strength_on_win.len()
    }

    pub fn losses(&self) -> usize {
        self.opponent_strength_on_loss.len()
    }

    pub fn average_opponent(&self) -> Option<f64> {
        let games = self.wins() + self.losses();
        if games == 0 {
            return None;
        }
        let total: f64 = self
            .opponent_strength_on_win
            .iter()
            .chain(self.opponent_strength_on_loss.iter())
            .sum();
        Some(total / games as f64)
    }

    pub fn best_win(&self) -> Option<f64> {
        self.opponent_strength_on_win.iter().copied().reduce(f64::max)
    }

    pub fn average_partner(&self) -> Option<f64> {
        if self.partner_strength.is_empty() {
            return None;
        }
        Some(self.partner_strength.iter().sum::<f64>() / self.partner_strength.len() as f64)
    }

    /// Most visited venue; ties go to the venue listed first
    pub fn home_venue(&self) -> Option<Venue> {
        self.venue_appearances
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
            .map(|(venue, _)| *venue)
    }

    pub(crate) fn record_venue(&mut self, venue: Venue) {
        *self.venue_appearances.entry(venue).or_insert(0) += 1;
    }
}

/// A player's full rating history in both modes.
///
/// Histories are append-only: index 0 is the prior, the last entry is the
/// current rating, and `len() == 1 + games applied in that mode`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRating {
    pub username: String,
    singles_history: Vec<Glicko2Rating>,
    doubles_history: Vec<TrueSkillRating>,
    pub singles: ModeStats,
    pub doubles: ModeStats,
}

impl PlayerRating {
    pub fn new(
        username: &str,
        singles_prior: Glicko2Rating,
        doubles_prior: TrueSkillRating,
    ) -> Self {
        Self {
            username: username.to_string(),
            singles_history: vec![singles_prior],
            doubles_history: vec![doubles_prior],
            singles: ModeStats::default(),
            doubles: ModeStats::default(),
        }
    }

    pub fn rating_singles(&self) -> Glicko2Rating {
        // never empty: constructed with the prior
        self.singles_history[self.singles_history.len() - 1]
    }

    pub fn rating_doubles(&self) -> TrueSkillRating {
        self.doubles_history[self.doubles_history.len() - 1]
    }

    pub fn singles_history(&self) -> &[Glicko2Rating] {
        &self.singles_history
    }

    pub fn doubles_history(&self) -> &[TrueSkillRating] {
        &self.doubles_history
    }

    /// Mean after every game in `mode`, prior first
    pub fn mu_history(&self, mode: Mode) -> Vec<f64> {
        match mode {
            Mode::Singles => self.singles_history.iter().map(|r| r.mu).collect(),
            Mode::Doubles => self.doubles_history.iter().map(|r| r.mu).collect(),
        }
    }

    pub fn mu(&self, mode: Mode) -> f64 {
        match mode {
            Mode::Singles => self.rating_singles().mu,
            Mode::Doubles => self.rating_doubles().mu,
        }
    }

    pub fn stats(&self, mode: Mode) -> &ModeStats {
        match mode {
            Mode::Singles => &self.singles,
            Mode::Doubles => &self.doubles,
        }
    }

    pub fn games_played(&self, mode: Mode) -> usize {
        match mode {
            Mode::Singles => self.singles_history.len() - 1,
            Mode::Doubles => self.doubles_history.len() - 1,
        }
    }

    pub fn has_played(&self, mode: Mode) -> bool {
        self.games_played(mode) > 0
    }

    pub(crate) fn push_singles(&mut self, rating: Glicko2Rating) {
        self.singles_history.push(rating);
    }

    pub(crate) fn push_doubles(&mut self, rating: TrueSkillRating) {
        self.doubles_history.push(rating);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> PlayerRating {
        PlayerRating::new(
            "shane",
            Glicko2Rating::new(1500.0, 350.0, 0.06),
            TrueSkillRating::new(25.0, 25.0 / 3.0),
        )
    }

    #[test]
    fn test_history_starts_with_prior() {
        let mut p = player();
        assert_eq!(p.games_played(Mode::Singles), 0);
        assert!(!p.has_played(Mode::Singles));

        p.push_singles(Glicko2Rating::new(1560.0, 290.0, 0.06));
        assert_eq!(p.singles_history().len(), 2);
        assert_eq!(p.rating_singles().mu, 1560.0);
        assert_eq!(p.mu_history(Mode::Singles), vec![1500.0, 1560.0]);
        assert_eq!(p.games_played(Mode::Doubles), 0);
    }

    #[test]
    fn test_mode_stats() {
        let mut stats = ModeStats::default();
        assert_eq!(stats.average_opponent(), None);
        assert_eq!(stats.best_win(), None);

        stats.opponent_strength_on_win.extend([1600.0, 1550.0]);
        stats.opponent_strength_on_loss.push(1450.0);
        assert_eq!(stats.wins(), 2);
        assert_eq!(stats.losses(), 1);
        assert_eq!(stats.best_win(), Some(1600.0));
        assert!((stats.average_opponent().unwrap() - 1533.333_333).abs() < 1e-5);
    }

    #[test]
    fn test_home_venue_prefers_most_visited_then_first_listed() {
        let mut stats = ModeStats::default();
        stats.record_venue(Venue::Norms);
        stats.record_venue(Venue::Mtta);
        assert_eq!(stats.home_venue(), Some(Venue::Mtta));

        stats.record_venue(Venue::Norms);
        assert_eq!(stats.home_venue(), Some(Venue::Norms));
    }
}
