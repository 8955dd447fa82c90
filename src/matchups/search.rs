use std::cmp::Ordering;

use clap::ValueEnum;
use log::info;

use crate::config::settings::MatchupSettings;
use crate::errors::ConsistencyError;
use crate::rating::{Glicko2, Glicko2Rating, Team, TrueSkill, TrueSkillRating};

/// 95% two-sided normal quantile, used for the combined doubles uncertainty
const Z_95: f64 = 1.96;

/// How surviving candidates are ranked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortKey {
    /// Highest match quality first
    #[default]
    Quality,
    /// Win probability closest to a coin flip first
    Balance,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SinglesEntry {
    pub username: String,
    pub rating: Glicko2Rating,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoublesEntry {
    pub username: String,
    pub rating: TrueSkillRating,
}

/// One scored pairing. `win_probability` is for `side_a`.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchupCandidate {
    pub side_a: Vec<String>,
    pub side_b: Vec<String>,
    pub delta_mu: f64,
    pub uncertainty: f64,
    pub quality: f64,
    pub win_probability: f64,
}

impl MatchupCandidate {
    fn balance(&self) -> f64 {
        (self.win_probability - 0.5).abs()
    }

    fn names(&self) -> impl Iterator<Item = &String> {
        self.side_a.iter().chain(self.side_b.iter())
    }

    pub fn involves(&self, username: &str) -> bool {
        self.names().any(|n| n == username)
    }
}

/// Pruning thresholds; `None` disables a predicate
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Thresholds {
    pub delta_mu: Option<f64>,
    pub uncertainty: Option<f64>,
}

impl Thresholds {
    pub fn from_settings(settings: &MatchupSettings) -> Self {
        Self {
            delta_mu: Some(settings.delta_mu_threshold),
            uncertainty: Some(settings.uncertainty_threshold),
        }
    }
}

/// Candidates dropped before scoring, by the first predicate they failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SkipCounts {
    pub delta_mu: u64,
    pub uncertainty: u64,
}

impl SkipCounts {
    pub fn total(&self) -> u64 {
        self.delta_mu + self.uncertainty
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchupReport {
    /// Best candidates, already sorted and truncated
    pub candidates: Vec<MatchupCandidate>,
    /// Every pairing the roster allows
    pub total: u64,
    /// Pairings that survived pruning and were scored
    pub evaluated: u64,
    pub skipped: SkipCounts,
}

/// n choose 2
fn pairs(n: u64) -> u64 {
    n * n.saturating_sub(1) / 2
}

pub fn singles_matchup_count(roster: usize) -> u64 {
    pairs(roster as u64)
}

/// Ways to split four of `roster` players into two unordered teams of two
pub fn doubles_matchup_count(roster: usize) -> u64 {
    let n = roster as u64;
    pairs(n) * pairs(n.saturating_sub(2)) / 2
}

/// Every unordered pair `{i < j}` of the roster, scored with Glicko-2
pub fn search_singles_matchups(
    glicko: &Glicko2,
    players: &[SinglesEntry],
    top_n: usize,
    sort: SortKey,
) -> Result<MatchupReport, ConsistencyError> {
    let mut candidates = Vec::new();

    for (i, a) in players.iter().enumerate() {
        for b in &players[i + 1..] {
            candidates.push(MatchupCandidate {
                side_a: vec![a.username.clone()],
                side_b: vec![b.username.clone()],
                delta_mu: a.rating.mu - b.rating.mu,
                uncertainty: ((a.rating.phi.powi(2) + b.rating.phi.powi(2)) / 2.0).sqrt(),
                quality: glicko.quality_1vs1(&a.rating, &b.rating),
                win_probability: glicko.game_probability(&a.rating, &b.rating),
            });
        }
    }

    finish(
        "singles",
        candidates,
        SkipCounts::default(),
        singles_matchup_count(players.len()),
        top_n,
        sort,
    )
}

/// Every split of four roster players into two teams of two.
///
/// Team A is `{i < j}` and team B is `{k < l}`, all four distinct, with `i < k`
/// so each split is produced once. The pruning predicates run before any
/// scoring; each skipped candidate is counted under the first one it fails.
pub fn search_doubles_matchups(
    trueskill: &TrueSkill,
    players: &[DoublesEntry],
    thresholds: Thresholds,
    top_n: usize,
    sort: SortKey,
) -> Result<MatchupReport, ConsistencyError> {
    let n = players.len();
    let mut candidates = Vec::new();
    let mut skipped = SkipCounts::default();

    for i in 0..n {
        for j in i + 1..n {
            for k in i + 1..n {
                if k == j {
                    continue;
                }
                for l in k + 1..n {
                    if l == j {
                        continue;
                    }

                    let team_a: Team = [players[i].rating, players[j].rating];
                    let team_b: Team = [players[k].rating, players[l].rating];

                    let delta_mu =
                        (team_a[0].mu + team_a[1].mu - team_b[0].mu - team_b[1].mu) / 2.0;
                    if thresholds.delta_mu.is_some_and(|t| delta_mu.abs() > t) {
                        skipped.delta_mu += 1;
                        continue;
                    }

                    let uncertainty = combined_uncertainty(&team_a, &team_b);
                    if thresholds.uncertainty.is_some_and(|t| uncertainty > t) {
                        skipped.uncertainty += 1;
                        continue;
                    }

                    candidates.push(MatchupCandidate {
                        side_a: vec![players[i].username.clone(), players[j].username.clone()],
                        side_b: vec![players[k].username.clone(), players[l].username.clone()],
                        delta_mu,
                        uncertainty,
                        quality: trueskill.quality(&team_a, &team_b),
                        win_probability: trueskill.win_probability(&team_a, &team_b),
                    });
                }
            }
        }
    }

    finish("doubles", candidates, skipped, doubles_matchup_count(n), top_n, sort)
}

/// `1.96 * sqrt(mean of the four variances)`
pub fn combined_uncertainty(team_a: &Team, team_b: &Team) -> f64 {
    let mean_variance = team_a
        .iter()
        .chain(team_b.iter())
        .map(|r| r.sigma.powi(2))
        .sum::<f64>()
        / 4.0;
    Z_95 * mean_variance.sqrt()
}

/// Verifies completeness, then sorts and truncates
fn finish(
    search: &'static str,
    mut candidates: Vec<MatchupCandidate>,
    skipped: SkipCounts,
    total: u64,
    top_n: usize,
    sort: SortKey,
) -> Result<MatchupReport, ConsistencyError> {
    let evaluated = candidates.len() as u64;
    if evaluated + skipped.total() != total {
        return Err(ConsistencyError {
            search,
            evaluated,
            skipped: skipped.total(),
            expected: total,
        });
    }

    info!(
        "  → {} matchups: {} possible, {} evaluated, {} skipped (Δμ {}, uncertainty {})",
        search, total, evaluated, skipped.total(), skipped.delta_mu, skipped.uncertainty
    );

    candidates.sort_by(|a, b| compare(a, b, sort));
    candidates.truncate(top_n);

    Ok(MatchupReport {
        candidates,
        total,
        evaluated,
        skipped,
    })
}

fn compare(a: &MatchupCandidate, b: &MatchupCandidate, sort: SortKey) -> Ordering {
    let primary = match sort {
        SortKey::Quality => b.quality.total_cmp(&a.quality),
        SortKey::Balance => a.balance().total_cmp(&b.balance()),
    };
    primary
        .then_with(|| a.side_a.cmp(&b.side_a))
        .then_with(|| a.side_b.cmp(&b.side_b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn singles_roster(mus: &[f64]) -> Vec<SinglesEntry> {
        mus.iter()
            .enumerate()
            .map(|(i, &mu)| SinglesEntry {
                username: format!("p{i}"),
                rating: Glicko2Rating::new(mu, 80.0, 0.06),
            })
            .collect()
    }

    fn doubles_roster(ratings: &[(f64, f64)]) -> Vec<DoublesEntry> {
        ratings
            .iter()
            .enumerate()
            .map(|(i, &(mu, sigma))| DoublesEntry {
                username: format!("p{i}"),
                rating: TrueSkillRating::new(mu, sigma),
            })
            .collect()
    }

    #[test]
    fn test_matchup_counts() {
        assert_eq!(singles_matchup_count(0), 0);
        assert_eq!(singles_matchup_count(5), 10);
        assert_eq!(doubles_matchup_count(3), 0);
        assert_eq!(doubles_matchup_count(4), 3);
        assert_eq!(doubles_matchup_count(6), 45);
        assert_eq!(doubles_matchup_count(10), 630);
    }

    #[test]
    fn test_singles_enumerates_every_pair_once() {
        let roster = singles_roster(&[1500.0, 1620.0, 1490.0, 1710.0, 1300.0]);
        let report =
            search_singles_matchups(&Glicko2::default(), &roster, 100, SortKey::Quality).unwrap();

        assert_eq!(report.total, 10);
        assert_eq!(report.evaluated, 10);
        assert_eq!(report.skipped.total(), 0);

        let pairs: BTreeSet<BTreeSet<&String>> = report
            .candidates
            .iter()
            .map(|c| c.names().collect())
            .collect();
        assert_eq!(pairs.len(), 10);
        assert!(report.candidates.iter().all(|c| c.side_a != c.side_b));
    }

    #[test]
    fn test_singles_sorted_by_quality_and_truncated() {
        let roster = singles_roster(&[1500.0, 1505.0, 1900.0, 1100.0]);
        let report =
            search_singles_matchups(&Glicko2::default(), &roster, 2, SortKey::Quality).unwrap();

        assert_eq!(report.candidates.len(), 2);
        assert_eq!(report.evaluated, 6);
        assert_eq!(report.candidates[0].side_a, vec!["p0"]);
        assert_eq!(report.candidates[0].side_b, vec!["p1"]);
        assert!(report.candidates[0].quality >= report.candidates[1].quality);
    }

    #[test]
    fn test_balance_sort_prefers_coin_flips() {
        let roster = singles_roster(&[1500.0, 1700.0, 1702.0]);
        let report =
            search_singles_matchups(&Glicko2::default(), &roster, 3, SortKey::Balance).unwrap();
        let first = &report.candidates[0];
        assert_eq!(first.side_a, vec!["p1"]);
        assert!((first.win_probability - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_doubles_without_pruning_is_complete() {
        let ts = TrueSkill::default();
        for n in 4..=9 {
            let roster = doubles_roster(&vec![(25.0, 3.0); n]);
            let report = search_doubles_matchups(
                &ts,
                &roster,
                Thresholds::default(),
                usize::MAX,
                SortKey::Quality,
            )
            .unwrap();
            assert_eq!(report.evaluated, doubles_matchup_count(n));
            assert_eq!(report.candidates.len() as u64, report.total);

            let splits: BTreeSet<BTreeSet<BTreeSet<&String>>> = report
                .candidates
                .iter()
                .map(|c| {
                    let a: BTreeSet<&String> = c.side_a.iter().collect();
                    let b: BTreeSet<&String> = c.side_b.iter().collect();
                    BTreeSet::from([a, b])
                })
                .collect();
            assert_eq!(splits.len() as u64, report.total);
        }
    }

    #[test]
    fn test_doubles_pruning_keeps_counts_consistent() {
        let ts = TrueSkill::default();
        let roster = doubles_roster(&[
            (31.0, 2.0),
            (28.0, 2.5),
            (26.0, 1.5),
            (24.0, 3.0),
            (20.0, 14.0),
            (18.0, 16.0),
            (15.0, 2.0),
        ]);
        let thresholds = Thresholds {
            delta_mu: Some(5.0),
            uncertainty: Some(9.5),
        };
        let report =
            search_doubles_matchups(&ts, &roster, thresholds, 15, SortKey::Quality).unwrap();

        assert_eq!(report.total, 105);
        assert_eq!(report.evaluated + report.skipped.total(), report.total);
        assert!(report.skipped.delta_mu > 0);
        assert!(report.skipped.uncertainty > 0);
        for c in &report.candidates {
            assert!(c.delta_mu.abs() <= 5.0);
            assert!(c.uncertainty <= 9.5);
        }
    }

    #[test]
    fn test_uncertain_players_never_paired_together() {
        let ts = TrueSkill::default();
        let roster = doubles_roster(&[
            (25.0, 1.0),
            (25.0, 1.0),
            (25.0, 1.0),
            (25.0, 1.0),
            (25.0, 20.0),
            (25.0, 22.0),
        ]);
        let thresholds = Thresholds {
            delta_mu: Some(5.0),
            uncertainty: Some(9.5),
        };
        let report =
            search_doubles_matchups(&ts, &roster, thresholds, usize::MAX, SortKey::Quality)
                .unwrap();

        assert_eq!(report.total, 45);
        assert!(report.skipped.uncertainty >= 6);
        assert!(report
            .candidates
            .iter()
            .all(|c| !(c.involves("p4") && c.involves("p5"))));
    }

    #[test]
    fn test_small_rosters_yield_nothing() {
        let ts = TrueSkill::default();
        let roster = doubles_roster(&[(25.0, 3.0); 3]);
        let report =
            search_doubles_matchups(&ts, &roster, Thresholds::default(), 15, SortKey::Quality)
                .unwrap();
        assert_eq!(report.total, 0);
        assert!(report.candidates.is_empty());

        let report =
            search_singles_matchups(&Glicko2::default(), &[], 15, SortKey::Quality).unwrap();
        assert_eq!(report.total, 0);
    }

    #[test]
    fn test_consistency_error_on_count_mismatch() {
        let skipped = SkipCounts {
            delta_mu: 1,
            uncertainty: 0,
        };
        let err = finish("doubles", Vec::new(), skipped, 3, 15, SortKey::Quality).unwrap_err();
        assert_eq!(err.expected, 3);
        assert_eq!(err.skipped, 1);
    }
}
