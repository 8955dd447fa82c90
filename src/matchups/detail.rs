use crate::errors::DomainError;
use crate::probability::{
    at_least_k_of_n_games, at_least_k_points, at_least_k_wins_in_match, fair_handicap_points,
    match_win_probability, p_deuce, p_deuce_win, PointProbabilityTable,
};
use crate::rating::{Glicko2, RatingModel, Team, TrueSkill};

use super::search::{combined_uncertainty, DoublesEntry, SinglesEntry};

/// First-to-2, -3 and -4 games, i.e. best of 3, 5 and 7
pub const MATCH_FORMATS: [u32; 3] = [2, 3, 4];
/// Size of the "at least k of n games" table
pub const GAMES_OUT_OF: u32 = 10;
const CLEAN_SWEEP_GAMES: i32 = 6;

/// Everything derived from side A's per-game probability
#[derive(Debug, Clone, PartialEq)]
pub struct MatchupOdds {
    pub game: f64,
    pub point: f64,
    pub deuce_reach: f64,
    pub deuce_win: f64,
    pub win_all_of_six: f64,
    /// `(games to win, probability)` for each of `MATCH_FORMATS`
    pub match_win: Vec<(u32, f64)>,
    pub at_least_one_game: Vec<(u32, f64)>,
    pub win_all_games: Vec<(u32, f64)>,
    /// `(k, P(at least k of GAMES_OUT_OF))`
    pub at_least_k_of_ten: Vec<(u32, f64)>,
    /// `(k, P(scoring at least k points in one game))`
    pub at_least_k_points: Vec<(u32, f64)>,
    /// `(opponent head start, win probability)`, fairest first
    pub handicaps: Vec<(u32, f64)>,
}

/// Mean change for one player under each result, plus the summed uncertainty change
#[derive(Debug, Clone, PartialEq)]
pub struct RatingPreview {
    pub username: String,
    pub mu: f64,
    pub uncertainty: f64,
    /// If side A wins the next game
    pub delta_if_a_wins: f64,
    /// If side A loses the next game
    pub delta_if_a_loses: f64,
    pub uncertainty_change: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchupDetail {
    pub side_a: Vec<String>,
    pub side_b: Vec<String>,
    pub delta_mu: f64,
    pub uncertainty: f64,
    pub odds: MatchupOdds,
    pub previews: Vec<RatingPreview>,
}

pub fn odds_from_game_probability(
    game: f64,
    table: &PointProbabilityTable,
) -> Result<MatchupOdds, DomainError> {
    let points_to_win = table.points_to_win();
    let point = table.point_probability_for(game)?;

    Ok(MatchupOdds {
        game,
        point,
        deuce_reach: p_deuce(point, points_to_win)?,
        deuce_win: p_deuce_win(point)?,
        win_all_of_six: game.powi(CLEAN_SWEEP_GAMES),
        match_win: per_format(|n| match_win_probability(game, n))?,
        at_least_one_game: per_format(|n| at_least_k_wins_in_match(game, n, 1))?,
        win_all_games: per_format(|n| Ok(game.powi(n as i32)))?,
        at_least_k_of_ten: (0..=GAMES_OUT_OF)
            .map(|k| Ok((k, at_least_k_of_n_games(game, GAMES_OUT_OF, k)?)))
            .collect::<Result<_, DomainError>>()?,
        at_least_k_points: (0..=points_to_win)
            .map(|k| Ok((k, at_least_k_points(point, points_to_win, k)?)))
            .collect::<Result<_, DomainError>>()?,
        handicaps: fair_handicap_points(point, points_to_win)?,
    })
}

/// `(games to win, f(games to win))` for each of `MATCH_FORMATS`
fn per_format<F>(f: F) -> Result<Vec<(u32, f64)>, DomainError>
where
    F: Fn(u32) -> Result<f64, DomainError>,
{
    MATCH_FORMATS.iter().map(|&n| Ok((n, f(n)?))).collect()
}

/// Player `a` against player `b`
pub fn singles_detail(
    glicko: &Glicko2,
    table: &PointProbabilityTable,
    a: &SinglesEntry,
    b: &SinglesEntry,
) -> Result<MatchupDetail, DomainError> {
    let (a_won, b_lost) = glicko.update(&a.rating, &b.rating)?;
    let (b_won, a_lost) = glicko.update(&b.rating, &a.rating)?;

    let preview = |entry: &SinglesEntry,
                   if_a_wins: f64,
                   if_a_loses: f64,
                   phi_a_wins: f64,
                   phi_a_loses: f64| {
        RatingPreview {
            username: entry.username.clone(),
            mu: entry.rating.mu,
            uncertainty: entry.rating.phi,
            delta_if_a_wins: if_a_wins - entry.rating.mu,
            delta_if_a_loses: if_a_loses - entry.rating.mu,
            uncertainty_change: phi_a_wins + phi_a_loses - 2.0 * entry.rating.phi,
        }
    };

    Ok(MatchupDetail {
        side_a: vec![a.username.clone()],
        side_b: vec![b.username.clone()],
        delta_mu: a.rating.mu - b.rating.mu,
        uncertainty: ((a.rating.phi.powi(2) + b.rating.phi.powi(2)) / 2.0).sqrt(),
        odds: odds_from_game_probability(glicko.game_probability(&a.rating, &b.rating), table)?,
        previews: vec![
            preview(a, a_won.mu, a_lost.mu, a_won.phi, a_lost.phi),
            preview(b, b_lost.mu, b_won.mu, b_lost.phi, b_won.phi),
        ],
    })
}

/// Team `a` against team `b`
pub fn doubles_detail(
    trueskill: &TrueSkill,
    table: &PointProbabilityTable,
    a: &[DoublesEntry; 2],
    b: &[DoublesEntry; 2],
) -> Result<MatchupDetail, DomainError> {
    let team_a: Team = [a[0].rating, a[1].rating];
    let team_b: Team = [b[0].rating, b[1].rating];

    let (a_won, b_lost) = trueskill.update(&team_a, &team_b)?;
    let (b_won, a_lost) = trueskill.update(&team_b, &team_a)?;

    let mut previews = Vec::with_capacity(4);
    for (entries, if_a_wins, if_a_loses) in [(a, &a_won, &a_lost), (b, &b_lost, &b_won)] {
        for (i, entry) in entries.iter().enumerate() {
            previews.push(RatingPreview {
                username: entry.username.clone(),
                mu: entry.rating.mu,
                uncertainty: entry.rating.sigma,
                delta_if_a_wins: if_a_wins[i].mu - entry.rating.mu,
                delta_if_a_loses: if_a_loses[i].mu - entry.rating.mu,
                uncertainty_change: if_a_wins[i].sigma + if_a_loses[i].sigma
                    - 2.0 * entry.rating.sigma,
            });
        }
    }

    Ok(MatchupDetail {
        side_a: a.iter().map(|e| e.username.clone()).collect(),
        side_b: b.iter().map(|e| e.username.clone()).collect(),
        delta_mu: (team_a[0].mu + team_a[1].mu - team_b[0].mu - team_b[1].mu) / 2.0,
        uncertainty: combined_uncertainty(&team_a, &team_b),
        odds: odds_from_game_probability(trueskill.win_probability(&team_a, &team_b), table)?,
        previews,
    })
}
