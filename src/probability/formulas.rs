use ndarray::Array2;
use statrs::function::factorial::binomial;

use crate::errors::DomainError;

/// Points needed to take a game
pub const POINTS_PER_GAME: u32 = 11;

fn check_probability(function: &'static str, p: f64) -> Result<(), DomainError> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(DomainError::ProbabilityOutOfRange { function, value: p })
    }
}

fn check_trials(function: &'static str, n: u32) -> Result<(), DomainError> {
    if n >= 1 {
        Ok(())
    } else {
        Err(DomainError::EmptyTrials { function, n })
    }
}

fn check_k(function: &'static str, k: u32, n: u32) -> Result<(), DomainError> {
    if k <= n {
        Ok(())
    } else {
        Err(DomainError::KOutOfRange { function, k, n })
    }
}

/// Probability that the first to `target` wins having conceded exactly `conceded`
fn first_to_target_with(p: f64, target: u32, conceded: u32) -> f64 {
    binomial(u64::from(target - 1 + conceded), u64::from(conceded))
        * p.powi(target as i32)
        * (1.0 - p).powi(conceded as i32)
}

/// Probability a game reaches `n-1` all
pub fn p_deuce(p: f64, points_to_win: u32) -> Result<f64, DomainError> {
    check_probability("p_deuce", p)?;
    check_trials("p_deuce", points_to_win)?;
    let n = points_to_win - 1;
    Ok(binomial(u64::from(2 * n), u64::from(n)) * (p * (1.0 - p)).powi(n as i32))
}

/// Probability of winning from deuce, i.e. of ever getting two points clear
pub fn p_deuce_win(p: f64) -> Result<f64, DomainError> {
    check_probability("p_deuce_win", p)?;
    Ok(p.powi(2) / (1.0 - 2.0 * p * (1.0 - p)))
}

/// Probability of winning one game to `points_to_win`, win by two
pub fn game_win_probability(p: f64, points_to_win: u32) -> Result<f64, DomainError> {
    check_probability("game_win_probability", p)?;
    check_trials("game_win_probability", points_to_win)?;

    let without_deuce: f64 = (0..points_to_win.saturating_sub(1))
        .map(|j| first_to_target_with(p, points_to_win, j))
        .sum();

    Ok(without_deuce + p_deuce(p, points_to_win)? * p_deuce_win(p)?)
}

/// Probability of winning a best-of-`(2n-1)` match given the per-game probability
pub fn match_win_probability(p: f64, games_to_win: u32) -> Result<f64, DomainError> {
    check_probability("match_win_probability", p)?;
    check_trials("match_win_probability", games_to_win)?;
    Ok((0..games_to_win)
        .map(|k| first_to_target_with(p, games_to_win, k))
        .sum())
}

/// Probability of taking at least `k` games in a first-to-`games_to_win` match
pub fn at_least_k_wins_in_match(p: f64, games_to_win: u32, k: u32) -> Result<f64, DomainError> {
    const NAME: &str = "at_least_k_wins_in_match";
    check_probability(NAME, p)?;
    check_trials(NAME, games_to_win)?;
    check_k(NAME, k, games_to_win)?;

    // losing while holding j < k games, with the roles swapped
    let short: f64 = (0..k).map(|j| first_to_target_with(1.0 - p, games_to_win, j)).sum();
    Ok((1.0 - short).clamp(0.0, 1.0))
}

/// Probability of winning at least `k` of `n` independent games
pub fn at_least_k_of_n_games(p: f64, n: u32, k: u32) -> Result<f64, DomainError> {
    const NAME: &str = "at_least_k_of_n_games";
    check_probability(NAME, p)?;
    check_trials(NAME, n)?;
    check_k(NAME, k, n)?;

    Ok((k..=n)
        .map(|i| {
            binomial(u64::from(n), u64::from(i)) * p.powi(i as i32) * (1.0 - p).powi((n - i) as i32)
        })
        .sum())
}

/// Probability of scoring at least `k` points in one game to `points_to_win`
pub fn at_least_k_points(p: f64, points_to_win: u32, k: u32) -> Result<f64, DomainError> {
    const NAME: &str = "at_least_k_points";
    check_probability(NAME, p)?;
    check_trials(NAME, points_to_win)?;
    check_k(NAME, k, points_to_win)?;

    let q = 1.0 - p;
    if k == points_to_win {
        // from deuce, anything except dropping the next two points gets there
        let without_deuce: f64 = (0..points_to_win - 1)
            .map(|j| first_to_target_with(p, points_to_win, j))
            .sum();
        return Ok(without_deuce + p_deuce(p, points_to_win)? * (1.0 - q.powi(2)));
    }

    let short: f64 = (0..k).map(|j| first_to_target_with(q, points_to_win, j)).sum();
    Ok((1.0 - short).clamp(0.0, 1.0))
}

/// Win probability from every score, indexed `[own, opponent]`
fn score_grid(p: f64, points_to_win: u32) -> Result<Array2<f64>, DomainError> {
    let n = points_to_win as usize;
    let q = 1.0 - p;
    let deuce_win = p_deuce_win(p)?;
    let mut grid = Array2::<f64>::zeros((n + 1, n + 1));

    for own in (0..=n).rev() {
        for opp in (0..=n).rev() {
            let lead = own as i64 - opp as i64;
            grid[[own, opp]] = if own + 1 >= n && opp + 1 >= n {
                match lead {
                    0 => deuce_win,
                    1 => p + q * deuce_win,
                    -1 => p * deuce_win,
                    d if d > 0 => 1.0,
                    _ => 0.0,
                }
            } else if own >= n {
                1.0
            } else if opp >= n {
                0.0
            } else {
                p * grid[[own + 1, opp]] + q * grid[[own, opp + 1]]
            };
        }
    }

    Ok(grid)
}

/// Head starts for the opponent, `(points, win probability)`, fairest first.
///
/// The side with point probability `p` starts at 0 and the opponent at `i`
/// for every `i` in `0..points_to_win`.
pub fn fair_handicap_points(p: f64, points_to_win: u32) -> Result<Vec<(u32, f64)>, DomainError> {
    check_probability("fair_handicap_points", p)?;
    check_trials("fair_handicap_points", points_to_win)?;

    let grid = score_grid(p, points_to_win)?;
    let mut handicaps: Vec<(u32, f64)> = (0..points_to_win)
        .map(|i| (i, grid[[0, i as usize]]))
        .collect();

    handicaps.sort_by(|a, b| {
        (a.1 - 0.5)
            .abs()
            .total_cmp(&(b.1 - 0.5).abs())
            .then(a.0.cmp(&b.0))
    });
    Ok(handicaps)
}
