use ndarray::Array1;

use super::formulas::game_win_probability;
use crate::errors::DomainError;

/// Samples of the game-probability axis, spaced 1e-4 apart over [0, 1]
pub const POINT_TABLE_RESOLUTION: usize = 10_001;

const BISECTION_STEPS: usize = 60;

/// Inverse of `game_win_probability`: game probability -> point probability.
///
/// Entry `i` holds the point probability whose game probability is
/// `i / (POINT_TABLE_RESOLUTION - 1)`. Lookups round to the nearest entry.
#[derive(Debug, Clone)]
pub struct PointProbabilityTable {
    points_to_win: u32,
    entries: Array1<f64>,
}

impl PointProbabilityTable {
    pub fn new(points_to_win: u32) -> Result<Self, DomainError> {
        let last = POINT_TABLE_RESOLUTION - 1;
        let mut entries = Array1::<f64>::zeros(POINT_TABLE_RESOLUTION);

        for (i, entry) in entries.iter_mut().enumerate() {
            *entry = match i {
                0 => 0.0,
                i if i == last => 1.0,
                i => invert(i as f64 / last as f64, points_to_win)?,
            };
        }

        Ok(Self {
            points_to_win,
            entries,
        })
    }

    pub fn points_to_win(&self) -> u32 {
        self.points_to_win
    }

    pub fn entries(&self) -> &Array1<f64> {
        &self.entries
    }

    pub fn point_probability_for(&self, game_probability: f64) -> Result<f64, DomainError> {
        if !(0.0..=1.0).contains(&game_probability) {
            return Err(DomainError::ProbabilityOutOfRange {
                function: "point_probability_for",
                value: game_probability,
            });
        }
        let index = (game_probability * (POINT_TABLE_RESOLUTION - 1) as f64).round() as usize;
        Ok(self.entries[index.min(POINT_TABLE_RESOLUTION - 1)])
    }
}

/// Bisection on the monotone map p -> game_win_probability(p)
fn invert(target: f64, points_to_win: u32) -> Result<f64, DomainError> {
    let (mut lo, mut hi) = (0.0, 1.0);
    for _ in 0..BISECTION_STEPS {
        let mid = (lo + hi) / 2.0;
        if game_win_probability(mid, points_to_win)? < target {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Ok((lo + hi) / 2.0)
}
