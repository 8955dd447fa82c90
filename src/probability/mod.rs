//! Point, game and match probabilities for first-to-N, win-by-two play

pub mod formulas;
pub mod table;

pub use formulas::{
    at_least_k_of_n_games, at_least_k_points, at_least_k_wins_in_match, fair_handicap_points,
    game_win_probability, match_win_probability, p_deuce, p_deuce_win, POINTS_PER_GAME,
};
pub use table::{PointProbabilityTable, POINT_TABLE_RESOLUTION};
