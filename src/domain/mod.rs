pub mod games_expansion;
pub mod models;
pub mod parsers;
pub mod player;
pub mod rows;

pub use games_expansion::{expand_score_to_games, GameOrder, GameStep};
pub use models::{MatchRecord, Mode, Participants, Score, Venue};
pub use player::{ModeStats, PlayerRating};
pub use rows::{DoublesRow, SinglesRow};
