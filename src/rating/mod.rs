pub mod engine;
pub mod gaussian;
pub mod glicko2;
pub mod trueskill;
pub mod types;

pub use engine::{process_match_log, FailurePolicy, ProcessedLog, RatingEngine};
pub use glicko2::Glicko2;
pub use trueskill::{TeamOutcome, TrueSkill};
pub use types::{Glicko2Rating, RatingModel, RatingState, Team, TrueSkillRating};
