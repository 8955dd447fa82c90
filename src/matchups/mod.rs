pub mod detail;
pub mod search;

pub use detail::{
    doubles_detail, odds_from_game_probability, singles_detail, MatchupDetail, MatchupOdds,
    RatingPreview,
};
pub use search::{
    doubles_matchup_count, search_doubles_matchups, search_singles_matchups, singles_matchup_count,
    DoublesEntry, MatchupCandidate, MatchupReport, SinglesEntry, SkipCounts, SortKey, Thresholds,
};
