use clap::ValueEnum;

use crate::domain::Score;

/// One elementary "one game of result" update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStep {
    WinnerWins,
    LoserWins,
}

/// Order in which the games of a match are replayed into the rating models.
///
/// Every order applies `winner_games + loser_games` steps; only the sequence
/// differs, which nudges the final ratings slightly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum GameOrder {
    /// The net margin as straight wins, then each lost game followed by a comeback win
    #[default]
    SweepFirst,
    /// Every game the loser took, then every game the winner took
    LossesFirst,
    /// Every game the winner took, then every game the loser took
    WinsFirst,
}

pub fn expand_score_to_games(score: Score, order: GameOrder) -> Vec<GameStep> {
    match order {
        GameOrder::SweepFirst => expand_sweep_first(score),
        GameOrder::LossesFirst => {
            let mut steps = repeat_step(GameStep::LoserWins, score.loser_games);
            steps.extend(repeat_step(GameStep::WinnerWins, score.winner_games));
            steps
        }
        GameOrder::WinsFirst => {
            let mut steps = repeat_step(GameStep::WinnerWins, score.winner_games);
            steps.extend(repeat_step(GameStep::LoserWins, score.loser_games));
            steps
        }
    }
}

fn expand_sweep_first(score: Score) -> Vec<GameStep> {
    let mut steps = repeat_step(GameStep::WinnerWins, score.margin());
    for _ in 0..score.loser_games {
        steps.push(GameStep::LoserWins);
        steps.push(GameStep::WinnerWins);
    }
    steps
}

fn repeat_step(step: GameStep, count: u32) -> Vec<GameStep> {
    (0..count).map(|_| step).collect()
}

pub fn count_total_games(scores: &[Score]) -> usize {
    scores.iter().map(|s| s.total_games() as usize).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use GameStep::{LoserWins as L, WinnerWins as W};

    #[test]
    fn test_clean_sweep_is_all_winner_steps() {
        let steps = expand_score_to_games(Score::new(3, 0), GameOrder::SweepFirst);
        assert_eq!(steps, vec![W, W, W]);
    }

    #[test]
    fn test_sweep_first_alternates_lost_games() {
        let steps = expand_score_to_games(Score::new(3, 2), GameOrder::SweepFirst);
        assert_eq!(steps, vec![W, L, W, L, W]);
    }

    #[test]
    fn test_losses_first_and_wins_first() {
        let score = Score::new(2, 1);
        assert_eq!(expand_score_to_games(score, GameOrder::LossesFirst), vec![L, W, W]);
        assert_eq!(expand_score_to_games(score, GameOrder::WinsFirst), vec![W, W, L]);
    }

    #[test]
    fn test_every_order_plays_every_game() {
        let score = Score::new(4, 3);
        for order in [GameOrder::SweepFirst, GameOrder::LossesFirst, GameOrder::WinsFirst] {
            let steps = expand_score_to_games(score, order);
            assert_eq!(steps.len(), 7);
            assert_eq!(steps.iter().filter(|s| **s == W).count(), 4);
        }
        assert_eq!(count_total_games(&[score, Score::new(2, 0)]), 9);
    }
}
