use std::collections::BTreeSet;

use pong_ranking::config::settings::AppConfig;
use pong_ranking::domain::Mode;
use pong_ranking::matchups::{
    doubles_matchup_count, search_doubles_matchups, search_singles_matchups, singles_matchup_count,
    DoublesEntry, SinglesEntry, SortKey, Thresholds,
};
use pong_ranking::rating::{Glicko2, Glicko2Rating, TrueSkill, TrueSkillRating};
use pong_ranking::services::processing::rate_csv;
use pong_ranking::snapshot::{read_snapshot, write_snapshot};

const SINGLES_LOG: &str = "\
date,winner,loser,score,venue
2023-01-09,Shane,Alex,3-0,Pong Detroit (Bert's)
2023-01-16,Alex,Mike,3-2,Norm's
2023-01-23,Mike,Shane,2-1,MTTA
2023-01-30,Shane,Nobody,3-1,The Moon
";

const DOUBLES_LOG: &str = "\
date,winner1,winner2,loser1,loser2,score,venue
2023-02-01,aa,bb,cc,dd,2-1,MTTA
2023-02-08,cc,aa,bb,dd,2-0,Norm's
";

#[test]
fn test_singles_log_history_lengths() {
    let log = rate_csv(SINGLES_LOG.as_bytes(), Mode::Singles, &AppConfig::new()).unwrap();

    assert_eq!(log.matches.len(), 3);
    assert_eq!(log.rejected.len(), 1);
    assert!(!log.players.contains_key("nobody"));

    // 3-0, then 2-1: prior + 3 + 3
    assert_eq!(log.players["shane"].singles_history().len(), 7);
    // 3-0, then 3-2: prior + 3 + 5
    assert_eq!(log.players["alex"].singles_history().len(), 9);
    // 3-2, then 2-1: prior + 5 + 3
    assert_eq!(log.players["mike"].singles_history().len(), 9);

    let ranked: Vec<&str> = log
        .sorted_players(Mode::Singles)
        .iter()
        .map(|p| p.username.as_str())
        .collect();
    assert_eq!(ranked.len(), 3);
    assert_eq!(log.venues.len(), 3);
}

#[test]
fn test_doubles_log_updates_all_four() {
    let log = rate_csv(DOUBLES_LOG.as_bytes(), Mode::Doubles, &AppConfig::new()).unwrap();

    assert_eq!(log.matches.len(), 2);
    for name in ["aa", "bb", "cc", "dd"] {
        let player = &log.players[name];
        assert!(player.has_played(Mode::Doubles));
        assert!(!player.has_played(Mode::Singles));
    }
    // dd lost both matches
    assert!(log.players["dd"].rating_doubles().mu < 25.0);
    assert_eq!(log.players["dd"].doubles_history().len(), 6);
}

#[test]
fn test_high_uncertainty_players_never_share_a_matchup() {
    let trueskill = TrueSkill::default();
    let roster: Vec<DoublesEntry> = ["aa", "bb", "cc", "dd", "new1", "new2"]
        .iter()
        .map(|&name| DoublesEntry {
            username: name.to_string(),
            rating: if name.starts_with("new") {
                TrueSkillRating::new(25.0, 25.0 / 3.0)
            } else {
                TrueSkillRating::new(25.0, 1.0)
            },
        })
        .collect();

    let thresholds = Thresholds {
        delta_mu: Some(5.0),
        uncertainty: Some(9.5),
    };
    let report =
        search_doubles_matchups(&trueskill, &roster, thresholds, 100, SortKey::Quality).unwrap();

    assert_eq!(report.total, doubles_matchup_count(6));
    assert_eq!(report.evaluated + report.skipped.total(), report.total);
    assert!(report.skipped.uncertainty > 0);
    assert!(!report.candidates.is_empty());
    for candidate in &report.candidates {
        assert!(!(candidate.involves("new1") && candidate.involves("new2")));
    }
}

#[test]
fn test_searches_cover_every_pairing() {
    let glicko = Glicko2::default();
    let trueskill = TrueSkill::default();

    for n in 4..=8usize {
        let singles: Vec<SinglesEntry> = (0..n)
            .map(|i| SinglesEntry {
                username: format!("p{i}"),
                rating: Glicko2Rating::new(1400.0 + 25.0 * i as f64, 120.0, 0.06),
            })
            .collect();
        let report =
            search_singles_matchups(&glicko, &singles, usize::MAX, SortKey::Balance).unwrap();
        assert_eq!(report.evaluated, singles_matchup_count(n));
        assert_eq!(report.candidates.len() as u64, report.total);

        let doubles: Vec<DoublesEntry> = (0..n)
            .map(|i| DoublesEntry {
                username: format!("p{i}"),
                rating: TrueSkillRating::new(20.0 + i as f64, 2.0),
            })
            .collect();
        let report = search_doubles_matchups(
            &trueskill,
            &doubles,
            Thresholds::default(),
            usize::MAX,
            SortKey::Quality,
        )
        .unwrap();
        assert_eq!(report.evaluated, doubles_matchup_count(n));

        let splits: BTreeSet<Vec<String>> = report
            .candidates
            .iter()
            .map(|c| {
                let mut key = c.side_a.clone();
                key.extend(c.side_b.iter().cloned());
                key
            })
            .collect();
        assert_eq!(splits.len() as u64, report.total);
    }
}

#[test]
fn test_snapshot_round_trip_through_public_api() {
    let log = rate_csv(SINGLES_LOG.as_bytes(), Mode::Singles, &AppConfig::new()).unwrap();
    let ranked = log.sorted_players(Mode::Singles);

    let mut buffer = Vec::new();
    let written = write_snapshot(ranked.iter().copied(), Mode::Singles, &mut buffer).unwrap();
    assert_eq!(written, 3);

    let loaded = read_snapshot(buffer.as_slice(), Mode::Singles).unwrap();
    let shane = &loaded["shane"];
    let original = &log.players["shane"];
    assert_eq!(shane.rating.mu(), original.rating_singles().mu);
    assert_eq!(shane.mu_history, original.mu_history(Mode::Singles));
    assert!(shane.singles_entry().is_some());
    assert!(shane.doubles_entry().is_none());
}
