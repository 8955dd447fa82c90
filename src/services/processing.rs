use std::collections::BTreeSet;

use anyhow::{anyhow, Result};
use log::info;

use crate::cache::Cache;
use crate::config::settings::AppConfig;
use crate::domain::rows::{read_doubles_rows, read_singles_rows};
use crate::domain::{Mode, PlayerRating};
use crate::output::{render_history, render_rankings, title};
use crate::rating::{process_match_log, FailurePolicy, ProcessedLog};
use crate::services::matchups::MatchupService;
use crate::snapshot::{save_snapshot, PlayerSnapshot};

/// What `pong rank` prints besides the rankings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankOptions {
    pub modes: Vec<Mode>,
    pub show_matchups: bool,
    pub show_graph: bool,
}

/// Rates the cached match logs, writes snapshots, prints rankings
pub struct ProcessingService {
    config: AppConfig,
    options: RankOptions,
    cache: Cache,
}

impl ProcessingService {
    pub fn new(config: AppConfig, options: RankOptions) -> Result<Self> {
        Ok(Self {
            cache: Cache::new(config.paths.cache_dir())?,
            config,
            options,
        })
    }

    pub fn run(&self) -> Result<()> {
        info!("=== Starting Rating Pass ===\n");

        for &mode in &self.options.modes {
            self.run_mode(mode)?;
        }

        info!("=== Rating Pass Complete ===");
        Ok(())
    }

    fn run_mode(&self, mode: Mode) -> Result<()> {
        let csv = self
            .cache
            .load_raw(mode.as_str())?
            .ok_or_else(|| anyhow!("No cached {} match log, run `pong fetch` first", mode))?;

        let log = rate_csv(&csv, mode, &self.config)?;
        let ranked = log.sorted_players(mode);
        save_snapshot(ranked.iter().copied(), mode, &self.config.paths.ratings_csv(mode))?;

        let shown = filter_roster(ranked, &self.config.players_present);
        println!(
            "{}",
            title(&format!(
                "{} rankings ({} players, {} matches, {} venues)",
                mode,
                shown.len(),
                log.matches.len(),
                log.venues.len()
            ))
        );
        print!("{}", render_rankings(&shown, mode));

        if self.options.show_graph {
            self.print_charts(&shown, mode);
        }

        if self.options.show_matchups {
            let roster: Vec<PlayerSnapshot> = shown
                .iter()
                .map(|p| PlayerSnapshot::from_player(p, mode))
                .collect();
            let service = MatchupService::new(&self.config);
            service.print_search(mode, &roster)?;
        }

        Ok(())
    }

    fn print_charts(&self, players: &[&PlayerRating], mode: Mode) {
        println!("{}", title("Rating progress charts"));
        let decimals = match mode {
            Mode::Singles => 0,
            Mode::Doubles => 1,
        };
        for player in players {
            println!("\n{} ({} games)", player.username, player.games_played(mode));
            print!("{}", render_history(&player.mu_history(mode), decimals));
        }
    }
}

/// Parses one mode's CSV export and replays it, skipping bad records
pub fn rate_csv(csv: &[u8], mode: Mode, config: &AppConfig) -> Result<ProcessedLog> {
    match mode {
        Mode::Singles => {
            process_match_log(&read_singles_rows(csv)?, config, FailurePolicy::SkipRecord)
        }
        Mode::Doubles => {
            process_match_log(&read_doubles_rows(csv)?, config, FailurePolicy::SkipRecord)
        }
    }
}

/// Keeps only the players present; an empty filter keeps everyone
pub fn filter_roster<'a>(
    players: Vec<&'a PlayerRating>,
    present: &BTreeSet<String>,
) -> Vec<&'a PlayerRating> {
    if present.is_empty() {
        return players;
    }
    players.into_iter().filter(|p| present.contains(&p.username)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::parse_player_list;

    const SINGLES_CSV: &str = "\
date,winner,loser,score,venue
2023-01-09,Shane,Alex,3-1,Pong Detroit (Bert's)
2023-01-10,Alex,Mike,2-0,Norm's
2023-01-11,Mike,Mike,2-0,Norm's
";

    #[test]
    fn test_rate_csv_skips_bad_rows() {
        let log = rate_csv(SINGLES_CSV.as_bytes(), Mode::Singles, &AppConfig::new()).unwrap();
        assert_eq!(log.matches.len(), 2);
        assert_eq!(log.rejected.len(), 1);
        assert_eq!(log.sorted_players(Mode::Singles).len(), 3);
    }

    #[test]
    fn test_filter_roster() {
        let log = rate_csv(SINGLES_CSV.as_bytes(), Mode::Singles, &AppConfig::new()).unwrap();
        let everyone = filter_roster(log.sorted_players(Mode::Singles), &BTreeSet::new());
        assert_eq!(everyone.len(), 3);

        let present = parse_player_list("SHANE mike");
        let shown = filter_roster(log.sorted_players(Mode::Singles), &present);
        let names: Vec<&str> = shown.iter().map(|p| p.username.as_str()).collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"shane") && names.contains(&"mike"));
    }
}
