use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::domain::{GameOrder, Mode};
use crate::matchups::SortKey;

pub struct Glicko2Settings {
    pub mu: f64,
    pub phi: f64,
    pub sigma: f64,
    pub tau: f64,
    pub epsilon: f64,
}

impl Default for Glicko2Settings {
    fn default() -> Self {
        Self {
            mu: 1500.0,
            phi: 350.0,
            sigma: 0.06,
            tau: 1.0,
            epsilon: 0.000_001,
        }
    }
}

pub struct TrueSkillSettings {
    pub mu: f64,
    pub sigma: f64,
    pub beta: f64,
    pub tau: f64,
    /// Doubles games cannot end level, so this stays 0 unless a caller opts in
    pub draw_probability: f64,
}

impl Default for TrueSkillSettings {
    fn default() -> Self {
        let mu = 25.0;
        let sigma = mu / 3.0;
        Self {
            mu,
            sigma,
            beta: sigma / 2.0,
            tau: sigma / 100.0,
            draw_probability: 0.0,
        }
    }
}

pub struct EngineSettings {
    pub game_order: GameOrder,
    pub min_username_len: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            game_order: GameOrder::SweepFirst,
            min_username_len: 2,
        }
    }
}

pub struct MatchupSettings {
    pub delta_mu_threshold: f64,
    pub uncertainty_threshold: f64,
    pub top_n: usize,
    pub singles_sort: SortKey,
    pub doubles_sort: SortKey,
}

impl Default for MatchupSettings {
    fn default() -> Self {
        Self {
            delta_mu_threshold: 5.0,
            uncertainty_threshold: 9.5,
            top_n: 15,
            singles_sort: SortKey::Quality,
            doubles_sort: SortKey::Quality,
        }
    }
}

pub struct SheetSettings {
    pub sheet_key: String,
    pub gid_singles: u64,
    pub gid_doubles: u64,
    pub timeout_secs: u64,
    pub retries: u32,
    pub retry_delay_ms: u64,
    pub user_agent: &'static str,
    pub base_url: &'static str,
}

impl Default for SheetSettings {
    fn default() -> Self {
        Self {
            sheet_key: "1evcgUzJ5hO55RYshc3dH-EmzZfor58t0qPB-zp8iw4A".to_string(),
            gid_singles: 834797930,
            gid_doubles: 682349527,
            timeout_secs: 2,
            retries: 2,
            retry_delay_ms: 500,
            user_agent: "PongRanking/1.0",
            base_url: "https://docs.google.com/spreadsheet/ccc",
        }
    }
}


pub struct DataPaths {
    pub data_dir: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

impl DataPaths {
    pub fn ratings_csv(&self, mode: Mode) -> PathBuf {
        self.data_dir.join(format!("ratings_{}.csv", mode.as_str()))
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.data_dir.join("cache")
    }
}

pub struct AppConfig {
    pub singles: Glicko2Settings,
    pub doubles: TrueSkillSettings,
    pub engine: EngineSettings,
    pub matchups: MatchupSettings,
    pub sheet: SheetSettings,
    pub paths: DataPaths,
    /// Usernames to keep in rankings and matchup rosters; empty keeps everyone
    pub players_present: BTreeSet<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            singles: Glicko2Settings::default(),
            doubles: TrueSkillSettings::default(),
            engine: EngineSettings::default(),
            matchups: MatchupSettings::default(),
            sheet: SheetSettings::default(),
            paths: DataPaths::default(),
            players_present: BTreeSet::new(),
        }
    }

    /// Defaults overridden by a `.env` file and the process environment
    pub fn from_env() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            log::debug!("No .env file loaded: {}", e);
        }

        let mut config = Self::new();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("PONG_SHEET_KEY") {
            self.sheet.sheet_key = key;
        }
        if let Some(gid) = lookup("PONG_SHEET_GID_SINGLES").and_then(|v| v.parse().ok()) {
            self.sheet.gid_singles = gid;
        }
        if let Some(gid) = lookup("PONG_SHEET_GID_DOUBLES").and_then(|v| v.parse().ok()) {
            self.sheet.gid_doubles = gid;
        }
        if let Some(dir) = lookup("PONG_DATA_DIR") {
            self.paths.data_dir = PathBuf::from(dir);
        }
        if let Some(players) = lookup("PLAYERS") {
            self.players_present = parse_player_list(&players);
        }
    }
}

/// Whitespace-separated usernames, normalized the same way as the match log
pub fn parse_player_list(raw: &str) -> BTreeSet<String> {
    raw.split_whitespace()
        .map(crate::domain::parsers::normalize_username)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_trueskill_defaults_follow_mu() {
        let ts = TrueSkillSettings::default();
        assert!((ts.sigma - 25.0 / 3.0).abs() < 1e-12);
        assert!((ts.beta - ts.sigma / 2.0).abs() < 1e-12);
        assert_eq!(ts.draw_probability, 0.0);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("PONG_SHEET_GID_SINGLES", "42"),
            ("PONG_DATA_DIR", "/tmp/pong"),
            ("PLAYERS", "Alice  bob\tCarol"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::new();
        config.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.sheet.gid_singles, 42);
        assert_eq!(config.sheet.gid_doubles, 682349527);
        assert_eq!(
            config.paths.ratings_csv(Mode::Doubles),
            PathBuf::from("/tmp/pong/ratings_doubles.csv")
        );
        assert_eq!(
            config.players_present.into_iter().collect::<Vec<_>>(),
            vec!["alice", "bob", "carol"]
        );
    }
}
