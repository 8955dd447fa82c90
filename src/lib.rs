pub mod cache;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod fetchers;
pub mod http;
pub mod matchups;
pub mod output;
pub mod probability;
pub mod rating;
pub mod services;
pub mod snapshot;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use cli::Cli;

use crate::cli::{Command, ModeSelection};
use crate::config::settings::AppConfig;
use crate::domain::{GameOrder, Mode};
use crate::services::ingestion::IngestionService;
use crate::services::matchups::MatchupService;
use crate::services::processing::{ProcessingService, RankOptions};

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

/// Command-line overrides for `rank`; `None` keeps the configured value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankOverrides {
    pub delta_mu: Option<f64>,
    pub uncertainty: Option<f64>,
    pub top: Option<usize>,
    pub order: Option<GameOrder>,
}

impl RankOverrides {
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(delta_mu) = self.delta_mu {
            config.matchups.delta_mu_threshold = delta_mu;
        }
        if let Some(uncertainty) = self.uncertainty {
            config.matchups.uncertainty_threshold = uncertainty;
        }
        if let Some(top) = self.top {
            config.matchups.top_n = top;
        }
        if let Some(order) = self.order {
            config.engine.game_order = order;
        }
    }
}

pub fn handle_fetch() -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = AppConfig::from_env();
        let service = IngestionService::new(&config)?;
        service.run().await
    })
}

pub fn handle_rank(
    skip_fetch: bool,
    show_matchups: bool,
    show_graph: bool,
    modes: ModeSelection,
    overrides: &RankOverrides,
) -> Result<()> {
    if !skip_fetch {
        handle_fetch()?;
    }

    let mut config = AppConfig::from_env();
    overrides.apply(&mut config);

    let options = RankOptions {
        modes: modes.modes(),
        show_matchups,
        show_graph,
    };
    let service = ProcessingService::new(config, options)?;
    service.run()
}

pub fn handle_matchups(mode: Mode, players: &[String]) -> Result<()> {
    let config = AppConfig::from_env();
    let service = MatchupService::new(&config);
    service.run(mode, players)
}

pub fn handle_completions(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_only_touch_given_values() {
        let mut config = AppConfig::new();
        let overrides = RankOverrides {
            top: Some(3),
            order: Some(GameOrder::WinsFirst),
            ..Default::default()
        };
        overrides.apply(&mut config);

        assert_eq!(config.matchups.top_n, 3);
        assert_eq!(config.engine.game_order, GameOrder::WinsFirst);
        assert_eq!(config.matchups.delta_mu_threshold, 5.0);
        assert_eq!(config.matchups.uncertainty_threshold, 9.5);
    }
}
