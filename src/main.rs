use anyhow::Result;

use pong_ranking::cli::Command;
use pong_ranking::{
    handle_completions, handle_fetch, handle_matchups, handle_rank, interpret, RankOverrides,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Fetch => handle_fetch(),
        Command::Rank {
            skip_fetch,
            matches,
            graph,
            mode,
            delta_mu,
            uncertainty,
            top,
            order,
        } => {
            let overrides = RankOverrides {
                delta_mu: *delta_mu,
                uncertainty: *uncertainty,
                top: *top,
                order: *order,
            };
            handle_rank(*skip_fetch, *matches, *graph, *mode, &overrides)
        }
        Command::Matchups { mode, players } => handle_matchups(*mode, players),
        Command::Completions { shell } => handle_completions(*shell),
    }
}
