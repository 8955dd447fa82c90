use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use crate::domain::{GameOrder, Mode};

#[derive(Parser, Debug)]
#[command(author, version, about = "pong ratings: Glicko-2 singles, TrueSkill doubles")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

/// Which match logs `rank` processes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ModeSelection {
    Singles,
    Doubles,
    #[default]
    Both,
}

impl ModeSelection {
    pub fn modes(&self) -> Vec<Mode> {
        match self {
            ModeSelection::Singles => vec![Mode::Singles],
            ModeSelection::Doubles => vec![Mode::Doubles],
            ModeSelection::Both => vec![Mode::Singles, Mode::Doubles],
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Download both match logs from the sheet into the local cache
    Fetch,
    /// Rate every cached match, write snapshots and print the rankings
    Rank {
        /// Use the cached CSVs without downloading first
        #[arg(short, long)]
        skip_fetch: bool,
        /// Also print the best matchups among the shown players
        #[arg(short, long)]
        matches: bool,
        /// Print a rating progress chart per player
        #[arg(short, long)]
        graph: bool,
        #[arg(long, value_enum, default_value_t = ModeSelection::Both)]
        mode: ModeSelection,
        /// Largest team mean difference a doubles matchup may have
        #[arg(long)]
        delta_mu: Option<f64>,
        /// Largest combined uncertainty a doubles matchup may have
        #[arg(long)]
        uncertainty: Option<f64>,
        /// Number of matchups to print
        #[arg(long)]
        top: Option<usize>,
        /// Order in which a match score is replayed as single games
        #[arg(long, value_enum)]
        order: Option<GameOrder>,
    },
    /// Rank matchups from the last snapshot; name 2 (singles) or 4 (doubles) players for full odds
    Matchups {
        #[arg(long, value_enum, default_value_t = Mode::Singles)]
        mode: Mode,
        /// Usernames; doubles pairs the first two against the last two
        players: Vec<String>,
    },
    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_flags() {
        let args = [
            "pong", "rank", "-s", "-m", "--mode", "doubles", "--delta-mu", "3.5", "--top", "5",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Rank {
                skip_fetch,
                matches,
                graph,
                mode,
                delta_mu,
                top,
                order,
                ..
            } => {
                assert!(skip_fetch && matches && !graph);
                assert_eq!(mode.modes(), vec![Mode::Doubles]);
                assert_eq!(delta_mu, Some(3.5));
                assert_eq!(top, Some(5));
                assert_eq!(order, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_rank_long_flags_are_kebab_case() {
        let args = [
            "pong",
            "rank",
            "--skip-fetch",
            "--matches",
            "--graph",
            "--delta-mu",
            "4",
            "--uncertainty",
            "8.5",
            "--order",
            "wins-first",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Rank {
                skip_fetch,
                matches,
                graph,
                delta_mu,
                uncertainty,
                order,
                ..
            } => {
                assert!(skip_fetch && matches && graph);
                assert_eq!(delta_mu, Some(4.0));
                assert_eq!(uncertainty, Some(8.5));
                assert_eq!(order, Some(GameOrder::WinsFirst));
            }
            other => panic!("unexpected command {other:?}"),
        }

        assert!(Cli::try_parse_from(["pong", "rank", "--deltamu", "4"]).is_err());
        assert!(Cli::try_parse_from(["pong", "rank", "--skipfetch"]).is_err());
    }

    #[test]
    fn test_subcommand_names() {
        assert_eq!(Cli::try_parse_from(["pong", "fetch"]).unwrap().command, Command::Fetch);
        assert!(Cli::try_parse_from(["pong", "completions", "bash"]).is_ok());
        assert!(Cli::try_parse_from(["pong", "matchups"]).is_ok());
    }

    #[test]
    fn test_matchups_players() {
        let args = ["pong", "matchups", "--mode", "doubles", "aa", "bb", "cc", "dd"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(
            cli.command,
            Command::Matchups {
                mode: Mode::Doubles,
                players: vec!["aa".into(), "bb".into(), "cc".into(), "dd".into()],
            }
        );
    }

    #[test]
    fn test_game_order_values() {
        let cli = Cli::try_parse_from(["pong", "rank", "--order", "losses-first"]).unwrap();
        assert!(matches!(cli.command, Command::Rank { order: Some(GameOrder::LossesFirst), .. }));
        assert!(Cli::try_parse_from(["pong", "rank", "--order", "random"]).is_err());
    }
}
