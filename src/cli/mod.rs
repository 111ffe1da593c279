//! CLI module for the game server
//!
//! Provides command-line interface parsing for the game-server binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod init;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Cloudflower game backend server
///
/// Account registration, token authentication and character persistence
/// over a REST API.
#[derive(Parser, Debug)]
#[command(
    name = "game-server",
    version,
    about = "Cloudflower game backend server",
    long_about = "Account registration, token authentication and character persistence over a REST API.\n\n\
                  Run without arguments to start the server, or use 'init' to scaffold a deployment.",
    after_help = "EXAMPLES:\n    \
                  game-server init              # Scaffold game.toml and .env.example\n    \
                  game-server                   # Start the server (requires game.toml)\n    \
                  game-server config --validate # Check configuration and secrets\n    \
                  game-server --config my.toml  # Use a custom config file"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "game.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scaffold game.toml, .env.example and the data/ directory
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,

        /// Leave the starter item and quest catalog out
        #[arg(long)]
        no_catalog: bool,

        /// Host address for the server
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port for the server
        #[arg(long, default_value = "3000")]
        port: u16,
    },

    /// Show configuration information
    Config {
        /// Show the full configuration, including the catalog
        #[arg(short = 'f', long)]
        full: bool,

        /// Validate the configuration file and referenced secrets
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_serves() {
        let cli = Cli::try_parse_from(["game-server"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("game.toml"));
    }

    #[test]
    fn test_init_flags() {
        let cli = Cli::try_parse_from([
            "game-server",
            "--no-color",
            "init",
            "deploy",
            "--force",
            "--port",
            "8080",
        ])
        .unwrap();

        assert!(cli.no_color);
        match cli.command {
            Some(Commands::Init {
                path, force, port, ..
            }) => {
                assert_eq!(path, PathBuf::from("deploy"));
                assert!(force);
                assert_eq!(port, 8080);
            }
            other => panic!("Expected Init, got {:?}", other),
        }
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli =
            Cli::try_parse_from(["game-server", "config", "--validate", "-c", "other.toml"]).unwrap();

        assert_eq!(cli.config, PathBuf::from("other.toml"));
        assert!(matches!(
            cli.command,
            Some(Commands::Config { validate: true, full: false })
        ));
    }
}
