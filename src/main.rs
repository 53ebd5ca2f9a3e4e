//! Binary entry point for clipstash.
//!
//! This binary provides the CLI interface for the clipstash clipboard history.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use clap::{Parser, Subcommand};
use clipstash::cli::{
    CliContext, ListArgs, cmd_add, cmd_clear, cmd_daemon, cmd_delete, cmd_list, cmd_recall,
    cmd_status, read_selection,
};
use clipstash::config::{CONFIG_PATH_ENV, ClipConfig};
use clipstash::observability::{self, LoggingConfig};
use clipstash::rendering::ListOptions;
use clipstash::Result;
use std::path::PathBuf;
use std::process::ExitCode;

/// Clipstash - clipboard history for Wayland and X11.
#[derive(Parser, Debug)]
#[command(name = "clipstash")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose (debug) logging on stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Watch the clipboard and record every change.
    Daemon,

    /// Record the current clipboard content once.
    Add,

    /// List clipboard history, newest first.
    List {
        /// Number of clips to show.
        #[arg(short = 'n', long, default_value_t = 50)]
        limit: usize,

        /// Only print clip content (for pickers).
        #[arg(short, long)]
        simple: bool,

        /// Do not truncate long clips.
        #[arg(short, long)]
        full: bool,

        /// Print clips as a JSON array.
        #[arg(long, conflicts_with_all = ["simple", "full"])]
        json: bool,
    },

    /// Restore a clip to the clipboard (by ID, or from a line piped on stdin).
    Recall {
        /// ID of the clip to restore.
        id: Option<i64>,
    },

    /// Delete a clip (by ID, or from a line piped on stdin).
    Delete {
        /// ID of the clip to delete.
        id: Option<i64>,
    },

    /// Clear all history, or only clips matching a regex.
    Clear {
        /// Regex; clips whose content matches are removed.
        regex: Option<String>,
    },

    /// Show daemon and backend status.
    Status,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match ClipConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init(&LoggingConfig::from_env(&config, cli.verbose)) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli.command, CliContext::new(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_expected_miss() => {
            eprintln!("{e}");
            ExitCode::SUCCESS
        },
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(command: Commands, context: CliContext) -> Result<()> {
    match command {
        Commands::Daemon => cmd_daemon(&context),

        Commands::Add => {
            let backend = context.backend()?;
            let service = context.open_service()?;
            cmd_add(&service, backend.as_ref()).map(|_| ())
        },

        Commands::List {
            limit,
            simple,
            full,
            json,
        } => {
            let service = context.open_service()?;
            let args = ListArgs {
                limit,
                options: ListOptions { simple, full },
                json,
            };
            cmd_list(&service, args, &mut std::io::stdout().lock()).map(|_| ())
        },

        Commands::Recall { id } => {
            let selection = read_selection(id)?;
            let backend = context.backend()?;
            let service = context.open_service()?;
            if let Some(id) = cmd_recall(&service, backend.as_ref(), &selection)? {
                eprintln!("Restored clip {id}");
            }
            Ok(())
        },

        Commands::Delete { id } => {
            let selection = read_selection(id)?;
            let service = context.open_service()?;
            if let Some(id) = cmd_delete(&service, &selection)? {
                eprintln!("Deleted clip {id}");
            }
            Ok(())
        },

        Commands::Clear { regex } => {
            let service = context.open_service()?;
            let removed = cmd_clear(&service, regex.as_deref())?;
            match regex {
                Some(pattern) => eprintln!("Removed {removed} clip(s) matching '{pattern}'"),
                None => eprintln!("History cleared ({removed} clip(s) removed)"),
            }
            Ok(())
        },

        Commands::Status => {
            println!("{}", cmd_status(&context)?);
            Ok(())
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_list_flags() {
        let cli = Cli::try_parse_from(["clipstash", "list", "-n", "10", "-s"]).unwrap();
        match cli.command {
            Commands::List {
                limit,
                simple,
                full,
                json,
            } => {
                assert_eq!(limit, 10);
                assert!(simple);
                assert!(!full);
                assert!(!json);
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_list_defaults() {
        let cli = Cli::try_parse_from(["clipstash", "list"]).unwrap();
        assert!(matches!(cli.command, Commands::List { limit: 50, .. }));
    }

    #[test]
    fn test_recall_optional_id() {
        let cli = Cli::try_parse_from(["clipstash", "recall", "7"]).unwrap();
        assert!(matches!(cli.command, Commands::Recall { id: Some(7) }));

        let cli = Cli::try_parse_from(["clipstash", "recall"]).unwrap();
        assert!(matches!(cli.command, Commands::Recall { id: None }));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["clipstash", "clear", "foo.*", "--verbose", "--config", "/c.json"])
                .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/c.json")));
        assert!(matches!(cli.command, Commands::Clear { regex: Some(ref r) } if r == "foo.*"));
    }

    #[test]
    fn test_json_conflicts_with_simple() {
        assert!(Cli::try_parse_from(["clipstash", "list", "--json", "--simple"]).is_err());
    }
}
