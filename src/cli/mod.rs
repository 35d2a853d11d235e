//! CLI module for the API key desk
//!
//! Provides subcommands for running the desk in different modes:
//! - `serve`: API + browser page combined (default)
//! - `api`: API server only
//! - `ui`: browser page with optional API proxy
//! - `console`: terminal client for a running API
//! - `session`: mint a development session token

pub mod api;
pub mod console;
pub mod serve;
pub mod session;
pub mod ui;

mod common;

use clap::{Parser, Subcommand};

/// API key desk - issue and verify API keys through a hosted key service
#[derive(Parser)]
#[command(name = "api-key-desk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run API + browser page combined (default mode)
    Serve(serve::ServeArgs),

    /// Run API server only
    Api,

    /// Run the browser page with optional API proxy
    Ui(ui::UiArgs),

    /// Generate and validate keys from the terminal
    Console(console::ConsoleArgs),

    /// Print a development session token signed with session.secret
    Session(session::SessionArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_none() {
        let cli = Cli::try_parse_from(["api-key-desk"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_session_command() {
        let cli = Cli::try_parse_from(["api-key-desk", "session", "--user", "user_42"]).unwrap();

        match cli.command {
            Some(Command::Session(args)) => {
                assert_eq!(args.user, "user_42");
                assert_eq!(args.ttl_minutes, 60);
            }
            _ => panic!("expected session command"),
        }
    }

    #[test]
    fn test_parse_ui_command() {
        let cli = Cli::try_parse_from(["api-key-desk", "ui", "--skip-proxy", "--port", "3000"]).unwrap();

        match cli.command {
            Some(Command::Ui(args)) => {
                assert!(args.skip_proxy);
                assert_eq!(args.port, Some(3000));
            }
            _ => panic!("expected ui command"),
        }
    }
}
