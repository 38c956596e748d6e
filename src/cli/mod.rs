//! Command-line interface for eventos.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// eventos - events, categories and registrations over HTTP
#[derive(Parser)]
#[command(name = "eventos")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config.toml (default: search the usual locations)
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    #[command(alias = "daemon")]
    Serve,

    /// Create a default config file
    Init,

    /// Create a user account
    CreateUser {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Give the account the administrator role
        #[arg(long)]
        admin: bool,
    },

    /// List user accounts
    #[command(alias = "ls")]
    Users {
        #[arg(long, default_value_t = 0)]
        skip: u64,
        #[arg(long, default_value_t = 100)]
        limit: u64,
    },
}

pub use commands::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["eventos"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn create_user_arguments() {
        let cli = Cli::try_parse_from([
            "eventos",
            "create-user",
            "--name",
            "Ana",
            "--email",
            "ana@example.com",
            "--password",
            "secret-pass",
            "--admin",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::CreateUser { name, admin, .. }) => {
                assert_eq!(name, "Ana");
                assert!(admin);
            }
            _ => panic!("expected create-user"),
        }
    }

    #[test]
    fn config_flag_is_global() {
        let cli =
            Cli::try_parse_from(["eventos", "users", "--config", "/tmp/eventos.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/eventos.toml")));
    }
}
