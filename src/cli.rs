//! Command-line interface definition for TodoBot
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive chat, user management, and
//! history and to-do inspection.

use clap::{Parser, Subcommand};

/// TodoBot - terminal chat client
///
/// Pick a user, chat with the TodoBot assistant, and replay the
/// conversation history kept by the backend.
#[derive(Parser, Debug, Clone)]
#[command(name = "todobot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the backend base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for TodoBot
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Select this user id on startup
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Manage users known to the backend
    Users {
        /// User management subcommand
        #[command(subcommand)]
        command: UserCommand,
    },

    /// Print the conversation history of a user
    History {
        /// User id whose history to print
        #[arg(short, long)]
        user: String,
    },

    /// Print the to-do list of a user
    Todos {
        /// User id whose to-do list to print
        #[arg(short, long)]
        user: String,

        /// Print the list and counts as JSON
        #[arg(long)]
        json: bool,
    },
}

/// User management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum UserCommand {
    /// List all users
    List {
        /// Print the list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a new user
    Add {
        /// Display name of the new user
        name: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            base_url: None,
            command: Commands::Chat { user: None },
        }
    }
}
