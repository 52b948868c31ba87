//! TodoBot - terminal chat client
//!
#![doc = "TodoBot - terminal chat client"]
#![doc = "Main entry point for the TodoBot application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use todobot::cli::{Cli, Commands, UserCommand};
use todobot::commands;
use todobot::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { user } => {
            tracing::info!("Starting interactive chat");
            if let Some(u) = &user {
                tracing::debug!("Selecting user on startup: {}", u);
            }
            commands::chat::run_chat(config, user).await?;
            Ok(())
        }
        Commands::Users { command } => match command {
            UserCommand::List { json } => {
                tracing::info!("Listing users");
                commands::users::list_users(config, json).await?;
                Ok(())
            }
            UserCommand::Add { name } => {
                tracing::info!("Adding user {}", name);
                commands::users::add_user(config, name).await?;
                Ok(())
            }
        },
        Commands::History { user } => {
            tracing::info!("Showing history for user {}", user);
            commands::history::show_history(config, user).await?;
            Ok(())
        }
        Commands::Todos { user, json } => {
            tracing::info!("Showing todos for user {}", user);
            commands::todos::show_todos(config, user, json).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber
///
/// `RUST_LOG` wins when set; otherwise only warnings are shown, or debug
/// output with `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "todobot=debug" } else { "todobot=warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
