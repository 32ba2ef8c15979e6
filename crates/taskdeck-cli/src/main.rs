//! Taskdeck CLI
//!
//! Command-line and terminal interface for the taskdeck todo/user backend.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use taskdeck_core::{ApiClient, ApiError, Config, Role, Route, SharedCache, SyncError};

mod commands;
mod output;
mod prompt;
mod tui;

use output::{Output, OutputFormat};

/// Environment variable that turns on logging
pub const LOG_ENV: &str = "TASKDECK_LOG";

#[derive(Parser)]
#[command(name = "taskdeck")]
#[command(about = "Taskdeck - todos and users from the terminal")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to an alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI interface
    Tui {
        /// View to open (/, /todos, /users)
        #[arg(long, default_value = "/")]
        path: Route,
    },
    /// Check whether the API is reachable
    Health,
    /// Show server statistics
    Stats,
    /// Manage todos
    Todo {
        #[command(subcommand)]
        command: TodoCommands,
    },
    /// Manage users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum TodoCommands {
    /// List all todos
    #[command(alias = "ls")]
    List,
    /// Add a todo
    #[command(alias = "create")]
    Add {
        /// Todo title
        title: String,
        /// Assign to a user id
        #[arg(short, long)]
        user: Option<i64>,
    },
    /// Toggle a todo between pending and completed
    #[command(alias = "toggle")]
    Done {
        /// Todo id
        id: i64,
    },
    /// Change a todo's title
    Edit {
        /// Todo id
        id: i64,
        /// New title
        title: String,
    },
    /// Assign a todo to a user, or unassign it
    Assign {
        /// Todo id
        id: i64,
        /// User id (omit to unassign)
        user: Option<i64>,
    },
    /// Delete a todo
    #[command(alias = "delete")]
    Rm {
        /// Todo id
        id: i64,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// List all users
    #[command(alias = "ls")]
    List,
    /// Show a single user
    Show {
        /// User id
        id: i64,
    },
    /// Add a user
    #[command(alias = "create")]
    Add {
        /// Full name
        name: String,
        /// Email address
        email: String,
        /// Role (user or admin)
        #[arg(short, long, default_value = "user")]
        role: Role,
    },
    /// Edit a user (prompts for values not given as flags)
    Edit {
        /// User id
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        role: Option<Role>,
    },
    /// Delete a user
    #[command(alias = "delete")]
    Rm {
        /// User id
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (mode, api_base_url, proxy_origin, new_todos_first, data_dir, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Config commands work even when the API is unreachable or misconfigured
    if let Some(Commands::Config { command }) = &cli.command {
        return handle_config_command(command.clone(), config_path, &output);
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    // Handle TUI (default when no command given)
    let route = match &cli.command {
        None => Some(Route::Dashboard),
        Some(Commands::Tui { path }) => Some(*path),
        _ => None,
    };
    if let Some(route) = route {
        return tui::run(config, route).await;
    }

    init_cli_logging();

    let client = ApiClient::from_config(&config)?;
    let cache = SharedCache::new(client.clone(), &config);

    let result = match cli.command {
        Some(Commands::Health) => commands::health::check(&cache, client.base_url(), &output).await,
        Some(Commands::Stats) => commands::stats::show(&cache, &output).await,
        Some(Commands::Todo { command }) => handle_todo_command(command, &cache, &output).await,
        Some(Commands::User { command }) => {
            handle_user_command(command, &client, &cache, &output).await
        }
        Some(Commands::Tui { .. }) | Some(Commands::Config { .. }) | None => Ok(()),
    };

    if let Err(ref e) = result {
        let hint = match e.downcast_ref::<SyncError>() {
            Some(sync) => sync.source.recovery_suggestion(),
            None => e
                .downcast_ref::<ApiError>()
                .and_then(|api| api.recovery_suggestion()),
        };
        if let Some(hint) = hint {
            if !output.is_quiet() {
                eprintln!("hint: {}", hint);
            }
        }
    }

    result
}

async fn handle_todo_command(
    command: TodoCommands,
    cache: &SharedCache,
    output: &Output,
) -> Result<()> {
    match command {
        TodoCommands::List => commands::todo::list(cache, output).await,
        TodoCommands::Add { title, user } => commands::todo::add(cache, title, user, output).await,
        TodoCommands::Done { id } => commands::todo::toggle(cache, id, output).await,
        TodoCommands::Edit { id, title } => commands::todo::edit(cache, id, title, output).await,
        TodoCommands::Assign { id, user } => commands::todo::assign(cache, id, user, output).await,
        TodoCommands::Rm { id } => commands::todo::delete(cache, id, output).await,
    }
}

async fn handle_user_command(
    command: UserCommands,
    client: &ApiClient,
    cache: &SharedCache,
    output: &Output,
) -> Result<()> {
    match command {
        UserCommands::List => commands::user::list(cache, output).await,
        UserCommands::Show { id } => commands::user::show(client, id, output).await,
        UserCommands::Add { name, email, role } => {
            commands::user::add(cache, name, email, role, output).await
        }
        UserCommands::Edit {
            id,
            name,
            email,
            role,
        } => commands::user::edit(client, cache, id, name, email, role, output).await,
        UserCommands::Rm { id, yes } => commands::user::delete(client, cache, id, yes, output).await,
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Log to stderr when TASKDECK_LOG is set (e.g. TASKDECK_LOG=debug)
fn init_cli_logging() {
    use tracing_subscriber::EnvFilter;

    let Ok(log_level) = std::env::var(LOG_ENV) else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_directives(&log_level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Filter directives scoping a log level to taskdeck's own crates
fn log_directives(level: &str) -> String {
    format!("taskdeck_core={},taskdeck={}", level, level)
}
