//! Taskdeck TUI
//!
//! Terminal user interface over the shared cache.
//!
//! ## Layout
//!
//! - Top: route tabs (Dashboard, Todos, Users) and the API status
//! - Middle: the current view, with an error banner above stale data
//! - Bottom: status bar or command input
//!
//! ## Navigation
//!
//! - 1/2/3 or Tab: Switch view
//! - j/k or ↑/↓: Move selection up/down
//! - r: Refresh the current view
//! - c: Check API status
//! - q: Quit
//!
//! ## Commands
//!
//! - a: Add todo / user
//! - x: Toggle todo
//! - e: Edit
//! - u: Assign todo
//! - d: Delete
//! - :: Command mode
//!
//! Network work never runs on the draw loop: every action is spawned as a
//! task and the loop picks up the published state on the next frame.

mod app;
mod ui;

use std::fs::File;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use std::io::stdout;
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use taskdeck_core::{ApiClient, Config, Route, SharedCache, SyncResult, TodoPatch};

use app::{Action, App, InputMode};

/// Messages from background tasks to the draw loop
#[derive(Debug)]
enum AppEvent {
    /// Show a status message
    Status(String),
}

/// Run the TUI application
pub async fn run(config: Config, route: Route) -> Result<()> {
    // Initialize TUI logging (file-based, only if TASKDECK_LOG is set)
    init_tui_logging(&config);

    let client = ApiClient::from_config(&config)?;
    let base_url = client.base_url().to_string();
    let cache = SharedCache::new(client, &config);
    info!("Starting TUI against {}", base_url);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = App::new(cache, route, base_url);
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    // Probe the API once and load the first view
    spawn_action(app.cache(), Action::CheckHealth, event_tx.clone());
    if let Some(action) = app.navigate(route) {
        spawn_action(app.cache(), action, event_tx.clone());
    }

    let result = run_app(&mut terminal, &mut app, event_tx, event_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_tx: mpsc::UnboundedSender<AppEvent>,
    mut event_rx: mpsc::UnboundedReceiver<AppEvent>,
) -> Result<()> {
    loop {
        // Check for status message timeout
        app.check_status_timeout();

        // Pick up state published by background tasks
        app.sync_views();

        // Draw UI
        terminal.draw(|frame| ui::draw(frame, app))?;

        tokio::select! {
            biased;

            Some(event) = event_rx.recv() => {
                match event {
                    AppEvent::Status(message) => app.set_status(message),
                }
            }

            // Poll for terminal events
            _ = tokio::time::sleep(Duration::from_millis(50)) => {
                if event::poll(Duration::from_millis(0))? {
                    if let Event::Key(key) = event::read()? {
                        // Only handle key press events (not release)
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }

                        // If help is showing, any key dismisses it
                        if app.show_help {
                            app.show_help = false;
                            continue;
                        }

                        let action = match app.input_mode {
                            InputMode::Normal => handle_normal_mode(app, key.code, key.modifiers),
                            InputMode::Command => handle_command_mode(app, key.code, key.modifiers),
                            InputMode::Confirm => handle_confirm_mode(app, key.code),
                        };

                        if let Some(action) = action {
                            spawn_action(app.cache(), action, event_tx.clone());
                        }
                    }
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Handle key events in normal mode
fn handle_normal_mode(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Option<Action> {
    // Clear status message on navigation keys
    if matches!(
        code,
        KeyCode::Char('j')
            | KeyCode::Char('k')
            | KeyCode::Up
            | KeyCode::Down
            | KeyCode::Tab
            | KeyCode::BackTab
    ) {
        app.status_message = None;
    }

    match code {
        // Quit
        KeyCode::Char('q') => {
            app.should_quit = true;
            None
        }
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
            None
        }

        // Views
        KeyCode::Char(c @ '1'..='3') => {
            let index = c as usize - '1' as usize;
            app.navigate(Route::ALL[index])
        }
        KeyCode::Tab => {
            let next = app.route.next();
            app.navigate(next)
        }
        KeyCode::BackTab => {
            let prev = app.route.prev();
            app.navigate(prev)
        }

        KeyCode::Char('k') | KeyCode::Up => {
            app.move_up();
            None
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.move_down();
            None
        }

        KeyCode::Char('r') => Some(Action::refresh(app.route)),
        KeyCode::Char('c') => Some(Action::CheckHealth),
        KeyCode::Esc => {
            app.dismiss_error();
            None
        }

        KeyCode::Char('a') if app.route != Route::Dashboard => {
            app.enter_command_mode("add ");
            None
        }
        KeyCode::Char('e') => {
            app.enter_edit_mode();
            None
        }
        KeyCode::Char('u') if app.route == Route::Todos => {
            app.enter_command_mode("assign ");
            None
        }
        KeyCode::Char('x') | KeyCode::Char(' ') => app.toggle_current(),
        KeyCode::Char('d') => app.delete_current(),

        KeyCode::Char(':') => {
            app.enter_command_mode("");
            None
        }
        KeyCode::Char('?') => {
            app.toggle_help();
            None
        }

        _ => None,
    }
}

/// Handle key events in command mode
fn handle_command_mode(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Option<Action> {
    match code {
        // Cancel command
        KeyCode::Esc => app.exit_input_mode(),
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => app.exit_input_mode(),

        // Execute command
        KeyCode::Enter => return app.execute_command(),

        // Text input
        KeyCode::Char(c) => app.insert_char(c),
        KeyCode::Backspace => app.delete_char(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),

        _ => {}
    }
    None
}

/// Handle the y/n answer to a delete confirmation
fn handle_confirm_mode(app: &mut App, code: KeyCode) -> Option<Action> {
    app.answer_confirm(matches!(code, KeyCode::Char('y') | KeyCode::Char('Y')))
}

/// Run an action against the cache on a background task
fn spawn_action(cache: &SharedCache, action: Action, tx: mpsc::UnboundedSender<AppEvent>) {
    let cache = cache.clone();
    tokio::spawn(async move {
        if let Some(message) = perform(&cache, action).await {
            let _ = tx.send(AppEvent::Status(message));
        }
    });
}

/// Execute an action, returning a status message on success
///
/// Failures are already recorded in the view's error slot.
async fn perform(cache: &SharedCache, action: Action) -> Option<String> {
    let result: SyncResult<Option<String>> = match action {
        Action::RefreshStats => cache.stats().refresh().await.map(|_| None),
        Action::RefreshTodos => {
            let (todos, _) = tokio::join!(cache.todos().refresh(), cache.refresh_assignees());
            todos.map(|_| None)
        }
        Action::RefreshUsers => cache.users().refresh().await.map(|_| None),
        Action::CheckHealth => {
            let status = cache.health().check().await;
            Ok(Some(status.to_string()))
        }
        Action::AddTodo(draft) => cache
            .todos()
            .create(draft)
            .await
            .map(|created| created.map(|todo| format!("Added '{}'", todo.title))),
        Action::ToggleTodo(id) => cache.todos().toggle(id).await.map(|toggled| {
            toggled.map(|todo| {
                if todo.completed {
                    format!("Completed '{}'", todo.title)
                } else {
                    format!("Reopened '{}'", todo.title)
                }
            })
        }),
        Action::RenameTodo { id, title } => cache
            .todos()
            .update(id, TodoPatch::title(title))
            .await
            .map(|_| Some("Todo updated".to_string())),
        Action::AssignTodo { id, user_id } => cache
            .todos()
            .update(id, TodoPatch::assign(user_id))
            .await
            .map(|todo| match (todo.assigned_user_name, todo.assigned_user_id) {
                (Some(name), _) => Some(format!("Assigned to {}", name)),
                (None, Some(user_id)) => Some(format!("Assigned to user {}", user_id)),
                (None, None) => Some("Unassigned".to_string()),
            }),
        Action::DeleteTodo(id) => cache
            .todos()
            .delete(id)
            .await
            .map(|_| Some("Todo deleted".to_string())),
        Action::AddUser(draft) => cache
            .users()
            .create(draft)
            .await
            .map(|created| created.map(|user| format!("Added {}", user.name))),
        Action::UpdateUser { id, patch } => cache
            .users()
            .update(id, patch)
            .await
            .map(|user| Some(format!("Updated {}", user.name))),
        Action::DeleteUser(id) => cache
            .users()
            .delete(id)
            .await
            .map(|_| Some("User deleted".to_string())),
    };

    result.unwrap_or_else(|e| {
        debug!("Action failed: {}", e);
        None
    })
}

/// Initialize logging for TUI mode
///
/// Only initializes if TASKDECK_LOG environment variable is set.
/// Logs to file (config.log_file or default {data_dir}/debug.log).
fn init_tui_logging(config: &Config) {
    let Ok(log_level) = std::env::var(crate::LOG_ENV) else {
        return;
    };

    let log_path = config.log_path();
    if config.log_file.is_none() {
        let _ = config.ensure_data_dir();
    }

    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(crate::log_directives(&log_level));

    // Initialize file-based logging (ignore error if already initialized)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("TUI logging initialized to {:?}", log_path);
}
