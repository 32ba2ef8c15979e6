//! Application state and logic

use std::collections::HashSet;

use tokio::sync::watch;

use taskdeck_core::models::UserId;
use taskdeck_core::sync::StatsState;
use taskdeck_core::{
    ApiStatus, CollectionState, NewTodo, NewUser, Role, Route, SharedCache, Todo, User, UserPatch,
};

/// Input mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal navigation mode
    Normal,
    /// Command input mode (after pressing : or command key)
    Command,
    /// Waiting for y/n before deleting a user
    Confirm,
}

/// Work handed to a background task
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    RefreshStats,
    /// Refresh todos and the users offered for assignment
    RefreshTodos,
    RefreshUsers,
    CheckHealth,
    AddTodo(NewTodo),
    ToggleTodo(i64),
    RenameTodo { id: i64, title: String },
    AssignTodo { id: i64, user_id: Option<UserId> },
    DeleteTodo(i64),
    AddUser(NewUser),
    UpdateUser { id: UserId, patch: UserPatch },
    DeleteUser(UserId),
}

impl Action {
    /// Refresh that loads a view's data
    pub fn refresh(route: Route) -> Self {
        match route {
            Route::Dashboard => Action::RefreshStats,
            Route::Todos => Action::RefreshTodos,
            Route::Users => Action::RefreshUsers,
        }
    }
}

/// User awaiting delete confirmation
#[derive(Debug, Clone, PartialEq)]
pub struct PendingDelete {
    pub id: UserId,
    pub name: String,
}

/// Application state
pub struct App {
    /// Whether the app should exit
    pub should_quit: bool,
    /// View currently shown
    pub route: Route,
    /// Views that have loaded their data at least once
    mounted: HashSet<Route>,
    /// Current input mode
    pub input_mode: InputMode,
    /// Command input buffer
    pub command_input: String,
    /// Cursor position in command input (in characters)
    pub command_cursor: usize,
    /// Status message to display temporarily
    pub status_message: Option<String>,
    /// When the status message was set (for auto-dismiss)
    pub status_message_time: Option<std::time::Instant>,
    /// Whether help overlay is visible
    pub show_help: bool,
    /// Selected row in the todo list
    pub todo_index: usize,
    /// Selected row in the user list
    pub user_index: usize,
    pub pending_delete: Option<PendingDelete>,
    /// Latest snapshots, refreshed from the cache every frame
    pub todos: CollectionState<Todo>,
    pub users: CollectionState<User>,
    pub stats: StatsState,
    pub api_status: ApiStatus,
    /// Base URL shown in the footer
    pub base_url: String,
    cache: SharedCache,
    todos_rx: watch::Receiver<CollectionState<Todo>>,
    users_rx: watch::Receiver<CollectionState<User>>,
    stats_rx: watch::Receiver<StatsState>,
    health_rx: watch::Receiver<ApiStatus>,
}

impl App {
    /// Create a new app over the shared cache
    pub fn new(cache: SharedCache, route: Route, base_url: impl Into<String>) -> Self {
        let todos_rx = cache.todos().subscribe();
        let users_rx = cache.users().subscribe();
        let stats_rx = cache.stats().subscribe();
        let health_rx = cache.health().subscribe();
        let todos = todos_rx.borrow().clone();
        let users = users_rx.borrow().clone();
        let stats = stats_rx.borrow().clone();
        let api_status = *health_rx.borrow();

        Self {
            should_quit: false,
            route,
            mounted: HashSet::new(),
            input_mode: InputMode::Normal,
            command_input: String::new(),
            command_cursor: 0,
            status_message: None,
            status_message_time: None,
            show_help: false,
            todo_index: 0,
            user_index: 0,
            pending_delete: None,
            todos,
            users,
            stats,
            api_status,
            base_url: base_url.into(),
            cache,
            todos_rx,
            users_rx,
            stats_rx,
            health_rx,
        }
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    /// Pull any state published since the last frame
    pub fn sync_views(&mut self) {
        if self.todos_rx.has_changed().unwrap_or(false) {
            self.todos = self.todos_rx.borrow_and_update().clone();
            self.todo_index = clamp_index(self.todo_index, self.todos.items.len());
        }
        if self.users_rx.has_changed().unwrap_or(false) {
            self.users = self.users_rx.borrow_and_update().clone();
            self.user_index = clamp_index(self.user_index, self.users.items.len());
        }
        if self.stats_rx.has_changed().unwrap_or(false) {
            self.stats = self.stats_rx.borrow_and_update().clone();
        }
        if self.health_rx.has_changed().unwrap_or(false) {
            self.api_status = *self.health_rx.borrow_and_update();
        }
    }

    /// Show a route, loading its data the first time it is shown
    pub fn navigate(&mut self, route: Route) -> Option<Action> {
        self.route = route;
        self.exit_input_mode();
        if self.mounted.insert(route) {
            Some(Action::refresh(route))
        } else {
            None
        }
    }

    /// Error message of the current view
    pub fn current_error(&self) -> Option<&str> {
        match self.route {
            Route::Dashboard => self.stats.error.as_deref(),
            Route::Todos => self.todos.error.as_deref(),
            Route::Users => self.users.error.as_deref(),
        }
    }

    /// Dismiss the current view's error banner
    pub fn dismiss_error(&mut self) {
        match self.route {
            Route::Todos => self.cache.todos().dismiss_error(),
            Route::Users => self.cache.users().dismiss_error(),
            // Statistics errors clear on the next successful refresh
            Route::Dashboard => {}
        }
    }

    /// Set a status message (will auto-dismiss after 3 seconds)
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_message_time = Some(std::time::Instant::now());
    }

    /// Check and clear expired status message
    pub fn check_status_timeout(&mut self) {
        if let Some(time) = self.status_message_time {
            if time.elapsed() > std::time::Duration::from_secs(3) {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn current_todo(&self) -> Option<&Todo> {
        self.todos.items.get(self.todo_index)
    }

    pub fn current_user(&self) -> Option<&User> {
        self.users.items.get(self.user_index)
    }

    /// Move selection up in the current view
    pub fn move_up(&mut self) {
        match self.route {
            Route::Todos => self.todo_index = self.todo_index.saturating_sub(1),
            Route::Users => self.user_index = self.user_index.saturating_sub(1),
            Route::Dashboard => {}
        }
    }

    /// Move selection down in the current view
    pub fn move_down(&mut self) {
        match self.route {
            Route::Todos => {
                if self.todo_index < self.todos.items.len().saturating_sub(1) {
                    self.todo_index += 1;
                }
            }
            Route::Users => {
                if self.user_index < self.users.items.len().saturating_sub(1) {
                    self.user_index += 1;
                }
            }
            Route::Dashboard => {}
        }
    }

    /// Enter command mode with pre-filled input
    pub fn enter_command_mode(&mut self, prefill: impl Into<String>) {
        self.input_mode = InputMode::Command;
        self.command_input = prefill.into();
        self.command_cursor = self.command_input.chars().count();
    }

    /// Pre-fill the edit command for the selected row
    pub fn enter_edit_mode(&mut self) {
        let prefill = match self.route {
            Route::Todos => self.current_todo().map(|t| format!("edit {}", t.title)),
            Route::Users => self
                .current_user()
                .map(|u| format!("edit {}, {}, {}", u.name, u.email, u.role)),
            Route::Dashboard => None,
        };
        match prefill {
            Some(prefill) => self.enter_command_mode(prefill),
            None => self.set_status("Nothing selected"),
        }
    }

    /// Exit command/confirm mode
    pub fn exit_input_mode(&mut self) {
        self.input_mode = InputMode::Normal;
        self.command_input.clear();
        self.command_cursor = 0;
        self.pending_delete = None;
    }

    /// Insert character at cursor position
    pub fn insert_char(&mut self, c: char) {
        let at = byte_offset(&self.command_input, self.command_cursor);
        self.command_input.insert(at, c);
        self.command_cursor += 1;
    }

    /// Delete character before cursor
    pub fn delete_char(&mut self) {
        if self.command_cursor > 0 {
            self.command_cursor -= 1;
            let at = byte_offset(&self.command_input, self.command_cursor);
            self.command_input.remove(at);
        }
    }

    /// Move cursor left
    pub fn cursor_left(&mut self) {
        self.command_cursor = self.command_cursor.saturating_sub(1);
    }

    /// Move cursor right
    pub fn cursor_right(&mut self) {
        if self.command_cursor < self.command_input.chars().count() {
            self.command_cursor += 1;
        }
    }

    /// Toggle the selected todo
    pub fn toggle_current(&mut self) -> Option<Action> {
        if self.route != Route::Todos {
            return None;
        }
        self.current_todo().map(|t| Action::ToggleTodo(t.id))
    }

    /// Delete the selected row; users ask for confirmation first
    pub fn delete_current(&mut self) -> Option<Action> {
        match self.route {
            Route::Todos => self.current_todo().map(|t| Action::DeleteTodo(t.id)),
            Route::Users => {
                let user = self.current_user()?;
                self.pending_delete = Some(PendingDelete {
                    id: user.id,
                    name: user.name.clone(),
                });
                self.input_mode = InputMode::Confirm;
                None
            }
            Route::Dashboard => None,
        }
    }

    /// Resolve a y/n answer to the pending delete
    pub fn answer_confirm(&mut self, yes: bool) -> Option<Action> {
        let pending = self.pending_delete.take();
        self.exit_input_mode();
        match pending {
            Some(pending) if yes => Some(Action::DeleteUser(pending.id)),
            Some(_) => {
                self.set_status("Cancelled");
                None
            }
            None => None,
        }
    }

    /// Parse and execute command from input
    pub fn execute_command(&mut self) -> Option<Action> {
        let input = self.command_input.trim().to_string();
        self.exit_input_mode();

        let (verb, rest) = match input.split_once(' ') {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (input.as_str(), ""),
        };

        match (self.route, verb) {
            (_, "") => None,
            (_, "q") | (_, "quit") => {
                self.should_quit = true;
                None
            }
            (_, "health") => Some(Action::CheckHealth),
            (route, "refresh") => Some(Action::refresh(route)),
            (_, "go") => match rest.parse::<Route>() {
                Ok(route) => self.navigate(route),
                Err(e) => {
                    self.set_status(e);
                    None
                }
            },
            // Blank titles are ignored without a request
            (Route::Todos, "add") => Some(Action::AddTodo(NewTodo::new(rest))),
            (Route::Todos, "edit") => {
                let id = self.current_todo()?.id;
                if rest.is_empty() {
                    return None;
                }
                Some(Action::RenameTodo {
                    id,
                    title: rest.to_string(),
                })
            }
            (Route::Todos, "assign") => {
                let id = self.current_todo()?.id;
                match self.resolve_assignee(rest) {
                    Ok(user_id) => Some(Action::AssignTodo { id, user_id }),
                    Err(msg) => {
                        self.set_status(msg);
                        None
                    }
                }
            }
            (Route::Users, "add") => match parse_user_fields(rest) {
                Ok((name, email, role)) => {
                    Some(Action::AddUser(NewUser::new(name, email, role.unwrap_or_default())))
                }
                Err(msg) => {
                    self.set_status(msg);
                    None
                }
            },
            (Route::Users, "edit") => {
                let current = self.current_user()?.clone();
                match parse_user_fields(rest) {
                    Ok((name, email, role)) => {
                        let patch = UserPatch {
                            name: Some(name).filter(|n| !n.is_empty() && *n != current.name),
                            email: Some(email).filter(|e| !e.is_empty() && *e != current.email),
                            role: role.filter(|r| *r != current.role),
                        };
                        if patch.is_empty() {
                            self.set_status("Nothing to change");
                            None
                        } else {
                            Some(Action::UpdateUser {
                                id: current.id,
                                patch,
                            })
                        }
                    }
                    Err(msg) => {
                        self.set_status(msg);
                        None
                    }
                }
            }
            _ => {
                self.set_status(format!("Unknown command: {}", input));
                None
            }
        }
    }

    /// Find the user named by `assign <id|name>`; empty or `none` unassigns
    fn resolve_assignee(&self, query: &str) -> Result<Option<UserId>, String> {
        if query.is_empty() || query.eq_ignore_ascii_case("none") {
            return Ok(None);
        }
        if let Ok(id) = query.parse::<UserId>() {
            return Ok(Some(id));
        }

        let needle = query.to_lowercase();
        let matches: Vec<&User> = self
            .users
            .items
            .iter()
            .filter(|u| u.name.to_lowercase().starts_with(&needle))
            .collect();

        match matches.as_slice() {
            [user] => Ok(Some(user.id)),
            [] => Err(format!("No user matching '{}'", query)),
            _ => Err(format!("'{}' matches {} users", query, matches.len())),
        }
    }
}

/// Parse `name, email[, role]`
fn parse_user_fields(input: &str) -> Result<(String, String, Option<Role>), String> {
    let parts: Vec<&str> = input.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [name, email] => Ok((name.to_string(), email.to_string(), None)),
        [name, email, role] => Ok((name.to_string(), email.to_string(), Some(role.parse()?))),
        _ => Err("Usage: add <name>, <email>[, user|admin]".to_string()),
    }
}

fn clamp_index(index: usize, len: usize) -> usize {
    index.min(len.saturating_sub(1))
}

fn byte_offset(s: &str, chars: usize) -> usize {
    s.char_indices().nth(chars).map(|(i, _)| i).unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskdeck_core::{ApiClient, Config};

    fn app(route: Route) -> App {
        let client = ApiClient::new("http://127.0.0.1:9/api").unwrap();
        let cache = SharedCache::new(client, &Config::default());
        App::new(cache, route, "http://127.0.0.1:9/api")
    }

    fn user(id: i64, name: &str) -> User {
        User {
            id,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            role: Role::User,
            created_at: chrono::Utc::now(),
        }
    }

    fn todo(id: i64, title: &str) -> Todo {
        Todo {
            id,
            title: title.to_string(),
            completed: false,
            created_at: chrono::Utc::now(),
            assigned_user_id: None,
            assigned_user_name: None,
        }
    }

    #[tokio::test]
    async fn test_navigate_refreshes_once() {
        let mut app = app(Route::Dashboard);

        assert_eq!(app.navigate(Route::Todos), Some(Action::RefreshTodos));
        assert_eq!(app.navigate(Route::Users), Some(Action::RefreshUsers));
        assert_eq!(app.navigate(Route::Todos), None);
        assert_eq!(app.route, Route::Todos);
    }

    #[tokio::test]
    async fn test_add_todo_command() {
        let mut app = app(Route::Todos);
        app.enter_command_mode("add Buy milk");

        assert_eq!(
            app.execute_command(),
            Some(Action::AddTodo(NewTodo::new("Buy milk")))
        );
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[tokio::test]
    async fn test_assign_by_name_prefix() {
        let mut app = app(Route::Todos);
        app.todos.items = vec![todo(7, "Write docs")];
        app.users.items = vec![user(1, "Ada"), user(2, "Grace"), user(3, "Gregor")];

        app.enter_command_mode("assign ada");
        assert_eq!(
            app.execute_command(),
            Some(Action::AssignTodo {
                id: 7,
                user_id: Some(1)
            })
        );

        app.enter_command_mode("assign gr");
        assert_eq!(app.execute_command(), None);
        assert!(app.status_message.unwrap().contains("matches 2 users"));
    }

    #[tokio::test]
    async fn test_unassign() {
        let mut app = app(Route::Todos);
        app.todos.items = vec![todo(7, "Write docs")];

        app.enter_command_mode("assign none");
        assert_eq!(
            app.execute_command(),
            Some(Action::AssignTodo {
                id: 7,
                user_id: None
            })
        );
    }

    #[tokio::test]
    async fn test_user_delete_requires_confirmation() {
        let mut app = app(Route::Users);
        app.users.items = vec![user(4, "Ada")];

        assert_eq!(app.delete_current(), None);
        assert_eq!(app.input_mode, InputMode::Confirm);

        assert_eq!(app.answer_confirm(false), None);
        assert_eq!(app.input_mode, InputMode::Normal);

        app.delete_current();
        assert_eq!(app.answer_confirm(true), Some(Action::DeleteUser(4)));
    }

    #[tokio::test]
    async fn test_edit_user_sends_only_changes() {
        let mut app = app(Route::Users);
        app.users.items = vec![user(4, "Ada")];

        app.enter_edit_mode();
        assert_eq!(app.command_input, "edit Ada, ada@example.com, user");

        app.command_input = "edit Ada, ada@example.com, admin".to_string();
        assert_eq!(
            app.execute_command(),
            Some(Action::UpdateUser {
                id: 4,
                patch: UserPatch {
                    role: Some(Role::Admin),
                    ..UserPatch::default()
                }
            })
        );
    }

    #[test]
    fn test_parse_user_fields() {
        assert_eq!(
            parse_user_fields("Ada, ada@example.com, admin"),
            Ok(("Ada".to_string(), "ada@example.com".to_string(), Some(Role::Admin)))
        );
        assert!(parse_user_fields("Ada").is_err());
        assert!(parse_user_fields("Ada, a@b.c, root").is_err());
    }

    #[tokio::test]
    async fn test_text_input_handles_multibyte() {
        let mut app = app(Route::Todos);
        app.enter_command_mode("add ");
        app.insert_char('é');
        app.insert_char('t');
        app.cursor_left();
        app.delete_char();
        assert_eq!(app.command_input, "add t");
    }
}
