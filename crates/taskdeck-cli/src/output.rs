//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;

use taskdeck_core::{ApiStatus, Stats, Todo, User};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print a single todo
    pub fn print_todo(&self, todo: &Todo) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:        {}", todo.id);
                println!("Title:     {}", todo.title);
                println!(
                    "Status:    {}",
                    if todo.completed { "completed" } else { "pending" }
                );
                if let Some(ref name) = todo.assigned_user_name {
                    println!("Assigned:  {}", name);
                } else if let Some(user_id) = todo.assigned_user_id {
                    println!("Assigned:  user {}", user_id);
                }
                println!("Created:   {}", todo.created_at.format("%Y-%m-%d %H:%M"));
            }
            OutputFormat::Json => print_json(todo),
            OutputFormat::Quiet => println!("{}", todo.id),
        }
    }

    /// Print a list of todos
    pub fn print_todos(&self, todos: &[Todo]) {
        match self.format {
            OutputFormat::Human => {
                if todos.is_empty() {
                    println!("No todos yet. Add one with `taskdeck todo add <title>`.");
                    return;
                }
                for todo in todos {
                    let assignee = todo
                        .assigned_user_name
                        .as_ref()
                        .map(|name| format!(" | {}", truncate(name, 20)))
                        .unwrap_or_default();
                    println!(
                        "{:>4} [{}] {}{} | {}",
                        todo.id,
                        if todo.completed { "x" } else { " " },
                        truncate(&todo.title, 45),
                        assignee,
                        todo.created_at.format("%Y-%m-%d")
                    );
                }
                let done = todos.iter().filter(|t| t.completed).count();
                println!("\n{} todo(s), {} completed", todos.len(), done);
            }
            OutputFormat::Json => print_json(&todos),
            OutputFormat::Quiet => {
                for todo in todos {
                    println!("{}", todo.id);
                }
            }
        }
    }

    /// Print a single user
    pub fn print_user(&self, user: &User) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:       {}", user.id);
                println!("Name:     {}", user.name);
                println!("Email:    {}", user.email);
                println!("Role:     {}", user.role);
                println!("Created:  {}", user.created_at.format("%Y-%m-%d %H:%M"));
            }
            OutputFormat::Json => print_json(user),
            OutputFormat::Quiet => println!("{}", user.id),
        }
    }

    /// Print a list of users
    pub fn print_users(&self, users: &[User]) {
        match self.format {
            OutputFormat::Human => {
                if users.is_empty() {
                    println!("No users found.");
                    return;
                }
                for user in users {
                    println!(
                        "{:>4} ({}) {} | {} | {}",
                        user.id,
                        user.initial(),
                        truncate(&user.name, 30),
                        truncate(&user.email, 35),
                        user.role
                    );
                }
                println!("\n{} user(s)", users.len());
            }
            OutputFormat::Json => print_json(&users),
            OutputFormat::Quiet => {
                for user in users {
                    println!("{}", user.id);
                }
            }
        }
    }

    /// Print the dashboard statistics
    pub fn print_stats(&self, stats: &Stats) {
        match self.format {
            OutputFormat::Human => {
                println!("Dashboard");
                println!("=========");
                println!();
                println!("  Total Todos:      {}", stats.total_todos);
                println!("  Completed:        {}", stats.completed_todos);
                println!("  Pending:          {}", stats.pending_todos);
                println!("  Total Users:      {}", stats.total_users);
                println!();
                println!("  Server uptime:    {}s", stats.uptime_secs());
                println!(
                    "  Last updated:     {}",
                    stats.timestamp.format("%Y-%m-%d %H:%M:%S")
                );
            }
            OutputFormat::Json => print_json(stats),
            OutputFormat::Quiet => {
                println!(
                    "{} {} {} {}",
                    stats.total_todos, stats.completed_todos, stats.pending_todos, stats.total_users
                );
            }
        }
    }

    /// Print the outcome of a health probe
    pub fn print_health(&self, status: ApiStatus, base_url: &str) {
        match self.format {
            OutputFormat::Human => {
                println!("{}", status);
                println!("Base URL: {}", base_url);
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": status.label(), "base_url": base_url})
                );
            }
            OutputFormat::Quiet => println!("{}", status.label()),
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to encode JSON: {}", e),
    }
}

/// Truncate a string to max characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("ÅÅÅÅÅÅÅÅÅÅÅÅ", 6), "ÅÅÅ...");
    }

    #[test]
    fn test_should_prompt_only_for_humans() {
        assert!(Output::new(OutputFormat::Human).should_prompt());
        assert!(!Output::new(OutputFormat::Json).should_prompt());
        assert!(!Output::new(OutputFormat::Quiet).should_prompt());
    }
}
