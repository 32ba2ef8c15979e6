//! UI rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame,
};

use taskdeck_core::{ApiStatus, Route};

use super::app::{App, InputMode};
use crate::output::truncate;

/// Main UI rendering function
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_nav_bar(frame, app, chunks[0]);

    match app.route {
        Route::Dashboard => draw_dashboard(frame, app, chunks[1]),
        Route::Todos => draw_todos(frame, app, chunks[1]),
        Route::Users => draw_users(frame, app, chunks[1]),
    }

    match app.input_mode {
        InputMode::Normal => draw_status_bar(frame, app, chunks[2]),
        InputMode::Command => draw_command_input(frame, app, chunks[2]),
        InputMode::Confirm => draw_confirm(frame, app, chunks[2]),
    }

    if app.show_help {
        draw_help_overlay(frame);
    }
}

/// Draw the route tabs with the API indicator on the right
fn draw_nav_bar(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Route::ALL
        .iter()
        .enumerate()
        .map(|(i, route)| Line::from(format!("{} {}", i + 1, route.title())))
        .collect();

    let tabs = Tabs::new(titles)
        .block(Block::default().title(" taskdeck ").borders(Borders::ALL))
        .select(app.route.index())
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .add_modifier(Modifier::REVERSED),
        );
    frame.render_widget(tabs, area);

    let label = app.api_status.to_string();
    let width = label.chars().count() as u16;
    if area.width < width + 4 {
        return;
    }
    let indicator = Paragraph::new(Span::styled(label, status_style(app.api_status)));
    let indicator_area = Rect::new(area.x + area.width - width - 2, area.y + 1, width, 1);
    frame.render_widget(indicator, indicator_area);
}

fn status_style(status: ApiStatus) -> Style {
    match status {
        ApiStatus::Checking => Style::default().fg(Color::Yellow),
        ApiStatus::Connected => Style::default().fg(Color::Green),
        ApiStatus::Error => Style::default().fg(Color::Red),
    }
}

/// Split off a one-line error banner when the view has an error
fn with_error_banner(frame: &mut Frame, error: Option<&str>, area: Rect) -> Rect {
    let Some(error) = error else {
        return area;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let banner = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" Error: {} ", error),
            Style::default().fg(Color::White).bg(Color::Red),
        ),
        Span::styled("  (Esc to dismiss)", Style::default().add_modifier(Modifier::DIM)),
    ]));
    frame.render_widget(banner, chunks[0]);
    chunks[1]
}

fn view_block(title: String, is_loading: bool) -> Block<'static> {
    let title = if is_loading {
        format!(" {} (loading...) ", title)
    } else {
        format!(" {} ", title)
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD))
}

fn placeholder(frame: &mut Frame, block: Block, text: &str, area: Rect) {
    let paragraph = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            text.to_string(),
            Style::default().add_modifier(Modifier::DIM),
        )),
    ])
    .block(block);
    frame.render_widget(paragraph, area);
}

/// Draw the statistics dashboard
fn draw_dashboard(frame: &mut Frame, app: &App, area: Rect) {
    let area = with_error_banner(frame, app.current_error(), area);
    let block = view_block("Dashboard".to_string(), app.stats.is_loading);

    let Some(stats) = &app.stats.stats else {
        let text = if app.stats.is_loading || !app.stats.loaded {
            "Loading dashboard..."
        } else {
            "No statistics available"
        };
        placeholder(frame, block, text, area);
        return;
    };

    let label = Style::default().add_modifier(Modifier::BOLD);
    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Total Todos:   ", label),
            Span::raw(stats.total_todos.to_string()),
        ]),
        Line::from(vec![
            Span::styled("  Completed:     ", label),
            Span::styled(
                stats.completed_todos.to_string(),
                Style::default().fg(Color::Green),
            ),
        ]),
        Line::from(vec![
            Span::styled("  Pending:       ", label),
            Span::styled(
                stats.pending_todos.to_string(),
                Style::default().fg(Color::Yellow),
            ),
        ]),
        Line::from(vec![
            Span::styled("  Total Users:   ", label),
            Span::raw(stats.total_users.to_string()),
        ]),
        Line::from(""),
        Line::from(Span::styled("  Server Information", label)),
        Line::from(format!("  Uptime:        {}s", stats.uptime_secs())),
        Line::from(format!(
            "  Last updated:  {}",
            stats.timestamp.format("%Y-%m-%d %H:%M:%S")
        )),
    ];

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// Draw the todo list and the assignable users beside it
fn draw_todos(frame: &mut Frame, app: &App, area: Rect) {
    let area = with_error_banner(frame, app.current_error(), area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(72), Constraint::Percentage(28)])
        .split(area);

    let todos = &app.todos;
    let done = todos.items.iter().filter(|t| t.completed).count();
    let block = view_block(
        format!("Todos ({}/{})", done, todos.items.len()),
        todos.is_loading,
    );

    if todos.items.is_empty() {
        let text = if todos.is_loading || !todos.loaded {
            "Loading todos..."
        } else {
            "No todos yet. Add one above!"
        };
        placeholder(frame, block, text, chunks[0]);
    } else {
        let max_len = chunks[0].width.saturating_sub(30) as usize;
        let items: Vec<ListItem> = todos
            .items
            .iter()
            .map(|todo| {
                let (check, title_style) = if todo.completed {
                    (
                        "[x] ",
                        Style::default()
                            .add_modifier(Modifier::CROSSED_OUT)
                            .add_modifier(Modifier::DIM),
                    )
                } else {
                    ("[ ] ", Style::default())
                };

                let mut spans = vec![
                    Span::raw(check),
                    Span::styled(truncate(&todo.title, max_len.max(8)), title_style),
                    Span::styled(
                        format!("  {}", todo.created_at.format("%Y-%m-%d")),
                        Style::default().add_modifier(Modifier::DIM),
                    ),
                ];
                if let Some(name) = &todo.assigned_user_name {
                    spans.push(Span::styled(
                        format!("  @{}", name),
                        Style::default().fg(Color::Cyan),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let list = List::new(items).block(block).highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .add_modifier(Modifier::REVERSED),
        );

        let mut state = ListState::default();
        state.select(Some(app.todo_index));
        frame.render_stateful_widget(list, chunks[0], &mut state);
    }

    // Assignment selector, empty when the users could not be loaded
    let selected = app.current_todo().and_then(|t| t.assigned_user_id);
    let users: Vec<ListItem> = app
        .users
        .items
        .iter()
        .map(|user| {
            let marker = if Some(user.id) == selected { "● " } else { "  " };
            ListItem::new(format!("{}{} {}", marker, user.id, user.name))
        })
        .collect();
    let users = List::new(users).block(
        Block::default()
            .title(" Assign to (:assign) ")
            .borders(Borders::ALL),
    );
    frame.render_widget(users, chunks[1]);
}

/// Draw the user list
fn draw_users(frame: &mut Frame, app: &App, area: Rect) {
    let area = with_error_banner(frame, app.current_error(), area);
    let users = &app.users;
    let block = view_block(format!("Users ({})", users.items.len()), users.is_loading);

    if users.items.is_empty() {
        let text = if users.is_loading || !users.loaded {
            "Loading users..."
        } else {
            "No users found"
        };
        placeholder(frame, block, text, area);
        return;
    }

    let items: Vec<ListItem> = users
        .items
        .iter()
        .map(|user| {
            let role_style = match user.role {
                taskdeck_core::Role::Admin => Style::default().fg(Color::Magenta),
                taskdeck_core::Role::User => Style::default().add_modifier(Modifier::DIM),
            };
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!(" {} ", user.initial()),
                    Style::default()
                        .add_modifier(Modifier::BOLD)
                        .add_modifier(Modifier::REVERSED),
                ),
                Span::raw(format!(" {}", user.name)),
                Span::styled(
                    format!("  <{}>", user.email),
                    Style::default().add_modifier(Modifier::DIM),
                ),
                Span::styled(format!("  {}", user.role), role_style),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD));

    let mut state = ListState::default();
    state.select(Some(app.user_index));
    frame.render_stateful_widget(list, area, &mut state);
}

/// Draw the status bar at the bottom
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let content = if let Some(msg) = &app.status_message {
        msg.clone()
    } else {
        let keys = match app.route {
            Route::Dashboard => "r:refresh",
            Route::Todos => "a:add  x:toggle  e:edit  u:assign  d:del  r:refresh",
            Route::Users => "a:add  e:edit  d:del  r:refresh",
        };
        format!("{}  c:check API  ?:help  q:quit  | {}", keys, app.base_url)
    };

    let paragraph = Paragraph::new(content).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Draw command input at the bottom
fn draw_command_input(frame: &mut Frame, app: &App, area: Rect) {
    let prefix = ":";

    let line = Line::from(vec![
        Span::styled(prefix, Style::default().fg(Color::Yellow)),
        Span::raw(app.command_input.as_str()),
    ]);

    frame.render_widget(Paragraph::new(line), area);

    // Position cursor
    let cursor_x = area.x + prefix.len() as u16 + app.command_cursor as u16;
    frame.set_cursor_position((cursor_x, area.y));
}

/// Draw the delete confirmation prompt
fn draw_confirm(frame: &mut Frame, app: &App, area: Rect) {
    let name = app
        .pending_delete
        .as_ref()
        .map(|p| p.name.as_str())
        .unwrap_or("this user");
    let line = Line::from(vec![Span::styled(
        format!("Are you sure you want to delete {}? [y/N]", name),
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    )]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Draw help overlay
fn draw_help_overlay(frame: &mut Frame) {
    let area = frame.area();

    // Calculate centered popup area
    let popup_width = 54.min(area.width.saturating_sub(4));
    let popup_height = 24.min(area.height.saturating_sub(4));
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("Navigation:"),
        Line::from("  1/2/3       Dashboard / Todos / Users"),
        Line::from("  Tab         Next view"),
        Line::from("  j/k, ↑/↓    Move up/down"),
        Line::from("  r           Refresh current view"),
        Line::from("  c           Check API status"),
        Line::from("  Esc         Dismiss error"),
        Line::from(""),
        Line::from("Todos:"),
        Line::from("  a           Add todo"),
        Line::from("  x, Space    Toggle completed"),
        Line::from("  e           Edit title"),
        Line::from("  u           Assign (:assign <id|name|none>)"),
        Line::from("  d           Delete todo"),
        Line::from(""),
        Line::from("Users:"),
        Line::from("  a / e       Add / edit (name, email, role)"),
        Line::from("  d           Delete user (asks first)"),
        Line::from(""),
        Line::from("  :           Command mode    q  Quit"),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    let paragraph = Paragraph::new(help_text).block(block);
    frame.render_widget(paragraph, popup_area);
}
