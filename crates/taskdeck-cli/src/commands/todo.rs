//! Todo command handlers

use anyhow::{bail, Result};

use taskdeck_core::{NewTodo, SharedCache, TodoPatch};

use crate::output::Output;

/// List all todos
pub async fn list(cache: &SharedCache, output: &Output) -> Result<()> {
    let todos = cache.todos();
    todos.refresh().await?;
    output.print_todos(&todos.snapshot().items);
    Ok(())
}

/// Add a todo, optionally assigned to a user
pub async fn add(
    cache: &SharedCache,
    title: String,
    user: Option<i64>,
    output: &Output,
) -> Result<()> {
    let draft = NewTodo::new(title.trim()).assigned_to(user);

    let Some(todo) = cache.todos().create(draft).await? else {
        bail!("Title cannot be empty");
    };

    output.success(&format!("Added todo: {}", todo.id));
    output.print_todo(&todo);
    Ok(())
}

/// Flip a todo between pending and completed
pub async fn toggle(cache: &SharedCache, id: i64, output: &Output) -> Result<()> {
    let todos = cache.todos();
    // Toggling negates the cached value, so the cache has to be current
    todos.refresh().await?;

    let Some(todo) = todos.toggle(id).await? else {
        bail!("Todo not found: {}", id);
    };

    let state = if todo.completed { "completed" } else { "pending" };
    output.success(&format!("Marked todo {} as {}", todo.id, state));
    Ok(())
}

/// Rename a todo
pub async fn edit(cache: &SharedCache, id: i64, title: String, output: &Output) -> Result<()> {
    let title = title.trim();
    if title.is_empty() {
        bail!("Title cannot be empty");
    }

    let todo = cache.todos().update(id, TodoPatch::title(title)).await?;

    output.success("Todo updated");
    output.print_todo(&todo);
    Ok(())
}

/// Assign a todo to a user, or clear the assignment
pub async fn assign(
    cache: &SharedCache,
    id: i64,
    user: Option<i64>,
    output: &Output,
) -> Result<()> {
    let todo = cache.todos().update(id, TodoPatch::assign(user)).await?;

    match (user, todo.assigned_user_name.as_deref()) {
        (Some(_), Some(name)) => output.success(&format!("Assigned todo {} to {}", id, name)),
        (Some(user_id), None) => {
            output.success(&format!("Assigned todo {} to user {}", id, user_id))
        }
        (None, _) => output.success(&format!("Unassigned todo {}", id)),
    }
    Ok(())
}

/// Delete a todo
pub async fn delete(cache: &SharedCache, id: i64, output: &Output) -> Result<()> {
    cache.todos().delete(id).await?;
    output.success(&format!("Deleted todo: {}", id));
    Ok(())
}
