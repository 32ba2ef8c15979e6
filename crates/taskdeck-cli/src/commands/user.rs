//! User command handlers

use anyhow::{bail, Context, Result};

use taskdeck_core::{ApiClient, NewUser, Role, SharedCache, UserPatch};

use crate::output::Output;
use crate::prompt::{confirm, prompt_with_default};

/// List all users
pub async fn list(cache: &SharedCache, output: &Output) -> Result<()> {
    let users = cache.users();
    users.refresh().await?;
    output.print_users(&users.snapshot().items);
    Ok(())
}

/// Show a single user
pub async fn show(client: &ApiClient, id: i64, output: &Output) -> Result<()> {
    let user = client.get_user(id).await?;
    output.print_user(&user);
    Ok(())
}

/// Add a user
pub async fn add(
    cache: &SharedCache,
    name: String,
    email: String,
    role: Role,
    output: &Output,
) -> Result<()> {
    let draft = NewUser::new(name.trim(), email.trim(), role);

    let Some(user) = cache.users().create(draft).await? else {
        bail!("Name and email are required");
    };

    output.success(&format!("Added user: {}", user.id));
    output.print_user(&user);
    Ok(())
}

/// Edit a user
///
/// Fields given as flags are applied directly. With no flags the current
/// values are offered as defaults at an interactive prompt.
pub async fn edit(
    client: &ApiClient,
    cache: &SharedCache,
    id: i64,
    name: Option<String>,
    email: Option<String>,
    role: Option<Role>,
    output: &Output,
) -> Result<()> {
    let mut patch = UserPatch { name, email, role };

    if patch.is_empty() && output.should_prompt() {
        let current = client.get_user(id).await?;

        println!("Editing user: {}", current.id);
        println!("Press Enter to keep current value, or type new value.\n");

        patch.name = prompt_with_default("Name", &current.name)?;
        patch.email = prompt_with_default("Email", &current.email)?;
        patch.role = prompt_with_default("Role (user/admin)", current.role.as_str())?
            .map(|value| value.parse::<Role>())
            .transpose()
            .map_err(anyhow::Error::msg)?;
    }

    if patch.is_empty() {
        output.message("Nothing to change.");
        return Ok(());
    }
    if patch.name.as_deref().is_some_and(|v| v.trim().is_empty())
        || patch.email.as_deref().is_some_and(|v| v.trim().is_empty())
    {
        bail!("Name and email cannot be empty");
    }

    let user = cache.users().update(id, patch).await?;

    output.success("User updated");
    output.print_user(&user);
    Ok(())
}

/// Delete a user after confirmation
pub async fn delete(
    client: &ApiClient,
    cache: &SharedCache,
    id: i64,
    yes: bool,
    output: &Output,
) -> Result<()> {
    if !yes {
        if !output.should_prompt() {
            bail!("Refusing to delete user {} without --yes", id);
        }

        let user = client
            .get_user(id)
            .await
            .with_context(|| format!("User not found: {}", id))?;
        println!("Delete user: {} - {} <{}>", user.id, user.name, user.email);
        if !confirm("Are you sure you want to delete this user?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    cache.users().delete(id).await?;
    output.success(&format!("Deleted user: {}", id));
    Ok(())
}
