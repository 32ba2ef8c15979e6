//! Health command handler

use anyhow::{bail, Result};

use taskdeck_core::{ApiStatus, SharedCache};

use crate::output::Output;

/// Probe the API once and report the outcome
pub async fn check(cache: &SharedCache, base_url: &str, output: &Output) -> Result<()> {
    let status = cache.health().check().await;
    output.print_health(status, base_url);

    if status == ApiStatus::Error {
        bail!("API at {} is not reachable", base_url);
    }
    Ok(())
}
