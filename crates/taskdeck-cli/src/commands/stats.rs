//! Stats command handler

use anyhow::Result;

use taskdeck_core::SharedCache;

use crate::output::Output;

/// Fetch and print the dashboard statistics
pub async fn show(cache: &SharedCache, output: &Output) -> Result<()> {
    let stats = cache.stats().refresh().await?;
    output.print_stats(&stats);
    Ok(())
}
