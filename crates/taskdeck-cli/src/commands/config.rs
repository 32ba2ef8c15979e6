//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use taskdeck_core::{Config, Mode};

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "mode": config.mode.as_str(),
                    "api_base_url": config.api_base_url,
                    "proxy_origin": config.proxy_origin,
                    "resolved_base_url": config.api_base_url(),
                    "new_todos_first": config.new_todos_first,
                    "data_dir": config.data_dir,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.api_base_url());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  mode:            {}", config.mode.as_str());
            println!(
                "  api_base_url:    {}",
                config.api_base_url.as_deref().unwrap_or("(not set)")
            );
            println!("  proxy_origin:    {}", config.proxy_origin);
            println!("  new_todos_first: {}", config.new_todos_first);
            println!("  data_dir:        {}", config.data_dir.display());
            println!(
                "  log_file:        {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Resolved API URL: {}", config.api_base_url());
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "mode" => {
            config.mode = match value {
                "production" => Mode::Production,
                "development" => Mode::Development,
                _ => bail!("Invalid value for mode. Use 'development' or 'production'."),
            };
        }
        "api_base_url" => {
            config.api_base_url = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.to_string())
            };
        }
        "proxy_origin" => {
            if value.is_empty() {
                bail!("proxy_origin cannot be empty");
            }
            config.proxy_origin = value.to_string();
        }
        "new_todos_first" => {
            config.new_todos_first = value
                .parse()
                .context("Invalid value for new_todos_first. Use 'true' or 'false'.")?;
        }
        "data_dir" => {
            config.data_dir = value.into();
        }
        "log_file" => {
            config.log_file = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.into())
            };
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: mode, api_base_url, proxy_origin, new_todos_first, data_dir, log_file",
                key
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_apply_known_keys() {
        let mut config = Config::default();

        apply(&mut config, "mode", "production").unwrap();
        apply(&mut config, "proxy_origin", "https://todo.example.com").unwrap();
        apply(&mut config, "new_todos_first", "true").unwrap();
        apply(&mut config, "api_base_url", "none").unwrap();

        assert_eq!(config.mode, Mode::Production);
        assert!(config.new_todos_first);
        assert!(config.api_base_url.is_none());
        assert_eq!(config.api_base_url(), "https://todo.example.com/api");
    }

    #[test]
    fn test_apply_rejects_bad_input() {
        let mut config = Config::default();
        assert!(apply(&mut config, "sync_url", "x").is_err());
        assert!(apply(&mut config, "mode", "staging").is_err());
        assert!(apply(&mut config, "new_todos_first", "maybe").is_err());
    }

    #[test]
    fn test_set_writes_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let output = Output::new(OutputFormat::Quiet);

        set(
            "api_base_url".to_string(),
            "http://10.0.0.5:8000/api".to_string(),
            Some(&path),
            &output,
        )
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("http://10.0.0.5:8000/api"));
    }
}
