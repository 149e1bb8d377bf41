//! Configuration validation functions.

use super::Config;

/// Validate the loaded configuration before the server starts.
pub fn validate_config(config: &Config) -> anyhow::Result<()> {
    if config.port == 0 {
        anyhow::bail!("port must be non-zero");
    }

    if !config.ws_path.starts_with('/') {
        anyhow::bail!(
            "ws_path must start with '/' (got '{}')",
            config.ws_path
        );
    }

    match config.logging.rotation.to_lowercase().as_str() {
        "daily" | "hourly" | "never" => {}
        other => anyhow::bail!(
            "logging.rotation must be one of daily, hourly, never (got '{other}')"
        ),
    }

    if config.server.client_queue_capacity == 0 {
        anyhow::bail!("server.client_queue_capacity must be at least 1");
    }

    if config.archive.credentials_path.is_some() != config.archive.project_id.is_some() {
        anyhow::bail!(
            "archive.credentials_path and archive.project_id must be configured together"
        );
    }

    Ok(())
}
