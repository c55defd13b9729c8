//! Handler for the `init` command.

use crate::cli::OutputFormatter;
use crate::config::{self, Config};
use crate::error::{Result, TicketingError};
use crate::storage::FileStorage;
use std::fs;
use std::path::Path;
use tracing::info;

/// Write a configuration skeleton and create the data directory.
///
/// The skeleton captures the resolved values, so environment overrides
/// given at init time end up in the file.
pub fn handle_init(
    config_path: Option<&Path>,
    force: bool,
    output: &OutputFormatter,
) -> Result<()> {
    let target = config_path
        .map(Path::to_path_buf)
        .or_else(config::default_config_path)
        .ok_or_else(|| {
            TicketingError::Persistence("no configuration directory available".to_string())
        })?;

    if target.exists() && !force {
        return Err(TicketingError::validation(format!(
            "configuration file {} already exists (use --force to overwrite)",
            target.display()
        )));
    }

    let settings = Config::load(Some(&target))?;
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, serde_yaml::to_string(&settings)?)?;

    let storage = FileStorage::new(&settings.storage.data_dir);
    storage.ensure_directories()?;
    info!(
        config = %target.display(),
        data_dir = %settings.storage.data_dir.display(),
        "initialized"
    );

    if output.is_json() {
        output.print_json(&serde_json::json!({
            "status": "success",
            "config": target,
            "dataDir": settings.storage.data_dir,
        }))?;
    } else {
        output.success(&format!("Wrote configuration to {}", target.display()));
        output.success(&format!(
            "Data directory ready at {}",
            settings.storage.data_dir.display()
        ));
    }
    Ok(())
}
