//! Run configuration built from the command line.

use crate::cli::Cli;
use crate::flash::FlashOptions;
use anyhow::Result;
use fatstamp_error::StampError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Longest label a FAT volume can carry.
pub const MAX_LABEL_LEN: usize = 11;

/// Validated, immutable configuration for one run.
#[derive(Debug, Clone)]
pub struct FlashConfig {
    pub devices: Vec<PathBuf>,
    pub options: FlashOptions,
    pub verbose: bool,
    pub assume_yes: bool,
    pub skip_preflight: bool,
    pub report: Option<PathBuf>,
}

impl FlashConfig {
    /// Collect the run configuration. Call [`FlashConfig::validate`] before use.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            devices: cli.devices.clone(),
            options: FlashOptions {
                volume_label: cli.label.clone(),
                template: cli.template.clone(),
            },
            verbose: cli.verbose,
            assume_yes: cli.yes,
            skip_preflight: cli.skip_preflight,
            report: cli.report.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_devices(&self.devices)
            .and_then(|()| validate_label(&self.options.volume_label))
            .and_then(|()| match &self.options.template {
                Some(template) => validate_template(template),
                None => Ok(()),
            })
            .map_err(|msg| StampError::ValidationFailed(msg).into())
    }
}

pub fn validate_devices(devices: &[PathBuf]) -> Result<(), String> {
    if devices.is_empty() {
        return Err("At least one device is required.".to_string());
    }
    let mut seen = HashSet::new();
    for device in devices {
        if device.as_os_str().is_empty() {
            return Err("Device path must not be empty.".to_string());
        }
        require_utf8(device, "Device path")?;
        // Two pipelines on one disk would race on the same partition.
        if !seen.insert(device) {
            return Err(format!("Device listed twice: {}", device.display()));
        }
    }
    Ok(())
}

pub fn validate_label(label: &str) -> Result<(), String> {
    if label.is_empty() {
        return Err("Volume label is required.".to_string());
    }
    if !label.is_ascii() {
        return Err(format!("Volume label must be ASCII: {}", label));
    }
    if label.len() > MAX_LABEL_LEN {
        return Err(format!(
            "Volume label is longer than {} characters: {}",
            MAX_LABEL_LEN, label
        ));
    }
    Ok(())
}

/// Paths are passed to external tools as UTF-8 arguments; anything else
/// would name a different file.
fn require_utf8(path: &Path, what: &str) -> Result<(), String> {
    if path.to_str().is_none() {
        return Err(format!("{} is not valid UTF-8: {}", what, path.display()));
    }
    Ok(())
}

pub fn validate_template(path: &Path) -> Result<(), String> {
    require_utf8(path, "Template path")?;
    if !path.exists() {
        return Err(format!("Template directory not found: {}", path.display()));
    }
    if !path.is_dir() {
        return Err(format!(
            "Template path is not a directory: {}",
            path.display()
        ));
    }
    Ok(())
}
