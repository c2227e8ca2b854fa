//! JSON report of a finished run.

use crate::flash::{FlashOptions, FlashReport};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

fn now_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceReport {
    pub path: PathBuf,
    pub partition: PathBuf,
    pub size_bytes: u64,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub volume_label: String,
    pub template: Option<PathBuf>,
    pub devices: Vec<DeviceReport>,
    pub synced: bool,
    pub success: bool,
    pub finished_at_unix_ms: u64,
}

impl RunReport {
    pub fn new(options: &FlashOptions, report: &FlashReport) -> Self {
        Self {
            volume_label: options.volume_label.clone(),
            template: options.template.clone(),
            devices: report
                .outcomes
                .iter()
                .map(|o| DeviceReport {
                    path: o.device.path().to_path_buf(),
                    partition: o.device.partition_path(),
                    size_bytes: o.device.size_bytes(),
                    success: o.success,
                })
                .collect(),
            synced: report.synced,
            success: report.success(),
            finished_at_unix_ms: now_unix_ms(),
        }
    }

    pub fn write(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize run report")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write run report: {}", path.display()))
    }
}
