use crate::device::Device;
use std::fmt::Display;
use std::path::PathBuf;

/// Options shared read-only by every device pipeline in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashOptions {
    /// FAT volume label, handed to mkfs.fat as-is.
    pub volume_label: String,
    /// Directory copied onto every device. `None` skips mounting and copying.
    pub template: Option<PathBuf>,
}

impl FlashOptions {
    pub fn new(volume_label: impl Into<String>) -> Self {
        Self {
            volume_label: volume_label.into(),
            template: None,
        }
    }

    pub fn with_template(mut self, template: impl Into<PathBuf>) -> Self {
        self.template = Some(template.into());
        self
    }
}

/// Logging context for one device, threaded through every pipeline call.
#[derive(Debug, Clone)]
pub struct DeviceContext {
    device: Device,
    label: String,
}

impl DeviceContext {
    pub fn new(device: Device) -> Self {
        let label = device.path().display().to_string();
        Self { device, label }
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn debug(&self, msg: impl Display) {
        log::debug!("[{}] {}", self.label, msg);
    }

    pub fn info(&self, msg: impl Display) {
        log::info!("[{}] {}", self.label, msg);
    }

    pub fn warn(&self, msg: impl Display) {
        log::warn!("[{}] {}", self.label, msg);
    }

    pub fn error(&self, msg: impl Display) {
        log::error!("[{}] {}", self.label, msg);
    }
}
