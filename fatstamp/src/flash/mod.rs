//! Flash module - per-device pipeline and the concurrent orchestrator.

mod config;
pub mod orchestrator;
mod pipeline;

pub use config::{DeviceContext, FlashOptions};
pub use orchestrator::{flash_devices, DeviceOutcome, FlashReport};
pub use pipeline::{DeviceFlashPipeline, PipelineState};
