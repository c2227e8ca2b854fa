//! fatstamp: partition, FAT-format and populate many removable drives at once.
//!
//! The interesting part is [`flash`]: one [`flash::DeviceFlashPipeline`] per
//! device, run concurrently by [`flash::orchestrator`] and joined behind a
//! single sync barrier. The remaining modules validate input and talk to the
//! operator.

pub mod app;
pub mod cli;
pub mod config;
pub mod confirm;
pub mod device;
pub mod flash;
pub mod logging;
pub mod preflight;
pub mod report;
