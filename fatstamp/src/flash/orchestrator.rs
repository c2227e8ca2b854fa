//! Fan-out of one pipeline per device, fan-in behind a single sync barrier.
//!
//! Pipelines run as local tasks on the current thread. They interleave at
//! every external command and share nothing but the read-only options.

use super::config::{DeviceContext, FlashOptions};
use super::pipeline::DeviceFlashPipeline;
use crate::device::Device;
use fatstamp_hal::{sync_barrier, SystemHal};
use futures::future::join_all;
use log::{error, info};
use std::rc::Rc;
use tokio::task::{spawn_local, LocalSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceOutcome {
    pub device: Device,
    pub success: bool,
}

/// Result of one orchestration run. Outcomes are in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashReport {
    pub outcomes: Vec<DeviceOutcome>,
    /// Whether the final sync barrier succeeded.
    pub synced: bool,
}

impl FlashReport {
    /// Every device succeeded and the barrier succeeded.
    pub fn success(&self) -> bool {
        self.synced && self.outcomes.iter().all(|o| o.success)
    }

    pub fn failed(&self) -> impl Iterator<Item = &DeviceOutcome> {
        self.outcomes.iter().filter(|o| !o.success)
    }

    pub fn succeeded_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }
}

/// Flash every device concurrently, then sync exactly once.
///
/// Waits for all pipelines, failed or not, before the barrier. A pipeline
/// that panics is logged and counted as a failure for its device only.
pub async fn run<H>(hal: Rc<H>, devices: Vec<Device>, options: FlashOptions) -> FlashReport
where
    H: SystemHal + 'static,
{
    let options = Rc::new(options);
    let local = LocalSet::new();

    local
        .run_until(async {
            info!("Flashing {} device(s)", devices.len());

            let handles: Vec<_> = devices
                .iter()
                .map(|device| {
                    let hal = Rc::clone(&hal);
                    let options = Rc::clone(&options);
                    let ctx = DeviceContext::new(device.clone());
                    spawn_local(async move {
                        DeviceFlashPipeline::new(&*hal, &ctx, &options).run().await
                    })
                })
                .collect();

            let joined = join_all(handles).await;

            let outcomes: Vec<DeviceOutcome> = devices
                .into_iter()
                .zip(joined)
                .map(|(device, joined)| {
                    let success = joined.unwrap_or_else(|err| {
                        error!(
                            "[{}] Pipeline aborted with an unclassified failure: {}",
                            device.path().display(),
                            err
                        );
                        false
                    });
                    DeviceOutcome { device, success }
                })
                .collect();

            let synced = match sync_barrier(&*hal).await {
                Ok(()) => true,
                Err(err) => {
                    error!("Sync barrier failed: {}", err);
                    false
                }
            };

            let report = FlashReport { outcomes, synced };
            info!(
                "{}/{} device(s) flashed successfully",
                report.succeeded_count(),
                report.outcomes.len()
            );
            for outcome in report.failed() {
                error!("FAILED: {}", outcome.device.path().display());
            }
            report
        })
        .await
}

/// Logical AND of every device outcome and the barrier.
pub async fn flash_devices<H>(hal: Rc<H>, devices: Vec<Device>, options: FlashOptions) -> bool
where
    H: SystemHal + 'static,
{
    run(hal, devices, options).await.success()
}
