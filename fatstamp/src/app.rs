//! Wiring from parsed arguments to a finished run.

use crate::config::FlashConfig;
use crate::device::Device;
use crate::flash::orchestrator;
use crate::report::RunReport;
use crate::{confirm, preflight};
use anyhow::Result;
use fatstamp_hal::LinuxHal;
use log::{info, warn};
use std::io;
use std::rc::Rc;

/// Validate, check, confirm, flash. `Ok(false)` means at least one device
/// (or the final sync) failed.
pub async fn run(config: FlashConfig) -> Result<bool> {
    config.validate()?;

    if config.skip_preflight {
        warn!("Skipping preflight checks");
    } else {
        preflight::run(&config.options)?;
    }

    let devices = config
        .devices
        .iter()
        .map(|path| Device::probe(path))
        .collect::<Result<Vec<_>>>()?;

    if config.assume_yes {
        info!("Confirmation skipped (--yes)");
    } else {
        let stdin = io::stdin();
        confirm::confirm_devices(
            &devices,
            &config.options,
            &mut stdin.lock(),
            &mut io::stdout(),
        )?;
    }

    let hal = Rc::new(LinuxHal::new());
    let report = orchestrator::run(hal, devices, config.options.clone()).await;

    if let Some(path) = &config.report {
        match RunReport::new(&config.options, &report).write(path) {
            Ok(()) => info!("Run report written to {}", path.display()),
            Err(err) => warn!("{:#}", err),
        }
    }

    Ok(report.success())
}
