//! Confirmation before destroying data.

use crate::device::{human_size, Device};
use crate::flash::FlashOptions;
use anyhow::{Context, Result};
use fatstamp_error::StampError;
use std::fmt::Write as _;
use std::io::{BufRead, Write};

pub const CONFIRMATION_WORD: &str = "yes";

pub fn render_plan(devices: &[Device], options: &FlashOptions) -> String {
    let mut plan = String::new();
    let _ = writeln!(
        plan,
        "The following devices will be ERASED and formatted as FAT (label {}):",
        options.volume_label
    );
    for device in devices {
        let _ = writeln!(
            plan,
            "  {}  ({})",
            device.path().display(),
            human_size(device.size_bytes())
        );
    }
    match &options.template {
        Some(template) => {
            let _ = writeln!(plan, "Contents of {} will be copied onto each.", template.display());
        }
        None => {
            let _ = writeln!(plan, "No template; devices will be left empty.");
        }
    }
    plan
}

/// Show the plan and require the operator to type [`CONFIRMATION_WORD`].
pub fn confirm_devices<R, W>(
    devices: &[Device],
    options: &FlashOptions,
    input: &mut R,
    output: &mut W,
) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    write!(output, "{}", render_plan(devices, options))?;
    write!(output, "Type '{}' to continue: ", CONFIRMATION_WORD)?;
    output.flush()?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("Failed to read confirmation input")?;

    if answer.trim() == CONFIRMATION_WORD {
        Ok(())
    } else {
        Err(StampError::Aborted.into())
    }
}
