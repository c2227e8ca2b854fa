//! Linux HAL implementation spawning real processes.

use super::{CommandRunner, CommandSpec, ProbeOps};
use crate::{FlashError, FlashResult};
use std::io;
use std::os::unix::fs::FileTypeExt;
use std::path::Path;
use std::process::{ExitStatus, Stdio};

/// Real HAL implementation for Linux systems.
///
/// Commands have no timeout: a stalled tool stalls its device's pipeline.
#[derive(Debug, Clone, Default)]
pub struct LinuxHal;

impl LinuxHal {
    pub fn new() -> Self {
        Self
    }
}

fn map_spawn_err(cmd: &CommandSpec, err: io::Error) -> FlashError {
    let context = if err.kind() == io::ErrorKind::NotFound {
        format!("Command not found: {}", cmd.program)
    } else {
        format!("failed to spawn {}", cmd.program)
    };
    FlashError::Unclassified(anyhow::Error::new(err).context(context))
}

fn check_status(cmd: &CommandSpec, status: ExitStatus) -> FlashResult<()> {
    if status.success() {
        return Ok(());
    }
    Err(FlashError::CommandFailed {
        command: cmd.quoted(),
        code: status.code(),
    })
}

impl CommandRunner for LinuxHal {
    async fn run(&self, cmd: &CommandSpec) -> FlashResult<()> {
        log::debug!("$ {}", cmd);
        // stdout/stderr are inherited so the operator sees tool output directly.
        let status = tokio::process::Command::new(&cmd.program)
            .args(&cmd.args)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|e| map_spawn_err(cmd, e))?;
        check_status(cmd, status)
    }

    fn run_blocking(&self, cmd: &CommandSpec) -> FlashResult<()> {
        log::debug!("$ {}", cmd);
        let status = std::process::Command::new(&cmd.program)
            .args(&cmd.args)
            .stdin(Stdio::null())
            .status()
            .map_err(|e| map_spawn_err(cmd, e))?;
        check_status(cmd, status)
    }
}

impl ProbeOps for LinuxHal {
    async fn is_block_device(&self, path: &Path) -> FlashResult<bool> {
        match tokio::fs::metadata(path).await {
            Ok(meta) => Ok(meta.file_type().is_block_device()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}
