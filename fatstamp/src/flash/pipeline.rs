use super::config::{DeviceContext, FlashOptions};
use fatstamp_hal::{
    mkfs_fat_command, parted_command, partprobe_command, rsync_command, FlashError, FlashResult,
    MountScope, PartedOp, RsyncOptions, SystemHal,
};
use std::cell::Cell;
use std::fmt;
use std::path::Path;

/// Where a device is in its flashing sequence.
///
/// The bracketed part of the sequence (`Mounted` .. `Unmounted`) only happens
/// when a template is configured. `Failed` is absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Init,
    TableReset,
    PartitionCreated,
    KernelRefreshed,
    PartitionVerified,
    FilesystemCreated,
    Mounted,
    ContentsCopied,
    Unmounted,
    Done,
    Failed,
}

impl PipelineState {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineState::Init => "init",
            PipelineState::TableReset => "table-reset",
            PipelineState::PartitionCreated => "partition-created",
            PipelineState::KernelRefreshed => "kernel-refreshed",
            PipelineState::PartitionVerified => "partition-verified",
            PipelineState::FilesystemCreated => "filesystem-created",
            PipelineState::Mounted => "mounted",
            PipelineState::ContentsCopied => "contents-copied",
            PipelineState::Unmounted => "unmounted",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Drives one device through partition, format and optional populate.
///
/// Steps run strictly in order and the first failure ends the sequence. The
/// failure is logged with the device's context and folded into `false`; it is
/// never propagated to sibling devices.
pub struct DeviceFlashPipeline<'a, H: SystemHal + ?Sized> {
    hal: &'a H,
    ctx: &'a DeviceContext,
    options: &'a FlashOptions,
    state: Cell<PipelineState>,
}

impl<'a, H: SystemHal + ?Sized> DeviceFlashPipeline<'a, H> {
    pub fn new(hal: &'a H, ctx: &'a DeviceContext, options: &'a FlashOptions) -> Self {
        Self {
            hal,
            ctx,
            options,
            state: Cell::new(PipelineState::Init),
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state.get()
    }

    fn advance(&self, next: PipelineState) {
        self.ctx.debug(format_args!("{} -> {}", self.state.get(), next));
        self.state.set(next);
    }

    /// Run every step. `true` only if the device reached [`PipelineState::Done`].
    pub async fn run(&self) -> bool {
        self.ctx.info("Starting");
        match self.execute().await {
            Ok(()) => {
                self.advance(PipelineState::Done);
                self.ctx.info("Flashed successfully");
                true
            }
            Err(err) => {
                self.report_failure(&err);
                self.advance(PipelineState::Failed);
                false
            }
        }
    }

    async fn execute(&self) -> FlashResult<()> {
        let disk = self.ctx.device().path();
        let partition = self.ctx.device().partition_path();

        self.ctx.info("Writing a fresh msdos partition table");
        self.hal
            .run(&parted_command(disk, PartedOp::msdos_label()))
            .await?;
        self.advance(PipelineState::TableReset);

        self.hal
            .run(&parted_command(disk, PartedOp::whole_disk_fat32()))
            .await?;
        self.advance(PipelineState::PartitionCreated);

        self.hal.run(&partprobe_command(disk)).await?;
        self.advance(PipelineState::KernelRefreshed);

        self.verify_partition(&partition).await?;
        self.advance(PipelineState::PartitionVerified);

        self.ctx.info(format_args!(
            "Creating FAT filesystem on {} (label {})",
            partition.display(),
            self.options.volume_label
        ));
        self.hal
            .run(&mkfs_fat_command(&partition, &self.options.volume_label))
            .await?;
        self.advance(PipelineState::FilesystemCreated);

        if let Some(template) = &self.options.template {
            self.populate(template, &partition).await?;
        }
        Ok(())
    }

    async fn verify_partition(&self, partition: &Path) -> FlashResult<()> {
        if self.hal.is_block_device(partition).await? {
            return Ok(());
        }
        Err(FlashError::VerificationFailed {
            expected_path: partition.to_path_buf(),
        })
    }

    /// Mount the new filesystem, copy the template in, unmount.
    ///
    /// Release problems are logged but never replace the copy's own outcome.
    async fn populate(&self, template: &Path, partition: &Path) -> FlashResult<()> {
        let scope = MountScope::acquire(self.hal, partition).await?;
        self.advance(PipelineState::Mounted);

        self.ctx.info(format_args!(
            "Copying {} into {}",
            template.display(),
            scope.mount_point().display()
        ));
        let copied = self
            .hal
            .run(&rsync_command(
                template,
                scope.mount_point(),
                &RsyncOptions::template(),
            ))
            .await;
        if copied.is_ok() {
            self.advance(PipelineState::ContentsCopied);
        }

        match scope.release().await {
            Ok(()) => self.advance(PipelineState::Unmounted),
            Err(err) => self
                .ctx
                .warn(format_args!("Cleanup of mount point failed: {}", err)),
        }
        copied
    }

    fn report_failure(&self, err: &FlashError) {
        let at = format!("{} after {}", err.kind(), self.state.get());
        match err {
            FlashError::VerificationFailed { expected_path } => self.ctx.error(format_args!(
                "Expected partition {} after partprobe, but it is missing or not a block device \
                 (does this device name take a plain \"1\" suffix?) [{}]",
                expected_path.display(),
                at
            )),
            FlashError::CommandFailed { .. } => self.ctx.error(format_args!("{} [{}]", err, at)),
            FlashError::Unclassified(cause) => {
                self.ctx
                    .error(format_args!("Unexpected failure: {:#} [{}]", cause, at))
            }
        }
    }
}
