use super::{mount_command, umount_command, CommandRunner};
use crate::{FlashError, FlashResult};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

const MOUNT_DIR_PREFIX: &str = "fatstamp-";

/// A partition mounted on a private temporary directory.
///
/// Release with [`MountScope::release`]. If the scope is dropped while still
/// mounted (the owning task was cancelled or panicked) the drop handler
/// unmounts through the blocking runner path and removes the directory.
///
/// The directory is removed with a non-recursive `remove_dir`, so a stale
/// mount never has its contents deleted by cleanup.
pub struct MountScope<'a, R: CommandRunner + ?Sized> {
    runner: &'a R,
    partition: PathBuf,
    mount_point: PathBuf,
    active: bool,
}

impl<'a, R: CommandRunner + ?Sized> MountScope<'a, R> {
    /// Create a uniquely named mount point and mount `partition` on it.
    ///
    /// On mount failure the directory is removed before the error is returned.
    pub async fn acquire(runner: &'a R, partition: &Path) -> FlashResult<Self> {
        let mount_point = tempfile::Builder::new()
            .prefix(MOUNT_DIR_PREFIX)
            .tempdir()?
            .keep();

        if let Err(err) = runner.run(&mount_command(partition, &mount_point)).await {
            if let Err(rm_err) = fs::remove_dir(&mount_point) {
                log::warn!(
                    "failed to remove mount point {}: {}",
                    mount_point.display(),
                    rm_err
                );
            }
            return Err(err);
        }

        Ok(Self {
            runner,
            partition: partition.to_path_buf(),
            mount_point,
            active: true,
        })
    }

    pub fn mount_point(&self) -> &Path {
        &self.mount_point
    }

    /// Unmount, then remove the mount point.
    ///
    /// Directory removal is attempted even when unmounting fails. The first
    /// error is returned.
    pub async fn release(mut self) -> FlashResult<()> {
        self.active = false;
        let unmounted = self.runner.run(&umount_command(&self.partition)).await;
        let removed = fs::remove_dir(&self.mount_point).map_err(|err| {
            FlashError::Unclassified(anyhow::Error::new(err).context(format!(
                "failed to remove mount point {}",
                self.mount_point.display()
            )))
        });
        unmounted.and(removed)
    }
}

impl<'a, R: CommandRunner + ?Sized> fmt::Debug for MountScope<'a, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountScope")
            .field("partition", &self.partition)
            .field("mount_point", &self.mount_point)
            .field("active", &self.active)
            .finish()
    }
}

impl<'a, R: CommandRunner + ?Sized> Drop for MountScope<'a, R> {
    fn drop(&mut self) {
        if !self.active {
            return;
        }
        if let Err(err) = self.runner.run_blocking(&umount_command(&self.partition)) {
            log::warn!(
                "mount scope failed to unmount {}: {}",
                self.partition.display(),
                err
            );
        }
        if let Err(err) = fs::remove_dir(&self.mount_point) {
            log::warn!(
                "mount scope failed to remove {}: {}",
                self.mount_point.display(),
                err
            );
        }
    }
}
