//! Mount and unmount commands.

use super::CommandSpec;
use std::path::Path;

pub fn mount_command(partition: &Path, mount_point: &Path) -> CommandSpec {
    CommandSpec::new("mount")
        .arg(partition.display().to_string())
        .arg(mount_point.display().to_string())
}

/// Unmount by device node rather than by mount point.
pub fn umount_command(partition: &Path) -> CommandSpec {
    CommandSpec::new("umount").arg(partition.display().to_string())
}
