//! HAL trait definitions and implementations.
//!
//! Command shapes live next to the concern they belong to; [`LinuxHal`] runs
//! them for real and [`FakeHal`] records them for tests.

pub mod fake_hal;
pub mod format_ops;
pub mod guards;
pub mod linux_hal;
pub mod mount_ops;
pub mod partition_ops;
pub mod probe_ops;
pub mod process_ops;
pub mod rsync_ops;
pub mod system_ops;

pub use fake_hal::{FakeHal, Operation};
pub use format_ops::mkfs_fat_command;
pub use guards::MountScope;
pub use linux_hal::LinuxHal;
pub use mount_ops::{mount_command, umount_command};
pub use partition_ops::{parted_command, partprobe_command, PartedOp};
pub use probe_ops::ProbeOps;
pub use process_ops::{quote_arg, CommandRunner, CommandSpec};
pub use rsync_ops::{rsync_command, RsyncOptions};
pub use system_ops::{sync_barrier, sync_command};

/// Everything a device pipeline needs from the system.
pub trait SystemHal: CommandRunner + ProbeOps {}

impl<T> SystemHal for T where T: CommandRunner + ProbeOps {}
