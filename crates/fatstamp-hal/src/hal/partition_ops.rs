//! Partitioning commands (parted/partprobe).

use super::CommandSpec;
use std::path::Path;

/// A partition table operation executed via `parted --script`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartedOp {
    MkLabel {
        label: String,
    },
    MkPart {
        part_type: String,
        fs_type: String,
        start: String,
        end: String,
    },
}

impl PartedOp {
    /// Fresh MS-DOS partition table. Destroys every existing partition.
    pub fn msdos_label() -> Self {
        PartedOp::MkLabel {
            label: "msdos".to_string(),
        }
    }

    /// One primary FAT32 partition spanning the whole disk.
    pub fn whole_disk_fat32() -> Self {
        PartedOp::MkPart {
            part_type: "primary".to_string(),
            fs_type: "fat32".to_string(),
            start: "0%".to_string(),
            end: "100%".to_string(),
        }
    }
}

pub fn parted_command(disk: &Path, op: PartedOp) -> CommandSpec {
    let cmd = CommandSpec::new("parted")
        .arg("--script")
        .arg(disk.display().to_string());
    match op {
        PartedOp::MkLabel { label } => cmd.arg("mklabel").arg(label),
        PartedOp::MkPart {
            part_type,
            fs_type,
            start,
            end,
        } => cmd
            .arg("mkpart")
            .arg(part_type)
            .arg(fs_type)
            .arg(start)
            .arg(end),
    }
}

/// Ask the kernel to re-read the partition table of `disk`.
pub fn partprobe_command(disk: &Path) -> CommandSpec {
    CommandSpec::new("partprobe").arg(disk.display().to_string())
}
