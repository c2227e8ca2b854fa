//! Filesystem creation.

use super::CommandSpec;
use std::path::Path;

/// `mkfs.fat -n <label> <partition>`.
///
/// The label is passed through untouched; mkfs.fat enforces its own limits.
pub fn mkfs_fat_command(partition: &Path, label: &str) -> CommandSpec {
    CommandSpec::new("mkfs.fat")
        .arg("-n")
        .arg(label)
        .arg(partition.display().to_string())
}
