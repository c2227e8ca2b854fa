use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Path of the first partition on `disk`.
///
/// Always the disk path with `1` appended; no probing and no `p1` handling for
/// nvme/mmcblk style names. Callers pass disks for which this holds.
pub fn partition_path(disk: &Path) -> PathBuf {
    let mut s = OsString::from(disk.as_os_str());
    s.push("1");
    PathBuf::from(s)
}
