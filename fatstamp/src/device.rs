//! Target devices.

use anyhow::{Context, Result};
use fatstamp_error::StampError;
use std::fs::{self, File};
use std::io::{self, Seek, SeekFrom};
use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};

/// A whole-disk block device to be flashed. Immutable for the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    path: PathBuf,
    size_bytes: u64,
}

impl Device {
    pub fn new(path: impl Into<PathBuf>, size_bytes: u64) -> Self {
        Self {
            path: path.into(),
            size_bytes,
        }
    }

    /// Check that `path` is a block device and measure its capacity.
    pub fn probe(path: &Path) -> Result<Self> {
        let meta = match fs::metadata(path) {
            Ok(meta) => meta,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(StampError::ValidationFailed(format!(
                    "Disk device not found: {}",
                    path.display()
                ))
                .into());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to stat {}", path.display()))
            }
        };
        if !meta.file_type().is_block_device() {
            return Err(StampError::ValidationFailed(format!(
                "Not a block device: {}",
                path.display()
            ))
            .into());
        }

        let mut file =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let size_bytes = measure_size(&mut file)
            .with_context(|| format!("Failed to determine size of {}", path.display()))?;
        Ok(Self::new(path, size_bytes))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `<disk>1`, always.
    pub fn partition_path(&self) -> PathBuf {
        fatstamp_hal::path::partition_path(&self.path)
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }
}

/// Capacity by seeking to the end. Block devices report a zero length in
/// their metadata, so this is the only portable way to size them.
pub fn measure_size<S: Seek>(stream: &mut S) -> io::Result<u64> {
    stream.seek(SeekFrom::End(0))
}

pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
