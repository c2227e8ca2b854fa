use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type FlashResult<T> = Result<T, FlashError>;

/// Failure of a single flashing step.
///
/// Every step of a device pipeline reports through this one type, whether the
/// failure came from an external tool's exit status or from a local check.
#[derive(Error, Debug)]
pub enum FlashError {
    #[error("Command failed: {command} (exit={code:?})")]
    CommandFailed { command: String, code: Option<i32> },

    #[error("Partition {} did not appear as a block device", expected_path.display())]
    VerificationFailed { expected_path: PathBuf },

    #[error(transparent)]
    Unclassified(#[from] anyhow::Error),
}

impl FlashError {
    /// Short name of the failure kind, used in log lines and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            FlashError::CommandFailed { .. } => "command-failed",
            FlashError::VerificationFailed { .. } => "verification-failed",
            FlashError::Unclassified(_) => "unclassified",
        }
    }
}

impl From<io::Error> for FlashError {
    fn from(err: io::Error) -> Self {
        FlashError::Unclassified(anyhow::Error::new(err))
    }
}

#[derive(Error, Debug)]
pub enum StampError {
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("fatstamp must run as root to partition block devices")]
    NotRoot,

    #[error("Required tool not found on PATH: {0}")]
    MissingTool(String),

    #[error("Operation aborted by user")]
    Aborted,
}
