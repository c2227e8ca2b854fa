//! System-level operations.

use super::{CommandRunner, CommandSpec};
use crate::FlashResult;

pub fn sync_command() -> CommandSpec {
    CommandSpec::new("sync")
}

/// Flush every buffered write to durable storage.
pub async fn sync_barrier<R: CommandRunner + ?Sized>(runner: &R) -> FlashResult<()> {
    log::info!("Flushing buffered writes to disk");
    runner.run(&sync_command()).await
}
