//! Device node probing.

use crate::FlashResult;
use std::path::Path;

/// Probing operations trait.
#[allow(async_fn_in_trait)]
pub trait ProbeOps {
    /// True if `path` exists and is a block special file. A missing path is
    /// `Ok(false)`, not an error.
    async fn is_block_device(&self, path: &Path) -> FlashResult<bool>;
}
