//! fatstamp hardware abstraction layer.
//!
//! Everything that touches the operating system goes through here: external
//! programs via [`CommandRunner`], block-device checks via [`ProbeOps`], and the
//! scoped mount used while populating a freshly formatted partition.

pub mod hal;
pub mod path;

pub use fatstamp_error::{FlashError, FlashResult};
pub use hal::*;
