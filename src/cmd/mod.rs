//! One-shot command line operations.

pub mod snapshot;

pub use snapshot::{SnapshotArgs, SnapshotError};
