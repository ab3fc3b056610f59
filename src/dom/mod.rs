pub mod selector;
pub mod snapshot;

pub use snapshot::{SnapshotEnvironment, SnapshotError, SnapshotNode};
