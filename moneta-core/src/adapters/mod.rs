//! Concrete implementations of external concerns

pub mod snapshot;

pub use snapshot::SnapshotStore;
