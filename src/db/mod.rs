pub mod models;
pub mod snapshot;

pub use snapshot::{SnapshotStore, SqliteSnapshotStore};
