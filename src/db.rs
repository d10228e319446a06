pub mod datastore;
pub use datastore::{Datastore, Envelope, Record, Scope, Transaction};
pub mod query;
pub use query::Query;
pub mod snapshot;
pub use snapshot::{FileBackend, MemoryBackend, SnapshotBackend, StoreState};
