/// Storage subsystem - Record persistence and change notification
///
/// Backends do the raw key-value I/O; `DocumentStore` layers the
/// best-effort policy, typed helpers and change broadcasting on top.

pub mod backend;
pub mod store;

// Re-export public interface
pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use store::{ChangeSubscription, DocumentStore, StoreChange, StoreWatcher};
