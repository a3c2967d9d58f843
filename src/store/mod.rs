//! Persistent store for the dashboard's cached values.
//!
//! One key per scalar or JSON-serialized field, namespaced by domain.
//! Storage errors are absorbed here; everything above sees either a value
//! or nothing.

mod field;
mod storage;

pub use field::{keys, Persisted};
pub use storage::{MemoryStore, SqliteStore, Store};
