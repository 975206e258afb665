//! Adapters layer: production implementations of outbound ports.

pub mod file_store;

pub use file_store::FileBackedKVStore;
