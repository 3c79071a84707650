//! Storage layer
//!
//! Local key-value persistence for the few values that outlive a session.

pub mod kv_store;

pub use kv_store::KeyValueStore;
