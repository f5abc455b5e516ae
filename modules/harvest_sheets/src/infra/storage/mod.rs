//! Storage layer - persistence of settings and photo records

pub mod repositories;

pub use repositories::{FileKeyValueStore, MemoryKeyValueStore};
