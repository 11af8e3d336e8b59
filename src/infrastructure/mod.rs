//! Adapters for the domain ports: snapshot stores and clocks.

pub mod clock;
pub mod in_memory;
pub mod json_file;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
