//! `OrderStore` adapters.

pub mod in_memory;
pub mod rest;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
