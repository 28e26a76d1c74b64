// src/storage/mod.rs - Storage Layer
//! # Storage Layer
//!
//! Byte-oriented backends, the record codec, query filters and the order
//! repository built on top of them.
//!
//! ```text
//! OrderStore::create_order / update_order
//!         │ codec::encode
//!         ▼
//! Backend::put(key = OrderId::to_key())
//!
//! OrderStore::orders(filters)
//!         │ Backend::scan_all (ascending key order)
//!         ▼
//! codec::decode ──► Filter::matches (AND) ──► Vec<Order>
//! ```
//!
//! Keys are big-endian sequence numbers, so ascending key order is creation
//! order in every backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display},
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::StoreResult;

pub mod codec;
pub mod filter;
pub mod memory;
pub mod persistent;
pub mod repository;

pub use filter::{
    with_pair, with_status, with_status_in, with_update_at_before_or_equal, Filter,
};
pub use memory::MemoryBackend;
pub use persistent::{PersistentBackend, PersistentConfig};
pub use repository::{OrderRepository, OrderStore};

/// Location string selecting the in-memory backend
pub const MEMORY_LOCATION: &str = ":memory:";

/// A raw `(key, value)` record as stored by a backend
pub type Record = (Vec<u8>, Vec<u8>);

/// Where a store keeps its records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
    /// Durable RocksDB directory, created if absent
    File(PathBuf),
    /// Process-lifetime in-memory map
    Memory,
}

impl Location {
    /// Parse a location string; [`MEMORY_LOCATION`] selects memory, anything else is a path
    pub fn parse(location: &str) -> Self {
        if location == MEMORY_LOCATION {
            Self::Memory
        } else {
            Self::File(PathBuf::from(location))
        }
    }

    /// File location for `path`
    pub fn file<P: AsRef<Path>>(path: P) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Memory => f.write_str(MEMORY_LOCATION),
        }
    }
}

/// Counters kept by every backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BackendStats {
    /// Point reads
    pub reads: u64,
    /// Writes
    pub writes: u64,
    /// Full scans
    pub scans: u64,
    /// Payload bytes written
    pub bytes_written: u64,
    /// Payload bytes read, scans included
    pub bytes_read: u64,
}

/// Ordered key/value store the repository persists through.
///
/// Implementations must make each `put` atomic with respect to other `put`s
/// and return `scan_all` results in ascending byte order of the keys.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Insert or overwrite the value stored under `key`
    async fn put(&self, key: &[u8], value: Vec<u8>) -> StoreResult<()>;

    /// Value stored under `key`, if any
    async fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    /// Every record in ascending key order
    async fn scan_all(&self) -> StoreResult<Vec<Record>>;

    /// Highest key currently stored
    async fn last_key(&self) -> StoreResult<Option<Vec<u8>>>;

    /// Persist buffered writes
    async fn flush(&self) -> StoreResult<()>;

    /// Snapshot of the backend counters
    fn stats(&self) -> BackendStats;
}

/// Open the backend for `location`
pub async fn open_backend(
    location: &Location,
    config: &PersistentConfig,
) -> StoreResult<Arc<dyn Backend>> {
    match location {
        Location::Memory => Ok(Arc::new(MemoryBackend::new())),
        Location::File(path) => {
            let backend = PersistentBackend::open(path, config.clone()).await?;
            Ok(Arc::new(backend))
        }
    }
}
