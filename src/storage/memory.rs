// src/storage/memory.rs - In-Memory Storage Backend
//! # In-Memory Storage Backend
//!
//! Ordered map behind a `parking_lot` lock. Records live for the lifetime of
//! the process; nothing is written to disk.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicU64, Ordering},
};
use tracing::{debug, info};

use super::{Backend, BackendStats, Record};
use crate::StoreResult;

#[derive(Debug, Default)]
struct MemoryStats {
    reads: AtomicU64,
    writes: AtomicU64,
    scans: AtomicU64,
    bytes_written: AtomicU64,
    bytes_read: AtomicU64,
}

/// In-memory backend; `BTreeMap` keeps keys in ascending byte order
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
    stats: MemoryStats,
}

impl MemoryBackend {
    /// Create an empty in-memory backend
    pub fn new() -> Self {
        info!("Initializing in-memory order storage");
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether no record is stored
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn put(&self, key: &[u8], value: Vec<u8>) -> StoreResult<()> {
        let size = value.len() as u64;
        self.records.write().insert(key.to_vec(), value);

        self.stats.writes.fetch_add(1, Ordering::Relaxed);
        self.stats.bytes_written.fetch_add(size, Ordering::Relaxed);
        debug!(bytes = size, "Stored record in memory");
        Ok(())
    }

    async fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        let value = self.records.read().get(key).cloned();

        self.stats.reads.fetch_add(1, Ordering::Relaxed);
        if let Some(bytes) = &value {
            self.stats
                .bytes_read
                .fetch_add(bytes.len() as u64, Ordering::Relaxed);
        }
        Ok(value)
    }

    async fn scan_all(&self) -> StoreResult<Vec<Record>> {
        let records: Vec<Record> = self
            .records
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let bytes: usize = records.iter().map(|(_, v)| v.len()).sum();
        self.stats.scans.fetch_add(1, Ordering::Relaxed);
        self.stats.bytes_read.fetch_add(bytes as u64, Ordering::Relaxed);
        Ok(records)
    }

    async fn last_key(&self) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.records.read().keys().next_back().cloned())
    }

    async fn flush(&self) -> StoreResult<()> {
        Ok(())
    }

    fn stats(&self) -> BackendStats {
        BackendStats {
            reads: self.stats.reads.load(Ordering::Relaxed),
            writes: self.stats.writes.load(Ordering::Relaxed),
            scans: self.stats.scans.load(Ordering::Relaxed),
            bytes_written: self.stats.bytes_written.load(Ordering::Relaxed),
            bytes_read: self.stats.bytes_read.load(Ordering::Relaxed),
        }
    }
}
