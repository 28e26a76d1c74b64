// src/storage/persistent.rs - Persistent Storage Backend
//! # Persistent Storage Layer
//!
//! Durable storage using RocksDB. Records live in the `orders` column family,
//! where RocksDB's bytewise comparator keeps them in key order across
//! restarts and compactions.
//!
//! RocksDB takes an exclusive `LOCK` file on open. Opening the same directory
//! from a second handle while the first is alive fails with
//! [`StoreError::BackendUnavailable`]; callers must not share a directory.

use async_trait::async_trait;
use rocksdb::{
    BlockBasedOptions, Cache, ColumnFamily, ColumnFamilyDescriptor, DBCompressionType,
    IteratorMode, Options as RocksOptions, WriteOptions, DB,
};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Instant,
};
use tokio::task::spawn_blocking;
use tracing::{debug, info, instrument};

use super::{Backend, BackendStats, Record};
use crate::{StoreError, StoreResult};

/// Column family holding order records
const CF_ORDERS: &str = "orders";

/// Tuning for the RocksDB backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistentConfig {
    /// Enable LZ4/Zstd compression
    pub compression: bool,
    /// Block cache size in MB, 0 disables the cache
    pub cache_size_mb: usize,
    /// Write buffer size in MB
    pub write_buffer_size_mb: usize,
    /// Maximum write buffer number
    pub max_write_buffer_number: i32,
    /// fsync every write
    pub sync_writes: bool,
}

impl Default for PersistentConfig {
    fn default() -> Self {
        Self {
            compression: true,
            cache_size_mb: 64,
            write_buffer_size_mb: 16,
            max_write_buffer_number: 2,
            sync_writes: false,
        }
    }
}

#[derive(Debug, Default)]
struct PersistentStats {
    reads: AtomicU64,
    writes: AtomicU64,
    scans: AtomicU64,
    bytes_written: AtomicU64,
    bytes_read: AtomicU64,
}

/// RocksDB-backed store
pub struct PersistentBackend {
    db: Arc<DB>,
    path: PathBuf,
    config: PersistentConfig,
    stats: PersistentStats,
}

impl std::fmt::Debug for PersistentBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentBackend")
            .field("path", &self.path)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PersistentBackend {
    /// Open (or create) the database directory at `path`
    pub async fn open<P: AsRef<Path>>(path: P, config: PersistentConfig) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        info!("Initializing persistent storage at {:?}", path);

        let unavailable = |reason: String| StoreError::BackendUnavailable {
            location: path.display().to_string(),
            reason,
        };

        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|e| unavailable(format!("failed to create data directory: {}", e)))?;

        let db_path = path.clone();
        let db_config = config.clone();
        let db = spawn_blocking(move || Self::open_database(&db_path, &db_config))
            .await
            .map_err(|e| unavailable(format!("failed to spawn database opening task: {}", e)))?
            .map_err(|e| unavailable(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            path,
            config,
            stats: PersistentStats::default(),
        })
    }

    /// Open RocksDB with the configured settings
    fn open_database(path: &Path, config: &PersistentConfig) -> Result<DB, rocksdb::Error> {
        let mut db_opts = RocksOptions::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        db_opts.set_write_buffer_size(config.write_buffer_size_mb * 1024 * 1024);
        db_opts.set_max_write_buffer_number(config.max_write_buffer_number);

        if config.compression {
            db_opts.set_compression_type(DBCompressionType::Lz4);
            db_opts.set_bottommost_compression_type(DBCompressionType::Zstd);
        }

        if config.cache_size_mb > 0 {
            let cache = Cache::new_lru_cache(config.cache_size_mb * 1024 * 1024);
            let mut block_opts = BlockBasedOptions::default();
            block_opts.set_block_cache(&cache);
            block_opts.set_cache_index_and_filter_blocks(true);
            db_opts.set_block_based_table_factory(&block_opts);
        }

        db_opts.increase_parallelism(num_cpus::get() as i32);

        let cfs = vec![ColumnFamilyDescriptor::new(CF_ORDERS, db_opts.clone())];
        DB::open_cf_descriptors(&db_opts, path, cfs)
    }

    /// Directory this backend was opened on
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Compact the order column family
    pub async fn compact(&self) -> StoreResult<()> {
        info!("Starting database compaction");
        let db = Arc::clone(&self.db);

        spawn_blocking(move || {
            let cf = orders_cf(&db)?;
            db.compact_range_cf(cf, None::<&[u8]>, None::<&[u8]>);
            Ok::<(), StoreError>(())
        })
        .await
        .map_err(io_error)??;

        info!("Database compaction completed");
        Ok(())
    }
}

fn orders_cf(db: &DB) -> StoreResult<&ColumnFamily> {
    db.cf_handle(CF_ORDERS)
        .ok_or_else(|| StoreError::BackendIo(format!("Column family {} not found", CF_ORDERS)))
}

fn io_error<E: ToString>(e: E) -> StoreError {
    StoreError::BackendIo(e.to_string())
}

#[async_trait]
impl Backend for PersistentBackend {
    #[instrument(skip_all, fields(bytes = value.len()))]
    async fn put(&self, key: &[u8], value: Vec<u8>) -> StoreResult<()> {
        let start = Instant::now();
        let size = value.len() as u64;
        let key = key.to_vec();
        let sync = self.config.sync_writes;

        let db = Arc::clone(&self.db);
        spawn_blocking(move || {
            let cf = orders_cf(&db)?;
            let mut write_opts = WriteOptions::default();
            write_opts.set_sync(sync);
            db.put_cf_opt(cf, &key, &value, &write_opts).map_err(io_error)
        })
        .await
        .map_err(io_error)??;

        self.stats.writes.fetch_add(1, Ordering::Relaxed);
        self.stats.bytes_written.fetch_add(size, Ordering::Relaxed);
        debug!("Persisted record in {:?}", start.elapsed());
        Ok(())
    }

    async fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        let key = key.to_vec();
        let db = Arc::clone(&self.db);

        let value = spawn_blocking(move || {
            let cf = orders_cf(&db)?;
            db.get_cf(cf, &key).map_err(io_error)
        })
        .await
        .map_err(io_error)??;

        self.stats.reads.fetch_add(1, Ordering::Relaxed);
        if let Some(bytes) = &value {
            self.stats
                .bytes_read
                .fetch_add(bytes.len() as u64, Ordering::Relaxed);
        }
        Ok(value)
    }

    #[instrument(skip(self))]
    async fn scan_all(&self) -> StoreResult<Vec<Record>> {
        let start = Instant::now();
        let db = Arc::clone(&self.db);

        let records = spawn_blocking(move || {
            let cf = orders_cf(&db)?;
            db.iterator_cf(cf, IteratorMode::Start)
                .map(|item| {
                    item.map(|(k, v)| (k.into_vec(), v.into_vec()))
                        .map_err(io_error)
                })
                .collect::<StoreResult<Vec<Record>>>()
        })
        .await
        .map_err(io_error)??;

        let bytes: usize = records.iter().map(|(_, v)| v.len()).sum();
        self.stats.scans.fetch_add(1, Ordering::Relaxed);
        self.stats.bytes_read.fetch_add(bytes as u64, Ordering::Relaxed);
        debug!("Scanned {} records in {:?}", records.len(), start.elapsed());
        Ok(records)
    }

    async fn last_key(&self) -> StoreResult<Option<Vec<u8>>> {
        let db = Arc::clone(&self.db);

        spawn_blocking(move || {
            let cf = orders_cf(&db)?;
            let last = db.iterator_cf(cf, IteratorMode::End).next();
            match last {
                Some(item) => item.map(|(k, _)| Some(k.into_vec())).map_err(io_error),
                None => Ok(None),
            }
        })
        .await
        .map_err(io_error)?
    }

    async fn flush(&self) -> StoreResult<()> {
        let db = Arc::clone(&self.db);

        spawn_blocking(move || {
            let cf = orders_cf(&db)?;
            db.flush_cf(cf).map_err(io_error)
        })
        .await
        .map_err(io_error)?
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

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_backend() -> (PersistentBackend, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let backend = PersistentBackend::open(temp_dir.path(), PersistentConfig::default())
            .await
            .unwrap();
        (backend, temp_dir)
    }

    #[tokio::test]
    async fn test_persistent_backend_crud() {
        let (backend, _temp) = create_test_backend().await;

        backend.put(b"a", b"first".to_vec()).await.unwrap();
        assert_eq!(backend.get(b"a").await.unwrap(), Some(b"first".to_vec()));
        assert_eq!(backend.get(b"b").await.unwrap(), None);

        backend.put(b"a", b"second".to_vec()).await.unwrap();
        assert_eq!(backend.get(b"a").await.unwrap(), Some(b"second".to_vec()));
        assert_eq!(backend.scan_all().await.unwrap().len(), 1);

        let stats = backend.stats();
        assert_eq!(stats.writes, 2);
        assert_eq!(stats.scans, 1);
    }

    #[tokio::test]
    async fn test_scan_order_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();

        {
            let backend = PersistentBackend::open(temp_dir.path(), PersistentConfig::default())
                .await
                .unwrap();
            for id in [2u64, 300, 1] {
                backend
                    .put(&id.to_be_bytes(), id.to_string().into_bytes())
                    .await
                    .unwrap();
            }
            backend.flush().await.unwrap();
            backend.compact().await.unwrap();
        }

        let backend = PersistentBackend::open(temp_dir.path(), PersistentConfig::default())
            .await
            .unwrap();
        let values: Vec<Vec<u8>> = backend
            .scan_all()
            .await
            .unwrap()
            .into_iter()
            .map(|(_, v)| v)
            .collect();
        assert_eq!(values, vec![b"1".to_vec(), b"2".to_vec(), b"300".to_vec()]);
        assert_eq!(
            backend.last_key().await.unwrap(),
            Some(300u64.to_be_bytes().to_vec())
        );
    }

    #[tokio::test]
    async fn test_second_open_is_rejected() {
        let (_backend, temp) = create_test_backend().await;

        let result = PersistentBackend::open(temp.path(), PersistentConfig::default()).await;
        assert!(matches!(result, Err(StoreError::BackendUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_unusable_path() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("plain-file");
        std::fs::write(&file, b"not a directory").unwrap();

        let result = PersistentBackend::open(file.join("db"), PersistentConfig::default()).await;
        assert!(matches!(result, Err(StoreError::BackendUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_uncompressed_without_cache() {
        let temp = TempDir::new().unwrap();
        let config = PersistentConfig {
            compression: false,
            cache_size_mb: 0,
            sync_writes: true,
            ..Default::default()
        };

        let backend = PersistentBackend::open(temp.path(), config).await.unwrap();
        backend.put(b"k", b"v".to_vec()).await.unwrap();
        assert_eq!(backend.last_key().await.unwrap(), Some(b"k".to_vec()));
        assert_eq!(backend.path(), temp.path());
    }
}
