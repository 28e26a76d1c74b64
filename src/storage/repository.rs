// src/storage/repository.rs - Order Repository
//! # Order Repository
//!
//! [`OrderStore`] assigns identities, runs orders through the codec and
//! persists them in a [`Backend`]. Queries scan the backend in key order, so
//! results always come back in creation order regardless of later updates.
//!
//! Writes are serialized by one async mutex that also owns the last assigned
//! ID. Reads take no lock: a scan racing a write sees the record either
//! before or after the write, never half-written.

use async_trait::async_trait;
use std::{path::Path, sync::Arc};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::{
    codec, open_backend, Backend, BackendStats, Filter, Location, PersistentConfig,
};
use crate::{
    config::StoreConfig,
    core::{order::Order, types::OrderId},
    StoreError, StoreResult,
};

/// Order bookkeeping operations used by the trading engine
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist a new order and write its assigned ID back into `order`
    ///
    /// The order must not carry an ID yet: an order with `id` already set,
    /// including one that was created before, is rejected with
    /// [`StoreError::Validation`]. To retry after a failed create, pass the
    /// same value again; its `id` is left `None` on failure.
    async fn create_order(&self, order: &mut Order) -> StoreResult<()>;

    /// Overwrite an existing order in place
    async fn update_order(&self, order: &Order) -> StoreResult<()>;

    /// Fetch a single order
    async fn order(&self, id: OrderId) -> StoreResult<Order>;

    /// All orders matching every filter, in creation order
    async fn orders(&self, filters: &[Filter]) -> StoreResult<Vec<Order>>;
}

/// Repository over a single exclusively owned backend handle
pub struct OrderStore {
    backend: Arc<dyn Backend>,
    location: Location,
    last_id: Mutex<OrderId>,
}

impl std::fmt::Debug for OrderStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderStore")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl OrderStore {
    /// Durable store in the RocksDB directory at `path`
    pub async fn from_file<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Self::open(&Location::file(path), &PersistentConfig::default()).await
    }

    /// Ephemeral store living as long as the process
    pub async fn from_memory() -> StoreResult<Self> {
        Self::open(&Location::Memory, &PersistentConfig::default()).await
    }

    /// Store for the configured location
    pub async fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        Self::open(&Location::parse(&config.location), &config.persistent).await
    }

    /// Open `location`, tuning RocksDB with `config` when file-backed
    pub async fn open(location: &Location, config: &PersistentConfig) -> StoreResult<Self> {
        let backend = open_backend(location, config).await?;
        Self::with_backend(location.clone(), backend).await
    }

    /// Wrap an already opened backend
    ///
    /// Fails with [`StoreError::BackendUnavailable`] when the highest stored
    /// key cannot be read or is not an order ID.
    pub async fn with_backend(location: Location, backend: Arc<dyn Backend>) -> StoreResult<Self> {
        let unavailable = |reason: String| StoreError::BackendUnavailable {
            location: location.to_string(),
            reason,
        };

        let last_key = backend
            .last_key()
            .await
            .map_err(|e| unavailable(e.to_string()))?;
        let last_id = match last_key {
            Some(key) => OrderId::from_key(&key)
                .ok_or_else(|| unavailable(format!("malformed record key {:?}", key)))?,
            None => OrderId(0),
        };

        info!(%location, last_id = last_id.0, "Order store opened");
        Ok(Self {
            backend,
            location,
            last_id: Mutex::new(last_id),
        })
    }

    /// Where this store keeps its records
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Backend counters
    pub fn stats(&self) -> BackendStats {
        self.backend.stats()
    }

    /// Flush pending writes and release the backend handle
    pub async fn close(self) -> StoreResult<()> {
        // Waits for an in-flight write to finish
        let _guard = self.last_id.lock().await;
        self.backend.flush().await?;
        info!(location = %self.location, "Order store closed");
        Ok(())
    }

    async fn load(&self, id: OrderId) -> StoreResult<Order> {
        let key = id.to_key();
        let payload = self
            .backend
            .get(&key)
            .await?
            .ok_or(StoreError::NotFound(id))?;
        decode_record(&key, &payload)
    }
}

/// Decode a scanned record and check it is stored under its own ID
fn decode_record(key: &[u8], payload: &[u8]) -> StoreResult<Order> {
    let id = OrderId::from_key(key)
        .ok_or_else(|| StoreError::CorruptRecord(format!("malformed record key {:?}", key)))?;

    let order = codec::decode(payload).map_err(|e| match e {
        StoreError::CorruptRecord(reason) => {
            StoreError::CorruptRecord(format!("order {}: {}", id, reason))
        }
        other => other,
    })?;

    if order.id != Some(id) {
        return Err(StoreError::CorruptRecord(format!(
            "order {} stored with ID {:?}",
            id, order.id
        )));
    }

    Ok(order)
}

#[async_trait]
impl OrderRepository for OrderStore {
    #[instrument(skip(self, order), fields(symbol = %order.symbol))]
    async fn create_order(&self, order: &mut Order) -> StoreResult<()> {
        if let Some(id) = order.id {
            return Err(StoreError::Validation(format!(
                "Order already has ID {}",
                id
            )));
        }
        order.validate()?;

        let mut last_id = self.last_id.lock().await;
        let id = last_id
            .next()
            .ok_or_else(|| StoreError::BackendIo("order ID sequence exhausted".to_string()))?;

        let mut record = order.clone();
        record.id = Some(id);
        let payload = codec::encode(&record)?;
        self.backend.put(&id.to_key(), payload).await?;

        *last_id = id;
        order.id = Some(id);
        debug!(%id, "Created order");
        Ok(())
    }

    #[instrument(skip(self, order), fields(id = ?order.id))]
    async fn update_order(&self, order: &Order) -> StoreResult<()> {
        let id = order.id.ok_or_else(|| {
            StoreError::Validation("Order has no ID; create it first".to_string())
        })?;
        order.validate()?;

        let _guard = self.last_id.lock().await;
        let stored = self.load(id).await?;

        if order.created_at != stored.created_at {
            warn!(%id, "Rejected update changing created_at");
            return Err(StoreError::Validation(format!(
                "created_at of order {} cannot change",
                id
            )));
        }

        if order.updated_at < stored.updated_at {
            warn!(%id, "Rejected update moving updated_at backwards");
            return Err(StoreError::Validation(format!(
                "updated_at {} of order {} precedes stored {}",
                order.updated_at, id, stored.updated_at
            )));
        }

        let payload = codec::encode(order)?;
        self.backend.put(&id.to_key(), payload).await?;

        debug!(%id, status = %order.status, "Updated order");
        Ok(())
    }

    async fn order(&self, id: OrderId) -> StoreResult<Order> {
        self.load(id).await
    }

    #[instrument(skip(self, filters), fields(filter_count = filters.len()))]
    async fn orders(&self, filters: &[Filter]) -> StoreResult<Vec<Order>> {
        for filter in filters {
            debug!(%filter, "Applying filter");
        }

        let records = self.backend.scan_all().await?;
        let scanned = records.len();

        let mut orders = Vec::new();
        for (key, payload) in records {
            let order = decode_record(&key, &payload)?;
            if Filter::all_match(filters, &order) {
                orders.push(order);
            }
        }

        debug!(scanned, matched = orders.len(), "Queried orders");
        Ok(orders)
    }
}
