// src/lib.rs - Order Store Library Root
//! # Order Store - Embedded Order Persistence
//!
//! Durable bookkeeping of trade orders for an automated trading system:
//! - Store-assigned, creation-ordered order IDs
//! - Point updates that keep an order's identity and position
//! - Composable filtered queries (pair, status, status set, update time)
//! - RocksDB-backed or in-memory storage behind one backend trait
//!
//! ## Architecture
//!
//! ```text
//!              ┌──────────────────────────┐
//!              │       OrderStore         │
//!              │ create / update / query  │
//!              └─────┬──────────────┬─────┘
//!                    │              │
//!           ┌────────▼──────┐  ┌────▼─────────┐
//!           │  Record Codec │  │   Filters    │
//!           │   (bincode)   │  │ (predicates) │
//!           └────────┬──────┘  └──────────────┘
//!                    │
//!        ┌───────────▼────────────┐
//!        │        Backend         │
//!        │  RocksDB  │  BTreeMap  │
//!        └────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use order_store::prelude::*;
//! use rust_decimal::Decimal;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = OrderStore::from_file("./data/orders").await?;
//!
//!     let mut order = OrderBuilder::new()
//!         .symbol("BTCUSDT")
//!         .buy()
//!         .limit(Decimal::new(30_000, 0))
//!         .quantity(Decimal::new(1, 2))
//!         .build()?;
//!     store.create_order(&mut order).await?;
//!
//!     let open = store.orders(&[with_pair("BTCUSDT"), with_status(OrderStatus::New)]).await?;
//!     println!("{} open BTCUSDT orders", open.len());
//!     Ok(())
//! }
//! ```

#![warn(clippy::all, missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod error;
pub mod storage;
pub mod telemetry;

pub use crate::core::{
    order::{Order, OrderBuilder, OrderSide, OrderStatus, OrderType},
    types::{OrderId, Price, Quantity, Symbol, Timestamp},
};
pub use crate::config::{LogFormat, LoggingConfig, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use storage::{
    with_pair, with_status, with_status_in, with_update_at_before_or_equal, Backend, Filter,
    Location, OrderRepository, OrderStore,
};

/// Prelude module for convenient imports
pub mod prelude {
    //! Prelude module that re-exports the most commonly used types and traits

    pub use crate::{
        core::{
            order::{Order, OrderBuilder, OrderSide, OrderStatus, OrderType},
            types::OrderId,
        },
        storage::{
            with_pair, with_status, with_status_in, with_update_at_before_or_equal, Filter,
            OrderRepository, OrderStore,
        },
        StoreError, StoreResult,
    };
}

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
