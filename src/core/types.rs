// src/core/types.rs - Core Type Definitions
//! Core type definitions shared by the order model and the storage layer.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Type alias for trading pairs, e.g. `BTCUSDT`
pub type Symbol = String;

/// Type alias for prices
pub type Price = Decimal;

/// Type alias for quantities
pub type Quantity = Decimal;

/// Type alias for timestamps
pub type Timestamp = DateTime<Utc>;

/// Identifier assigned by the store when an order is created.
///
/// IDs come from a monotonically increasing sequence, so ordering by ID is
/// ordering by creation. The big-endian key encoding keeps that property for
/// byte-ordered backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl OrderId {
    /// Width of an encoded storage key
    pub const KEY_LEN: usize = 8;

    /// Storage key for this ID
    pub fn to_key(self) -> [u8; Self::KEY_LEN] {
        self.0.to_be_bytes()
    }

    /// Parse a storage key produced by [`OrderId::to_key`]
    pub fn from_key(key: &[u8]) -> Option<Self> {
        let bytes: [u8; Self::KEY_LEN] = key.try_into().ok()?;
        Some(Self(u64::from_be_bytes(bytes)))
    }

    /// The ID following this one in the sequence
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for OrderId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
