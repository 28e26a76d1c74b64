// src/core/mod.rs - Core Module Declaration
//! Core domain models and types
//!
//! The order record and the identifier the store assigns to it.

pub mod order;
pub mod types;

pub use order::{Order, OrderBuilder, OrderSide, OrderStatus, OrderType};
pub use types::{OrderId, Price, Quantity, Symbol, Timestamp};
