// src/core/order.rs - Order Domain Model
//! Order record stored by the repository, its enums and construction helpers.
//!
//! Status is caller-driven: the store records whatever status it is given and
//! does not enforce a transition graph.

use crate::{StoreError, StoreResult};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display},
    str::FromStr,
};

pub use crate::core::types::{OrderId, Price, Quantity, Symbol, Timestamp};

/// Order side - Buy or Sell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderSide {
    /// Buy order
    Buy,
    /// Sell order
    Sell,
}

impl Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

impl FromStr for OrderSide {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BUY" => Ok(Self::Buy),
            "SELL" => Ok(Self::Sell),
            _ => Err(StoreError::Validation(format!("Invalid order side: {}", s))),
        }
    }
}

/// Order type as reported by the exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    /// Execute only at the given price or better
    Limit,
    /// Execute immediately at the best available price
    Market,
    /// Limit order rejected if it would take liquidity
    LimitMaker,
    /// Market order triggered at a stop price
    StopLoss,
    /// Limit order triggered at a stop price
    StopLossLimit,
    /// Market order triggered at a profit target
    TakeProfit,
    /// Limit order triggered at a profit target
    TakeProfitLimit,
}

impl OrderType {
    /// Wire name used by exchange APIs
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Limit => "LIMIT",
            Self::Market => "MARKET",
            Self::LimitMaker => "LIMIT_MAKER",
            Self::StopLoss => "STOP_LOSS",
            Self::StopLossLimit => "STOP_LOSS_LIMIT",
            Self::TakeProfit => "TAKE_PROFIT",
            Self::TakeProfitLimit => "TAKE_PROFIT_LIMIT",
        }
    }
}

impl Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderType {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LIMIT" => Ok(Self::Limit),
            "MARKET" => Ok(Self::Market),
            "LIMIT_MAKER" => Ok(Self::LimitMaker),
            "STOP_LOSS" => Ok(Self::StopLoss),
            "STOP_LOSS_LIMIT" => Ok(Self::StopLossLimit),
            "TAKE_PROFIT" => Ok(Self::TakeProfit),
            "TAKE_PROFIT_LIMIT" => Ok(Self::TakeProfitLimit),
            _ => Err(StoreError::Validation(format!("Invalid order type: {}", s))),
        }
    }
}

/// Order status representing the current state of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Accepted by the exchange, nothing filled yet
    New,
    /// Some quantity filled
    PartiallyFilled,
    /// Completely filled
    Filled,
    /// Canceled by the user
    Canceled,
    /// Cancel request sent, awaiting confirmation
    PendingCancel,
    /// Rejected by the exchange
    Rejected,
    /// Expired by time-in-force rules
    Expired,
}

impl OrderStatus {
    /// Wire name used by exchange APIs
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::PartiallyFilled => "PARTIALLY_FILLED",
            Self::Filled => "FILLED",
            Self::Canceled => "CANCELED",
            Self::PendingCancel => "PENDING_CANCEL",
            Self::Rejected => "REJECTED",
            Self::Expired => "EXPIRED",
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NEW" => Ok(Self::New),
            "PARTIALLY_FILLED" => Ok(Self::PartiallyFilled),
            "FILLED" => Ok(Self::Filled),
            "CANCELED" => Ok(Self::Canceled),
            "PENDING_CANCEL" => Ok(Self::PendingCancel),
            "REJECTED" => Ok(Self::Rejected),
            "EXPIRED" => Ok(Self::Expired),
            _ => Err(StoreError::Validation(format!("Invalid order status: {}", s))),
        }
    }
}

/// Trade order record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Store-assigned ID, `None` until the order is created
    pub id: Option<OrderId>,
    /// ID reported by the exchange
    pub exchange_id: i64,
    /// Trading pair
    pub symbol: Symbol,
    /// Order side
    pub side: OrderSide,
    /// Order type
    pub order_type: OrderType,
    /// Current order status
    pub status: OrderStatus,
    /// Order price
    pub price: Price,
    /// Order quantity
    pub quantity: Quantity,
    /// Creation timestamp
    pub created_at: Timestamp,
    /// Last update timestamp
    pub updated_at: Timestamp,
    /// Stop price of an OCO leg
    pub stop: Option<Price>,
    /// OCO group linking both legs
    pub group_id: Option<i64>,
}

impl Order {
    /// Start building an order
    pub fn builder() -> OrderBuilder {
        OrderBuilder::new()
    }

    /// Validate the fields the store relies on
    pub fn validate(&self) -> StoreResult<()> {
        if self.symbol.trim().is_empty() {
            return Err(StoreError::Validation("Symbol is required".to_string()));
        }

        if self.price < Decimal::ZERO {
            return Err(StoreError::Validation(format!(
                "Price must not be negative: {}",
                self.price
            )));
        }

        if self.quantity < Decimal::ZERO {
            return Err(StoreError::Validation(format!(
                "Quantity must not be negative: {}",
                self.quantity
            )));
        }

        if let Some(stop) = self.stop {
            if stop < Decimal::ZERO {
                return Err(StoreError::Validation(format!(
                    "Stop price must not be negative: {}",
                    stop
                )));
            }
        }

        if self.updated_at < self.created_at {
            return Err(StoreError::Validation(format!(
                "updated_at {} precedes created_at {}",
                self.updated_at, self.created_at
            )));
        }

        Ok(())
    }

    /// Notional value (price * quantity)
    pub fn notional(&self) -> Decimal {
        self.price * self.quantity
    }
}

impl Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self
            .id
            .map_or_else(|| "-".to_string(), |id| id.to_string());
        write!(
            f,
            "[{}] {} {} | ID: {}, Type: {}, {} x ${} (~${})",
            self.status,
            self.side,
            self.symbol,
            id,
            self.order_type,
            self.quantity,
            self.price,
            self.notional().round_dp(2)
        )
    }
}

/// Builder pattern for creating orders
#[derive(Debug, Clone, Default)]
pub struct OrderBuilder {
    exchange_id: i64,
    symbol: Option<Symbol>,
    side: Option<OrderSide>,
    order_type: Option<OrderType>,
    status: Option<OrderStatus>,
    price: Price,
    quantity: Option<Quantity>,
    created_at: Option<Timestamp>,
    updated_at: Option<Timestamp>,
    stop: Option<Price>,
    group_id: Option<i64>,
}

impl OrderBuilder {
    /// Create a new order builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the exchange-side ID
    pub fn exchange_id(mut self, exchange_id: i64) -> Self {
        self.exchange_id = exchange_id;
        self
    }

    /// Set symbol
    pub fn symbol<S: Into<Symbol>>(mut self, symbol: S) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Set order side
    pub fn side(mut self, side: OrderSide) -> Self {
        self.side = Some(side);
        self
    }

    /// Set as buy order
    pub fn buy(self) -> Self {
        self.side(OrderSide::Buy)
    }

    /// Set as sell order
    pub fn sell(self) -> Self {
        self.side(OrderSide::Sell)
    }

    /// Set order type
    pub fn order_type(mut self, order_type: OrderType) -> Self {
        self.order_type = Some(order_type);
        self
    }

    /// Set as market order
    pub fn market(self) -> Self {
        self.order_type(OrderType::Market)
    }

    /// Set as limit order with price
    pub fn limit(mut self, price: Price) -> Self {
        self.order_type = Some(OrderType::Limit);
        self.price = price;
        self
    }

    /// Set status, defaults to [`OrderStatus::New`]
    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Set price
    pub fn price(mut self, price: Price) -> Self {
        self.price = price;
        self
    }

    /// Set quantity
    pub fn quantity(mut self, quantity: Quantity) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Set creation time, defaults to now
    pub fn created_at(mut self, created_at: Timestamp) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Set update time, defaults to the creation time
    pub fn updated_at(mut self, updated_at: Timestamp) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    /// Set the stop price of an OCO leg
    pub fn stop(mut self, stop: Price) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Set the OCO group
    pub fn group_id(mut self, group_id: i64) -> Self {
        self.group_id = Some(group_id);
        self
    }

    /// Build the order
    pub fn build(self) -> StoreResult<Order> {
        let symbol = self
            .symbol
            .ok_or_else(|| StoreError::Validation("Symbol is required".to_string()))?;

        let side = self
            .side
            .ok_or_else(|| StoreError::Validation("Order side is required".to_string()))?;

        let order_type = self
            .order_type
            .ok_or_else(|| StoreError::Validation("Order type is required".to_string()))?;

        let quantity = self
            .quantity
            .ok_or_else(|| StoreError::Validation("Quantity is required".to_string()))?;

        let created_at = self.created_at.unwrap_or_else(Utc::now);

        let order = Order {
            id: None,
            exchange_id: self.exchange_id,
            symbol,
            side,
            order_type,
            status: self.status.unwrap_or(OrderStatus::New),
            price: self.price,
            quantity,
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
            stop: self.stop,
            group_id: self.group_id,
        };

        order.validate()?;
        Ok(order)
    }
}
