// src/storage/filter.rs - Query Filters
//! Composable predicates for [`OrderRepository::orders`](super::OrderRepository::orders).
//!
//! A filter is a plain value describing one condition. Queries AND all
//! supplied filters together, so the order in which they are passed does not
//! change the result.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use crate::core::{
    order::{Order, OrderStatus},
    types::{Symbol, Timestamp},
};

/// A single query condition over an [`Order`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Filter {
    /// `order.symbol == symbol`
    PairEquals(Symbol),
    /// `order.status` is one of the listed statuses
    StatusIn(Vec<OrderStatus>),
    /// `order.updated_at <= t`
    UpdatedAtOrBefore(Timestamp),
}

impl Filter {
    /// Whether `order` satisfies this filter
    pub fn matches(&self, order: &Order) -> bool {
        match self {
            Self::PairEquals(symbol) => order.symbol == *symbol,
            Self::StatusIn(statuses) => statuses.contains(&order.status),
            Self::UpdatedAtOrBefore(t) => order.updated_at <= *t,
        }
    }

    /// Whether `order` satisfies every filter in `filters`
    pub fn all_match(filters: &[Filter], order: &Order) -> bool {
        filters.iter().all(|filter| filter.matches(order))
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PairEquals(symbol) => write!(f, "pair = {}", symbol),
            Self::StatusIn(statuses) => {
                let names: Vec<&str> = statuses.iter().map(|s| s.as_str()).collect();
                write!(f, "status in [{}]", names.join(", "))
            }
            Self::UpdatedAtOrBefore(t) => write!(f, "updated_at <= {}", t.to_rfc3339()),
        }
    }
}

/// Orders traded on `symbol`
pub fn with_pair<S: Into<Symbol>>(symbol: S) -> Filter {
    Filter::PairEquals(symbol.into())
}

/// Orders currently in `status`
pub fn with_status(status: OrderStatus) -> Filter {
    Filter::StatusIn(vec![status])
}

/// Orders whose status is any of `statuses`; an empty set matches nothing
pub fn with_status_in<I>(statuses: I) -> Filter
where
    I: IntoIterator<Item = OrderStatus>,
{
    Filter::StatusIn(statuses.into_iter().collect())
}

/// Orders last updated at or before `t`
pub fn with_update_at_before_or_equal(t: Timestamp) -> Filter {
    Filter::UpdatedAtOrBefore(t)
}
