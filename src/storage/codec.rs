// src/storage/codec.rs - Record Codec
//! Binary encoding of [`Order`] records.
//!
//! A record is one format-version byte followed by the bincode body. The body
//! uses fixed-width integers and rejects trailing bytes, so a payload decodes
//! only if it is exactly one well-formed order.

use bincode::Options;

use crate::{core::order::Order, StoreError, StoreResult};

/// Current record format version
pub const RECORD_VERSION: u8 = 1;

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

/// Encode an order into its stored form
pub fn encode(order: &Order) -> StoreResult<Vec<u8>> {
    let body = options()
        .serialize(order)
        .map_err(|e| StoreError::Validation(format!("Order cannot be encoded: {}", e)))?;

    let mut record = Vec::with_capacity(body.len() + 1);
    record.push(RECORD_VERSION);
    record.extend_from_slice(&body);
    Ok(record)
}

/// Decode a stored record
pub fn decode(record: &[u8]) -> StoreResult<Order> {
    let (version, body) = record
        .split_first()
        .ok_or_else(|| StoreError::CorruptRecord("empty payload".to_string()))?;

    if *version != RECORD_VERSION {
        return Err(StoreError::CorruptRecord(format!(
            "unsupported record version {}",
            version
        )));
    }

    options()
        .deserialize(body)
        .map_err(|e| StoreError::CorruptRecord(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        order::{OrderSide, OrderStatus, OrderType},
        types::OrderId,
    };
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn sample_order() -> Order {
        let created_at = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        Order {
            id: Some(OrderId(42)),
            exchange_id: -9,
            symbol: "BTCUSDT".to_string(),
            side: OrderSide::Sell,
            order_type: OrderType::StopLossLimit,
            status: OrderStatus::PartiallyFilled,
            price: dec!(27123.4500),
            quantity: dec!(0.00100),
            created_at,
            updated_at: created_at + chrono::Duration::nanoseconds(1),
            stop: Some(dec!(26999.9)),
            group_id: Some(3),
        }
    }

    #[test]
    fn test_round_trip_preserves_every_field() {
        let order = sample_order();
        let decoded = decode(&encode(&order).unwrap()).unwrap();

        assert_eq!(decoded, order);
        assert_eq!(decoded.created_at.timestamp_subsec_nanos(), 123_456_789);
        // Decimal scale survives, not just the numeric value
        assert_eq!(decoded.price.to_string(), "27123.4500");
        assert_eq!(decoded.quantity.to_string(), "0.00100");
    }

    #[test]
    fn test_round_trip_without_optionals() {
        let mut order = sample_order();
        order.id = None;
        order.stop = None;
        order.group_id = None;

        assert_eq!(decode(&encode(&order).unwrap()).unwrap(), order);
    }

    #[test]
    fn test_record_starts_with_version() {
        let record = encode(&sample_order()).unwrap();
        assert_eq!(record[0], RECORD_VERSION);
    }

    #[test]
    fn test_corrupt_payloads() {
        let record = encode(&sample_order()).unwrap();

        assert!(matches!(decode(&[]), Err(StoreError::CorruptRecord(_))));

        let mut wrong_version = record.clone();
        wrong_version[0] = 99;
        assert!(matches!(decode(&wrong_version), Err(StoreError::CorruptRecord(_))));

        let truncated = &record[..record.len() / 2];
        assert!(matches!(decode(truncated), Err(StoreError::CorruptRecord(_))));

        let mut trailing = record;
        trailing.push(0);
        assert!(matches!(decode(&trailing), Err(StoreError::CorruptRecord(_))));

        assert!(matches!(
            decode(b"\x01not an order"),
            Err(StoreError::CorruptRecord(_))
        ));
    }
}
