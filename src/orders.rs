use serde::{Deserialize, Serialize};

use crate::limit::Price;

/// Stable identifier assigned to an order at creation time by the book that
/// accepted it. Never reused within the lifetime of a book instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Limit,
    Market,
}

/// A resting or transient participant in the book.
///
/// `resident_limit` is `Some(price)` iff the order currently rests in the
/// `Limit` at that price on `side`; it is cleared the moment the order is
/// removed (fully filled or cancelled). Order data lives in exactly one
/// place — the book's id index — `Limit`s only ever hold `OrderId`s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub side: Side,
    /// Remaining quantity. Monotonically non-increasing; `0` means filled.
    pub size: u64,
    /// Monotonic per-book tiebreaker for FIFO priority within a price level.
    pub created_at: u64,
    pub resident_limit: Option<Price>,
}
