use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::book_side::BookSide;
use crate::errors::OrderBookError;
use crate::limit::Price;
use crate::matching::{self, Match};
use crate::orders::{Order, OrderId, Side};

/// A single-instrument continuous double-auction order book.
///
/// Owns both sides (`bids`, `asks`) and the order id index. Every mutating
/// method runs to completion synchronously — there are no suspension points
/// and no internal locking; callers that share one `OrderBook` across
/// threads must serialize access themselves.
pub struct OrderBook {
    bids: BookSide,
    asks: BookSide,
    orders: HashMap<OrderId, Order>,
    next_order_id: u64,
    clock: u64,
}

impl OrderBook {
    pub fn new() -> Self {
        Self {
            bids: BookSide::new(Side::Buy),
            asks: BookSide::new(Side::Sell),
            orders: HashMap::new(),
            next_order_id: 1,
            clock: 0,
        }
    }

    fn next_id(&mut self) -> OrderId {
        let id = OrderId(self.next_order_id);
        self.next_order_id += 1;
        id
    }

    /// Strictly increasing per-book tiebreaker, replacing wall-clock
    /// timestamps to avoid collisions under burst traffic.
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn side_mut(&mut self, side: Side) -> &mut BookSide {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    fn opposite_mut(&mut self, side: Side) -> &mut BookSide {
        match side {
            Side::Buy => &mut self.asks,
            Side::Sell => &mut self.bids,
        }
    }

    /// Splits `self` into the opposite side and the id index as disjoint
    /// mutable borrows, so `matching::sweep` can hold both at once without
    /// going through a method call that would tie up the whole of `self`.
    fn opposite_and_orders(&mut self, side: Side) -> (&mut BookSide, &mut HashMap<OrderId, Order>) {
        match side {
            Side::Buy => (&mut self.asks, &mut self.orders),
            Side::Sell => (&mut self.bids, &mut self.orders),
        }
    }

    /// Accepts an order allowed to rest at `price`. Aggressively crosses
    /// against the opposite side first (standard CDA behavior), then rests
    /// any remainder at `price`.
    pub fn place_limit_order(&mut self, side: Side, size: u64, price: Price) -> Vec<Match> {
        debug_assert!(size > 0, "order size must be positive");
        let id = self.next_id();
        let created_at = self.tick();
        let mut incoming = Order {
            id,
            side,
            size,
            created_at,
            resident_limit: None,
        };

        let permits: Box<dyn Fn(Price) -> bool> = match side {
            Side::Buy => Box::new(move |limit_price: Price| limit_price <= price),
            Side::Sell => Box::new(move |limit_price: Price| limit_price >= price),
        };

        let (opposite, orders) = self.opposite_and_orders(side);
        let matches = matching::sweep(opposite, orders, &mut incoming, permits);
        debug!(order_id = %id, filled = matches.len(), "limit order matched");

        if incoming.size > 0 {
            incoming.resident_limit = Some(price);
            let remaining = incoming.size;
            self.orders.insert(id, incoming);
            self.side_mut(side).get_or_create(price).add_order(id, remaining);
        }

        self.check_invariants();
        matches
    }

    /// Fills against the opposite side at best-first prices, ignoring
    /// price, until `size` is exhausted. Atomic: the liquidity check runs
    /// before any mutation, so a failed call leaves the book untouched.
    pub fn place_market_order(&mut self, side: Side, size: u64) -> Result<Vec<Match>, OrderBookError> {
        debug_assert!(size > 0, "order size must be positive");
        let available = self.opposite_mut(side).total_volume();
        if size > available {
            warn!(side = ?side, size, available, "market order rejected: insufficient liquidity");
            return Err(OrderBookError::InsufficientLiquidity {
                requested: size,
                available,
            });
        }

        let id = self.next_id();
        let created_at = self.tick();
        let mut incoming = Order {
            id,
            side,
            size,
            created_at,
            resident_limit: None,
        };

        let (opposite, orders) = self.opposite_and_orders(side);
        let matches = matching::sweep(opposite, orders, &mut incoming, |_| true);
        debug!(order_id = %id, filled = matches.len(), "market order matched");

        debug_assert_eq!(incoming.size, 0, "market order must fully fill given sufficient liquidity");
        self.check_invariants();
        Ok(matches)
    }

    /// Removes a resting order by id. Fails with `UnknownOrder` if `id` is
    /// absent from the index; the book is left unmutated.
    pub fn cancel_order(&mut self, id: OrderId) -> Result<(), OrderBookError> {
        let order = self.orders.get(&id).ok_or(OrderBookError::UnknownOrder(id))?;
        let side = order.side;
        let price = order
            .resident_limit
            .expect("an indexed order is always resting");
        let size = order.size;

        let book_side = self.side_mut(side);
        let limit = book_side
            .get_mut(price)
            .expect("resident_limit always names a resident limit");
        limit.delete_order(id, size);
        let now_empty = limit.is_empty();
        if now_empty {
            book_side.remove(price);
        }

        self.orders.remove(&id);
        self.check_invariants();
        Ok(())
    }

    pub fn bids_total_volume(&self) -> u64 {
        self.bids.total_volume()
    }

    pub fn asks_total_volume(&self) -> u64 {
        self.asks.total_volume()
    }

    /// Best-to-worst traversal of one side, each limit's orders in FIFO
    /// order. A copy realization is acceptable: this is an observer
    /// operation, not on the matching hot path.
    pub fn snapshot(&self, side: Side) -> Vec<LimitView> {
        let book_side = match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        };
        book_side
            .best_to_worst()
            .into_iter()
            .map(|limit| LimitView {
                price: limit.price,
                orders: limit
                    .orders
                    .iter()
                    .map(|id| {
                        let order = &self.orders[id];
                        OrderView {
                            id: order.id,
                            price: limit.price,
                            size: order.size,
                            side: order.side,
                            created_at: order.created_at,
                        }
                    })
                    .collect(),
            })
            .collect()
    }

    /// Debug-only consistency check over the book's structural invariants.
    /// An internal check failing here is fatal: not something a caller can
    /// catch and retry, hence the panic rather than a `Result` variant.
    fn check_invariants(&self) {
        if !cfg!(debug_assertions) {
            return;
        }
        for (side_name, book_side) in [("bids", &self.bids), ("asks", &self.asks)] {
            for limit in book_side.best_to_worst() {
                assert!(!limit.is_empty(), "{side_name} limit at {} is empty but still indexed", limit.price);
                let sum: u64 = limit
                    .orders
                    .iter()
                    .map(|id| self.orders[id].size)
                    .sum();
                assert_eq!(
                    sum, limit.total_volume,
                    "{side_name} limit at {} volume cache out of sync",
                    limit.price
                );
                for id in &limit.orders {
                    let order = &self.orders[id];
                    assert_eq!(order.resident_limit, Some(limit.price));
                    assert!(order.size > 0);
                }
            }
        }
        if let (Some(best_ask), Some(best_bid)) = (self.asks.best_price(), self.bids.best_price()) {
            assert!(best_ask > best_bid, "crossed book: ask {best_ask} <= bid {best_bid}");
        }
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

/// JSON projection of one resting order, used by `LimitView`/`BookSnapshot`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderView {
    pub id: OrderId,
    pub price: Price,
    pub size: u64,
    pub side: Side,
    pub created_at: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitView {
    pub price: Price,
    pub orders: Vec<OrderView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    // S1: Place and cancel single limit.
    #[test]
    fn place_and_cancel_single_limit() {
        let mut ob = OrderBook::new();
        let matches = ob.place_limit_order(Side::Sell, 10, 10_000);
        assert!(matches.is_empty());
        assert_eq!(ob.asks_total_volume(), 10);

        let id = ob.snapshot(Side::Sell)[0].orders[0].id;
        ob.cancel_order(id).unwrap();
        assert_eq!(ob.asks_total_volume(), 0);
        assert!(ob.snapshot(Side::Sell).is_empty());
    }

    // S2: Two limits on the same side, distinct prices.
    #[test]
    fn two_limits_same_side_distinct_prices() {
        let mut ob = OrderBook::new();
        ob.place_limit_order(Side::Sell, 10, 10_000);
        ob.place_limit_order(Side::Sell, 5, 9_000);

        let snap = ob.snapshot(Side::Sell);
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].price, 9_000);
        assert_eq!(snap[0].orders[0].size, 5);
    }

    // S3: Market partial fill of one limit.
    #[test]
    fn market_partial_fill_of_one_limit() {
        let mut ob = OrderBook::new();
        ob.place_limit_order(Side::Sell, 20, 10_000);

        let matches = ob.place_market_order(Side::Buy, 10).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].size_filled, 10);
        assert_eq!(matches[0].price, 10_000);

        let snap = ob.snapshot(Side::Sell);
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].orders[0].size, 10);
    }

    // S4: Market sweep across multiple limits.
    #[test]
    fn market_sweep_across_multiple_limits() {
        let mut ob = OrderBook::new();
        ob.place_limit_order(Side::Buy, 10, 5_000);
        ob.place_limit_order(Side::Buy, 1, 5_000);
        ob.place_limit_order(Side::Buy, 8, 9_000);
        ob.place_limit_order(Side::Buy, 5, 10_000);
        assert_eq!(ob.bids_total_volume(), 24);

        let matches = ob.place_market_order(Side::Sell, 20).unwrap();
        let filled: u64 = matches.iter().map(|m| m.size_filled).sum();
        assert_eq!(filled, 20);

        assert_eq!(ob.bids_total_volume(), 4);
        let snap = ob.snapshot(Side::Buy);
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].price, 5_000);
    }

    // S5: Insufficient liquidity.
    #[test]
    fn insufficient_liquidity_leaves_book_untouched() {
        let mut ob = OrderBook::new();
        let err = ob.place_market_order(Side::Buy, 1).unwrap_err();
        assert_eq!(
            err,
            OrderBookError::InsufficientLiquidity {
                requested: 1,
                available: 0
            }
        );
        assert_eq!(ob.bids_total_volume(), 0);
        assert_eq!(ob.asks_total_volume(), 0);
    }

    // S6: Cancel preserves FIFO of remaining.
    #[test]
    fn cancel_preserves_fifo_of_remaining() {
        let mut ob = OrderBook::new();
        ob.place_limit_order(Side::Buy, 5, 10_000); // A
        ob.place_limit_order(Side::Buy, 8, 10_000); // B
        ob.place_limit_order(Side::Buy, 10, 10_000); // C

        let b_id = ob.snapshot(Side::Buy)[0].orders[1].id;
        ob.cancel_order(b_id).unwrap();

        let matches = ob.place_market_order(Side::Sell, 6).unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].size_filled, 5);
        assert_eq!(matches[1].size_filled, 1);

        let snap = ob.snapshot(Side::Buy);
        assert_eq!(snap[0].orders[0].size, 9);
    }

    #[test]
    fn cancel_unknown_order_fails() {
        let mut ob = OrderBook::new();
        let err = ob.cancel_order(OrderId(999)).unwrap_err();
        assert_eq!(err, OrderBookError::UnknownOrder(OrderId(999)));
    }

    #[test]
    fn crossing_limit_matches_instead_of_resting() {
        let mut ob = OrderBook::new();
        ob.place_limit_order(Side::Sell, 5, 105);
        let matches = ob.place_limit_order(Side::Buy, 3, 110);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].price, 105);
        assert_eq!(matches[0].size_filled, 3);
        assert!(ob.snapshot(Side::Buy).is_empty());
        assert_eq!(ob.snapshot(Side::Sell)[0].orders[0].size, 2);
    }

    #[test]
    fn no_crossed_book_after_any_operation() {
        let mut ob = OrderBook::new();
        ob.place_limit_order(Side::Buy, 5, 100);
        ob.place_limit_order(Side::Sell, 5, 200);
        assert!(ob.asks.best_price().unwrap() > ob.bids.best_price().unwrap());
    }
}
