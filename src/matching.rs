//! Price-time priority fill, shared by market orders and crossing limit
//! orders.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::book_side::BookSide;
use crate::limit::Price;
use crate::orders::{Order, OrderId, Side};

/// One fill event. `ask_order_id`/`bid_order_id` are assigned by the fixed
/// rule "ask is the Sell-side order of the pair", independent of which side
/// was the resting order and which was incoming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub ask_order_id: OrderId,
    pub bid_order_id: OrderId,
    pub size_filled: u64,
    pub price: Price,
}

fn to_match(resting: &Order, incoming: &Order, price: Price, size_filled: u64) -> Match {
    let (ask, bid) = match incoming.side {
        Side::Buy => (resting.id, incoming.id),
        Side::Sell => (incoming.id, resting.id),
    };
    Match {
        ask_order_id: ask,
        bid_order_id: bid,
        size_filled,
        price,
    }
}

/// Drains `top` against `incoming` until the limit empties or `incoming`
/// is exhausted, in FIFO order. Match price is always `top.price` — the
/// resting order's limit price, never the incoming order's.
///
/// Split out as a free function because the limit's orders live in the
/// book's id index (arena), not inside the `Limit` itself.
fn fill_limit(
    top: &mut crate::limit::Limit,
    orders: &mut HashMap<OrderId, Order>,
    incoming: &mut Order,
) -> Vec<Match> {
    let mut matches = Vec::new();
    let price = top.price;

    while incoming.size > 0 {
        let Some(resting_id) = top.front() else {
            break;
        };
        let resting = orders
            .get_mut(&resting_id)
            .expect("order resident in a limit must be present in the id index");

        let fill = incoming.size.min(resting.size);
        incoming.size -= fill;
        resting.size -= fill;
        top.record_fill(fill);

        matches.push(to_match(resting, incoming, price, fill));

        if resting.size == 0 {
            top.pop_front();
            resting.resident_limit = None;
            orders.remove(&resting_id);
        }
    }

    matches
}

/// Repeatedly fills the best limit on `opposite` that satisfies `permits`,
/// until `incoming` is exhausted or no further permissible limit exists.
/// `permits(limit_price)` is the crossing predicate: always-true for market
/// orders, `limit_price <= incoming.price` for a crossing buy,
/// `limit_price >= incoming.price` for a crossing sell.
pub fn sweep(
    opposite: &mut BookSide,
    orders: &mut HashMap<OrderId, Order>,
    incoming: &mut Order,
    permits: impl Fn(Price) -> bool,
) -> Vec<Match> {
    let mut matches = Vec::new();

    loop {
        if incoming.size == 0 {
            break;
        }
        let Some(top_price) = opposite.best_price() else {
            break;
        };
        if !permits(top_price) {
            break;
        }

        let top = opposite
            .get_mut(top_price)
            .expect("best_price always names a resident limit");
        matches.extend(fill_limit(top, orders, incoming));

        if top.total_volume == 0 {
            opposite.remove(top_price);
        }
    }

    matches
}
