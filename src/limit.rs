use std::collections::VecDeque;

use crate::orders::OrderId;

/// Integer price ticks. Using a fixed-point integer instead of a float keeps
/// "same price" an exact equality, sidestepping the float-keyed-map hazard.
pub type Price = u64;

/// All resting orders at one price on one side, in arrival order.
///
/// `total_volume` is a cache maintained incrementally on every
/// `add_order`/`delete_order`/fill so it never requires summing `orders`.
#[derive(Debug, Clone)]
pub struct Limit {
    pub price: Price,
    pub orders: VecDeque<OrderId>,
    pub total_volume: u64,
}

impl Limit {
    pub fn new(price: Price) -> Self {
        Self {
            price,
            orders: VecDeque::new(),
            total_volume: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Appends `id` at the tail and folds `size` into the cached volume.
    /// Caller guarantees `size > 0` and that `id` is not already resident.
    pub fn add_order(&mut self, id: OrderId, size: u64) {
        debug_assert!(size > 0, "resting orders must have positive size");
        self.orders.push_back(id);
        self.total_volume += size;
    }

    /// Removes `id` by identity, preserving FIFO order of the remainder, and
    /// folds `size` out of the cached volume. Caller guarantees `id` is
    /// resident in this limit with the given `size`.
    pub fn delete_order(&mut self, id: OrderId, size: u64) {
        if let Some(pos) = self.orders.iter().position(|o| *o == id) {
            self.orders.remove(pos);
            self.total_volume -= size;
        }
    }

    /// Removes `fill` units of volume from the head order's accounting and,
    /// if it drained entirely, pops it from the queue. Does not touch the
    /// order's own `size` field — callers of `matching::fill` own that.
    pub fn record_fill(&mut self, fill: u64) {
        self.total_volume -= fill;
    }

    pub fn pop_front(&mut self) -> Option<OrderId> {
        self.orders.pop_front()
    }

    pub fn front(&self) -> Option<OrderId> {
        self.orders.front().copied()
    }
}
