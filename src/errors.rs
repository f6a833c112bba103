use thiserror::Error;

use crate::orders::OrderId;

/// Non-fatal errors the core surfaces to its caller. The book is left
/// unmutated whenever one of these is returned.
///
/// A fatal structural invariant violation has no variant here: it is fatal
/// by definition, and is realized instead as a `debug_assert!` inside
/// `OrderBook::check_invariants` rather than a `Result` a caller could catch
/// and retry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderBookError {
    #[error("market order size {requested} exceeds available liquidity {available}")]
    InsufficientLiquidity { requested: u64, available: u64 },

    #[error("unknown order id {0}")]
    UnknownOrder(OrderId),
}
