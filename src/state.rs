use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::orderbook::OrderBook;

/// One instrument's book behind a single exclusive lock. Holding the lock
/// for a request's full duration is what makes each call execute to
/// completion atomically with respect to any other core operation once
/// multiple requests can arrive concurrently over HTTP — the lock, not the
/// core itself, does the serializing.
#[derive(Clone)]
pub struct BookHandle(pub Arc<Mutex<OrderBook>>);

impl BookHandle {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(OrderBook::new())))
    }
}

impl Default for BookHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Transport-only ticker registry; the core underneath is single-instrument.
/// Maps ticker symbols to independent books so `{ticker}` path segments in
/// the HTTP surface have somewhere to resolve.
#[derive(Clone)]
pub struct AppState {
    books: Arc<HashMap<String, BookHandle>>,
}

impl AppState {
    /// Seeds the registry with the given ticker symbols, each backed by its
    /// own empty book.
    pub fn new(tickers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let books = tickers
            .into_iter()
            .map(|t| (t.into(), BookHandle::new()))
            .collect();
        Self {
            books: Arc::new(books),
        }
    }

    pub fn book(&self, ticker: &str) -> Option<&BookHandle> {
        self.books.get(ticker)
    }

    pub fn all(&self) -> impl Iterator<Item = (&str, &BookHandle)> {
        self.books.iter().map(|(t, h)| (t.as_str(), h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_ticker_is_absent() {
        let state = AppState::new(["BTC-USD"]);
        assert!(state.book("BTC-USD").is_some());
        assert!(state.book("DOGE-USD").is_none());
    }
}
