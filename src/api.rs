use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, warn};

use crate::errors::OrderBookError;
use crate::matching::Match;
use crate::orderbook::OrderView;
use crate::orders::{OrderId, OrderType, Side};
use crate::state::AppState;

type ApiErr = (StatusCode, Json<serde_json::Value>);

fn msg(status: StatusCode, text: impl Into<String>) -> ApiErr {
    (status, Json(json!({ "msg": text.into() })))
}

fn ticker_not_found() -> ApiErr {
    msg(StatusCode::BAD_REQUEST, "ticker not found")
}

impl From<OrderBookError> for ApiErr {
    fn from(e: OrderBookError) -> Self {
        match e {
            OrderBookError::InsufficientLiquidity { .. } => msg(StatusCode::BAD_REQUEST, e.to_string()),
            OrderBookError::UnknownOrder(_) => msg(StatusCode::NOT_FOUND, e.to_string()),
        }
    }
}

/// `GET /book/{ticker}` response.
#[derive(Debug, Serialize)]
pub struct BookSnapshot {
    pub total_bid_volume: u64,
    pub total_ask_volume: u64,
    pub asks: Vec<OrderView>,
    pub bids: Vec<OrderView>,
}

/// `POST /order` request body.
#[derive(Debug, Deserialize)]
pub struct NewOrder {
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub action: Side,
    pub size: u64,
    pub price: Option<u64>,
    pub ticker: String,
}

#[derive(Debug, Serialize)]
pub struct MsgResponse {
    pub msg: String,
}

fn vwap(matches: &[Match]) -> f64 {
    let total_size: u64 = matches.iter().map(|m| m.size_filled).sum();
    let weighted: u128 = matches
        .iter()
        .map(|m| m.price as u128 * m.size_filled as u128)
        .sum();
    weighted as f64 / total_size as f64
}

/// `GET /book/{ticker}`
pub async fn get_book(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<BookSnapshot>, ApiErr> {
    let handle = state.book(&ticker).ok_or_else(ticker_not_found)?;
    let book = handle.0.lock().await;
    let flatten = |views: Vec<crate::orderbook::LimitView>| -> Vec<OrderView> {
        views.into_iter().flat_map(|l| l.orders).collect()
    };
    Ok(Json(BookSnapshot {
        total_bid_volume: book.bids_total_volume(),
        total_ask_volume: book.asks_total_volume(),
        asks: flatten(book.snapshot(Side::Sell)),
        bids: flatten(book.snapshot(Side::Buy)),
    }))
}

/// `POST /order`
///
/// Success: `{ "msg": "LIMIT ORDER PLACED" }` or
/// `{ "msg": "MARKET ORDER PLACED, average price: <vwap>" }`, where the
/// VWAP is computed here from the `Match` list the core returns — the core
/// itself never computes an average price.
pub async fn place_order(
    State(state): State<AppState>,
    Json(payload): Json<NewOrder>,
) -> Result<Json<MsgResponse>, ApiErr> {
    if payload.size == 0 {
        warn!(ticker = %payload.ticker, "order rejected: size must be > 0");
        return Err(msg(StatusCode::BAD_REQUEST, "size must be greater than 0"));
    }
    let handle = state.book(&payload.ticker).ok_or_else(ticker_not_found)?;
    let mut book = handle.0.lock().await;

    match payload.order_type {
        OrderType::Limit => {
            let Some(price) = payload.price else {
                return Err(msg(StatusCode::BAD_REQUEST, "price is required for a LIMIT order"));
            };
            book.place_limit_order(payload.action, payload.size, price);
            info!(ticker = %payload.ticker, "limit order placed");
            Ok(Json(MsgResponse {
                msg: "LIMIT ORDER PLACED".to_string(),
            }))
        }
        OrderType::Market => {
            let matches = book.place_market_order(payload.action, payload.size)?;
            info!(ticker = %payload.ticker, fills = matches.len(), "market order placed");
            Ok(Json(MsgResponse {
                msg: format!("MARKET ORDER PLACED, average price: {:.2}", vwap(&matches)),
            }))
        }
    }
}

/// `DELETE /order/{id}`
///
/// The wire contract carries no ticker, so every registered book is tried in
/// turn; order ids are only unique within a single book, which is
/// sufficient for the single-instrument core this transport fronts.
pub async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<MsgResponse>, ApiErr> {
    let order_id = OrderId(id);
    for (_, handle) in state.all() {
        let mut book = handle.0.lock().await;
        if book.cancel_order(order_id).is_ok() {
            info!(order_id = %order_id, "order cancelled");
            return Ok(Json(MsgResponse {
                msg: "order cancelled".to_string(),
            }));
        }
    }
    warn!(order_id = %order_id, "cancel failed: order not found in any book");
    Err(OrderBookError::UnknownOrder(order_id).into())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/book/{ticker}", get(get_book))
        .route("/order", post(place_order))
        .route("/order/{id}", delete(cancel_order))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(false))
                .on_response(DefaultOnResponse::new().level(tracing::Level::DEBUG)),
        )
        .with_state(state)
}
