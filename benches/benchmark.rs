use criterion::{Criterion, criterion_group, criterion_main};
use matching_core::orderbook::OrderBook;
use matching_core::orders::Side;

// Bids and asks sit at disjoint price ranges so seeding one side can never
// cross the other: `place_limit_order` always crosses aggressively, so
// interleaving a Sell and a Buy at the same price here would fill each
// other on the spot and leave the book empty.
fn setup_order_book(depth: u64, orders_per_level: u64) -> OrderBook {
    let mut ob = OrderBook::new();
    for price in 1..=depth {
        for _ in 0..orders_per_level {
            ob.place_limit_order(Side::Buy, 1, price);
        }
    }
    for price in (depth + 1)..=(2 * depth) {
        for _ in 0..orders_per_level {
            ob.place_limit_order(Side::Sell, 1, price);
        }
    }
    ob
}

fn bench_place_market_order(c: &mut Criterion) {
    let depth = 100;
    let orders_per_level = 10;

    c.bench_function("market order sweeping half the book", |b| {
        b.iter_batched(
            || setup_order_book(depth, orders_per_level),
            |mut ob| {
                ob.place_market_order(Side::Buy, depth * orders_per_level / 2)
                    .unwrap();
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_place_crossing_limit_order(c: &mut Criterion) {
    let depth = 100;
    let orders_per_level = 10;

    c.bench_function("crossing limit order sweeping the book", |b| {
        b.iter_batched(
            || setup_order_book(depth, orders_per_level),
            // crosses every resting bid (all priced >= depth / 2) before resting the remainder
            |mut ob| {
                ob.place_limit_order(Side::Sell, depth * orders_per_level, depth / 2);
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_cancel_order(c: &mut Criterion) {
    c.bench_function("cancel a resting order", |b| {
        b.iter_batched(
            || {
                let mut ob = OrderBook::new();
                ob.place_limit_order(Side::Buy, 10, 1);
                ob
            },
            |mut ob| {
                let id = ob.snapshot(Side::Buy)[0].orders[0].id;
                ob.cancel_order(id).unwrap();
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_place_market_order,
    bench_place_crossing_limit_order,
    bench_cancel_order
);
criterion_main!(benches);
