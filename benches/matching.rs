//! Benchmarks for the matchcore matching engine.
//!
//! | Metric               | Target            |
//! |----------------------|-------------------|
//! | Single match latency | < 10μs            |
//! | Throughput           | > 100,000 ops/sec |
//!
//! ## Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//!
//! # Run specific benchmark
//! cargo bench -- single_match
//! ```
//!
//! Results are saved to `target/criterion/` with HTML reports.

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use std::time::Duration;

use matchcore::exchange::{Exchange, OrderRequest};
use matchcore::{MatchingEngine, Order, OrderBook, OrderType, Side};
use rust_decimal::Decimal;

// ============================================================================
// HELPER FUNCTIONS - Deterministic order generation
// ============================================================================

fn limit(side: Side, price: u64, quantity: u64) -> Order {
    Order::new(0, 1, side, OrderType::Limit, price, quantity, 0)
}

/// Rest `count` orders on `side`, one per level, moving away from `base_price`
fn populate(
    book: &mut OrderBook,
    engine: &mut MatchingEngine,
    side: Side,
    count: usize,
    base_price: u64,
    price_step: u64,
    quantity: u64,
) {
    for i in 0..count {
        let offset = i as u64 * price_step;
        let price = match side {
            Side::Sell => base_price + offset,
            Side::Buy => base_price - offset,
        };
        engine
            .submit(book, limit(side, price, quantity), 0)
            .expect("populate order");
    }
}

/// Mixed buy/sell limit orders around 50000 with a seeded RNG
fn generate_order_batch(count: usize, seed: u64) -> Vec<Order> {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let base_price: u64 = 5_000_000_000_000;

    (0..count)
        .map(|_| {
            let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
            let price_offset: i64 = rng.gen_range(-50_000_000_000i64..=50_000_000_000i64);
            let price = (base_price as i64 + price_offset) as u64;
            let quantity: u64 = rng.gen_range(1_000_000..=100_000_000);
            limit(side, price, quantity)
        })
        .collect()
}

fn asks_book(count: usize, quantity: u64) -> (OrderBook, MatchingEngine) {
    let mut book = OrderBook::with_capacity(count * 2);
    let mut engine = MatchingEngine::new();
    populate(&mut book, &mut engine, Side::Sell, count, 5_000_000_000_000, 100_000_000, quantity);
    (book, engine)
}

// ============================================================================
// BENCHMARK: Single Match Latency
// ============================================================================

fn bench_single_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_match");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("fill_best_ask", |b| {
        b.iter_batched(
            || asks_book(1000, 100_000_000),
            |(mut book, mut engine)| {
                let buy = limit(Side::Buy, 5_000_000_000_000, 100_000_000);
                black_box(engine.submit(&mut book, buy, 0))
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("multi_level_sweep", |b| {
        b.iter_batched(
            || asks_book(100, 10_000_000),
            |(mut book, mut engine)| {
                // Large enough to sweep ~10 levels
                let buy = limit(Side::Buy, 5_001_000_000_000, 100_000_000);
                black_box(engine.submit(&mut book, buy, 0))
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("no_match_rest_on_book", |b| {
        b.iter_batched(
            || asks_book(1000, 100_000_000),
            |(mut book, mut engine)| {
                let buy = limit(Side::Buy, 4_900_000_000_000, 100_000_000);
                black_box(engine.submit(&mut book, buy, 0))
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("market_sweep", |b| {
        b.iter_batched(
            || asks_book(100, 10_000_000),
            |(mut book, mut engine)| {
                let buy = Order::market(2, Side::Buy, 100_000_000);
                black_box(engine.submit(&mut book, buy, 0))
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

// ============================================================================
// BENCHMARK: Order Operations
// ============================================================================

fn bench_order_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_operations");
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("cancel_mid_book", |b| {
        b.iter_batched(
            || {
                let mut book = OrderBook::with_capacity(2000);
                let mut engine = MatchingEngine::new();
                populate(&mut book, &mut engine, Side::Buy, 1000, 5_000_000_000_000, 100_000_000, 100_000_000);
                (book, engine)
            },
            |(mut book, mut engine)| black_box(engine.cancel(&mut book, 500)),
            BatchSize::SmallInput,
        );
    });

    group.bench_function("amend_reduce", |b| {
        b.iter_batched(
            || asks_book(1000, 100_000_000),
            |(mut book, mut engine)| black_box(engine.amend(&mut book, 500, None, Some(50_000_000), 0)),
            BatchSize::SmallInput,
        );
    });

    group.bench_function("snapshot_10_levels", |b| {
        let (book, _) = asks_book(1000, 100_000_000);
        b.iter(|| black_box(book.snapshot(10)));
    });

    group.finish();
}

// ============================================================================
// BENCHMARK: Throughput
// ============================================================================

fn bench_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("throughput");
    group.measurement_time(Duration::from_secs(15));
    group.sample_size(50);

    for batch_size in [1_000, 10_000, 50_000] {
        group.throughput(Throughput::Elements(batch_size as u64));
        group.bench_with_input(BenchmarkId::new("engine", batch_size), &batch_size, |b, &size| {
            let orders = generate_order_batch(size, 42);
            b.iter_batched(
                || (OrderBook::with_capacity(size), MatchingEngine::new(), orders.clone()),
                |(mut book, mut engine, orders)| {
                    for order in orders {
                        let _ = black_box(engine.submit(&mut book, order, 0));
                    }
                    book.order_count()
                },
                BatchSize::LargeInput,
            );
        });
    }

    // Same flow through the exchange, including ledger and journal
    group.throughput(Throughput::Elements(10_000));
    group.bench_function("exchange_10000", |b| {
        let requests: Vec<OrderRequest> = generate_order_batch(10_000, 7)
            .into_iter()
            .enumerate()
            .map(|(i, o)| OrderRequest::limit(i as u64 % 50, o.side(), o.price, o.quantity))
            .collect();
        b.iter_batched(
            || (Exchange::new(Decimal::ZERO), requests.clone()),
            |(mut ex, requests)| {
                for request in requests {
                    let _ = black_box(ex.submit_order(request));
                }
                ex.trades().len()
            },
            BatchSize::LargeInput,
        );
    });

    group.finish();
}

// ============================================================================
// BENCHMARK: Large Book
// ============================================================================

fn bench_large_book(c: &mut Criterion) {
    let mut group = c.benchmark_group("large_book");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(50);

    group.bench_function("match_in_100k_book", |b| {
        let mut book = OrderBook::with_capacity(120_000);
        let mut engine = MatchingEngine::new();
        populate(&mut book, &mut engine, Side::Sell, 50_000, 5_000_000_000_000, 100_000, 10_000_000);
        populate(&mut book, &mut engine, Side::Buy, 50_000, 4_999_000_000_000, 100_000, 10_000_000);

        // Each iteration takes one ask and puts one back at the same price
        b.iter(|| {
            let buy = limit(Side::Buy, 5_000_000_000_000, 10_000_000);
            let taken = black_box(engine.submit(&mut book, buy, 0));
            let sell = limit(Side::Sell, 5_000_000_000_000, 10_000_000);
            let _ = black_box(engine.submit(&mut book, sell, 0));
            taken
        });
    });

    group.bench_function("state_root_100k_book", |b| {
        let mut book = OrderBook::with_capacity(120_000);
        let mut engine = MatchingEngine::new();
        populate(&mut book, &mut engine, Side::Sell, 50_000, 5_000_000_000_000, 100_000, 10_000_000);
        populate(&mut book, &mut engine, Side::Buy, 50_000, 4_999_000_000_000, 100_000, 10_000_000);
        b.iter(|| black_box(book.state_root()));
    });

    group.finish();
}

// ============================================================================
// CRITERION ENTRY POINT
// ============================================================================

criterion_group!(
    benches,
    bench_single_match,
    bench_order_operations,
    bench_throughput,
    bench_large_book
);

criterion_main!(benches);
