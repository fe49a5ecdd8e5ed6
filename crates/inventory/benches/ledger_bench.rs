use std::sync::Arc;

use common::{Direction, ProductId};
use criterion::{Criterion, criterion_group, criterion_main};
use futures_util::future::join_all;
use inventory::{InMemoryStockLedger, StockLedger};

fn bench_single_adjustment(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let ledger = InMemoryStockLedger::new();
    let product = ProductId::new(1);
    rt.block_on(async { ledger.register(product, 0).await.unwrap() });

    c.bench_function("ledger/inbound_adjustment", |b| {
        b.iter(|| {
            rt.block_on(async {
                ledger.adjust(product, 1, Direction::Inbound).await.unwrap();
            });
        });
    });
}

fn bench_contended_row(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("ledger/contended_outbound_64", |b| {
        b.iter(|| {
            rt.block_on(async {
                let ledger = Arc::new(InMemoryStockLedger::new());
                let product = ProductId::new(1);
                ledger.register(product, 32).await.unwrap();

                let tasks = (0..64).map(|_| {
                    let ledger = ledger.clone();
                    tokio::spawn(async move { ledger.adjust(product, 1, Direction::Outbound).await })
                });
                join_all(tasks).await;
            });
        });
    });
}

criterion_group!(benches, bench_single_adjustment, bench_contended_row);
criterion_main!(benches);
