use std::sync::Arc;

use chrono::NaiveDate;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tokio::runtime::Builder;

use munim_core::{RecordId, TenantId};
use munim_infra::engine::LedgerBalanceEngine;
use munim_infra::store::InMemoryLedgerStore;
use munim_ledger::EntryDraft;
use munim_parties::SupplierId;

fn draft(supplier: SupplierId, day: u32, debit: i64) -> EntryDraft {
    EntryDraft {
        // Spread days over a year so tail length tracks the preload count.
        date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(day as u64),
        particulars: "bench entry".to_string(),
        voucher_type: "Journal".to_string(),
        voucher_no: format!("J-{day}"),
        debit,
        credit: 0,
        supplier_id: supplier,
    }
}

/// Cost of inserting at the front of a partition: the cascade rewrites the
/// whole tail, so this is the engine's worst case.
fn bench_front_insert_cascade(c: &mut Criterion) {
    let rt = Builder::new_current_thread().build().expect("runtime");

    let mut group = c.benchmark_group("front_insert_cascade");
    for tail_len in [10u32, 100, 300] {
        group.throughput(Throughput::Elements(tail_len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(tail_len), &tail_len, |b, &n| {
            b.iter(|| {
                rt.block_on(async {
                    let engine = LedgerBalanceEngine::new(Arc::new(InMemoryLedgerStore::new()));
                    let tenant = TenantId::new();
                    let supplier = SupplierId::new(RecordId::new());

                    for day in 1..=n {
                        engine
                            .create_entry(tenant, draft(supplier, day, 1_000))
                            .await
                            .expect("preload");
                    }

                    // The measured shape: one backdated insert rewriting n entries.
                    engine
                        .create_entry(tenant, draft(supplier, 0, 500))
                        .await
                        .expect("front insert");
                })
            });
        });
    }
    group.finish();
}

/// Cost of appending at the end of a partition: zero-length tail, so this
/// should stay flat as the partition grows.
fn bench_append(c: &mut Criterion) {
    let rt = Builder::new_current_thread().build().expect("runtime");

    let mut group = c.benchmark_group("append_no_cascade");
    for preload in [10u32, 100, 300] {
        group.bench_with_input(BenchmarkId::from_parameter(preload), &preload, |b, &n| {
            let engine = LedgerBalanceEngine::new(Arc::new(InMemoryLedgerStore::new()));
            let tenant = TenantId::new();
            let supplier = SupplierId::new(RecordId::new());
            rt.block_on(async {
                for day in 1..=n {
                    engine
                        .create_entry(tenant, draft(supplier, day, 1_000))
                        .await
                        .expect("preload");
                }
            });

            let mut day = n;
            b.iter(|| {
                day += 1;
                rt.block_on(async {
                    engine
                        .create_entry(tenant, draft(supplier, day, 1_000))
                        .await
                        .expect("append");
                })
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_front_insert_cascade, bench_append);
criterion_main!(benches);
