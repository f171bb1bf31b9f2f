//! Benchmark suite for transfer throughput
//!
//! Measures the engine under a single caller and under contention, using the
//! divan benchmarking framework.
//!
//! # Running Benchmarks
//!
//! ```bash
//! cargo bench
//! ```
//!
//! Contended runs spread transfers over a small account set so that callers
//! regularly queue on the same account locks.

use rust_decimal::Decimal;
use rust_ledger_engine::LedgerEngine;

fn main() {
    divan::main();
}

fn engine_with_accounts(count: u64) -> LedgerEngine {
    let engine = LedgerEngine::in_memory();
    for owner in 0..count {
        engine
            .open_account(owner, "SAVINGS", Decimal::new(1_000_000_000, 2))
            .expect("open account");
    }
    engine
}

/// Back-to-back transfers from one caller
#[divan::bench(args = [100, 1_000, 10_000])]
fn sequential_transfers(bencher: divan::Bencher, transfers: u64) {
    bencher
        .with_inputs(|| engine_with_accounts(16))
        .bench_values(|engine| {
            for i in 0..transfers {
                let from = i % 16 + 1;
                let to = (i + 1) % 16 + 1;
                engine
                    .transfer(from, to, Decimal::ONE)
                    .expect("transfer");
            }
        });
}

/// Transfers from several threads over a shared account set
#[divan::bench(args = [2, 4, 16])]
fn contended_transfers(bencher: divan::Bencher, accounts: u64) {
    const THREADS: u64 = 4;
    const PER_THREAD: u64 = 500;

    bencher
        .with_inputs(|| engine_with_accounts(accounts))
        .bench_values(|engine| {
            std::thread::scope(|scope| {
                for t in 0..THREADS {
                    let engine = engine.clone();
                    scope.spawn(move || {
                        for i in 0..PER_THREAD {
                            let from = (t + i) % accounts + 1;
                            let to = (t + i + 1) % accounts + 1;
                            engine
                                .transfer(from, to, Decimal::ONE)
                                .expect("transfer");
                        }
                    });
                }
            });
        });
}

/// History lookup on an account with many entries
#[divan::bench]
fn history_lookup(bencher: divan::Bencher) {
    let engine = engine_with_accounts(2);
    for _ in 0..1_000 {
        engine.transfer(1, 2, Decimal::ONE).expect("transfer");
        engine.transfer(2, 1, Decimal::ONE).expect("transfer");
    }

    bencher.bench(|| engine.account_transaction_history(1).expect("history"));
}
