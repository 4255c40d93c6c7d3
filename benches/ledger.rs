// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Benchmarks for accounts and the ledger.
//!
//! Run with: cargo bench
//!
//! Benchmarks include:
//! - Single-threaded deposits, withdrawals and transfers
//! - Multi-threaded transfers over a shared set of accounts
//! - Statistics over every account history in a populated ledger

use account_ledger::{Account, Ledger};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rayon::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;

// =============================================================================
// Helper Functions
// =============================================================================

fn amount(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

fn account_id(n: usize) -> String {
    format!("ACC{:05}", n)
}

fn ledger_with_accounts(count: usize, balance: Decimal) -> Ledger {
    let ledger = Ledger::new();
    for n in 0..count {
        ledger.open_account(account_id(n), balance).unwrap();
    }
    ledger
}

// =============================================================================
// Single-Threaded Benchmarks
// =============================================================================

fn bench_single_deposit(c: &mut Criterion) {
    let account = Account::new("ACC00000");
    c.bench_function("single_deposit", |b| {
        b.iter(|| {
            account.deposit(black_box(amount(10000)), "bench").unwrap();
        })
    });
}

fn bench_single_withdrawal(c: &mut Criterion) {
    c.bench_function("single_withdrawal", |b| {
        b.iter(|| {
            let account = Account::with_balance("ACC00000", amount(10000)).unwrap();
            account.withdraw(black_box(amount(5000)), "bench").unwrap();
        })
    });
}

fn bench_single_transfer(c: &mut Criterion) {
    c.bench_function("single_transfer", |b| {
        b.iter(|| {
            let sender = Account::with_balance("ACC00000", amount(10000)).unwrap();
            let recipient = Account::new("ACC00001");
            sender
                .transfer(&recipient, black_box(amount(2500)), "bench")
                .unwrap();
        })
    });
}

fn bench_ledger_mixed(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger_mixed");

    for count in [100, 1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*count as u64 * 3));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter(|| {
                let ledger = ledger_with_accounts(2, amount(100));
                for _ in 0..count {
                    ledger.deposit(&account_id(0), amount(100), "in").unwrap();
                    ledger
                        .transfer(&account_id(0), &account_id(1), amount(50), "move")
                        .unwrap();
                    let _ = ledger.withdraw(&account_id(1), amount(25), "out");
                }
                black_box(&ledger);
            })
        });
    }
    group.finish();
}

// =============================================================================
// Multi-Threaded Benchmarks
// =============================================================================

fn bench_parallel_transfers(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel_transfers");

    // Fewer accounts means more lock contention.
    for num_accounts in [2, 16, 256].iter() {
        let transfers = 10_000;
        group.throughput(Throughput::Elements(transfers as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(num_accounts),
            num_accounts,
            |b, &num_accounts| {
                b.iter(|| {
                    let ledger = Arc::new(ledger_with_accounts(num_accounts, amount(1_000_000)));

                    (0..transfers).into_par_iter().for_each(|i| {
                        let from = account_id(i % num_accounts);
                        let to = account_id((i * 7 + 1) % num_accounts);
                        let _ = ledger.transfer(&from, &to, amount(1), "bench");
                    });

                    black_box(&ledger);
                })
            },
        );
    }
    group.finish();
}

fn bench_statistics(c: &mut Criterion) {
    let ledger = ledger_with_accounts(10, amount(1_000_000));
    for i in 0..10_000 {
        ledger
            .deposit(&account_id(i % 10), amount(100), "seed")
            .unwrap();
    }

    c.bench_function("statistics_10k", |b| {
        b.iter(|| black_box(ledger.statistics()))
    });
}

criterion_group!(
    single_threaded,
    bench_single_deposit,
    bench_single_withdrawal,
    bench_single_transfer,
    bench_ledger_mixed,
);

criterion_group!(multi_threaded, bench_parallel_transfers);

criterion_group!(aggregates, bench_statistics);

criterion_main!(single_threaded, multi_threaded, aggregates);
