// SPDX-License-Identifier: MPL-2.0
//! Benchmarks for log snapshot retrieval.
//!
//! Measures the performance of:
//! - Filtering an in-memory dump by process id
//! - Full retrieval through a `LogSource`, including the reader thread

use std::io::Cursor;
use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use selfcheck::application::port::{LogDump, LogSource};
use selfcheck::diagnostics::{filter_lines, retrieve_process_log};
use selfcheck::domain::diagnostics::ReadTimeout;
use selfcheck::error::Result;

const PID: u32 = 4242;

/// A `threadtime` dump where every tenth line belongs to [`PID`].
fn synthetic_dump(lines: usize) -> Vec<String> {
    (0..lines)
        .map(|i| {
            let pid = if i % 10 == 0 { PID } else { 1000 + (i % 7) as u32 };
            format!("01-01 10:00:{:02}.{:03}  {pid}  {pid} I Tag: message {i}", i % 60, i % 1000)
        })
        .collect()
}

struct MemoryLog(String);

impl LogSource for MemoryLog {
    fn open(&self) -> Result<LogDump> {
        Ok(LogDump::new(Cursor::new(self.0.clone().into_bytes())))
    }
}

fn bench_filter_lines(c: &mut Criterion) {
    let mut group = c.benchmark_group("log_filter");

    for size in [1_000, 10_000, 100_000] {
        let dump = synthetic_dump(size);
        group.bench_with_input(BenchmarkId::new("filter_lines", size), &dump, |b, dump| {
            b.iter(|| black_box(filter_lines(dump.iter().cloned(), PID)));
        });
    }

    group.finish();
}

fn bench_retrieve(c: &mut Criterion) {
    let mut group = c.benchmark_group("log_retrieve");

    let source = MemoryLog(synthetic_dump(10_000).join("\n"));
    group.bench_function("retrieve_process_log_10k", |b| {
        b.iter(|| black_box(retrieve_process_log(&source, PID, ReadTimeout::default())));
    });

    group.finish();
}

criterion_group!(benches, bench_filter_lines, bench_retrieve);
criterion_main!(benches);
