//! # Scheduler Throughput Benchmark
//!
//! Measures the cost of one frame's early and late passes with a realistic
//! mix of pending work:
//! - thousands of waiting one-shot tasks whose predicates stay false
//! - a batch of tasks that complete every frame
//! - a few hundred repeating tasks
//!
//! Run with: `cargo bench --package lumen_core`

#![allow(missing_docs)]

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lumen_core::{FrameClock, ManualTimeSource, Scheduler, TimeBase};

const FRAME: Duration = Duration::from_micros(16_667);

fn advance(scheduler: &Scheduler, source: &ManualTimeSource) {
    source.advance(FRAME);
    scheduler.clock().advance();
    scheduler.tick_early();
    scheduler.tick_late();
}

/// Benchmark: frames with N parked tasks that never become ready.
fn bench_parked_tasks(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler_parked");

    for count in [1_000usize, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let source = ManualTimeSource::new();
            let scheduler = Scheduler::new(FrameClock::new(source.clone()));
            let gate = Rc::new(Cell::new(false));
            let _handles: Vec<_> = (0..count)
                .map(|_| {
                    let gate = Rc::clone(&gate);
                    scheduler.schedule(|| Ok(()), move || gate.get())
                })
                .collect();

            b.iter(|| {
                advance(&scheduler, &source);
                black_box(scheduler.pending_count())
            });
        });
    }

    group.finish();
}

/// Benchmark: 1,000 tasks registered and completed per frame.
fn bench_churn(c: &mut Criterion) {
    c.bench_function("scheduler_churn_1k", |b| {
        let source = ManualTimeSource::new();
        let scheduler = Scheduler::new(FrameClock::new(source.clone()));

        b.iter(|| {
            for i in 0..1_000u32 {
                let _ = scheduler.schedule_next_frame(move || Ok(i));
            }
            advance(&scheduler, &source);
            black_box(scheduler.frame())
        });
    });
}

/// Benchmark: 256 repeating tasks on a 50ms interval.
fn bench_repeating(c: &mut Criterion) {
    c.bench_function("scheduler_repeating_256", |b| {
        let source = ManualTimeSource::new();
        let scheduler = Scheduler::new(FrameClock::new(source.clone()));
        let fired = Rc::new(Cell::new(0u64));
        let _handles: Vec<_> = (0..256)
            .map(|_| {
                let fired = Rc::clone(&fired);
                scheduler.schedule_repeating(
                    move || {
                        fired.set(fired.get() + 1);
                        Ok(true)
                    },
                    Duration::from_millis(50),
                    Duration::ZERO,
                    TimeBase::Scaled,
                )
            })
            .collect();

        b.iter(|| {
            advance(&scheduler, &source);
            black_box(fired.get())
        });
    });
}

criterion_group!(benches, bench_parked_tasks, bench_churn, bench_repeating);
criterion_main!(benches);
