//! Performance benchmarks for the lock controller.
//!
//! These benchmarks measure key-event throughput through the state machine
//! and the cost of a tick, the two paths that run on every event.
//!
//! # Run Benchmarks
//!
//! ```sh
//! # Run all controller benchmarks
//! cargo bench --bench controller_bench
//!
//! # Run one group
//! cargo bench --bench controller_bench -- key_sequences
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use keylock_core::KeyBindings;
use keylock_emulator::{CodeStore, LockController, LockState, transition};
use keylock_hardware::KeypadInput;
use std::hint::black_box;

fn keys(typed: &str) -> Vec<KeypadInput> {
    let bindings = KeyBindings::default();
    typed
        .bytes()
        .filter_map(|b| KeypadInput::from_byte(b, &bindings))
        .collect()
}

/// Benchmark whole use cases fed through a fresh controller.
fn bench_key_sequences(c: &mut Criterion) {
    let mut group = c.benchmark_group("key_sequences");

    let sequences = vec![
        ("unknown_code", "123456+"),
        ("set_passcode", "012345+4+271828+"),
        ("change_admin", "*012345+987654+987654+"),
        ("bulk_erase", "012345+++"),
        ("overflow", "1234567"),
    ];

    for (name, typed) in sequences {
        let input = keys(typed);
        group.throughput(Throughput::Elements(input.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &input, |b, input| {
            b.iter(|| {
                let mut controller = LockController::default();
                for key in input {
                    black_box(controller.handle_key(*key));
                }
                black_box(controller.state_kind())
            });
        });
    }

    group.finish();
}

/// Benchmark the pure transition function on its own.
fn bench_transition(c: &mut Criterion) {
    let mut group = c.benchmark_group("transition");
    group.throughput(Throughput::Elements(1));

    let store = CodeStore::new();
    let passcode = keys("33333");

    group.bench_function("enter_passcode", |b| {
        b.iter(|| {
            let state = passcode.iter().fold(LockState::Idle, |state, key| {
                transition(state, *key, &store).next
            });
            black_box(transition(state, KeypadInput::Enter, black_box(&store)))
        });
    });

    group.bench_function("classify_unknown", |b| {
        b.iter(|| black_box(&store).classify(black_box(&[9, 8, 7, 6, 5, 4])));
    });

    group.finish();
}

/// Benchmark a full unlock, including every tick of the actuator sequence.
fn bench_unlock_cycle(c: &mut Criterion) {
    c.bench_function("unlock_cycle", |b| {
        let input = keys("333333+");
        b.iter(|| {
            let mut controller = LockController::default();
            for key in &input {
                black_box(controller.handle_key(*key));
            }
            while controller.is_unlocking() {
                black_box(controller.on_tick());
            }
            black_box(controller.unlock_count())
        });
    });
}

criterion_group!(
    benches,
    bench_key_sequences,
    bench_transition,
    bench_unlock_cycle,
);

criterion_main!(benches);
