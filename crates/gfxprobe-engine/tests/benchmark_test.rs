//! Micro-benchmark timing through the shared context.

mod common;

use std::time::Duration;

use common::{probe_with, Counters, FakeBackend, FakeScript};
use gfxprobe_engine::benchmark::BENCHMARK_ITERATIONS;

/// 12 flushes should never take anywhere near this long per iteration.
const CEILING_MS: f64 = 1_000.0;

#[test]
fn test_two_runs_are_positive_finite_and_comparable() {
    let probe = probe_with(FakeBackend::new(FakeScript {
        finish_delay: Duration::from_millis(1),
        ..Default::default()
    }));

    let first = probe.run_micro_benchmark().millis_per_iteration();
    let second = probe.run_micro_benchmark().millis_per_iteration();

    for value in [first, second] {
        assert!(value.is_finite(), "value {}", value);
        assert!(value > 0.0, "value {}", value);
        assert!(value < CEILING_MS, "value {}", value);
    }
    // Both runs sleep at least 1ms per iteration; allow generous jitter.
    let ratio = first.max(second) / first.min(second);
    assert!(ratio < 10.0, "first {} second {}", first, second);
}

#[test]
fn test_runs_fixed_iterations_with_varying_color() {
    let probe = probe_with(FakeBackend::new(FakeScript::default()));
    let result = probe.run_micro_benchmark();
    assert!(result.did_run());

    let backend = probe.context().backend();
    let n = BENCHMARK_ITERATIONS as usize;
    assert_eq!(Counters::get(&backend.counters.clear), n);
    assert_eq!(Counters::get(&backend.counters.finish), n);

    let colors = backend.clear_colors();
    assert_eq!(colors.len(), n);
    for pair in colors.windows(2) {
        assert_ne!(pair[0], pair[1]);
    }
    assert_eq!(colors[0], [0.0, 0.2, 0.3, 1.0]);
}

#[test]
fn test_benchmark_without_context_is_zero() {
    let probe = probe_with(FakeBackend::new(FakeScript {
        make_current_ok: false,
        ..Default::default()
    }));

    let result = probe.run_micro_benchmark();
    assert!(!result.did_run());
    assert_eq!(result.millis_per_iteration(), 0.0);
    assert_eq!(Counters::get(&probe.context().backend().counters.finish), 0);
}
