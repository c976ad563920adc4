use std::time::Instant;

use gfxprobe_core::BenchmarkResult;
use tracing::debug;

use crate::backend::GraphicsBackend;
use crate::gles_driver::{GL_COLOR_BUFFER_BIT, GL_DEPTH_BUFFER_BIT, GL_STENCIL_BUFFER_BIT};

pub const BENCHMARK_ITERATIONS: u32 = 12;

/// Time clear + finish round trips on the current context and return the
/// mean cost per iteration. The clear color changes every iteration so the
/// driver cannot collapse the work.
pub fn run_clear_finish_loop<B: GraphicsBackend + ?Sized>(backend: &B) -> BenchmarkResult {
    let mask = GL_COLOR_BUFFER_BIT | GL_DEPTH_BUFFER_BIT | GL_STENCIL_BUFFER_BIT;
    let start = Instant::now();
    for i in 0..BENCHMARK_ITERATIONS {
        backend.clear_color(0.1 * i as f32, 0.2, 0.3, 1.0);
        backend.clear(mask);
        backend.finish();
    }
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    let per_iteration = elapsed_ms / f64::from(BENCHMARK_ITERATIONS);
    debug!(
        "micro-benchmark: {:.3}ms total, {:.4}ms/iteration",
        elapsed_ms, per_iteration
    );
    BenchmarkResult(per_iteration)
}
