// ============================================================================
// headless.rs — GridLife
// Windowless runner: advances a session for a fixed number of generations.
// ============================================================================

use std::time::Instant;

use crate::config::LifeConfig;
use crate::context::{DeviceContext, RenderTarget};
use crate::cpu::CpuLife;
use crate::engine::{CellEngine, GpuLife};
use crate::error::LifeError;
use crate::grid::HostGrid;
use crate::metrics::GridStats;
use crate::orchestrator::Orchestrator;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    /// wgpu device, frames drawn into an offscreen texture.
    Gpu,
    /// Host memory, no adapter needed.
    Cpu,
}

#[derive(Clone, Debug)]
pub struct HeadlessConfig {
    pub generations: u64,
    pub progress_interval: u64,
    pub backend: Backend,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            generations: 1000,
            progress_interval: 250,
            backend: Backend::Gpu,
        }
    }
}

/// Seed a grid from `config`, run `headless.generations` generations and
/// return the population of the last one.
pub fn run_headless(config: &LifeConfig, headless: &HeadlessConfig) -> Result<GridStats, LifeError> {
    config.validate()?;
    let initial = HostGrid::random(config.grid()?, config.seed_density, config.seed);
    let canvas = config.canvas_size;

    match headless.backend {
        Backend::Cpu => {
            let engine = CpuLife::new(&initial);
            drive(Orchestrator::new(initial, canvas, canvas), engine, headless)
        }
        Backend::Gpu => {
            let context = pollster::block_on(DeviceContext::headless())?;
            let target = RenderTarget::offscreen(&context, canvas, canvas);
            let engine =
                pollster::block_on(GpuLife::initialize(context, target, &initial, config))?;
            drive(Orchestrator::new(initial, canvas, canvas), engine, headless)
        }
    }
}

fn drive<E: CellEngine>(
    mut orch: Orchestrator<E>,
    engine: E,
    config: &HeadlessConfig,
) -> Result<GridStats, LifeError> {
    let grid = engine.grid();
    orch.create(engine)?;
    let initial = orch.stats();

    log::info!(
        "Headless run started: {} generations on {}x{} ({:?})",
        config.generations,
        grid.width,
        grid.height,
        config.backend
    );

    pollster::block_on(orch.toggle_run())?;

    let started = Instant::now();
    let mut last_report = Instant::now();
    let mut last_report_step = 0u64;

    for step in 0..config.generations {
        orch.tick()?;

        if config.progress_interval > 0 && (step + 1) % config.progress_interval == 0 {
            let done = step + 1;
            let total_elapsed = started.elapsed().as_secs_f64().max(1e-6);
            let total_rate = done as f64 / total_elapsed;

            let window_elapsed = last_report.elapsed().as_secs_f64().max(1e-6);
            let window_rate = (done - last_report_step) as f64 / window_elapsed;

            let remaining = config.generations.saturating_sub(done);
            let eta_secs = if total_rate > 1e-6 {
                remaining as f64 / total_rate
            } else {
                0.0
            };

            log::info!(
                "Headless progress: {}/{} | gen/s={:.0} (window {:.0}) | ETA={:.1} s",
                done,
                config.generations,
                total_rate,
                window_rate,
                eta_secs,
            );

            last_report = Instant::now();
            last_report_step = done;
        }
    }

    // Pausing pulls the final generation back into the host snapshot.
    pollster::block_on(orch.toggle_run())?;
    let stats = orch.stats();
    stats.log(Some(&initial));

    log::info!(
        "Headless run finished in {:.2}s",
        started.elapsed().as_secs_f64()
    );
    orch.dispose();
    Ok(stats)
}
