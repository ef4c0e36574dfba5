// ============================================================================
// lib.rs — GridLife
// Double-buffered Conway's Life on the GPU: resources, pipelines, engines and
// the session state machine that drives them.
// ============================================================================

pub mod app;
pub mod builders;
pub mod config;
pub mod context;
pub mod cpu;
pub mod engine;
pub mod error;
pub mod grid;
pub mod headless;
pub mod input;
pub mod metrics;
pub mod orchestrator;
pub mod pipeline;
pub mod readback;
pub mod renderer;
pub mod simulation;
pub mod world;

pub use config::LifeConfig;
pub use engine::{CellEngine, GpuLife};
pub use error::LifeError;
pub use orchestrator::{LifeState, Orchestrator};
