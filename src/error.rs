// ============================================================================
// error.rs — GridLife
// Error taxonomy shared by the builders, resource set, engines and orchestrator.
// ============================================================================

use crate::orchestrator::LifeState;
use crate::pipeline::InitStage;

/// Every failure the crate can surface to its caller.
///
/// Operations invoked before the engine exists are not errors: they are
/// no-ops reported through `Ok(false)` / `Ok(None)` by the orchestrator.
#[derive(thiserror::Error, Debug)]
pub enum LifeError {
    #[error("GPU device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("builder `{label}` is missing a required {slot}")]
    Configuration { slot: &'static str, label: String },

    #[error("cell data has {actual} cells but the grid holds {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("cell {index} holds {value}; cells must be 0 or 1")]
    InvalidCell { index: usize, value: u32 },

    #[error("stage `{stage:?}` requires {missing} to be built first")]
    Dependency { stage: InitStage, missing: &'static str },

    #[error("grid must be at least 1x1, got {width}x{height}")]
    InvalidGrid { width: u32, height: u32 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("validation failed during `{stage:?}`: {message}")]
    Validation { stage: InitStage, message: String },

    #[error("cannot {action} while {state:?}")]
    InvalidTransition { state: LifeState, action: &'static str },

    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("staging buffer map failed: {0}")]
    Map(#[from] wgpu::BufferAsyncError),

    #[error("staging buffer mapping was dropped before completing")]
    ReadbackCancelled,

    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_names_the_slot() {
        let err = LifeError::Configuration {
            slot: "vertex buffer layout",
            label: "cell_pipeline".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("vertex buffer layout"));
        assert!(msg.contains("cell_pipeline"));
    }

    #[test]
    fn dependency_error_names_stage_and_prerequisite() {
        let err = LifeError::Dependency {
            stage: InitStage::Pipelines,
            missing: "bind group layouts",
        };
        let msg = err.to_string();
        assert!(msg.contains("Pipelines"));
        assert!(msg.contains("bind group layouts"));
    }
}
