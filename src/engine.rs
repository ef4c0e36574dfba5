// ============================================================================
// engine.rs — GridLife
// The engine seam driven by the orchestrator, and its wgpu implementation.
// ============================================================================

use crate::config::LifeConfig;
use crate::context::{DeviceContext, RenderTarget};
use crate::error::LifeError;
use crate::grid::{BufferRole, GridDims, HostGrid, SessionState};
use crate::input::HoverPoint;
use crate::pipeline::{Assembled, Assembly, BindGroups, InitStage, Pipelines};
use crate::readback::StagingBuffer;
use crate::renderer::RenderEngine;
use crate::simulation::SimulationEngine;
use crate::world::ResourceSet;

/// Device-side operations the orchestrator sequences.
///
/// Implementations pick buffers from the parity of the `SessionState` they are
/// handed and never advance the step counter themselves.
#[allow(async_fn_in_trait)]
pub trait CellEngine {
    fn grid(&self) -> GridDims;

    /// Compute generation `step_count + 1` into the next buffer.
    fn step(&mut self, session: &SessionState) -> Result<(), LifeError>;

    /// Draw the current generation, with the hover highlight if given.
    fn render(&mut self, session: &SessionState, hover: Option<HoverPoint>)
        -> Result<(), LifeError>;

    fn write_cells(
        &mut self,
        session: &SessionState,
        role: BufferRole,
        cells: &[u32],
    ) -> Result<(), LifeError>;

    async fn read_current_generation(
        &mut self,
        session: &SessionState,
    ) -> Result<Vec<u32>, LifeError>;

    fn resize(&mut self, _width: u32, _height: u32) {}
}

// ======================== GPU Engine ========================

pub struct GpuLife {
    context: DeviceContext,
    target: RenderTarget,
    resources: ResourceSet,
    bind_groups: BindGroups,
    pipelines: Pipelines,
    staging: StagingBuffer,
    workgroup_size: u32,
}

impl GpuLife {
    /// Run every initialization stage in order, each inside a validation
    /// error scope. Dropping the returned future before it completes drops
    /// whatever the unfinished stages created.
    pub async fn initialize(
        context: DeviceContext,
        target: RenderTarget,
        initial: &HostGrid,
        config: &LifeConfig,
    ) -> Result<Self, LifeError> {
        let Assembled {
            resources,
            bind_groups,
            pipelines,
            staging,
            ..
        } = {
            let mut assembly = Assembly::new(&context, config.workgroup_size, config.hover_overlay);
            for stage in InitStage::ORDER {
                context.device.push_error_scope(wgpu::ErrorFilter::Validation);
                let result = assembly.run(stage, initial);
                if let Some(error) = context.device.pop_error_scope().await {
                    return Err(LifeError::Validation {
                        stage,
                        message: error.to_string(),
                    });
                }
                result?;
            }
            assembly.finish()?
        };

        let grid = resources.grid();
        log::info!(
            "GPU engine ready: {}x{} grid, workgroup {}x{}, {} bytes per generation",
            grid.width,
            grid.height,
            config.workgroup_size,
            config.workgroup_size,
            staging.size()
        );

        Ok(Self {
            context,
            target,
            resources,
            bind_groups,
            pipelines,
            staging,
            workgroup_size: config.workgroup_size,
        })
    }

    fn simulation(&self) -> SimulationEngine<'_> {
        SimulationEngine {
            context: &self.context,
            pipelines: &self.pipelines,
            bind_groups: &self.bind_groups.cells,
        }
    }

    fn renderer(&self) -> RenderEngine<'_> {
        RenderEngine {
            context: &self.context,
            pipelines: &self.pipelines,
            bind_groups: &self.bind_groups,
            resources: &self.resources,
        }
    }
}

impl CellEngine for GpuLife {
    fn grid(&self) -> GridDims {
        self.resources.grid()
    }

    fn step(&mut self, session: &SessionState) -> Result<(), LifeError> {
        self.simulation()
            .step(session, self.resources.grid(), self.workgroup_size);
        Ok(())
    }

    fn render(
        &mut self,
        session: &SessionState,
        hover: Option<HoverPoint>,
    ) -> Result<(), LifeError> {
        if let Some(point) = hover {
            self.resources.write_hover(&self.context.queue, point);
        }
        let Some(frame) = self.target.acquire(&self.context.device)? else {
            return Ok(());
        };
        self.renderer().render(frame.view(), session, hover.is_some());
        frame.present();
        Ok(())
    }

    fn write_cells(
        &mut self,
        session: &SessionState,
        role: BufferRole,
        cells: &[u32],
    ) -> Result<(), LifeError> {
        self.resources
            .write_cells(&self.context.queue, session, role, cells)
    }

    async fn read_current_generation(
        &mut self,
        session: &SessionState,
    ) -> Result<Vec<u32>, LifeError> {
        self.staging
            .read_current_generation(&self.context, &self.resources.storage, session)
            .await
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.target.size() == (width, height) {
            return;
        }
        self.target.resize(&self.context.device, width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{next_generation, CellCoord};

    fn gpu(initial: &HostGrid) -> Option<GpuLife> {
        let context = match pollster::block_on(DeviceContext::headless()) {
            Ok(context) => context,
            Err(e) => {
                eprintln!("skipping GPU test: {e}");
                return None;
            }
        };
        let target = RenderTarget::offscreen(&context, 64, 64);
        let config = LifeConfig {
            grid_width: initial.dims().width,
            grid_height: initial.dims().height,
            ..LifeConfig::default()
        };
        Some(
            pollster::block_on(GpuLife::initialize(context, target, initial, &config))
                .expect("initialize"),
        )
    }

    fn advance(engine: &mut GpuLife, session: &mut SessionState) -> Vec<u32> {
        engine.step(session).unwrap();
        session.advance();
        engine.render(session, None).unwrap();
        pollster::block_on(engine.read_current_generation(session)).unwrap()
    }

    #[test]
    fn block_is_stable_on_device() {
        let dims = GridDims::new(6, 6).unwrap();
        let block = [
            CellCoord::new(2, 2),
            CellCoord::new(3, 2),
            CellCoord::new(2, 3),
            CellCoord::new(3, 3),
        ];
        let initial = HostGrid::from_live_cells(dims, &block);
        let Some(mut engine) = gpu(&initial) else {
            return;
        };
        let mut session = SessionState::new();
        for _ in 0..4 {
            assert_eq!(advance(&mut engine, &mut session), initial.cells());
        }
        assert_eq!(session.step_count(), 4);
    }

    #[test]
    fn blinker_matches_host_rule() {
        let dims = GridDims::new(5, 5).unwrap();
        let blinker = [
            CellCoord::new(1, 2),
            CellCoord::new(2, 2),
            CellCoord::new(3, 2),
        ];
        let mut expected = HostGrid::from_live_cells(dims, &blinker);
        let Some(mut engine) = gpu(&expected) else {
            return;
        };
        let mut session = SessionState::new();
        for _ in 0..3 {
            expected = next_generation(&expected);
            assert_eq!(advance(&mut engine, &mut session), expected.cells());
        }
    }

    #[test]
    fn hover_overlay_draws_without_validation_errors() {
        let dims = GridDims::new(8, 8).unwrap();
        let initial = HostGrid::random(dims, 0.5, Some(9));
        let Some(mut engine) = gpu(&initial) else {
            return;
        };
        let session = SessionState::new();

        engine
            .context
            .device
            .push_error_scope(wgpu::ErrorFilter::Validation);
        engine.step(&session).unwrap();
        engine
            .render(&session, Some(HoverPoint { x: 0.3, y: -0.6 }))
            .unwrap();
        engine.resize(128, 32);
        engine
            .render(&session, Some(HoverPoint { x: -0.99, y: 0.99 }))
            .unwrap();
        engine.context.device.poll(wgpu::Maintain::Wait);
        let error = pollster::block_on(engine.context.device.pop_error_scope());
        assert!(error.is_none(), "validation error: {error:?}");
        assert_eq!(engine.target.size(), (128, 32));

        let cells = pollster::block_on(engine.read_current_generation(&session)).unwrap();
        assert_eq!(cells, initial.cells());
    }

    #[test]
    fn edit_is_visible_to_readback() {
        let dims = GridDims::new(4, 4).unwrap();
        let mut host = HostGrid::empty(dims);
        let Some(mut engine) = gpu(&host) else {
            return;
        };
        let session = SessionState::new();
        host.toggle(CellCoord::new(1, 1));
        engine
            .write_cells(&session, BufferRole::Current, host.cells())
            .unwrap();
        engine.render(&session, None).unwrap();
        let cells = pollster::block_on(engine.read_current_generation(&session)).unwrap();
        assert_eq!(cells, host.cells());
    }

    #[test]
    fn wrong_sized_upload_is_rejected() {
        let dims = GridDims::new(4, 4).unwrap();
        let Some(mut engine) = gpu(&HostGrid::empty(dims)) else {
            return;
        };
        let err = engine
            .write_cells(&SessionState::new(), BufferRole::Current, &[0; 3])
            .unwrap_err();
        assert!(matches!(
            err,
            LifeError::SizeMismatch {
                expected: 16,
                actual: 3
            }
        ));
    }
}
