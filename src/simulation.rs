// ============================================================================
// simulation.rs — GridLife
// Compute dispatch for one generation step.
// ============================================================================

use crate::context::DeviceContext;
use crate::grid::{GridDims, SessionState};
use crate::pipeline::{BindGroupPair, Pipelines};

/// Workgroups needed to cover `extent` cells along one axis.
pub fn workgroup_count(extent: u32, workgroup_size: u32) -> u32 {
    extent.div_ceil(workgroup_size.max(1))
}

/// Records and submits the compute pass. Never touches the step counter:
/// the caller advances it once the step has been submitted.
pub struct SimulationEngine<'a> {
    pub context: &'a DeviceContext,
    pub pipelines: &'a Pipelines,
    pub bind_groups: &'a BindGroupPair,
}

impl SimulationEngine<'_> {
    /// Record one compute pass reading the current buffer and writing the next.
    pub fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        session: &SessionState,
        grid: GridDims,
        workgroup_size: u32,
    ) {
        let dispatch_x = workgroup_count(grid.width, workgroup_size);
        let dispatch_y = workgroup_count(grid.height, workgroup_size);

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("simulation_pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipelines.simulation);
        pass.set_bind_group(0, self.bind_groups.select(session.parity()), &[]);
        pass.dispatch_workgroups(dispatch_x, dispatch_y, 1);
    }

    pub fn step(&self, session: &SessionState, grid: GridDims, workgroup_size: u32) {
        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("simulation_encoder"),
            });
        self.encode(&mut encoder, session, grid, workgroup_size);
        self.context.queue.submit(std::iter::once(encoder.finish()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_covers_the_grid() {
        assert_eq!(workgroup_count(32, 8), 4);
        assert_eq!(workgroup_count(33, 8), 5);
        assert_eq!(workgroup_count(1, 8), 1);
        assert_eq!(workgroup_count(7, 8), 1);
    }
}
