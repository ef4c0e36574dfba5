// ============================================================================
// renderer.rs — GridLife
// Render pass: instanced cell quads plus the optional hover highlight.
// ============================================================================

use crate::config::BACKGROUND;
use crate::context::DeviceContext;
use crate::grid::SessionState;
use crate::pipeline::{BindGroups, Pipelines};
use crate::world::{ResourceSet, QUAD_VERTEX_COUNT};

pub struct RenderEngine<'a> {
    pub context: &'a DeviceContext,
    pub pipelines: &'a Pipelines,
    pub bind_groups: &'a BindGroups,
    pub resources: &'a ResourceSet,
}

impl RenderEngine<'_> {
    /// Draw the current generation into `view`. The hover quad is drawn on
    /// top when `show_hover` is set and the overlay was built.
    pub fn render(&self, view: &wgpu::TextureView, session: &SessionState, show_hover: bool) {
        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(BACKGROUND),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let instances = self.resources.grid().area() as u32;
            pass.set_pipeline(&self.pipelines.cell);
            pass.set_bind_group(0, self.bind_groups.cells.select(session.parity()), &[]);
            pass.set_vertex_buffer(0, self.resources.cell_vertices.slice(..));
            pass.draw(0..QUAD_VERTEX_COUNT, 0..instances);

            if show_hover {
                if let (Some(pipeline), Some(group), Some(hover)) = (
                    &self.pipelines.hover,
                    &self.bind_groups.hover,
                    &self.resources.hover,
                ) {
                    pass.set_pipeline(pipeline);
                    pass.set_bind_group(0, group, &[]);
                    pass.set_vertex_buffer(0, hover.vertices.slice(..));
                    pass.draw(0..QUAD_VERTEX_COUNT, 0..1);
                }
            }
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
    }
}
