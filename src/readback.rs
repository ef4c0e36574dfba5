// ============================================================================
// readback.rs — GridLife
// Copies the current generation into a mappable staging buffer and reads it
// back to the host.
// ============================================================================

use crate::context::DeviceContext;
use crate::error::LifeError;
use crate::grid::{BufferRole, SessionState};
use crate::world::StorageBufferPair;

/// Host-mappable copy target sized to one generation.
pub struct StagingBuffer {
    buffer: wgpu::Buffer,
}

impl StagingBuffer {
    pub fn new(device: &wgpu::Device, storage: &StorageBufferPair) -> Self {
        Self {
            buffer: device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("cell_state_staging"),
                size: storage.size(),
                usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }),
        }
    }

    pub fn size(&self) -> wgpu::BufferAddress {
        self.buffer.size()
    }

    /// Copy the buffer holding the current generation and wait for it to map.
    pub async fn read_current_generation(
        &self,
        context: &DeviceContext,
        storage: &StorageBufferPair,
        session: &SessionState,
    ) -> Result<Vec<u32>, LifeError> {
        let source = storage.for_role(session, BufferRole::Current);

        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("readback_encoder"),
            });
        encoder.copy_buffer_to_buffer(source, 0, &self.buffer, 0, self.buffer.size());
        context.queue.submit(std::iter::once(encoder.finish()));

        let slice = self.buffer.slice(..);
        let (sender, receiver) = futures_intrusive::channel::shared::oneshot_channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            sender.send(result).ok();
        });
        context.device.poll(wgpu::Maintain::Wait);

        receiver.receive().await.ok_or(LifeError::ReadbackCancelled)??;

        let cells = {
            let data = slice.get_mapped_range();
            bytemuck::cast_slice::<u8, u32>(&data).to_vec()
        };
        self.buffer.unmap();

        log::trace!(
            "Read back {} cells at step {}",
            cells.len(),
            session.step_count()
        );
        Ok(cells)
    }
}
