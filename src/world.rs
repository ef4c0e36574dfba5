// ============================================================================
// world.rs — GridLife
// Resource Set: grid uniform, quad vertex buffers, the ping-pong pair of cell
// storage buffers and the hover overlay uniform.
// ============================================================================

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::error::LifeError;
use crate::grid::{check_cells, BufferRole, GridDims, HostGrid, SessionState};
use crate::input::HoverPoint;

// ======================== Constants ========================

/// Unit cell quad, two triangles, inset so neighbouring cells keep a gap.
pub const CELL_QUAD: [[f32; 2]; 6] = [
    [-0.8, -0.8],
    [0.8, -0.8],
    [0.8, 0.8],
    [-0.8, -0.8],
    [0.8, 0.8],
    [-0.8, 0.8],
];

/// Full-cell quad used by the hover highlight.
pub const HOVER_QUAD: [[f32; 2]; 6] = [
    [-1.0, -1.0],
    [1.0, -1.0],
    [1.0, 1.0],
    [-1.0, -1.0],
    [1.0, 1.0],
    [-1.0, 1.0],
];

pub const QUAD_VERTEX_COUNT: u32 = 6;
pub const QUAD_STRIDE: wgpu::BufferAddress = std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress;
pub const QUAD_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

// ======================== Uniform Structs ========================

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct GridUniforms {
    pub size: [f32; 2],
}

impl GridUniforms {
    pub fn new(grid: GridDims) -> Self {
        Self {
            size: [grid.width as f32, grid.height as f32],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct HoverUniforms {
    pub position: [f32; 2],
    /// One cell's extent in NDC.
    pub size: [f32; 2],
    pub grid: [f32; 2],
}

impl HoverUniforms {
    pub fn new(point: HoverPoint, grid: GridDims) -> Self {
        Self {
            position: [point.x, point.y],
            size: [2.0 / grid.width as f32, 2.0 / grid.height as f32],
            grid: [grid.width as f32, grid.height as f32],
        }
    }
}

// ======================== Storage Pair ========================

/// Cell state buffers A (slot 0) and B (slot 1).
pub struct StorageBufferPair {
    buffers: [wgpu::Buffer; 2],
}

impl StorageBufferPair {
    fn new(device: &wgpu::Device, initial: &[u32]) -> Self {
        let usage = wgpu::BufferUsages::STORAGE
            | wgpu::BufferUsages::COPY_SRC
            | wgpu::BufferUsages::COPY_DST;
        let create = |label: &str| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(initial),
                usage,
            })
        };
        Self {
            buffers: [create("cell_state_a"), create("cell_state_b")],
        }
    }

    pub fn a(&self) -> &wgpu::Buffer {
        &self.buffers[0]
    }

    pub fn b(&self) -> &wgpu::Buffer {
        &self.buffers[1]
    }

    pub fn slot(&self, slot: usize) -> &wgpu::Buffer {
        &self.buffers[slot]
    }

    pub fn for_role(&self, session: &SessionState, role: BufferRole) -> &wgpu::Buffer {
        self.slot(role.slot(session.parity()))
    }

    /// Byte size of one buffer.
    pub fn size(&self) -> wgpu::BufferAddress {
        self.buffers[0].size()
    }
}

// ======================== Resource Set ========================

/// Hover overlay buffers, present only when the overlay is enabled.
pub struct HoverResources {
    pub vertices: wgpu::Buffer,
    pub uniform: wgpu::Buffer,
}

/// GPU-resident buffers for one session.
pub struct ResourceSet {
    grid: GridDims,
    pub grid_uniform: wgpu::Buffer,
    pub cell_vertices: wgpu::Buffer,
    pub storage: StorageBufferPair,
    pub hover: Option<HoverResources>,
}

impl ResourceSet {
    /// Allocate every buffer and seed both storage buffers with `initial`.
    pub fn create(
        device: &wgpu::Device,
        initial: &HostGrid,
        hover_overlay: bool,
    ) -> Result<Self, LifeError> {
        let grid = initial.dims();
        check_cells(grid, initial.cells())?;

        let grid_uniform = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("grid_uniforms"),
            contents: bytemuck::bytes_of(&GridUniforms::new(grid)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let cell_vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cell_vertices"),
            contents: bytemuck::cast_slice(&CELL_QUAD),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let storage = StorageBufferPair::new(device, initial.cells());

        let hover = hover_overlay.then(|| HoverResources {
            vertices: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("hover_vertices"),
                contents: bytemuck::cast_slice(&HOVER_QUAD),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            }),
            uniform: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("hover_uniforms"),
                contents: bytemuck::bytes_of(&HoverUniforms::new(
                    HoverPoint { x: 0.0, y: 0.0 },
                    grid,
                )),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            }),
        });

        log::debug!(
            "Resource set created: {}x{} grid, {} bytes per generation, hover overlay {}",
            grid.width,
            grid.height,
            grid.byte_size(),
            if hover_overlay { "on" } else { "off" }
        );

        Ok(Self {
            grid,
            grid_uniform,
            cell_vertices,
            storage,
            hover,
        })
    }

    pub fn grid(&self) -> GridDims {
        self.grid
    }

    /// Upload a full generation into the buffer playing `role` this step.
    pub fn write_cells(
        &self,
        queue: &wgpu::Queue,
        session: &SessionState,
        role: BufferRole,
        cells: &[u32],
    ) -> Result<(), LifeError> {
        check_cells(self.grid, cells)?;
        queue.write_buffer(
            self.storage.for_role(session, role),
            0,
            bytemuck::cast_slice(cells),
        );
        Ok(())
    }

    pub fn write_hover(&self, queue: &wgpu::Queue, point: HoverPoint) {
        if let Some(hover) = &self.hover {
            queue.write_buffer(
                &hover.uniform,
                0,
                bytemuck::bytes_of(&HoverUniforms::new(point, self.grid)),
            );
        }
    }
}
