// ============================================================================
// builders.rs — GridLife
// Bind-group-layout, bind-group, compute-pipeline and render-pipeline
// builders. Each builder accumulates entries and is consumed by `build`,
// which allocates exactly one device object.
// ============================================================================

use crate::error::LifeError;

pub const COMPUTE_ENTRY: &str = "computeMain";
pub const VERTEX_ENTRY: &str = "vertexMain";
pub const FRAGMENT_ENTRY: &str = "fragmentMain";

fn missing(slot: &'static str, label: &str) -> LifeError {
    LifeError::Configuration {
        slot,
        label: label.to_string(),
    }
}

// ======================== Bind Group Layout ========================

/// Buffer bindings numbered in the order they are added.
#[derive(Default)]
pub struct BindGroupLayoutBuilder {
    entries: Vec<wgpu::BindGroupLayoutEntry>,
}

impl BindGroupLayoutBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uniform(self, visibility: wgpu::ShaderStages) -> Self {
        self.entry(visibility, wgpu::BufferBindingType::Uniform)
    }

    pub fn storage(self, visibility: wgpu::ShaderStages, read_only: bool) -> Self {
        self.entry(visibility, wgpu::BufferBindingType::Storage { read_only })
    }

    fn entry(mut self, visibility: wgpu::ShaderStages, ty: wgpu::BufferBindingType) -> Self {
        self.entries.push(wgpu::BindGroupLayoutEntry {
            binding: self.entries.len() as u32,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn check(&self, label: &str) -> Result<(), LifeError> {
        if self.is_empty() {
            return Err(missing("layout entry", label));
        }
        Ok(())
    }

    pub fn build(self, device: &wgpu::Device, label: &str) -> Result<wgpu::BindGroupLayout, LifeError> {
        self.check(label)?;
        Ok(device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: &self.entries,
        }))
    }
}

// ======================== Bind Group ========================

/// Whole-buffer bindings numbered in the order they are added.
#[derive(Default)]
pub struct BindGroupBuilder<'a> {
    entries: Vec<wgpu::BindGroupEntry<'a>>,
}

impl<'a> BindGroupBuilder<'a> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn buffer(mut self, buffer: &'a wgpu::Buffer) -> Self {
        self.entries.push(wgpu::BindGroupEntry {
            binding: self.entries.len() as u32,
            resource: buffer.as_entire_binding(),
        });
        self
    }

    pub(crate) fn check(&self, label: &str) -> Result<(), LifeError> {
        if self.entries.is_empty() {
            return Err(missing("bind group entry", label));
        }
        Ok(())
    }

    pub fn build(
        self,
        device: &wgpu::Device,
        label: &str,
        layout: &wgpu::BindGroupLayout,
    ) -> Result<wgpu::BindGroup, LifeError> {
        self.check(label)?;
        Ok(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &self.entries,
        }))
    }
}

// ======================== Compute Pipeline ========================

#[derive(Default)]
pub struct ComputePipelineBuilder<'a> {
    bind_group_layouts: Vec<&'a wgpu::BindGroupLayout>,
}

impl<'a> ComputePipelineBuilder<'a> {
    pub fn new() -> Self {
        Self {
            bind_group_layouts: Vec::new(),
        }
    }

    pub fn bind_group_layout(mut self, layout: &'a wgpu::BindGroupLayout) -> Self {
        self.bind_group_layouts.push(layout);
        self
    }

    pub(crate) fn check(&self, label: &str) -> Result<(), LifeError> {
        if self.bind_group_layouts.is_empty() {
            return Err(missing("bind group layout", label));
        }
        Ok(())
    }

    /// Builds a pipeline running [`COMPUTE_ENTRY`] of `module`.
    pub fn build(
        self,
        device: &wgpu::Device,
        label: &str,
        module: &wgpu::ShaderModule,
    ) -> Result<wgpu::ComputePipeline, LifeError> {
        self.check(label)?;
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{label}_layout")),
            bind_group_layouts: &self.bind_group_layouts,
            push_constant_ranges: &[],
        });
        Ok(device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(label),
            layout: Some(&layout),
            module,
            entry_point: Some(COMPUTE_ENTRY),
            compilation_options: Default::default(),
            cache: None,
        }))
    }
}

// ======================== Render Pipeline ========================

struct VertexLayout {
    stride: wgpu::BufferAddress,
    attributes: Vec<wgpu::VertexAttribute>,
}

#[derive(Default)]
pub struct RenderPipelineBuilder<'a> {
    bind_group_layouts: Vec<&'a wgpu::BindGroupLayout>,
    vertex_buffers: Vec<VertexLayout>,
    targets: Vec<Option<wgpu::ColorTargetState>>,
}

impl<'a> RenderPipelineBuilder<'a> {
    pub fn new() -> Self {
        Self {
            bind_group_layouts: Vec::new(),
            vertex_buffers: Vec::new(),
            targets: Vec::new(),
        }
    }

    pub fn bind_group_layout(mut self, layout: &'a wgpu::BindGroupLayout) -> Self {
        self.bind_group_layouts.push(layout);
        self
    }

    /// Per-vertex buffer layout, bound at the next vertex buffer slot.
    pub fn vertex_buffer(
        mut self,
        stride: wgpu::BufferAddress,
        attributes: &[wgpu::VertexAttribute],
    ) -> Self {
        self.vertex_buffers.push(VertexLayout {
            stride,
            attributes: attributes.to_vec(),
        });
        self
    }

    pub fn render_target(
        mut self,
        format: wgpu::TextureFormat,
        blend: Option<wgpu::BlendState>,
    ) -> Self {
        self.targets.push(Some(wgpu::ColorTargetState {
            format,
            blend,
            write_mask: wgpu::ColorWrites::ALL,
        }));
        self
    }

    pub(crate) fn check(&self, label: &str) -> Result<(), LifeError> {
        if self.vertex_buffers.is_empty() {
            return Err(missing("vertex buffer layout", label));
        }
        if self.targets.is_empty() {
            return Err(missing("render target", label));
        }
        if self.bind_group_layouts.is_empty() {
            return Err(missing("bind group layout", label));
        }
        Ok(())
    }

    /// Builds a triangle-list pipeline using [`VERTEX_ENTRY`] and
    /// [`FRAGMENT_ENTRY`] of `module`.
    pub fn build(
        self,
        device: &wgpu::Device,
        label: &str,
        module: &wgpu::ShaderModule,
    ) -> Result<wgpu::RenderPipeline, LifeError> {
        self.check(label)?;
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{label}_layout")),
            bind_group_layouts: &self.bind_group_layouts,
            push_constant_ranges: &[],
        });
        let buffers: Vec<wgpu::VertexBufferLayout<'_>> = self
            .vertex_buffers
            .iter()
            .map(|v| wgpu::VertexBufferLayout {
                array_stride: v.stride,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &v.attributes,
            })
            .collect();

        Ok(device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module,
                entry_point: Some(VERTEX_ENTRY),
                buffers: &buffers,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: Some(FRAGMENT_ENTRY),
                targets: &self.targets,
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        }))
    }
}
