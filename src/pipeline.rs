// ============================================================================
// pipeline.rs — GridLife
// Bind-group-layout, bind-group and pipeline assembly, run as ordered
// initialization stages: assets → layouts → bind groups → pipelines → staging.
// ============================================================================

use crate::builders::{
    BindGroupBuilder, BindGroupLayoutBuilder, ComputePipelineBuilder, RenderPipelineBuilder,
};
use crate::context::DeviceContext;
use crate::error::LifeError;
use crate::grid::{HostGrid, Parity};
use crate::readback::StagingBuffer;
use crate::world::{ResourceSet, QUAD_ATTRIBUTES, QUAD_STRIDE};

const WORKGROUP_PLACEHOLDER: &str = "WORKGROUP_SIZE";

// ======================== Stages ========================

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InitStage {
    Assets,
    Layouts,
    BindGroups,
    Pipelines,
    Staging,
}

impl InitStage {
    pub const ORDER: [InitStage; 5] = [
        InitStage::Assets,
        InitStage::Layouts,
        InitStage::BindGroups,
        InitStage::Pipelines,
        InitStage::Staging,
    ];
}

// ======================== Products ========================

pub struct Layouts {
    /// (0) grid uniform, (1) read-only cells, (2) read-write cells.
    pub cell: wgpu::BindGroupLayout,
    /// (0) hover uniform, vertex stage only.
    pub hover: Option<wgpu::BindGroupLayout>,
}

/// The two cell bind groups, bindings (1) and (2) swapped between them.
pub struct BindGroupPair {
    /// Reads A, writes B.
    even: wgpu::BindGroup,
    /// Reads B, writes A.
    odd: wgpu::BindGroup,
}

impl BindGroupPair {
    pub fn select(&self, parity: Parity) -> &wgpu::BindGroup {
        match parity {
            Parity::Even => &self.even,
            Parity::Odd => &self.odd,
        }
    }
}

pub struct BindGroups {
    pub cells: BindGroupPair,
    pub hover: Option<wgpu::BindGroup>,
}

pub struct Pipelines {
    pub simulation: wgpu::ComputePipeline,
    pub cell: wgpu::RenderPipeline,
    pub hover: Option<wgpu::RenderPipeline>,
}

/// Everything a finished assembly hands to the engine.
pub struct Assembled {
    pub resources: ResourceSet,
    pub layouts: Layouts,
    pub bind_groups: BindGroups,
    pub pipelines: Pipelines,
    pub staging: StagingBuffer,
}

// ======================== Assembly ========================

/// Holds each initialization stage's product as it is made.
///
/// Dropping an unfinished assembly releases whatever it has created so far.
pub struct Assembly<'a> {
    context: &'a DeviceContext,
    workgroup_size: u32,
    hover_overlay: bool,
    resources: Option<ResourceSet>,
    layouts: Option<Layouts>,
    bind_groups: Option<BindGroups>,
    pipelines: Option<Pipelines>,
    staging: Option<StagingBuffer>,
}

fn require<'t, T>(
    slot: &'t Option<T>,
    stage: InitStage,
    missing: &'static str,
) -> Result<&'t T, LifeError> {
    slot.as_ref().ok_or(LifeError::Dependency { stage, missing })
}

impl<'a> Assembly<'a> {
    pub fn new(context: &'a DeviceContext, workgroup_size: u32, hover_overlay: bool) -> Self {
        Self {
            context,
            workgroup_size,
            hover_overlay,
            resources: None,
            layouts: None,
            bind_groups: None,
            pipelines: None,
            staging: None,
        }
    }

    pub fn run(&mut self, stage: InitStage, initial: &HostGrid) -> Result<(), LifeError> {
        log::debug!("Initialization stage {stage:?}");
        match stage {
            InitStage::Assets => self.create_assets(initial),
            InitStage::Layouts => self.build_layouts(),
            InitStage::BindGroups => self.build_bind_groups(),
            InitStage::Pipelines => self.build_pipelines(),
            InitStage::Staging => self.make_staging(),
        }
    }

    pub fn create_assets(&mut self, initial: &HostGrid) -> Result<(), LifeError> {
        self.resources = Some(ResourceSet::create(
            &self.context.device,
            initial,
            self.hover_overlay,
        )?);
        Ok(())
    }

    pub fn build_layouts(&mut self) -> Result<(), LifeError> {
        let device = &self.context.device;
        let shared = wgpu::ShaderStages::VERTEX_FRAGMENT | wgpu::ShaderStages::COMPUTE;

        // Writable storage is not allowed in the vertex stage.
        let cell = BindGroupLayoutBuilder::new()
            .uniform(shared)
            .storage(shared, true)
            .storage(wgpu::ShaderStages::COMPUTE, false)
            .build(device, "cell_bgl")?;

        let hover = if self.hover_overlay {
            Some(
                BindGroupLayoutBuilder::new()
                    .uniform(wgpu::ShaderStages::VERTEX)
                    .build(device, "hover_bgl")?,
            )
        } else {
            None
        };

        self.layouts = Some(Layouts { cell, hover });
        Ok(())
    }

    pub fn build_bind_groups(&mut self) -> Result<(), LifeError> {
        let device = &self.context.device;
        let layouts = require(&self.layouts, InitStage::BindGroups, "bind group layouts")?;
        let resources = require(&self.resources, InitStage::BindGroups, "the resource set")?;
        let storage = &resources.storage;

        let even = BindGroupBuilder::new()
            .buffer(&resources.grid_uniform)
            .buffer(storage.a())
            .buffer(storage.b())
            .build(device, "cell_bg_even", &layouts.cell)?;
        let odd = BindGroupBuilder::new()
            .buffer(&resources.grid_uniform)
            .buffer(storage.b())
            .buffer(storage.a())
            .build(device, "cell_bg_odd", &layouts.cell)?;

        let hover = match (&layouts.hover, &resources.hover) {
            (Some(layout), Some(buffers)) => Some(
                BindGroupBuilder::new()
                    .buffer(&buffers.uniform)
                    .build(device, "hover_bg", layout)?,
            ),
            _ => None,
        };

        self.bind_groups = Some(BindGroups {
            cells: BindGroupPair { even, odd },
            hover,
        });
        Ok(())
    }

    pub fn build_pipelines(&mut self) -> Result<(), LifeError> {
        let device = &self.context.device;
        let format = self.context.format;
        let layouts = require(&self.layouts, InitStage::Pipelines, "bind group layouts")?;

        let simulation_source = include_str!("shaders/simulation.wgsl")
            .replace(WORKGROUP_PLACEHOLDER, &self.workgroup_size.to_string());
        let simulation_shader = load_shader(device, "simulation_shader", &simulation_source);
        let cell_shader = load_shader(device, "cell_shader", include_str!("shaders/cell.wgsl"));

        let simulation = ComputePipelineBuilder::new()
            .bind_group_layout(&layouts.cell)
            .build(device, "simulation_pipeline", &simulation_shader)?;

        let cell = RenderPipelineBuilder::new()
            .bind_group_layout(&layouts.cell)
            .render_target(format, Some(wgpu::BlendState::REPLACE))
            .vertex_buffer(QUAD_STRIDE, &QUAD_ATTRIBUTES)
            .build(device, "cell_pipeline", &cell_shader)?;

        let hover = match &layouts.hover {
            Some(hover_layout) => {
                let hover_shader =
                    load_shader(device, "hover_shader", include_str!("shaders/hover.wgsl"));
                Some(
                    RenderPipelineBuilder::new()
                        .bind_group_layout(hover_layout)
                        .render_target(format, Some(wgpu::BlendState::ALPHA_BLENDING))
                        .vertex_buffer(QUAD_STRIDE, &QUAD_ATTRIBUTES)
                        .build(device, "hover_pipeline", &hover_shader)?,
                )
            }
            None => None,
        };

        self.pipelines = Some(Pipelines {
            simulation,
            cell,
            hover,
        });
        Ok(())
    }

    pub fn make_staging(&mut self) -> Result<(), LifeError> {
        let resources = require(&self.resources, InitStage::Staging, "the resource set")?;
        self.staging = Some(StagingBuffer::new(&self.context.device, &resources.storage));
        Ok(())
    }

    pub fn finish(self) -> Result<Assembled, LifeError> {
        let Assembly {
            resources,
            layouts,
            bind_groups,
            pipelines,
            staging,
            ..
        } = self;
        let missing = |what| LifeError::Dependency {
            stage: InitStage::Staging,
            missing: what,
        };
        Ok(Assembled {
            resources: resources.ok_or_else(|| missing("the resource set"))?,
            layouts: layouts.ok_or_else(|| missing("bind group layouts"))?,
            bind_groups: bind_groups.ok_or_else(|| missing("bind groups"))?,
            pipelines: pipelines.ok_or_else(|| missing("pipelines"))?,
            staging: staging.ok_or_else(|| missing("the staging buffer"))?,
        })
    }
}

fn load_shader(device: &wgpu::Device, label: &str, source: &str) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    })
}
