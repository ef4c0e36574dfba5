// ============================================================================
// context.rs — GridLife
// Device context (adapter / device / queue / colour format) and the render
// target frames are drawn into: a window surface or an offscreen texture.
// ============================================================================

use crate::error::LifeError;

/// Format used when rendering without a window.
pub const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

// ======================== Device Context ========================

/// GPU handles acquired once at session start.
pub struct DeviceContext {
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub format: wgpu::TextureFormat,
}

impl DeviceContext {
    pub fn instance() -> wgpu::Instance {
        wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        })
    }

    /// Request an adapter and device. With a surface, the colour format is
    /// taken from its capabilities; without one, [`OFFSCREEN_FORMAT`] is used.
    pub async fn request(
        instance: &wgpu::Instance,
        surface: Option<&wgpu::Surface<'_>>,
    ) -> Result<Self, LifeError> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: surface,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| LifeError::DeviceUnavailable("no suitable GPU adapter".into()))?;

        log::info!("GPU: {}", adapter.get_info().name);

        // The cell program reads storage buffers from the vertex stage.
        let required = wgpu::DownlevelFlags::COMPUTE_SHADERS | wgpu::DownlevelFlags::VERTEX_STORAGE;
        let flags = adapter.get_downlevel_capabilities().flags;
        if !flags.contains(required) {
            return Err(LifeError::DeviceUnavailable(format!(
                "adapter {} lacks compute or vertex storage support",
                adapter.get_info().name
            )));
        }

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("gridlife_device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(|e| LifeError::DeviceUnavailable(format!("failed to create device: {e}")))?;

        let format = match surface {
            Some(surface) => {
                let caps = surface.get_capabilities(&adapter);
                caps.formats
                    .iter()
                    .find(|f| f.is_srgb())
                    .or_else(|| caps.formats.first())
                    .copied()
                    .ok_or_else(|| {
                        LifeError::DeviceUnavailable("surface reports no formats".into())
                    })?
            }
            None => OFFSCREEN_FORMAT,
        };

        Ok(Self {
            adapter,
            device,
            queue,
            format,
        })
    }

    /// Context with no window attached.
    pub async fn headless() -> Result<Self, LifeError> {
        let instance = Self::instance();
        Self::request(&instance, None).await
    }
}

// ======================== Render Target ========================

/// Where rendered frames go.
pub enum RenderTarget {
    Surface {
        surface: wgpu::Surface<'static>,
        config: wgpu::SurfaceConfiguration,
    },
    Offscreen {
        texture: wgpu::Texture,
    },
}

impl RenderTarget {
    pub fn surface(
        surface: wgpu::Surface<'static>,
        context: &DeviceContext,
        width: u32,
        height: u32,
    ) -> Self {
        let caps = surface.get_capabilities(&context.adapter);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: context.format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&context.device, &config);
        RenderTarget::Surface { surface, config }
    }

    pub fn offscreen(context: &DeviceContext, width: u32, height: u32) -> Self {
        RenderTarget::Offscreen {
            texture: create_offscreen_texture(&context.device, context.format, width, height),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        match self {
            RenderTarget::Surface { config, .. } => (config.width, config.height),
            RenderTarget::Offscreen { texture } => (texture.width(), texture.height()),
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        match self {
            RenderTarget::Surface { surface, config } => {
                config.width = width;
                config.height = height;
                surface.configure(device, config);
            }
            RenderTarget::Offscreen { texture } => {
                *texture = create_offscreen_texture(device, texture.format(), width, height);
            }
        }
    }

    /// Next frame to draw into. `Ok(None)` means this frame is skipped
    /// (surface lost, outdated or timed out); the surface is reconfigured.
    pub fn acquire(&mut self, device: &wgpu::Device) -> Result<Option<Frame>, LifeError> {
        match self {
            RenderTarget::Surface { surface, config } => match surface.get_current_texture() {
                Ok(texture) => {
                    let view = texture
                        .texture
                        .create_view(&wgpu::TextureViewDescriptor::default());
                    Ok(Some(Frame::Surface { texture, view }))
                }
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    log::warn!("Surface lost or outdated; reconfiguring");
                    surface.configure(device, config);
                    Ok(None)
                }
                Err(wgpu::SurfaceError::Timeout) => {
                    log::warn!("Surface timed out; skipping frame");
                    Ok(None)
                }
                Err(e) => Err(e.into()),
            },
            RenderTarget::Offscreen { texture } => Ok(Some(Frame::Offscreen {
                view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
            })),
        }
    }
}

fn create_offscreen_texture(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("offscreen_target"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    })
}

/// One acquired colour attachment.
pub enum Frame {
    Surface {
        texture: wgpu::SurfaceTexture,
        view: wgpu::TextureView,
    },
    Offscreen {
        view: wgpu::TextureView,
    },
}

impl Frame {
    pub fn view(&self) -> &wgpu::TextureView {
        match self {
            Frame::Surface { view, .. } | Frame::Offscreen { view } => view,
        }
    }

    pub fn present(self) {
        if let Frame::Surface { texture, .. } = self {
            texture.present();
        }
    }
}
