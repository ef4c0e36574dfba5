// ============================================================================
// app.rs — GridLife
// winit event-loop handler: window, input translation and tick cadence.
// ============================================================================

use std::sync::Arc;
use std::time::{Duration, Instant};

use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow},
    keyboard::{Key, NamedKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::config::LifeConfig;
use crate::context::{DeviceContext, RenderTarget};
use crate::engine::GpuLife;
use crate::error::LifeError;
use crate::grid::HostGrid;
use crate::orchestrator::{LifeState, Orchestrator};

// ======================== Application ========================

pub struct App {
    state: Option<AppState>,
    config: LifeConfig,
}

struct AppState {
    window: Arc<Window>,
    orch: Orchestrator<GpuLife>,
    cursor: Option<PhysicalPosition<f64>>,
    interval: Duration,
    next_tick: Instant,
}

impl App {
    pub fn new(config: LifeConfig) -> Self {
        Self {
            state: None,
            config,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        match start(event_loop, &self.config) {
            Ok(state) => {
                // Initial redraw, required on macOS with winit 0.30
                state.window.request_redraw();
                self.state = Some(state);
            }
            Err(e) => {
                log::error!("Failed to start session: {e}");
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(state) = &mut self.state else {
            return;
        };
        if state.orch.state() != LifeState::Running {
            event_loop.set_control_flow(ControlFlow::Wait);
            return;
        }

        let now = Instant::now();
        if now >= state.next_tick {
            report(state.orch.tick());
            state.next_tick = now + state.interval;
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(state.next_tick));
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(state) = &mut self.state else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                state.orch.dispose();
                event_loop.exit();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if !event.state.is_pressed() || event.repeat {
                    return;
                }
                match &event.logical_key {
                    Key::Named(NamedKey::Escape) => {
                        state.orch.dispose();
                        event_loop.exit();
                    }
                    Key::Named(NamedKey::Space) => {
                        if let Some(LifeState::Running) =
                            report(pollster::block_on(state.orch.toggle_run()))
                        {
                            state.next_tick = Instant::now() + state.interval;
                        }
                    }
                    _ => {}
                }
            }

            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                if let Some(pos) = state.cursor {
                    report(state.orch.edit_cell(pos.x, pos.y));
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                state.cursor = Some(position);
                if let Some(true) = report(state.orch.hover(Some((position.x, position.y)))) {
                    state.window.request_redraw();
                }
            }

            WindowEvent::CursorLeft { .. } => {
                state.cursor = None;
                if let Some(true) = report(state.orch.hover(None)) {
                    state.window.request_redraw();
                }
            }

            WindowEvent::Resized(size) => {
                state.orch.resize(size.width, size.height);
                state.window.request_redraw();
            }

            WindowEvent::RedrawRequested => {
                // While running, frames come from the tick.
                if state.orch.state() != LifeState::Running {
                    report(state.orch.redraw());
                }
            }

            _ => {}
        }
    }
}

// ======================== Session Start ========================

fn start(event_loop: &ActiveEventLoop, config: &LifeConfig) -> Result<AppState, LifeError> {
    let window_attrs = WindowAttributes::default()
        .with_title("GridLife")
        .with_inner_size(PhysicalSize::new(config.canvas_size, config.canvas_size));
    let window = Arc::new(event_loop.create_window(window_attrs)?);
    let size = window.inner_size();

    let instance = DeviceContext::instance();
    let surface = instance.create_surface(window.clone())?;
    let context = pollster::block_on(DeviceContext::request(&instance, Some(&surface)))?;
    let target = RenderTarget::surface(surface, &context, size.width, size.height);

    let initial = HostGrid::random(config.grid()?, config.seed_density, config.seed);
    log::info!(
        "Seeded {} of {} cells",
        initial.live_count(),
        initial.dims().area()
    );

    let engine = pollster::block_on(GpuLife::initialize(context, target, &initial, config))?;
    let mut orch = Orchestrator::new(initial, size.width, size.height);
    orch.create(engine)?;

    log::info!("Space: run/pause | Left click: toggle cell | Esc: quit");

    Ok(AppState {
        window,
        orch,
        cursor: None,
        interval: config.update_interval(),
        next_tick: Instant::now(),
    })
}

/// Log a failed operation and carry on; input events are not fatal.
fn report<T>(result: Result<T, LifeError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            log::error!("{e}");
            None
        }
    }
}
