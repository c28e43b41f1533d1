//! Application shell: window, event loop and the render surface lifecycle.

use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes},
};

use crate::gfx::render_engine::RenderEngine;
use crate::gfx::surface::Surface;

/// Top-level application: owns the event loop and drives the surface's
/// lifecycle callbacks from window events.
pub struct DrystaneApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    surface: Surface,
}

impl DrystaneApp {
    /// Create a new application with an empty surface.
    pub fn new() -> Self {
        // Ok if a logger is already set; an embedding host may have one.
        let _ = env_logger::try_init();
        let event_loop = EventLoop::new().expect("Failed to create event loop");

        Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                window: None,
                render_engine: None,
                surface: Surface::new(),
            },
        }
    }

    /// The surface shapes should be registered on. Clones share state, so
    /// the handle stays usable (including from other threads) after
    /// `run` starts.
    pub fn surface(&self) -> Surface {
        self.app_state.surface.clone()
    }

    /// Run the application (consumes self and starts the event loop).
    pub fn run(mut self) {
        let event_loop = self.event_loop.take().expect("Event loop already consumed");
        event_loop.set_control_flow(ControlFlow::Poll);

        event_loop
            .run_app(&mut self.app_state)
            .expect("Failed to run event loop");
    }
}

impl Default for DrystaneApp {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        match event_loop.create_window(
            WindowAttributes::default().with_inner_size(winit::dpi::LogicalSize::new(1200, 800)),
        ) {
            Ok(window) => {
                let window_handle = Arc::new(window);
                self.window = Some(window_handle.clone());

                let (width, height) = window_handle.inner_size().into();
                let window_clone = window_handle.clone();
                let renderer = pollster::block_on(async move {
                    RenderEngine::new(window_clone, width, height).await
                });

                self.surface.on_surface_resized(width, height);
                self.surface.on_surface_created(&renderer);
                self.render_engine = Some(renderer);
                window_handle.request_redraw();
            }
            Err(err) => log::error!("failed to create window: {err}"),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(render_engine) = self.render_engine.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                render_engine.resize(size.width, size.height);
                self.surface.on_surface_resized(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = self.surface.on_draw_frame(render_engine) {
                    log::error!("frame failed: {err}");
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        // Animators flag redraws on the surface; forward them to winit.
        if let Some(window) = self.window.as_ref() {
            if self.surface.take_redraw_request() {
                window.request_redraw();
            }
        }
    }
}
