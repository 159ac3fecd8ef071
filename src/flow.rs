//! Startup and the frame loop.
//!
//! [`run`] opens a window, builds the GPU [`Context`], loads the scene and then
//! renders one frame per redraw until the window closes.
//!
//! # Lifecycle
//!
//! 1. `resumed`: create the window and start the startup future (assets load concurrently)
//! 2. native: block on the future; web: spawn it and receive the result as a user event
//! 3. any startup error ends the event loop and is returned from [`run`]
//! 4. `MouseWheel` events update the camera zoom between frames
//! 5. `RedrawRequested` renders one frame and, while the [`FrameLoop`] continues,
//!    requests the next redraw
//! 6. `CloseRequested` stops the frame loop and exits

use std::sync::Arc;

use instant::Instant;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    camera::CameraController,
    config::SceneConfig,
    context::Context,
    data_structures::{instance::PlacementGenerator, scene::Scene},
    error::SceneError,
    render::FrameRenderer,
    resources::{self, decode::ObjDecoder},
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Whether the loop wants another frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Stop,
}

/// Cooperative frame scheduling.
///
/// Frame N+1 only starts after frame N returned. The loop ends when
/// [`FrameLoop::request_stop`] is called or, for a bounded loop, after the frame limit.
#[derive(Debug)]
pub struct FrameLoop {
    frames: u64,
    frame_limit: Option<u64>,
    stop_requested: bool,
    started: Option<Instant>,
}

impl FrameLoop {
    /// A loop that runs until stopped.
    pub fn new() -> Self {
        Self {
            frames: 0,
            frame_limit: None,
            stop_requested: false,
            started: None,
        }
    }

    /// A loop that stops on its own after `limit` frames.
    pub fn with_frame_limit(limit: u64) -> Self {
        Self {
            frame_limit: Some(limit),
            ..Self::new()
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn request_stop(&mut self) {
        if !self.stop_requested {
            if let Some(started) = self.started {
                let secs = started.elapsed().as_secs_f64();
                if secs > 0.0 {
                    log::info!(
                        "Stopping after {} frames ({:.1} fps).",
                        self.frames,
                        self.frames as f64 / secs
                    );
                }
            }
        }
        self.stop_requested = true;
    }

    pub fn is_running(&self) -> bool {
        !self.stop_requested && self.frame_limit.is_none_or(|limit| self.frames < limit)
    }

    /// Runs one frame unless the loop has already ended.
    pub fn tick<F: FnOnce()>(&mut self, frame: F) -> LoopControl {
        if !self.is_running() {
            return LoopControl::Stop;
        }
        self.started.get_or_insert_with(Instant::now);
        frame();
        self.frames += 1;
        if self.is_running() {
            LoopControl::Continue
        } else {
            LoopControl::Stop
        }
    }

    /// Ticks until the loop ends and returns how many frames ran.
    ///
    /// Only returns for a bounded loop or once `frame` arranges for a stop.
    pub fn run<F: FnMut(&mut Self)>(&mut self, mut frame: F) -> u64 {
        let first = self.frames;
        while self.is_running() {
            self.started.get_or_insert_with(Instant::now);
            frame(self);
            self.frames += 1;
        }
        self.frames - first
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything alive once startup finished.
pub struct AppState {
    pub(crate) ctx: Context,
    scene: Scene<Context>,
    camera: CameraController,
    renderer: FrameRenderer,
    frame_loop: FrameLoop,
}

impl AppState {
    async fn new(window: Arc<Window>, config: SceneConfig) -> Result<Self, SceneError> {
        let mut ctx = Context::new(window).await?;
        let mut placement = PlacementGenerator::new();
        let scene = resources::load_scene(&mut ctx, &config, &ObjDecoder, &mut placement).await?;
        Ok(Self {
            ctx,
            scene,
            camera: CameraController::new(),
            renderer: FrameRenderer::from_config(&config),
            frame_loop: FrameLoop::new(),
        })
    }

    fn render(&mut self) -> LoopControl {
        let Self {
            ctx,
            scene,
            camera,
            renderer,
            frame_loop,
        } = self;
        frame_loop.tick(|| {
            renderer.render_frame(ctx, scene, camera);
        })
    }
}

pub(crate) enum FlowEvent {
    #[allow(dead_code)]
    Initialized(Box<AppState>),
    #[allow(dead_code)]
    Failed(SceneError),
}

impl std::fmt::Debug for FlowEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized(_) => f.write_str("Initialized"),
            Self::Failed(e) => f.debug_tuple("Failed").field(e).finish(),
        }
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[allow(dead_code)]
    proxy: winit::event_loop::EventLoopProxy<FlowEvent>,
    // Taken when the window is created.
    config: Option<SceneConfig>,
    state: Option<AppState>,
    startup_error: Option<SceneError>,
}

impl App {
    fn new(event_loop: &EventLoop<FlowEvent>, config: SceneConfig) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            config: Some(config),
            state: None,
            startup_error: None,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: SceneError) {
        log::error!("Scene startup failed: {error}");
        self.startup_error = Some(error);
        event_loop.exit();
    }

    fn ready(&mut self, state: AppState) {
        state.ctx.window().request_redraw();
        self.state = Some(state);
    }
}

impl ApplicationHandler<FlowEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(config) = self.config.take() else {
            return;
        };

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("forest-ngin");

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let canvas = web_sys::window()
                .and_then(|window| window.document())
                .and_then(|document| document.get_element_by_id(CANVAS_ID));
            match canvas {
                Some(canvas) => {
                    window_attributes = window_attributes
                        .with_canvas(Some(canvas.unchecked_into()))
                        // Wheel events zoom the camera instead of scrolling the page.
                        .with_prevent_default(true);
                }
                None => {
                    let reason = format!("no element with id `{CANVAS_ID}`");
                    return self.fail(event_loop, SceneError::GraphicsContextUnavailable(reason));
                }
            }
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                return self.fail(event_loop, SceneError::GraphicsContextUnavailable(e.to_string()));
            }
        };

        let init_future = AppState::new(window, config);

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(init_future) {
                Ok(state) => self.ready(state),
                Err(e) => self.fail(event_loop, e),
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let event = match init_future.await {
                    Ok(state) => FlowEvent::Initialized(Box::new(state)),
                    Err(e) => FlowEvent::Failed(e),
                };
                if proxy.send_event(event).is_err() {
                    log::error!("Event loop closed before the scene finished loading.");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent) {
        match event {
            FlowEvent::Initialized(state) => self.ready(*state),
            FlowEvent::Failed(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        if let WindowEvent::CloseRequested = event {
            if let Some(state) = &mut self.state {
                state.frame_loop.request_stop();
            }
            event_loop.exit();
            return;
        }
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        if state.camera.handle_window_events(&event) {
            return;
        }

        match event {
            // The next frame re-reads the display size.
            WindowEvent::Resized(_) => state.ctx.window().request_redraw(),
            WindowEvent::RedrawRequested => match state.render() {
                LoopControl::Continue => state.ctx.window().request_redraw(),
                LoopControl::Stop => event_loop.exit(),
            },
            _ => {}
        }
    }
}

/// Opens the window and renders the scene described by `config` until it is closed.
pub fn run(config: SceneConfig) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<FlowEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config)?;

    event_loop.run_app(&mut app)?;

    match app.startup_error.take() {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
