//! Application event loop.
//!
//! [`run`] opens a window, builds the GPU [`Context`], hands it to a scene
//! constructor once and then drives the resulting [`Stage`] until the window is
//! closed or the quit key is pressed.
//!
//! # Lifecycle
//!
//! Each redraw:
//! 1. Measure the time since the previous frame
//! 2. `Scene::update(dt)`: node cascade, then engines
//! 3. `Scene::render(camera)` into a [`Frame`](crate::render::Frame)
//! 4. Encode the frame into the surface texture, submit and present
//! 5. Request the next redraw
//!
//! GPU validation errors raised while preparing ("before render") or encoding
//! ("after render") a frame are logged and do not stop the loop.

use std::{iter, sync::Arc};

use instant::Instant;
use log::{error, info, trace, warn};
use tokio::runtime::Runtime;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::PhysicalKey,
    window::Window,
};

use crate::{
    camera::Camera, config::Config, context::Context, data_structures::scene::Scene,
};

/// What the driver loop animates and draws: one scene seen through one camera.
pub struct Stage {
    pub scene: Scene,
    pub camera: Box<dyn Camera>,
}

impl Stage {
    pub fn new(scene: Scene, camera: impl Camera + 'static) -> Self {
        Self {
            scene,
            camera: Box::new(camera),
        }
    }
}

/// Builds the stage once the GPU context exists. Runs exactly once; an error
/// aborts startup.
pub type SceneConstructor = Box<dyn FnOnce(&mut Context) -> anyhow::Result<Stage>>;

/// Surface states after which the frame is dropped and the surface rebuilt.
enum SurfaceProblem {
    Reconfigure,
}

struct AppState {
    ctx: Context,
    stage: Stage,
    is_surface_configured: bool,
}

impl AppState {
    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.resize(width, height);
            self.is_surface_configured = true;
        }
    }

    fn render(&mut self, async_runtime: &Runtime, dt: f32) -> Result<(), SurfaceProblem> {
        // invoke main render loop
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        let before = self
            .ctx
            .gpu
            .device
            .push_error_scope(wgpu::ErrorFilter::Validation);
        self.stage.scene.update(dt);
        let frame = self.stage.scene.render(self.stage.camera.as_ref());
        let output = match self.ctx.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(output) => Some(output),
            wgpu::CurrentSurfaceTexture::Suboptimal(output) => {
                trace!("suboptimal surface texture");
                Some(output)
            }
            wgpu::CurrentSurfaceTexture::Timeout | wgpu::CurrentSurfaceTexture::Occluded => None,
            wgpu::CurrentSurfaceTexture::Validation => {
                warn!("surface texture could not be acquired");
                None
            }
            wgpu::CurrentSurfaceTexture::Outdated | wgpu::CurrentSurfaceTexture::Lost => {
                drop(before);
                return Err(SurfaceProblem::Reconfigure);
            }
        };
        report_errors(async_runtime, before.pop(), "before render");
        let Some(output) = output else {
            return Ok(());
        };

        let after = self
            .ctx
            .gpu
            .device
            .push_error_scope(wgpu::ErrorFilter::Validation);
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder: wgpu::CommandEncoder =
            self.ctx
                .gpu
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Render Encoder"),
                });
        let clear_colour = self.ctx.settings.clear_colour;
        self.ctx.gpu.encode(
            &mut encoder,
            &frame,
            &view,
            &self.ctx.depth_texture.view,
            clear_colour,
        );
        self.ctx.gpu.queue.submit(iter::once(encoder.finish()));
        self.ctx.window.pre_present_notify();
        output.present();
        report_errors(async_runtime, after.pop(), "after render");
        Ok(())
    }
}

fn report_errors(
    async_runtime: &Runtime,
    scope: impl Future<Output = Option<wgpu::Error>>,
    label: &str,
) {
    if let Some(err) = async_runtime.block_on(scope) {
        error!("GPU error {label}: {err}");
    }
}

pub struct App {
    async_runtime: Runtime,
    settings: Config,
    // Taken on the first `resumed`.
    constructor: Option<SceneConstructor>,
    state: Option<AppState>,
    last_time: Instant,
    failure: Option<anyhow::Error>,
}

impl App {
    fn new(settings: Config, constructor: SceneConstructor) -> anyhow::Result<Self> {
        Ok(Self {
            async_runtime: Runtime::new()?,
            settings,
            constructor: Some(constructor),
            state: None,
            last_time: Instant::now(),
            failure: None,
        })
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let Some(constructor) = self.constructor.take() else {
            return Ok(());
        };
        let window_attributes = Window::default_attributes()
            .with_title(self.settings.title.clone())
            .with_inner_size(PhysicalSize::new(self.settings.width, self.settings.height));
        let window = Arc::new(event_loop.create_window(window_attributes)?);

        let mut ctx = self.async_runtime.block_on(Context::new(
            window,
            self.settings.clone(),
            self.async_runtime.handle().clone(),
        ))?;
        // outside of `block_on`, so the constructor may block on asset loading
        let stage = constructor(&mut ctx)?;
        info!(
            "scene ready: {} nodes, {} engines",
            stage.scene.root().node_count(),
            stage.scene.engine_count()
        );

        let mut state = AppState {
            ctx,
            stage,
            is_surface_configured: false,
        };
        let size = state.ctx.window.inner_size();
        state.resize(size.width, size.height);
        state.ctx.window.request_redraw();
        self.state = Some(state);
        self.last_time = Instant::now();
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(e) = self.init(event_loop) {
            error!("App initialization failed: {e:#}");
            self.failure = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } if code == state.ctx.settings.quit_key => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed().as_secs_f32();
                self.last_time = Instant::now();

                match state.render(&self.async_runtime, dt) {
                    Ok(()) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(SurfaceProblem::Reconfigure) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Open a window and run `constructor`'s stage until the window closes.
///
/// Logging is initialised from `RUST_LOG`. Setup failures, including errors
/// returned by the constructor, end the loop and are returned.
pub fn run(
    config: Config,
    constructor: impl FnOnce(&mut Context) -> anyhow::Result<Stage> + 'static,
) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config, Box::new(constructor))?;

    event_loop.run_app(&mut app)?;

    match app.failure.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
