use std::num::NonZeroU32;
use std::panic::AssertUnwindSafe;
use std::rc::Rc;
use std::time::{ Duration, Instant };

use glutin::config::{ Config, ConfigTemplateBuilder };
use glutin::context::{ ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version };
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{ Surface as GlutinSurface, SurfaceAttributesBuilder, SwapInterval, WindowSurface };
use glutin_winit::DisplayBuilder;
use raw_window_handle::HasWindowHandle;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ ActiveEventLoop, EventLoop };
use winit::keyboard::KeyCode;
use winit::platform::pump_events::{ EventLoopExtPumpEvents, PumpStatus };
use winit::window::{ Window, WindowId };

use crate::engine::backend::GlBackend;
use crate::engine::config::WindowConfig;
use crate::engine::error::{ RenderError, Result };
use crate::engine::systems::keyboard_input_system::KeyboardInputSystem;

/// Pumps allowed for the platform to deliver `resumed` during start-up.
const MAX_INIT_PUMPS: usize = 100;

fn init_error(err: impl std::fmt::Display) -> RenderError {
    RenderError::Init(err.to_string())
}

/// Unwind payload raised by [`pick_config`] when the display offers nothing.
struct NoMatchingConfig;

/// The candidate with the most MSAA samples; the first one wins ties.
fn most_samples<C>(configs: impl Iterator<Item = C>, samples: impl Fn(&C) -> u8) -> Option<C> {
    configs.reduce(|best, config| if samples(&config) > samples(&best) { config } else { best })
}

fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    match most_samples(configs, |config| config.num_samples()) {
        Some(config) => config,
        // glutin-winit requires a config back; `catch_missing_config` turns this into an error
        None => std::panic::resume_unwind(Box::new(NoMatchingConfig)),
    }
}

/// Runs `build`, mapping an empty config list from [`pick_config`] to [`RenderError::Init`].
/// Any other panic keeps unwinding.
fn catch_missing_config<T>(build: impl FnOnce() -> T) -> Result<T> {
    match std::panic::catch_unwind(AssertUnwindSafe(build)) {
        Ok(value) => Ok(value),
        Err(payload) if payload.is::<NoMatchingConfig>() => {
            Err(RenderError::Init("no GL config matches the requested 24-bit depth buffer".to_string()))
        }
        Err(payload) => std::panic::resume_unwind(payload),
    }
}

/// Enables depth testing and sets the transparent black clear colour.
fn prepare_context<G: GlBackend>(gl: &G) {
    gl.enable(glow::DEPTH_TEST);
    gl.clear_color(0.0, 0.0, 0.0, 0.0);
}

fn clear_frame<G: GlBackend>(gl: &G) {
    gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
}

/// Window-side state driven by the event loop.
///
/// Fields drop top to bottom: the GL surface goes before the context that
/// renders into it, and the context before its window. `gl` is only parked
/// here until [`Surface::init`] takes it.
struct SurfaceState {
    settings: WindowConfig,
    gl: Option<Rc<glow::Context>>,
    gl_surface: Option<GlutinSurface<WindowSurface>>,
    gl_context: Option<PossiblyCurrentContext>,
    window: Option<Window>,
    keyboard: KeyboardInputSystem,
    init_error: Option<RenderError>,
    close_requested: bool,
}

impl SurfaceState {
    fn new(settings: WindowConfig) -> Self {
        Self {
            settings,
            gl: None,
            gl_surface: None,
            gl_context: None,
            window: None,
            keyboard: KeyboardInputSystem::new(),
            init_error: None,
            close_requested: false,
        }
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let (width, height) = (self.settings.width, self.settings.height);
        let attributes = Window::default_attributes()
            .with_title(self.settings.title.as_str())
            .with_inner_size(PhysicalSize::new(width, height))
            .with_visible(false)
            .with_resizable(false);

        let template = ConfigTemplateBuilder::new().with_depth_size(24);
        let (window, gl_config) = catch_missing_config(|| {
            DisplayBuilder::new().with_window_attributes(Some(attributes)).build(event_loop, template, pick_config)
        })?.map_err(init_error)?;
        let window = window.ok_or_else(|| RenderError::Init("window creation returned a null handle".to_string()))?;
        let raw_handle = window.window_handle().map_err(init_error)?.as_raw();

        let display = gl_config.display();
        let context_attributes = ContextAttributesBuilder::new()
            .with_profile(GlProfile::Core)
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .build(Some(raw_handle));
        let not_current = unsafe { display.create_context(&gl_config, &context_attributes) }.map_err(init_error)?;

        let surface_width = NonZeroU32::new(width).ok_or_else(|| init_error("surface width must be non-zero"))?;
        let surface_height = NonZeroU32::new(height).ok_or_else(|| init_error("surface height must be non-zero"))?;
        let surface_attributes = SurfaceAttributesBuilder::<WindowSurface>::new().build(
            raw_handle,
            surface_width,
            surface_height
        );
        let gl_surface = unsafe { display.create_window_surface(&gl_config, &surface_attributes) }.map_err(init_error)?;
        let gl_context = not_current.make_current(&gl_surface).map_err(init_error)?;

        if self.settings.vsync {
            if let Err(e) = gl_surface.set_swap_interval(&gl_context, SwapInterval::Wait(NonZeroU32::MIN)) {
                log::warn!("could not enable vsync: {}", e);
            }
        }
        window.set_visible(true);

        let gl = unsafe { glow::Context::from_loader_function_cstr(|symbol| display.get_proc_address(symbol)) };
        log::info!(
            "created {}x{} surface \"{}\" with OpenGL {:?}",
            width,
            height,
            self.settings.title,
            glow::HasContext::version(&gl)
        );

        prepare_context(&gl);

        self.gl = Some(Rc::new(gl));
        self.gl_surface = Some(gl_surface);
        self.gl_context = Some(gl_context);
        self.window = Some(window);
        Ok(())
    }
}

impl ApplicationHandler for SurfaceState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.init_error.is_some() {
            return;
        }
        if let Err(e) = self.create_window(event_loop) {
            self.init_error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::debug!("close requested by the window system");
                self.close_requested = true;
            }
            WindowEvent::KeyboardInput { event, .. } => self.keyboard.receive_key_event(&event),
            WindowEvent::Focused(false) => self.keyboard.clear(),
            _ => {}
        }
    }
}

/// The window, its current GL context and the keyboard feeding the frame loop.
///
/// Field order is drop order: the window and context are released before the
/// event loop that created them.
pub struct Surface {
    state: SurfaceState,
    gl: Rc<glow::Context>,
    event_loop: EventLoop<()>,
    start: Instant,
}

impl Surface {
    /// Opens the window, makes a GL 3.3 core context current and enables depth testing.
    pub fn init(settings: &WindowConfig) -> Result<Self> {
        let mut event_loop = build_event_loop()?;
        let mut state = SurfaceState::new(settings.clone());

        for _ in 0..MAX_INIT_PUMPS {
            let status = event_loop.pump_app_events(Some(Duration::ZERO), &mut state);
            if let Some(err) = state.init_error.take() {
                return Err(err);
            }
            if state.gl.is_some() {
                break;
            }
            if let PumpStatus::Exit(code) = status {
                return Err(RenderError::Init(format!("event loop exited during start-up (code {})", code)));
            }
        }
        let gl = match state.gl.take() {
            Some(gl) => gl,
            None => {
                return Err(RenderError::Init("the platform never resumed the application".to_string()));
            }
        };

        Ok(Self { state, gl, event_loop, start: Instant::now() })
    }

    /// The context every component draws with.
    pub fn gl(&self) -> Rc<glow::Context> {
        Rc::clone(&self.gl)
    }

    pub fn clear(&self) {
        clear_frame(self.gl.as_ref());
    }

    /// Presents the back buffer.
    pub fn swap(&self) -> Result<()> {
        match (&self.state.gl_surface, &self.state.gl_context) {
            (Some(surface), Some(context)) => surface
                .swap_buffers(context)
                .map_err(|e| RenderError::Present(e.to_string())),
            _ => Err(RenderError::Present("surface has no GL context".to_string())),
        }
    }

    /// Drains pending window and input events without blocking.
    pub fn poll(&mut self) {
        let status = self.event_loop.pump_app_events(Some(Duration::ZERO), &mut self.state);
        if let PumpStatus::Exit(code) = status {
            log::debug!("event loop exited with code {}", code);
            self.state.close_requested = true;
        }
    }

    pub fn should_close(&self) -> bool {
        self.state.close_requested
    }

    pub fn close(&mut self) {
        self.state.close_requested = true;
    }

    pub fn key_down(&self, key: KeyCode) -> bool {
        self.state.keyboard.is_down(key)
    }

    /// Seconds since the surface was created.
    pub fn time(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }

    pub fn size(&self) -> (u32, u32) {
        (self.state.settings.width, self.state.settings.height)
    }
}

fn build_event_loop() -> Result<EventLoop<()>> {
    #[allow(unused_mut)]
    let mut builder = EventLoop::builder();
    // the test harness drives the loop from a worker thread
    #[cfg(all(feature = "integration-tests", target_os = "linux"))]
    winit::platform::x11::EventLoopBuilderExtX11::with_any_thread(&mut builder, true);
    builder.build().map_err(init_error)
}
