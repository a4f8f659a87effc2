use std::rc::Rc;
use std::time::{ Duration, Instant };

use glam::Mat4;

use crate::engine::backend::GlBackend;
use crate::engine::components::shader_program::{ MVP_UNIFORM, TEXTURE_UNIFORM };
use crate::engine::components::{ Camera, Mesh, ShaderProgram, Texture, Transform };
use crate::engine::config::AppConfig;
use crate::engine::error::Result;
use crate::engine::platform::Surface;
use crate::engine::systems::CameraController;

const FPS_LOG_INTERVAL: Duration = Duration::from_secs(5);

/// GPU resources and pose state for the tumbling cube.
///
/// Fields are declared in reverse construction order so that dropping a
/// scene releases the texture first and the mesh last.
pub struct Scene<G: GlBackend> {
    texture: Texture<G>,
    shader: ShaderProgram<G>,
    mesh: Mesh<G>,
    transform: Transform,
    camera: Camera,
}

impl<G: GlBackend> Scene<G> {
    /// Builds the cube and loads the configured texture from disk.
    pub fn new(gl: Rc<G>, config: &AppConfig) -> Result<Self> {
        let texture_path = config.texture_path();
        Self::with_texture(gl, config, |gl| Texture::load(gl, &texture_path))
    }

    /// Builds mesh, shader, transform and camera, then calls `load_texture`.
    ///
    /// Whatever was created before a failing step is released on return.
    pub fn with_texture(
        gl: Rc<G>,
        config: &AppConfig,
        load_texture: impl FnOnce(Rc<G>) -> Result<Texture<G>>
    ) -> Result<Self> {
        let mesh = Mesh::cube(Rc::clone(&gl))?;
        let shader = ShaderProgram::new(Rc::clone(&gl))?;
        let transform = Transform::identity();
        let camera = Camera::new(
            config.camera.fov_degrees.to_radians(),
            config.window.aspect_ratio(),
            config.camera.near,
            config.camera.far
        );
        let texture = load_texture(gl)?;

        Ok(Self { texture, shader, mesh, transform, camera })
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Poses the cube for `time` seconds and returns the matrix handed to the shader.
    pub fn update(&mut self, time: f32) -> Mat4 {
        self.camera.update_view();
        self.transform.spin(time);
        self.camera.view_projection() * self.transform.matrix()
    }

    /// Issues the draw: program, uniforms, texture, then the mesh.
    pub fn draw(&self, mvp: &Mat4) {
        self.shader.use_program();
        self.shader.set_uniform_mat4(MVP_UNIFORM, mvp);
        self.shader.set_uniform_texture(TEXTURE_UNIFORM, 0);
        self.texture.bind();
        self.mesh.render();
    }

    /// Releases GPU objects in reverse construction order. Idempotent.
    pub fn cleanup(&mut self) {
        self.texture.cleanup();
        self.shader.cleanup();
        self.mesh.cleanup();
    }
}

/// Counts frames and reports the average rate every few seconds.
struct FrameStats {
    frames: u32,
    since: Instant,
}

impl FrameStats {
    fn new() -> Self {
        Self { frames: 0, since: Instant::now() }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let elapsed = self.since.elapsed();
        if elapsed >= FPS_LOG_INTERVAL {
            log::debug!("{:.1} fps", (self.frames as f64) / elapsed.as_secs_f64());
            self.frames = 0;
            self.since = Instant::now();
        }
    }
}

/// Owns the surface and everything drawn on it.
///
/// `scene` is declared before `surface` so GPU objects are gone before the
/// context that owns them.
pub struct Application {
    scene: Scene<glow::Context>,
    controller: CameraController,
    last_frame: f32,
    stats: FrameStats,
    surface: Surface,
}

impl Application {
    pub fn init(config: &AppConfig) -> Result<Self> {
        let surface = Surface::init(&config.window)?;
        let scene = Scene::new(surface.gl(), config)?;
        log::info!("scene ready");

        Ok(Self {
            scene,
            controller: CameraController::from_config(&config.controls),
            last_frame: surface.time(),
            stats: FrameStats::new(),
            surface,
        })
    }

    /// Runs frames until the surface is asked to close.
    pub fn run_loop(&mut self) -> Result<()> {
        while !self.surface.should_close() {
            self.frame()?;
        }
        log::info!("close requested; leaving the frame loop");
        Ok(())
    }

    fn frame(&mut self) -> Result<()> {
        let now = self.surface.time();
        let dt = now - self.last_frame;
        self.last_frame = now;

        let surface = &self.surface;
        if self.controller.update(self.scene.camera_mut(), |key| surface.key_down(key), dt) {
            self.surface.close();
        }

        let mvp = self.scene.update(now);

        self.surface.clear();
        self.scene.draw(&mvp);
        self.surface.swap()?;
        self.surface.poll();

        self.stats.tick();
        Ok(())
    }

    pub fn cleanup(&mut self) {
        self.scene.cleanup();
        log::info!("released GPU resources");
    }
}

/// Opens the window, runs until closed and tears everything down.
pub fn run(config: &AppConfig) -> Result<()> {
    let mut app = Application::init(config)?;
    let result = app.run_loop();
    app.cleanup();
    result
}
