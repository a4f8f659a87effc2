use std::cell::RefCell;
use std::collections::{ HashMap, HashSet };
use std::rc::Rc;

use glam::Mat4;

use crate::engine::backend::GlBackend;
use crate::engine::error::{ truncate_info_log, RenderError, Result };

pub const MVP_UNIFORM: &str = "mvp";
pub const TEXTURE_UNIFORM: &str = "uTexture";

const VERTEX_SHADER_SOURCE: &str = include_str!("../assets/shaders/cube.vert.glsl");
const FRAGMENT_SHADER_SOURCE: &str = include_str!("../assets/shaders/cube.frag.glsl");

/// Uniforms resolved once after linking.
const KNOWN_UNIFORMS: [&str; 2] = [MVP_UNIFORM, TEXTURE_UNIFORM];

fn stage_name(shader_type: u32) -> &'static str {
    match shader_type {
        glow::VERTEX_SHADER => "vertex",
        glow::FRAGMENT_SHADER => "fragment",
        _ => "unknown",
    }
}

fn compile_shader<G: GlBackend>(gl: &G, shader_type: u32, source: &str) -> Result<G::Shader> {
    let shader = gl.create_shader(shader_type).map_err(RenderError::Shader)?;
    gl.shader_source(shader, source);
    gl.compile_shader(shader);

    if !gl.shader_compile_status(shader) {
        let log = gl.shader_info_log(shader);
        let log = truncate_info_log(&log);
        log::error!("{} shader failed to compile:\n{}", stage_name(shader_type), log);
        gl.delete_shader(shader);
        return Err(RenderError::Shader(format!("{} shader compile error: {}", stage_name(shader_type), log)));
    }
    Ok(shader)
}

fn link_program<G: GlBackend>(gl: &G, vertex: G::Shader, fragment: G::Shader) -> Result<G::Program> {
    let program = gl.create_program().map_err(RenderError::Shader)?;
    gl.attach_shader(program, vertex);
    gl.attach_shader(program, fragment);
    gl.link_program(program);

    let linked = gl.program_link_status(program);
    let log = if linked { String::new() } else { gl.program_info_log(program) };

    gl.detach_shader(program, vertex);
    gl.detach_shader(program, fragment);

    if !linked {
        let log = truncate_info_log(&log);
        log::error!("shader program failed to link:\n{}", log);
        gl.delete_program(program);
        return Err(RenderError::Shader(format!("program link error: {}", log)));
    }
    Ok(program)
}

/// The cube's linked vertex + fragment program and its uniform table.
pub struct ShaderProgram<G: GlBackend> {
    gl: Rc<G>,
    program: Option<G::Program>,
    /// `None` marks a uniform the linker dropped or never saw.
    uniforms: HashMap<String, Option<G::UniformLocation>>,
    warned: RefCell<HashSet<String>>,
}

impl<G: GlBackend> ShaderProgram<G> {
    /// Compiles and links the embedded cube shaders.
    pub fn new(gl: Rc<G>) -> Result<Self> {
        Self::from_sources(gl, VERTEX_SHADER_SOURCE, FRAGMENT_SHADER_SOURCE)
    }

    pub fn from_sources(gl: Rc<G>, vertex_source: &str, fragment_source: &str) -> Result<Self> {
        let vertex = compile_shader(gl.as_ref(), glow::VERTEX_SHADER, vertex_source)?;
        let fragment = match compile_shader(gl.as_ref(), glow::FRAGMENT_SHADER, fragment_source) {
            Ok(fragment) => fragment,
            Err(e) => {
                gl.delete_shader(vertex);
                return Err(e);
            }
        };

        let linked = link_program(gl.as_ref(), vertex, fragment);
        gl.delete_shader(vertex);
        gl.delete_shader(fragment);
        let program = linked?;

        let uniforms = KNOWN_UNIFORMS.iter()
            .map(|&name| {
                let location = gl.get_uniform_location(program, name);
                if location.is_none() {
                    log::debug!("uniform `{}` is not active in the linked program", name);
                }
                (name.to_string(), location)
            })
            .collect();

        log::info!("shader program linked ({:?})", program);
        Ok(Self {
            gl,
            program: Some(program),
            uniforms,
            warned: RefCell::new(HashSet::new()),
        })
    }

    pub fn use_program(&self) {
        if let Some(program) = self.program {
            self.gl.use_program(Some(program));
        }
    }

    pub fn unuse(&self) {
        self.gl.use_program(None);
    }

    /// Resolved location for `name`, or `None` if the program has no such uniform.
    pub fn uniform_location(&self, name: &str) -> Option<&G::UniformLocation> {
        self.uniforms.get(name).and_then(Option::as_ref)
    }

    /// Uploads `matrix` column-major. Missing uniforms are skipped with a one-time warning.
    pub fn set_uniform_mat4(&self, name: &str, matrix: &Mat4) {
        if let Some(location) = self.resolved(name) {
            self.gl.uniform_matrix_4_f32(location, false, &matrix.to_cols_array());
        }
    }

    /// Points the sampler uniform `name` at texture `unit`.
    pub fn set_uniform_texture(&self, name: &str, unit: i32) {
        if let Some(location) = self.resolved(name) {
            self.gl.uniform_1_i32(location, unit);
        }
    }

    fn resolved(&self, name: &str) -> Option<&G::UniformLocation> {
        let location = self.uniform_location(name);
        if location.is_none() && self.warned.borrow_mut().insert(name.to_string()) {
            log::warn!("uniform `{}` is not present in the shader program; skipping upload", name);
        }
        location
    }

    pub fn cleanup(&mut self) {
        if let Some(program) = self.program.take() {
            self.gl.delete_program(program);
        }
    }
}

impl<G: GlBackend> Drop for ShaderProgram<G> {
    fn drop(&mut self) {
        self.cleanup();
    }
}
