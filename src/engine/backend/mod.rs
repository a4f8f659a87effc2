//! The slice of OpenGL the renderer talks to.
//!
//! [`GlBackend`] mirrors the shape of glow's `HasContext`: associated handle
//! types plus one method per GL entry point. Components are generic over it so
//! the same code drives a real `glow::Context` and the recording backend used
//! by unit tests.

mod glow_backend;
#[cfg(test)]
pub(crate) mod recording;

use std::fmt::Debug;
use std::hash::Hash;

/// GPU state machine used by every component.
///
/// Implementors assume the GL context is current on the calling thread; the
/// [`Surface`](crate::engine::platform::Surface) makes it current before any
/// component is built and keeps it current until teardown.
pub trait GlBackend {
    type Shader: Copy + Debug + PartialEq;
    type Program: Copy + Debug + PartialEq;
    type Buffer: Copy + Debug + PartialEq + Eq + Hash;
    type VertexArray: Copy + Debug + PartialEq;
    type Texture: Copy + Debug + PartialEq;
    type UniformLocation: Clone + Debug;

    // shaders and programs
    fn create_shader(&self, shader_type: u32) -> Result<Self::Shader, String>;
    fn shader_source(&self, shader: Self::Shader, source: &str);
    fn compile_shader(&self, shader: Self::Shader);
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);
    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program);
    fn program_link_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn use_program(&self, program: Option<Self::Program>);
    fn delete_program(&self, program: Self::Program);

    // buffers and vertex arrays
    fn create_buffer(&self) -> Result<Self::Buffer, String>;
    fn bind_buffer(&self, target: u32, buffer: Option<Self::Buffer>);
    fn buffer_data(&self, target: u32, data: &[u8], usage: u32);
    fn delete_buffer(&self, buffer: Self::Buffer);
    fn create_vertex_array(&self) -> Result<Self::VertexArray, String>;
    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>);
    fn delete_vertex_array(&self, vertex_array: Self::VertexArray);
    fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32
    );
    fn enable_vertex_attrib_array(&self, index: u32);
    fn disable_vertex_attrib_array(&self, index: u32);

    // textures
    fn create_texture(&self) -> Result<Self::Texture, String>;
    fn active_texture(&self, unit: u32);
    fn bind_texture(&self, target: u32, texture: Option<Self::Texture>);
    fn pixel_store_i32(&self, parameter: u32, value: i32);
    fn tex_parameter_i32(&self, target: u32, parameter: u32, value: i32);
    #[allow(clippy::too_many_arguments)]
    fn tex_image_2d(
        &self,
        target: u32,
        level: i32,
        internal_format: i32,
        width: i32,
        height: i32,
        format: u32,
        ty: u32,
        pixels: &[u8]
    );
    fn generate_mipmap(&self, target: u32);
    fn delete_texture(&self, texture: Self::Texture);

    // uniforms
    fn get_uniform_location(&self, program: Self::Program, name: &str) -> Option<Self::UniformLocation>;
    fn uniform_matrix_4_f32(&self, location: &Self::UniformLocation, transpose: bool, values: &[f32]);
    fn uniform_1_i32(&self, location: &Self::UniformLocation, value: i32);

    // framebuffer and draw
    fn enable(&self, capability: u32);
    fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32);
    fn clear(&self, mask: u32);
    fn draw_elements(&self, mode: u32, count: i32, element_type: u32, offset: i32);
}

/// Bytes `tex_image_2d` reads for a tightly packed (unpack alignment 1)
/// 8-bit image, or `None` for formats the renderer never uploads.
pub fn packed_image_len(width: i32, height: i32, format: u32) -> Option<usize> {
    let channels = match format {
        glow::RGB => 3,
        glow::RGBA => 4,
        _ => {
            return None;
        }
    };
    let width = usize::try_from(width).ok()?;
    let height = usize::try_from(height).ok()?;
    width.checked_mul(height)?.checked_mul(channels)
}
