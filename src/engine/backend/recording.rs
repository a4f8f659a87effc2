//! In-memory [`GlBackend`] that records every call.
//!
//! Handles are plain `u32`s handed out from a counter. The backend keeps the
//! set of live objects and the current bindings so tests can assert on the
//! state a component leaves behind, not just on the call log.

use std::cell::{ Cell, RefCell };
use std::collections::{ HashMap, HashSet };

use super::GlBackend;

#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    CreateShader(u32, u32),
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    AttachShader(u32, u32),
    DetachShader(u32, u32),
    LinkProgram(u32),
    UseProgram(Option<u32>),
    DeleteProgram(u32),
    CreateBuffer(u32),
    BindBuffer(u32, Option<u32>),
    BufferData { target: u32, len: usize },
    DeleteBuffer(u32),
    CreateVertexArray(u32),
    BindVertexArray(Option<u32>),
    DeleteVertexArray(u32),
    VertexAttribPointer { index: u32, size: i32, stride: i32, offset: i32 },
    EnableVertexAttribArray(u32),
    DisableVertexAttribArray(u32),
    CreateTexture(u32),
    ActiveTexture(u32),
    BindTexture(u32, Option<u32>),
    PixelStore(u32, i32),
    TexParameter(u32, i32),
    TexImage2d { internal_format: i32, width: i32, height: i32, format: u32, len: usize },
    GenerateMipmap(u32),
    DeleteTexture(u32),
    GetUniformLocation(String),
    UniformMatrix4 { location: u32, transpose: bool, values: Vec<f32> },
    Uniform1i { location: u32, value: i32 },
    Enable(u32),
    ClearColor([f32; 4]),
    Clear(u32),
    DrawElements { mode: u32, count: i32, element_type: u32 },
}

#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: RefCell<Vec<GlCall>>,
    next_handle: Cell<u32>,
    live: RefCell<HashSet<u32>>,
    double_deletes: Cell<usize>,
    bound_vertex_array: Cell<Option<u32>>,
    bound_array_buffer: Cell<Option<u32>>,
    bound_texture: Cell<Option<u32>>,
    shader_types: RefCell<HashMap<u32, u32>>,
    /// Shader stage (e.g. `glow::FRAGMENT_SHADER`) whose compilation fails.
    pub failing_stage: Cell<Option<u32>>,
    pub fail_link: Cell<bool>,
    /// Uniform names the linked program exposes.
    pub active_uniforms: RefCell<Vec<String>>,
    uniform_locations: RefCell<HashMap<String, u32>>,
}

impl RecordingBackend {
    /// Backend whose programs expose the cube shader's uniforms.
    pub fn new() -> Self {
        let backend = Self::default();
        backend.active_uniforms.replace(vec!["mvp".to_string(), "uTexture".to_string()]);
        backend
    }

    pub fn calls(&self) -> Vec<GlCall> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn live_objects(&self) -> usize {
        self.live.borrow().len()
    }

    pub fn double_deletes(&self) -> usize {
        self.double_deletes.get()
    }

    pub fn bound_vertex_array(&self) -> Option<u32> {
        self.bound_vertex_array.get()
    }

    pub fn bound_array_buffer(&self) -> Option<u32> {
        self.bound_array_buffer.get()
    }

    pub fn bound_texture(&self) -> Option<u32> {
        self.bound_texture.get()
    }

    fn record(&self, call: GlCall) {
        self.calls.borrow_mut().push(call);
    }

    fn allocate(&self) -> u32 {
        let handle = self.next_handle.get() + 1;
        self.next_handle.set(handle);
        self.live.borrow_mut().insert(handle);
        handle
    }

    fn release(&self, handle: u32) {
        if !self.live.borrow_mut().remove(&handle) {
            self.double_deletes.set(self.double_deletes.get() + 1);
        }
    }
}

impl GlBackend for RecordingBackend {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type VertexArray = u32;
    type Texture = u32;
    type UniformLocation = u32;

    fn create_shader(&self, shader_type: u32) -> Result<u32, String> {
        let shader = self.allocate();
        self.shader_types.borrow_mut().insert(shader, shader_type);
        self.record(GlCall::CreateShader(shader_type, shader));
        Ok(shader)
    }

    fn shader_source(&self, _shader: u32, _source: &str) {}

    fn compile_shader(&self, shader: u32) {
        self.record(GlCall::CompileShader(shader));
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        let stage = self.shader_types.borrow().get(&shader).copied();
        match self.failing_stage.get() {
            Some(failing) => stage != Some(failing),
            None => true,
        }
    }

    fn shader_info_log(&self, _shader: u32) -> String {
        format!("0:1(1): error: syntax error{}", " ".repeat(2048))
    }

    fn delete_shader(&self, shader: u32) {
        self.release(shader);
        self.record(GlCall::DeleteShader(shader));
    }

    fn create_program(&self) -> Result<u32, String> {
        let program = self.allocate();
        self.record(GlCall::CreateProgram(program));
        Ok(program)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        self.record(GlCall::AttachShader(program, shader));
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        self.record(GlCall::DetachShader(program, shader));
    }

    fn link_program(&self, program: u32) {
        self.record(GlCall::LinkProgram(program));
    }

    fn program_link_status(&self, _program: u32) -> bool {
        !self.fail_link.get()
    }

    fn program_info_log(&self, _program: u32) -> String {
        "error: unresolved varying vTex".to_string()
    }

    fn use_program(&self, program: Option<u32>) {
        self.record(GlCall::UseProgram(program));
    }

    fn delete_program(&self, program: u32) {
        self.release(program);
        self.record(GlCall::DeleteProgram(program));
    }

    fn create_buffer(&self) -> Result<u32, String> {
        let buffer = self.allocate();
        self.record(GlCall::CreateBuffer(buffer));
        Ok(buffer)
    }

    fn bind_buffer(&self, target: u32, buffer: Option<u32>) {
        if target == glow::ARRAY_BUFFER {
            self.bound_array_buffer.set(buffer);
        }
        self.record(GlCall::BindBuffer(target, buffer));
    }

    fn buffer_data(&self, target: u32, data: &[u8], _usage: u32) {
        self.record(GlCall::BufferData { target, len: data.len() });
    }

    fn delete_buffer(&self, buffer: u32) {
        self.release(buffer);
        self.record(GlCall::DeleteBuffer(buffer));
    }

    fn create_vertex_array(&self) -> Result<u32, String> {
        let vertex_array = self.allocate();
        self.record(GlCall::CreateVertexArray(vertex_array));
        Ok(vertex_array)
    }

    fn bind_vertex_array(&self, vertex_array: Option<u32>) {
        self.bound_vertex_array.set(vertex_array);
        self.record(GlCall::BindVertexArray(vertex_array));
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        self.release(vertex_array);
        self.record(GlCall::DeleteVertexArray(vertex_array));
    }

    fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        size: i32,
        _data_type: u32,
        _normalized: bool,
        stride: i32,
        offset: i32
    ) {
        self.record(GlCall::VertexAttribPointer { index, size, stride, offset });
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.record(GlCall::EnableVertexAttribArray(index));
    }

    fn disable_vertex_attrib_array(&self, index: u32) {
        self.record(GlCall::DisableVertexAttribArray(index));
    }

    fn create_texture(&self) -> Result<u32, String> {
        let texture = self.allocate();
        self.record(GlCall::CreateTexture(texture));
        Ok(texture)
    }

    fn active_texture(&self, unit: u32) {
        self.record(GlCall::ActiveTexture(unit));
    }

    fn bind_texture(&self, target: u32, texture: Option<u32>) {
        self.bound_texture.set(texture);
        self.record(GlCall::BindTexture(target, texture));
    }

    fn pixel_store_i32(&self, parameter: u32, value: i32) {
        self.record(GlCall::PixelStore(parameter, value));
    }

    fn tex_parameter_i32(&self, _target: u32, parameter: u32, value: i32) {
        self.record(GlCall::TexParameter(parameter, value));
    }

    fn tex_image_2d(
        &self,
        _target: u32,
        _level: i32,
        internal_format: i32,
        width: i32,
        height: i32,
        format: u32,
        _ty: u32,
        pixels: &[u8]
    ) {
        self.record(GlCall::TexImage2d {
            internal_format,
            width,
            height,
            format,
            len: pixels.len(),
        });
    }

    fn generate_mipmap(&self, target: u32) {
        self.record(GlCall::GenerateMipmap(target));
    }

    fn delete_texture(&self, texture: u32) {
        self.release(texture);
        self.record(GlCall::DeleteTexture(texture));
    }

    fn get_uniform_location(&self, _program: u32, name: &str) -> Option<u32> {
        self.record(GlCall::GetUniformLocation(name.to_string()));
        if !self.active_uniforms.borrow().iter().any(|uniform| uniform == name) {
            return None;
        }
        let mut locations = self.uniform_locations.borrow_mut();
        let next = locations.len() as u32;
        Some(*locations.entry(name.to_string()).or_insert(next))
    }

    fn uniform_matrix_4_f32(&self, location: &u32, transpose: bool, values: &[f32]) {
        self.record(GlCall::UniformMatrix4 {
            location: *location,
            transpose,
            values: values.to_vec(),
        });
    }

    fn uniform_1_i32(&self, location: &u32, value: i32) {
        self.record(GlCall::Uniform1i { location: *location, value });
    }

    fn enable(&self, capability: u32) {
        self.record(GlCall::Enable(capability));
    }

    fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32) {
        self.record(GlCall::ClearColor([red, green, blue, alpha]));
    }

    fn clear(&self, mask: u32) {
        self.record(GlCall::Clear(mask));
    }

    fn draw_elements(&self, mode: u32, count: i32, element_type: u32, _offset: i32) {
        self.record(GlCall::DrawElements { mode, count, element_type });
    }
}
