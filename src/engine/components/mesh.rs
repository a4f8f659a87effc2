use std::mem::size_of;
use std::rc::Rc;

use crate::engine::backend::GlBackend;
use crate::engine::error::{ RenderError, Result };

pub const POSITION_LOCATION: u32 = 0;
pub const COLOR_LOCATION: u32 = 1;
pub const TEX_COORD_LOCATION: u32 = 2;

/// Floats per vertex in the interleaved position + color stream.
pub const VERTEX_STRIDE: usize = 6;
const TEX_COORD_STRIDE: usize = 2;

/// CPU-side geometry ready to be uploaded by [`Mesh::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    /// Interleaved `[x, y, z, r, g, b]` per vertex.
    pub vertices: Vec<f32>,
    /// `[u, v]` per vertex.
    pub tex_coords: Vec<f32>,
    pub indices: Vec<u32>,
}

// outward normal, then the face's u and v axes (u x v == normal)
const CUBE_FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]), // back
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]), // front
    ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]), // left
    ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]), // right
    ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]), // top
    ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]), // bottom
];

const FACE_TEX_COORDS: [[f32; 2]; 4] = [
    [0.0, 0.0],
    [1.0, 0.0],
    [1.0, 1.0],
    [0.0, 1.0],
];

const WHITE: [f32; 3] = [1.0, 1.0, 1.0];

impl MeshData {
    /// Unit cube centred on the origin: 4 vertices per face so every face
    /// carries its own texture coordinates, two counter-clockwise triangles each.
    pub fn cube() -> Self {
        let mut vertices = Vec::with_capacity(CUBE_FACES.len() * 4 * VERTEX_STRIDE);
        let mut tex_coords = Vec::with_capacity(CUBE_FACES.len() * 4 * TEX_COORD_STRIDE);
        let mut indices = Vec::with_capacity(CUBE_FACES.len() * 6);

        for (face, (normal, u, v)) in CUBE_FACES.iter().enumerate() {
            for [s, t] in FACE_TEX_COORDS {
                // tex coords double as the corner's position on the face
                let (du, dv) = (s - 0.5, t - 0.5);
                for axis in 0..3 {
                    vertices.push(0.5 * normal[axis] + du * u[axis] + dv * v[axis]);
                }
                vertices.extend_from_slice(&WHITE);
                tex_coords.extend_from_slice(&[s, t]);
            }

            let base = (face * 4) as u32;
            indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }

        Self { vertices, tex_coords, indices }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / VERTEX_STRIDE
    }

    fn validate(&self) -> Result<()> {
        if self.indices.is_empty() || self.indices.len() % 3 != 0 {
            return Err(
                RenderError::InvalidMesh(
                    format!("index count {} is not a positive multiple of 3", self.indices.len())
                )
            );
        }
        if self.vertices.len() % VERTEX_STRIDE != 0 {
            return Err(
                RenderError::InvalidMesh(
                    format!("{} vertex floats do not split into position + color", self.vertices.len())
                )
            );
        }
        if self.tex_coords.len() / TEX_COORD_STRIDE != self.vertex_count() {
            return Err(
                RenderError::InvalidMesh(
                    format!(
                        "{} tex coords for {} vertices",
                        self.tex_coords.len() / TEX_COORD_STRIDE,
                        self.vertex_count()
                    )
                )
            );
        }
        if let Some(index) = self.indices.iter().find(|&&i| (i as usize) >= self.vertex_count()) {
            return Err(
                RenderError::InvalidMesh(
                    format!("index {} out of range for {} vertices", index, self.vertex_count())
                )
            );
        }
        Ok(())
    }
}

/// GPU-resident geometry: one vertex array, its vertex buffers and its index buffer.
pub struct Mesh<G: GlBackend> {
    gl: Rc<G>,
    vao: Option<G::VertexArray>,
    vertex_buffers: Vec<G::Buffer>,
    index_buffer: Option<G::Buffer>,
    index_count: i32,
}

impl<G: GlBackend> Mesh<G> {
    pub fn cube(gl: Rc<G>) -> Result<Self> {
        Self::new(gl, &MeshData::cube())
    }

    /// Uploads `data`. On return neither a vertex array nor an array buffer is bound.
    pub fn new(gl: Rc<G>, data: &MeshData) -> Result<Self> {
        data.validate()?;

        // Anything acquired below is released by Drop if a later step fails.
        let mut mesh = Self {
            gl: Rc::clone(&gl),
            vao: None,
            vertex_buffers: Vec::with_capacity(2),
            index_buffer: None,
            index_count: data.indices.len() as i32,
        };

        let vao = gl.create_vertex_array().map_err(RenderError::Allocation)?;
        mesh.vao = Some(vao);
        gl.bind_vertex_array(Some(vao));

        let float_size = size_of::<f32>() as i32;
        let position_color = mesh.upload_vertex_stream(&data.vertices)?;
        let stride = (VERTEX_STRIDE as i32) * float_size;
        gl.vertex_attrib_pointer_f32(POSITION_LOCATION, 3, glow::FLOAT, false, stride, 0);
        gl.enable_vertex_attrib_array(POSITION_LOCATION);
        gl.vertex_attrib_pointer_f32(COLOR_LOCATION, 3, glow::FLOAT, false, stride, 3 * float_size);
        gl.enable_vertex_attrib_array(COLOR_LOCATION);

        let tex_coords = mesh.upload_vertex_stream(&data.tex_coords)?;
        gl.vertex_attrib_pointer_f32(TEX_COORD_LOCATION, 2, glow::FLOAT, false, 0, 0);
        gl.enable_vertex_attrib_array(TEX_COORD_LOCATION);

        let ebo = gl.create_buffer().map_err(RenderError::Allocation)?;
        mesh.index_buffer = Some(ebo);
        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
        gl.buffer_data(
            glow::ELEMENT_ARRAY_BUFFER,
            bytemuck::cast_slice(&data.indices),
            glow::STATIC_DRAW
        );

        // The element buffer binding is part of the VAO, so only the array buffer is unbound.
        gl.bind_buffer(glow::ARRAY_BUFFER, None);
        gl.bind_vertex_array(None);

        log::debug!(
            "uploaded mesh: {} vertices, {} indices (buffers {:?}, {:?})",
            data.vertex_count(),
            mesh.index_count,
            position_color,
            tex_coords
        );
        Ok(mesh)
    }

    fn upload_vertex_stream(&mut self, floats: &[f32]) -> Result<G::Buffer> {
        let vbo = self.gl.create_buffer().map_err(RenderError::Allocation)?;
        self.vertex_buffers.push(vbo);
        self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        self.gl.buffer_data(glow::ARRAY_BUFFER, bytemuck::cast_slice(floats), glow::STATIC_DRAW);
        Ok(vbo)
    }

    /// Number of indices drawn per [`render`](Self::render).
    pub fn vertex_count(&self) -> i32 {
        self.index_count
    }

    pub fn render(&self) {
        let Some(vao) = self.vao else {
            log::warn!("render called on a released mesh");
            return;
        };
        self.gl.bind_vertex_array(Some(vao));
        self.gl.draw_elements(glow::TRIANGLES, self.index_count, glow::UNSIGNED_INT, 0);
        self.gl.bind_vertex_array(None);
    }

    /// Releases the GPU objects. Calling it again does nothing.
    pub fn cleanup(&mut self) {
        if self.vao.is_none() && self.vertex_buffers.is_empty() && self.index_buffer.is_none() {
            return;
        }

        // attribute enables live in the VAO
        if let Some(vao) = self.vao {
            self.gl.bind_vertex_array(Some(vao));
            for location in [POSITION_LOCATION, COLOR_LOCATION, TEX_COORD_LOCATION] {
                self.gl.disable_vertex_attrib_array(location);
            }
        }

        self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
        for vbo in self.vertex_buffers.drain(..) {
            self.gl.delete_buffer(vbo);
        }
        if let Some(ebo) = self.index_buffer.take() {
            self.gl.delete_buffer(ebo);
        }

        self.gl.bind_vertex_array(None);
        if let Some(vao) = self.vao.take() {
            self.gl.delete_vertex_array(vao);
        }
    }
}

impl<G: GlBackend> Drop for Mesh<G> {
    fn drop(&mut self) {
        self.cleanup();
    }
}
