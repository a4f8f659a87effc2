pub mod camera;
pub mod mesh;
pub mod shader_program;
pub mod texture;
pub mod transform;

pub use camera::Camera;
pub use mesh::{ Mesh, MeshData };
pub use shader_program::ShaderProgram;
pub use texture::{ DecodedImage, Texture };
pub use transform::Transform;
