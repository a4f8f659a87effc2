use glam::{ Mat4, Vec3 };

/// Pitch stays inside this many degrees of the horizon when constrained.
pub const PITCH_LIMIT: f32 = 89.0;
const SENSITIVITY: f32 = 1.0;
const WORLD_UP: Vec3 = Vec3::Y;

/// First-person fly camera driven by Euler angles (degrees).
///
/// `front` and `right` are always derived from `yaw`/`pitch`; the view matrix
/// is refreshed by [`update_view`](Self::update_view) so a frame's worth of
/// movement and rotation can be folded into a single rebuild.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec3,
    yaw: f32,
    pitch: f32,
    front: Vec3,
    right: Vec3,
    view: Mat4,
    projection: Mat4,
}

impl Camera {
    /// `fov` is the vertical field of view in radians.
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            yaw: -90.0,
            pitch: 0.0,
            front: Vec3::NEG_Z,
            right: Vec3::X,
            view: Mat4::IDENTITY,
            projection: Mat4::perspective_rh_gl(fov, aspect, near, far),
        };
        camera.update_vectors();
        camera.update_view();
        camera
    }

    /// Adds to yaw and pitch; with `constrain_pitch` the pitch is clamped to ±[`PITCH_LIMIT`].
    pub fn process_rotation(&mut self, yaw_offset: f32, pitch_offset: f32, constrain_pitch: bool) {
        self.yaw += yaw_offset * SENSITIVITY;
        self.pitch += pitch_offset * SENSITIVITY;

        if constrain_pitch {
            self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }

        self.update_vectors();
    }

    /// Moves along the local right (`dx`) and front (`dz`) axes and the world up axis (`dy`).
    pub fn move_position(&mut self, dx: f32, dy: f32, dz: f32) {
        self.position += self.right * dx + WORLD_UP * dy + self.front * dz;
    }

    pub fn update_view(&mut self) {
        self.view = Mat4::look_at_rh(self.position, self.position + self.front, WORLD_UP);
    }

    /// Projection times view, as a fresh value.
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalize();
        self.right = self.front.cross(WORLD_UP).normalize();
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        WORLD_UP
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }
}
