use glam::Mat4;

/// Radians of spin per second about each axis.
pub const SPIN_RATE: f32 = 0.5;

/// Model matrix of the rendered object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    model: Mat4,
}

impl Transform {
    pub fn identity() -> Self {
        Self { model: Mat4::IDENTITY }
    }

    pub fn reset(&mut self) -> &mut Self {
        self.model = Mat4::IDENTITY;
        self
    }

    /// Post-multiplies a rotation about the local Y axis.
    pub fn rotate_y(&mut self, angle: f32) -> &mut Self {
        self.model *= Mat4::from_rotation_y(angle);
        self
    }

    /// Post-multiplies a rotation about the local X axis.
    pub fn rotate_x(&mut self, angle: f32) -> &mut Self {
        self.model *= Mat4::from_rotation_x(angle);
        self
    }

    /// Sets the tumbling pose for `seconds` since start-up: yaw first, then pitch.
    pub fn spin(&mut self, seconds: f32) {
        self.reset().rotate_y(seconds * SPIN_RATE).rotate_x(seconds * SPIN_RATE);
    }

    pub fn matrix(&self) -> Mat4 {
        self.model
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
