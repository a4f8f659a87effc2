use winit::keyboard::KeyCode;

use crate::engine::components::camera::Camera;
use crate::engine::config::ControlsConfig;

/// Maps held keys onto camera motion, scaled by the frame delta.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraController {
    /// World units per second.
    move_speed: f32,
    /// Degrees of yaw per second.
    rotation_speed: f32,
}

impl CameraController {
    pub fn new(move_speed: f32, rotation_speed: f32) -> Self {
        Self { move_speed, rotation_speed }
    }

    pub fn from_config(controls: &ControlsConfig) -> Self {
        Self::new(controls.move_speed, controls.rotation_speed)
    }

    /// Applies one frame of input to `camera` and returns `true` when ESC asks to close.
    ///
    /// Every held key contributes its own step, so opposite keys cancel out.
    /// The view matrix is left for the caller to rebuild.
    pub fn update(&self, camera: &mut Camera, is_down: impl Fn(KeyCode) -> bool, dt: f32) -> bool {
        let step = self.move_speed * dt;
        let turn = self.rotation_speed * dt;

        if is_down(KeyCode::KeyW) {
            camera.move_position(0.0, 0.0, step);
        }
        if is_down(KeyCode::KeyS) {
            camera.move_position(0.0, 0.0, -step);
        }
        if is_down(KeyCode::KeyA) {
            camera.move_position(-step, 0.0, 0.0);
        }
        if is_down(KeyCode::KeyD) {
            camera.move_position(step, 0.0, 0.0);
        }
        if is_down(KeyCode::Space) {
            camera.move_position(0.0, step, 0.0);
        }
        if is_down(KeyCode::ShiftLeft) {
            camera.move_position(0.0, -step, 0.0);
        }

        if is_down(KeyCode::KeyQ) {
            camera.process_rotation(-turn, 0.0, true);
        }
        if is_down(KeyCode::KeyE) {
            camera.process_rotation(turn, 0.0, true);
        }

        is_down(KeyCode::Escape)
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::from_config(&ControlsConfig::default())
    }
}
