pub mod camera_controller;
pub mod keyboard_input_system;

pub use camera_controller::CameraController;
pub use keyboard_input_system::KeyboardInputSystem;
