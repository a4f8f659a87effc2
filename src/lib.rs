//! A small OpenGL renderer: one textured cube tumbling in front of a
//! first-person fly camera.

pub mod app;
pub mod engine;

pub use app::{ run, Application, Scene };
