pub mod backend;
pub mod components;
pub mod config;
pub mod error;
pub mod platform;
pub mod systems;

pub use backend::GlBackend;
pub use components::*;
pub use config::AppConfig;
pub use error::{ RenderError, Result };
pub use platform::Surface;
pub use systems::*;
