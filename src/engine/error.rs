use std::path::PathBuf;

/// Longest info log carried by a [`RenderError::Shader`].
pub const MAX_INFO_LOG_BYTES: usize = 1024;

/// Fatal renderer errors. Each one aborts start-up or the frame loop; none is retried.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to initialise the drawing surface: {0}")]
    Init(String),
    #[error("shader error: {0}")]
    Shader(String),
    #[error("failed to load texture {}: {reason}", path.display())]
    Resource { path: PathBuf, reason: String },
    #[error("invalid image data: {0}")]
    InvalidImage(String),
    #[error("failed to create GPU object: {0}")]
    Allocation(String),
    #[error("invalid mesh data: {0}")]
    InvalidMesh(String),
    #[error("failed to present frame: {0}")]
    Present(String),
    #[error("invalid configuration {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, RenderError>;

/// Cuts a GL info log down to [`MAX_INFO_LOG_BYTES`] without splitting a character.
pub fn truncate_info_log(log: &str) -> &str {
    if log.len() <= MAX_INFO_LOG_BYTES {
        return log.trim_end();
    }
    let mut end = MAX_INFO_LOG_BYTES;
    while !log.is_char_boundary(end) {
        end -= 1;
    }
    log[..end].trim_end()
}
