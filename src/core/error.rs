//! Error types for the demo

use thiserror::Error;

/// Main error type for the demo
#[derive(Debug, Error)]
pub enum Error {
    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("Window error: {0}")]
    Window(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("invalid terrain dimensions {width}x{height} (need at least 2x2)")]
    InvalidDimension { width: usize, height: usize },
}
