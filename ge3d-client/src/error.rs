//! Error type shared by the whole client.

use std::path::PathBuf;

use ge3d_core::config::ConfigError;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    /// SDL, window or GL context creation failed.
    #[error("Window error: {0}")]
    Window(String),

    /// A GL object could not be created.
    #[error("OpenGL error: {0}")]
    GlLoad(String),

    #[error("Failed to compile {stage} shader: {log}")]
    ShaderBuild { stage: &'static str, log: String },

    #[error("Failed to link shader program: {0}")]
    ShaderLink(String),

    /// A model, image or cubemap face could not be read or decoded.
    #[error("Failed to load {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Logger error: {0}")]
    Logger(#[from] log::SetLoggerError),
}

impl EngineError {
    pub(crate) fn load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Load {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
