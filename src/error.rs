use thiserror::Error;

use crate::gl::{FramebufferStatus, ShaderStage};

/// Everything that can go wrong while creating or driving the renderer.
///
/// Construction-time failures (no context, broken shaders, incomplete
/// framebuffers) are fatal and bubble up to the embedding application.
/// Context loss is the only runtime condition the renderer recovers from.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("WebGL context is unavailable")]
    ContextUnavailable,

    #[error("WebGL context was lost")]
    ContextLost,

    #[error("failed to create {0}")]
    ResourceCreation(&'static str),

    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    #[error("shader program failed to link: {0}")]
    ProgramLink(String),

    #[error("framebuffer incomplete: {0:?}")]
    FramebufferIncomplete(FramebufferStatus),

    #[error("invalid renderer config: {0}")]
    InvalidConfig(String),

    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("snapshot encoding failed: {0}")]
    Snapshot(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, RenderError>;
