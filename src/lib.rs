//! Batched 2D WebGL renderer with a scrolling, following, effect-driven
//! camera.
//!
//! The [`renderer::Renderer`] owns a [`gl::GlContext`], mirrors every bit of
//! bound GPU state and routes draws through named pipelines. Cameras turn a
//! scene's display list into per-viewport draw passes; [`scene::render_scene`]
//! drives one whole frame.

pub mod camera;
pub mod color;
pub mod config;
pub mod ease;
pub mod error;
pub mod gameobject;
pub mod geometry;
pub mod gl;
pub mod lights;
pub mod matrix;
pub mod renderer;
pub mod scene;

pub use camera::{Camera, CameraManager};
pub use color::Color;
pub use config::RendererConfig;
pub use error::{RenderError, Result};
pub use gameobject::{BitmapMask, Frame, Rectangle, Renderable, Sprite, Texture};
pub use lights::{Light, LightsManager};
pub use matrix::TransformMatrix;
pub use renderer::Renderer;
pub use scene::{render_scene, Scene};
