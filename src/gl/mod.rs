// ── GPU context abstraction ───────────────────────────────────────────────────
//
// `GlContext` is the thin seam between the renderer and the actual WebGL 1
// API.  It mirrors the subset of GL calls the renderer issues, using opaque
// handle newtypes instead of JS objects so the renderer can be driven by the
// browser backend (`web`, wasm32 only) or by the recording `headless` backend
// used in tests and the demo binary.
//
// The renderer is the only caller that issues state-changing calls; it keeps
// its own cache of bound state and skips calls that would not change anything.

pub mod headless;
#[cfg(target_arch = "wasm32")]
pub mod web;

use std::fmt;

// ── Handles ───────────────────────────────────────────────────────────────────

macro_rules! handle {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $name(pub u32);
        )*
    };
}

handle! {
    /// A GPU texture object.
    TextureId,
    /// A linked shader program.
    ProgramId,
    ShaderId,
    /// A vertex or index buffer.
    BufferId,
    FramebufferId,
    RenderbufferId,
    /// A uniform location inside a specific program.
    UniformLocation,
}

// ── Enums ─────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    Blend,
    DepthTest,
    CullFace,
    ScissorTest,
    StencilTest,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstColor,
    OneMinusDstColor,
    DstAlpha,
    OneMinusDstAlpha,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendEquation {
    #[default]
    Add,
    Subtract,
    ReverseSubtract,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    Array,
    ElementArray,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    Static,
    Dynamic,
    Stream,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

/// Primitive assembly mode for `draw_arrays`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Topology {
    #[default]
    Triangles,
    TriangleStrip,
    Lines,
    Points,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextureFilter {
    #[default]
    Linear,
    Nearest,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextureWrap {
    #[default]
    ClampToEdge,
    Repeat,
    MirroredRepeat,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FramebufferStatus {
    Complete,
    IncompleteAttachment,
    MissingAttachment,
    IncompleteDimensions,
    Unsupported,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AttribType {
    Float,
    UnsignedByte,
}

impl AttribType {
    pub fn byte_size(self) -> u32 {
        match self {
            AttribType::Float => 4,
            AttribType::UnsignedByte => 1,
        }
    }
}

/// Which buffers `clear` touches.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ClearMask {
    pub color: bool,
    pub depth: bool,
    pub stencil: bool,
}

impl ClearMask {
    pub const COLOR: Self = Self { color: true, depth: false, stencil: false };
    pub const ALL: Self = Self { color: true, depth: true, stencil: true };
}

// ── GL enum values ────────────────────────────────────────────────────────────

/// Raw WebGL 1 enum values, used by the browser backend.
pub mod consts {
    pub const DEPTH_BUFFER_BIT: u32 = 0x0100;
    pub const STENCIL_BUFFER_BIT: u32 = 0x0400;
    pub const COLOR_BUFFER_BIT: u32 = 0x4000;

    pub const POINTS: u32 = 0x0000;
    pub const LINES: u32 = 0x0001;
    pub const TRIANGLES: u32 = 0x0004;
    pub const TRIANGLE_STRIP: u32 = 0x0005;

    pub const ZERO: u32 = 0;
    pub const ONE: u32 = 1;
    pub const SRC_COLOR: u32 = 0x0300;
    pub const ONE_MINUS_SRC_COLOR: u32 = 0x0301;
    pub const SRC_ALPHA: u32 = 0x0302;
    pub const ONE_MINUS_SRC_ALPHA: u32 = 0x0303;
    pub const DST_ALPHA: u32 = 0x0304;
    pub const ONE_MINUS_DST_ALPHA: u32 = 0x0305;
    pub const DST_COLOR: u32 = 0x0306;
    pub const ONE_MINUS_DST_COLOR: u32 = 0x0307;

    pub const FUNC_ADD: u32 = 0x8006;
    pub const FUNC_SUBTRACT: u32 = 0x800A;
    pub const FUNC_REVERSE_SUBTRACT: u32 = 0x800B;

    pub const ARRAY_BUFFER: u32 = 0x8892;
    pub const ELEMENT_ARRAY_BUFFER: u32 = 0x8893;
    pub const STREAM_DRAW: u32 = 0x88E0;
    pub const STATIC_DRAW: u32 = 0x88E4;
    pub const DYNAMIC_DRAW: u32 = 0x88E8;

    pub const CULL_FACE: u32 = 0x0B44;
    pub const DEPTH_TEST: u32 = 0x0B71;
    pub const STENCIL_TEST: u32 = 0x0B90;
    pub const BLEND: u32 = 0x0BE2;
    pub const SCISSOR_TEST: u32 = 0x0C11;

    pub const UNSIGNED_BYTE: u32 = 0x1401;
    pub const FLOAT: u32 = 0x1406;
    pub const RGBA: u32 = 0x1908;

    pub const FRAGMENT_SHADER: u32 = 0x8B30;
    pub const VERTEX_SHADER: u32 = 0x8B31;

    pub const NEAREST: u32 = 0x2600;
    pub const LINEAR: u32 = 0x2601;
    pub const TEXTURE_MAG_FILTER: u32 = 0x2800;
    pub const TEXTURE_MIN_FILTER: u32 = 0x2801;
    pub const TEXTURE_WRAP_S: u32 = 0x2802;
    pub const TEXTURE_WRAP_T: u32 = 0x2803;
    pub const TEXTURE_2D: u32 = 0x0DE1;
    pub const TEXTURE0: u32 = 0x84C0;
    pub const REPEAT: u32 = 0x2901;
    pub const CLAMP_TO_EDGE: u32 = 0x812F;
    pub const MIRRORED_REPEAT: u32 = 0x8370;
    pub const UNPACK_PREMULTIPLY_ALPHA_WEBGL: u32 = 0x9241;

    pub const MAX_TEXTURE_SIZE: u32 = 0x0D33;
    pub const MAX_TEXTURE_IMAGE_UNITS: u32 = 0x8872;

    pub const FRAMEBUFFER: u32 = 0x8D40;
    pub const RENDERBUFFER: u32 = 0x8D41;
    pub const COLOR_ATTACHMENT0: u32 = 0x8CE0;
    pub const DEPTH_STENCIL: u32 = 0x84F9;
    pub const DEPTH_STENCIL_ATTACHMENT: u32 = 0x821A;
    pub const FRAMEBUFFER_COMPLETE: u32 = 0x8CD5;
    pub const FRAMEBUFFER_INCOMPLETE_ATTACHMENT: u32 = 0x8CD6;
    pub const FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT: u32 = 0x8CD7;
    pub const FRAMEBUFFER_INCOMPLETE_DIMENSIONS: u32 = 0x8CD9;
}

impl Capability {
    pub fn to_gl(self) -> u32 {
        match self {
            Capability::Blend => consts::BLEND,
            Capability::DepthTest => consts::DEPTH_TEST,
            Capability::CullFace => consts::CULL_FACE,
            Capability::ScissorTest => consts::SCISSOR_TEST,
            Capability::StencilTest => consts::STENCIL_TEST,
        }
    }
}

impl BlendFactor {
    pub fn to_gl(self) -> u32 {
        use consts::*;
        match self {
            BlendFactor::Zero => ZERO,
            BlendFactor::One => ONE,
            BlendFactor::SrcColor => SRC_COLOR,
            BlendFactor::OneMinusSrcColor => ONE_MINUS_SRC_COLOR,
            BlendFactor::SrcAlpha => SRC_ALPHA,
            BlendFactor::OneMinusSrcAlpha => ONE_MINUS_SRC_ALPHA,
            BlendFactor::DstColor => DST_COLOR,
            BlendFactor::OneMinusDstColor => ONE_MINUS_DST_COLOR,
            BlendFactor::DstAlpha => DST_ALPHA,
            BlendFactor::OneMinusDstAlpha => ONE_MINUS_DST_ALPHA,
        }
    }
}

impl BlendEquation {
    pub fn to_gl(self) -> u32 {
        match self {
            BlendEquation::Add => consts::FUNC_ADD,
            BlendEquation::Subtract => consts::FUNC_SUBTRACT,
            BlendEquation::ReverseSubtract => consts::FUNC_REVERSE_SUBTRACT,
        }
    }
}

impl BufferTarget {
    pub fn to_gl(self) -> u32 {
        match self {
            BufferTarget::Array => consts::ARRAY_BUFFER,
            BufferTarget::ElementArray => consts::ELEMENT_ARRAY_BUFFER,
        }
    }
}

impl BufferUsage {
    pub fn to_gl(self) -> u32 {
        match self {
            BufferUsage::Static => consts::STATIC_DRAW,
            BufferUsage::Dynamic => consts::DYNAMIC_DRAW,
            BufferUsage::Stream => consts::STREAM_DRAW,
        }
    }
}

impl ShaderStage {
    pub fn to_gl(self) -> u32 {
        match self {
            ShaderStage::Vertex => consts::VERTEX_SHADER,
            ShaderStage::Fragment => consts::FRAGMENT_SHADER,
        }
    }
}

impl Topology {
    pub fn to_gl(self) -> u32 {
        match self {
            Topology::Triangles => consts::TRIANGLES,
            Topology::TriangleStrip => consts::TRIANGLE_STRIP,
            Topology::Lines => consts::LINES,
            Topology::Points => consts::POINTS,
        }
    }
}

impl TextureFilter {
    pub fn to_gl(self) -> u32 {
        match self {
            TextureFilter::Linear => consts::LINEAR,
            TextureFilter::Nearest => consts::NEAREST,
        }
    }
}

impl TextureWrap {
    pub fn to_gl(self) -> u32 {
        match self {
            TextureWrap::ClampToEdge => consts::CLAMP_TO_EDGE,
            TextureWrap::Repeat => consts::REPEAT,
            TextureWrap::MirroredRepeat => consts::MIRRORED_REPEAT,
        }
    }
}

impl AttribType {
    pub fn to_gl(self) -> u32 {
        match self {
            AttribType::Float => consts::FLOAT,
            AttribType::UnsignedByte => consts::UNSIGNED_BYTE,
        }
    }
}

impl ClearMask {
    pub fn to_gl(self) -> u32 {
        let mut bits = 0;
        if self.color {
            bits |= consts::COLOR_BUFFER_BIT;
        }
        if self.depth {
            bits |= consts::DEPTH_BUFFER_BIT;
        }
        if self.stencil {
            bits |= consts::STENCIL_BUFFER_BIT;
        }
        bits
    }
}

impl FramebufferStatus {
    pub fn from_gl(value: u32) -> Self {
        match value {
            consts::FRAMEBUFFER_COMPLETE => FramebufferStatus::Complete,
            consts::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => FramebufferStatus::IncompleteAttachment,
            consts::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => FramebufferStatus::MissingAttachment,
            consts::FRAMEBUFFER_INCOMPLETE_DIMENSIONS => FramebufferStatus::IncompleteDimensions,
            _ => FramebufferStatus::Unsupported,
        }
    }
}

// ── GlContext ─────────────────────────────────────────────────────────────────

/// Byte length of a tightly packed RGBA8 image, or `None` if it does not fit
/// in memory.
pub fn rgba_byte_len(width: u32, height: u32) -> Option<usize> {
    (width as usize).checked_mul(height as usize)?.checked_mul(4)
}

/// The WebGL 1 calls the renderer needs.
///
/// Creation methods return `None` when the driver refuses (typically because
/// the context is lost); the renderer turns that into a `RenderError`.
pub trait GlContext {
    // Context
    fn is_context_lost(&self) -> bool;
    fn drawing_buffer_size(&self) -> (u32, u32);
    /// Resize the drawing buffer (canvas backing store).
    fn set_drawing_buffer_size(&mut self, width: u32, height: u32);
    fn supported_extensions(&self) -> Vec<String>;
    /// Enable an extension. Returns `false` when it is not supported.
    fn get_extension(&mut self, name: &str) -> bool;
    fn max_texture_units(&self) -> u32;
    fn max_texture_size(&self) -> u32;

    // Fixed-function state
    fn enable(&mut self, cap: Capability);
    fn disable(&mut self, cap: Capability);
    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32);
    fn scissor(&mut self, x: i32, y: i32, width: i32, height: i32);
    fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32);
    fn clear(&mut self, mask: ClearMask);
    fn blend_equation(&mut self, equation: BlendEquation);
    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor);
    fn blend_func_separate(
        &mut self,
        src_rgb: BlendFactor,
        dst_rgb: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    );

    // Textures
    fn active_texture(&mut self, unit: u32);
    fn create_texture(&mut self) -> Option<TextureId>;
    fn bind_texture(&mut self, texture: Option<TextureId>);
    fn tex_filter(&mut self, min: TextureFilter, mag: TextureFilter);
    fn tex_wrap(&mut self, s: TextureWrap, t: TextureWrap);
    fn pixel_store_premultiply_alpha(&mut self, premultiply: bool);
    /// Upload RGBA8 pixels to the bound texture. `None` allocates storage only.
    fn tex_image_2d(&mut self, width: u32, height: u32, pixels: Option<&[u8]>);
    fn delete_texture(&mut self, texture: TextureId);

    // Framebuffers
    fn create_framebuffer(&mut self) -> Option<FramebufferId>;
    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferId>);
    fn framebuffer_texture_2d(&mut self, texture: Option<TextureId>);
    fn create_renderbuffer(&mut self) -> Option<RenderbufferId>;
    fn bind_renderbuffer(&mut self, renderbuffer: Option<RenderbufferId>);
    fn renderbuffer_storage_depth_stencil(&mut self, width: u32, height: u32);
    fn framebuffer_renderbuffer_depth_stencil(&mut self, renderbuffer: Option<RenderbufferId>);
    fn check_framebuffer_status(&self) -> FramebufferStatus;
    fn delete_framebuffer(&mut self, framebuffer: FramebufferId);
    fn delete_renderbuffer(&mut self, renderbuffer: RenderbufferId);

    // Shaders and programs
    fn create_shader(&mut self, stage: ShaderStage) -> Option<ShaderId>;
    fn shader_source(&mut self, shader: ShaderId, source: &str);
    fn compile_shader(&mut self, shader: ShaderId);
    fn shader_compile_status(&self, shader: ShaderId) -> bool;
    fn shader_info_log(&self, shader: ShaderId) -> String;
    fn delete_shader(&mut self, shader: ShaderId);
    fn create_program(&mut self) -> Option<ProgramId>;
    fn attach_shader(&mut self, program: ProgramId, shader: ShaderId);
    fn link_program(&mut self, program: ProgramId);
    fn program_link_status(&self, program: ProgramId) -> bool;
    fn program_info_log(&self, program: ProgramId) -> String;
    fn use_program(&mut self, program: Option<ProgramId>);
    fn delete_program(&mut self, program: ProgramId);

    // Buffers
    fn create_buffer(&mut self) -> Option<BufferId>;
    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferId>);
    /// Allocate `size` bytes of uninitialised storage.
    fn buffer_data_size(&mut self, target: BufferTarget, size: usize, usage: BufferUsage);
    fn buffer_data(&mut self, target: BufferTarget, data: &[u8], usage: BufferUsage);
    fn buffer_sub_data(&mut self, target: BufferTarget, offset: usize, data: &[u8]);
    fn delete_buffer(&mut self, buffer: BufferId);

    // Attributes
    fn attrib_location(&mut self, program: ProgramId, name: &str) -> Option<u32>;
    fn enable_vertex_attrib_array(&mut self, location: u32);
    fn disable_vertex_attrib_array(&mut self, location: u32);
    fn vertex_attrib_pointer(
        &mut self,
        location: u32,
        size: i32,
        ty: AttribType,
        normalized: bool,
        stride: i32,
        offset: i32,
    );

    // Uniforms
    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation>;
    fn uniform1f(&mut self, location: UniformLocation, x: f32);
    fn uniform2f(&mut self, location: UniformLocation, x: f32, y: f32);
    fn uniform3f(&mut self, location: UniformLocation, x: f32, y: f32, z: f32);
    fn uniform4f(&mut self, location: UniformLocation, x: f32, y: f32, z: f32, w: f32);
    fn uniform1i(&mut self, location: UniformLocation, x: i32);
    fn uniform2i(&mut self, location: UniformLocation, x: i32, y: i32);
    fn uniform3i(&mut self, location: UniformLocation, x: i32, y: i32, z: i32);
    fn uniform4i(&mut self, location: UniformLocation, x: i32, y: i32, z: i32, w: i32);
    fn uniform_matrix2fv(&mut self, location: UniformLocation, transpose: bool, data: &[f32; 4]);
    fn uniform_matrix3fv(&mut self, location: UniformLocation, transpose: bool, data: &[f32; 9]);
    fn uniform_matrix4fv(&mut self, location: UniformLocation, transpose: bool, data: &[f32; 16]);

    // Drawing
    fn draw_arrays(&mut self, topology: Topology, first: i32, count: i32);
    /// Read RGBA8 pixels from the bound framebuffer, bottom row first.
    fn read_pixels(&mut self, x: i32, y: i32, width: u32, height: u32) -> Vec<u8>;
}
