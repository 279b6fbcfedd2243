// ── Browser WebGL backend ─────────────────────────────────────────────────────
//
// Maps the renderer's opaque handles onto `web_sys` WebGL objects.  Handles
// are plain integers; the JS objects live in per-kind tables and are dropped
// (and deleted on the GPU) when the renderer deletes the handle.

use std::collections::HashMap;

use js_sys::{Array, Object, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    HtmlCanvasElement, WebGlBuffer, WebGlFramebuffer, WebGlProgram, WebGlRenderbuffer,
    WebGlRenderingContext as GL, WebGlShader, WebGlTexture, WebGlUniformLocation,
};

use super::{
    consts, rgba_byte_len, AttribType, BlendEquation, BlendFactor, BufferId, BufferTarget, BufferUsage,
    Capability, ClearMask, FramebufferId, FramebufferStatus, GlContext, ProgramId,
    RenderbufferId, ShaderId, ShaderStage, TextureFilter, TextureId, TextureWrap, Topology,
    UniformLocation,
};
use crate::config::ContextAttributes;
use crate::error::{RenderError, Result};

pub struct WebGlContext {
    gl: GL,
    canvas: HtmlCanvasElement,
    next_id: u32,
    textures: HashMap<u32, WebGlTexture>,
    framebuffers: HashMap<u32, WebGlFramebuffer>,
    renderbuffers: HashMap<u32, WebGlRenderbuffer>,
    shaders: HashMap<u32, WebGlShader>,
    programs: HashMap<u32, WebGlProgram>,
    buffers: HashMap<u32, WebGlBuffer>,
    uniforms: HashMap<u32, WebGlUniformLocation>,
    uniform_ids: HashMap<(u32, String), u32>,
}

impl WebGlContext {
    /// Create a WebGL 1 context on `canvas` with the given attributes.
    pub fn from_canvas(canvas: HtmlCanvasElement, attributes: &ContextAttributes) -> Result<Self> {
        let options = Object::new();
        let set = |key: &str, value: JsValue| {
            let _ = Reflect::set(&options, &JsValue::from_str(key), &value);
        };
        set("alpha", attributes.alpha.into());
        set("depth", attributes.depth.into());
        set("stencil", attributes.stencil.into());
        set("antialias", attributes.antialias.into());
        set("premultipliedAlpha", attributes.premultiplied_alpha.into());
        set("preserveDrawingBuffer", attributes.preserve_drawing_buffer.into());
        set("failIfMajorPerformanceCaveat", attributes.fail_if_major_performance_caveat.into());
        set("powerPreference", JsValue::from_str(attributes.power_preference.as_str()));

        let gl = canvas
            .get_context_with_context_options("webgl", &options)
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<GL>().ok())
            .ok_or(RenderError::ContextUnavailable)?;

        Ok(Self {
            gl,
            canvas,
            next_id: 0,
            textures: HashMap::new(),
            framebuffers: HashMap::new(),
            renderbuffers: HashMap::new(),
            shaders: HashMap::new(),
            programs: HashMap::new(),
            buffers: HashMap::new(),
            uniforms: HashMap::new(),
            uniform_ids: HashMap::new(),
        })
    }

    pub fn raw(&self) -> &GL {
        &self.gl
    }

    fn store<T>(next_id: &mut u32, table: &mut HashMap<u32, T>, object: Option<T>) -> Option<u32> {
        let object = object?;
        *next_id += 1;
        table.insert(*next_id, object);
        Some(*next_id)
    }

    fn get_u32(&self, pname: u32) -> u32 {
        self.gl
            .get_parameter(pname)
            .ok()
            .and_then(|v| v.as_f64())
            .map(|v| v as u32)
            .unwrap_or(0)
    }
}

impl GlContext for WebGlContext {
    fn is_context_lost(&self) -> bool {
        self.gl.is_context_lost()
    }

    fn drawing_buffer_size(&self) -> (u32, u32) {
        (
            self.gl.drawing_buffer_width().max(0) as u32,
            self.gl.drawing_buffer_height().max(0) as u32,
        )
    }

    fn set_drawing_buffer_size(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn supported_extensions(&self) -> Vec<String> {
        self.gl
            .get_supported_extensions()
            .map(|list: Array| list.iter().filter_map(|v| v.as_string()).collect())
            .unwrap_or_default()
    }

    fn get_extension(&mut self, name: &str) -> bool {
        matches!(self.gl.get_extension(name), Ok(Some(_)))
    }

    fn max_texture_units(&self) -> u32 {
        self.get_u32(consts::MAX_TEXTURE_IMAGE_UNITS)
    }

    fn max_texture_size(&self) -> u32 {
        self.get_u32(consts::MAX_TEXTURE_SIZE)
    }

    fn enable(&mut self, cap: Capability) {
        self.gl.enable(cap.to_gl());
    }

    fn disable(&mut self, cap: Capability) {
        self.gl.disable(cap.to_gl());
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.gl.viewport(x, y, width, height);
    }

    fn scissor(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.gl.scissor(x, y, width, height);
    }

    fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.gl.clear_color(r, g, b, a);
    }

    fn clear(&mut self, mask: ClearMask) {
        self.gl.clear(mask.to_gl());
    }

    fn blend_equation(&mut self, equation: BlendEquation) {
        self.gl.blend_equation(equation.to_gl());
    }

    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.gl.blend_func(src.to_gl(), dst.to_gl());
    }

    fn blend_func_separate(
        &mut self,
        src_rgb: BlendFactor,
        dst_rgb: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    ) {
        self.gl
            .blend_func_separate(src_rgb.to_gl(), dst_rgb.to_gl(), src_alpha.to_gl(), dst_alpha.to_gl());
    }

    fn active_texture(&mut self, unit: u32) {
        self.gl.active_texture(consts::TEXTURE0 + unit);
    }

    fn create_texture(&mut self) -> Option<TextureId> {
        let texture = self.gl.create_texture();
        Self::store(&mut self.next_id, &mut self.textures, texture).map(TextureId)
    }

    fn bind_texture(&mut self, texture: Option<TextureId>) {
        let texture = texture.and_then(|t| self.textures.get(&t.0));
        self.gl.bind_texture(consts::TEXTURE_2D, texture);
    }

    fn tex_filter(&mut self, min: TextureFilter, mag: TextureFilter) {
        self.gl.tex_parameteri(consts::TEXTURE_2D, consts::TEXTURE_MIN_FILTER, min.to_gl() as i32);
        self.gl.tex_parameteri(consts::TEXTURE_2D, consts::TEXTURE_MAG_FILTER, mag.to_gl() as i32);
    }

    fn tex_wrap(&mut self, s: TextureWrap, t: TextureWrap) {
        self.gl.tex_parameteri(consts::TEXTURE_2D, consts::TEXTURE_WRAP_S, s.to_gl() as i32);
        self.gl.tex_parameteri(consts::TEXTURE_2D, consts::TEXTURE_WRAP_T, t.to_gl() as i32);
    }

    fn pixel_store_premultiply_alpha(&mut self, premultiply: bool) {
        self.gl.pixel_storei(consts::UNPACK_PREMULTIPLY_ALPHA_WEBGL, premultiply as i32);
    }

    fn tex_image_2d(&mut self, width: u32, height: u32, pixels: Option<&[u8]>) {
        let result = self
            .gl
            .tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
                consts::TEXTURE_2D,
                0,
                consts::RGBA as i32,
                width as i32,
                height as i32,
                0,
                consts::RGBA,
                consts::UNSIGNED_BYTE,
                pixels,
            );
        if let Err(err) = result {
            log::error!("texImage2D {width}x{height} failed: {err:?}");
        }
    }

    fn delete_texture(&mut self, texture: TextureId) {
        if let Some(t) = self.textures.remove(&texture.0) {
            self.gl.delete_texture(Some(&t));
        }
    }

    fn create_framebuffer(&mut self) -> Option<FramebufferId> {
        let framebuffer = self.gl.create_framebuffer();
        Self::store(&mut self.next_id, &mut self.framebuffers, framebuffer).map(FramebufferId)
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferId>) {
        let framebuffer = framebuffer.and_then(|f| self.framebuffers.get(&f.0));
        self.gl.bind_framebuffer(consts::FRAMEBUFFER, framebuffer);
    }

    fn framebuffer_texture_2d(&mut self, texture: Option<TextureId>) {
        let texture = texture.and_then(|t| self.textures.get(&t.0));
        self.gl.framebuffer_texture_2d(
            consts::FRAMEBUFFER,
            consts::COLOR_ATTACHMENT0,
            consts::TEXTURE_2D,
            texture,
            0,
        );
    }

    fn create_renderbuffer(&mut self) -> Option<RenderbufferId> {
        let renderbuffer = self.gl.create_renderbuffer();
        Self::store(&mut self.next_id, &mut self.renderbuffers, renderbuffer).map(RenderbufferId)
    }

    fn bind_renderbuffer(&mut self, renderbuffer: Option<RenderbufferId>) {
        let renderbuffer = renderbuffer.and_then(|r| self.renderbuffers.get(&r.0));
        self.gl.bind_renderbuffer(consts::RENDERBUFFER, renderbuffer);
    }

    fn renderbuffer_storage_depth_stencil(&mut self, width: u32, height: u32) {
        self.gl.renderbuffer_storage(
            consts::RENDERBUFFER,
            consts::DEPTH_STENCIL,
            width as i32,
            height as i32,
        );
    }

    fn framebuffer_renderbuffer_depth_stencil(&mut self, renderbuffer: Option<RenderbufferId>) {
        let renderbuffer = renderbuffer.and_then(|r| self.renderbuffers.get(&r.0));
        self.gl.framebuffer_renderbuffer(
            consts::FRAMEBUFFER,
            consts::DEPTH_STENCIL_ATTACHMENT,
            consts::RENDERBUFFER,
            renderbuffer,
        );
    }

    fn check_framebuffer_status(&self) -> FramebufferStatus {
        FramebufferStatus::from_gl(self.gl.check_framebuffer_status(consts::FRAMEBUFFER))
    }

    fn delete_framebuffer(&mut self, framebuffer: FramebufferId) {
        if let Some(f) = self.framebuffers.remove(&framebuffer.0) {
            self.gl.delete_framebuffer(Some(&f));
        }
    }

    fn delete_renderbuffer(&mut self, renderbuffer: RenderbufferId) {
        if let Some(r) = self.renderbuffers.remove(&renderbuffer.0) {
            self.gl.delete_renderbuffer(Some(&r));
        }
    }

    fn create_shader(&mut self, stage: ShaderStage) -> Option<ShaderId> {
        let shader = self.gl.create_shader(stage.to_gl());
        Self::store(&mut self.next_id, &mut self.shaders, shader).map(ShaderId)
    }

    fn shader_source(&mut self, shader: ShaderId, source: &str) {
        if let Some(s) = self.shaders.get(&shader.0) {
            self.gl.shader_source(s, source);
        }
    }

    fn compile_shader(&mut self, shader: ShaderId) {
        if let Some(s) = self.shaders.get(&shader.0) {
            self.gl.compile_shader(s);
        }
    }

    fn shader_compile_status(&self, shader: ShaderId) -> bool {
        self.shaders
            .get(&shader.0)
            .map(|s| self.gl.get_shader_parameter(s, GL::COMPILE_STATUS).as_bool().unwrap_or(false))
            .unwrap_or(false)
    }

    fn shader_info_log(&self, shader: ShaderId) -> String {
        self.shaders
            .get(&shader.0)
            .and_then(|s| self.gl.get_shader_info_log(s))
            .unwrap_or_default()
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        if let Some(s) = self.shaders.remove(&shader.0) {
            self.gl.delete_shader(Some(&s));
        }
    }

    fn create_program(&mut self) -> Option<ProgramId> {
        let program = self.gl.create_program();
        Self::store(&mut self.next_id, &mut self.programs, program).map(ProgramId)
    }

    fn attach_shader(&mut self, program: ProgramId, shader: ShaderId) {
        if let (Some(p), Some(s)) = (self.programs.get(&program.0), self.shaders.get(&shader.0)) {
            self.gl.attach_shader(p, s);
        }
    }

    fn link_program(&mut self, program: ProgramId) {
        if let Some(p) = self.programs.get(&program.0) {
            self.gl.link_program(p);
        }
    }

    fn program_link_status(&self, program: ProgramId) -> bool {
        self.programs
            .get(&program.0)
            .map(|p| self.gl.get_program_parameter(p, GL::LINK_STATUS).as_bool().unwrap_or(false))
            .unwrap_or(false)
    }

    fn program_info_log(&self, program: ProgramId) -> String {
        self.programs
            .get(&program.0)
            .and_then(|p| self.gl.get_program_info_log(p))
            .unwrap_or_default()
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        let program = program.and_then(|p| self.programs.get(&p.0));
        self.gl.use_program(program);
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.uniform_ids.retain(|(p, _), _| *p != program.0);
        if let Some(p) = self.programs.remove(&program.0) {
            self.gl.delete_program(Some(&p));
        }
    }

    fn create_buffer(&mut self) -> Option<BufferId> {
        let buffer = self.gl.create_buffer();
        Self::store(&mut self.next_id, &mut self.buffers, buffer).map(BufferId)
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferId>) {
        let buffer = buffer.and_then(|b| self.buffers.get(&b.0));
        self.gl.bind_buffer(target.to_gl(), buffer);
    }

    fn buffer_data_size(&mut self, target: BufferTarget, size: usize, usage: BufferUsage) {
        self.gl.buffer_data_with_i32(target.to_gl(), size as i32, usage.to_gl());
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        self.gl.buffer_data_with_u8_array(target.to_gl(), data, usage.to_gl());
    }

    fn buffer_sub_data(&mut self, target: BufferTarget, offset: usize, data: &[u8]) {
        self.gl.buffer_sub_data_with_i32_and_u8_array(target.to_gl(), offset as i32, data);
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        if let Some(b) = self.buffers.remove(&buffer.0) {
            self.gl.delete_buffer(Some(&b));
        }
    }

    fn attrib_location(&mut self, program: ProgramId, name: &str) -> Option<u32> {
        let p = self.programs.get(&program.0)?;
        u32::try_from(self.gl.get_attrib_location(p, name)).ok()
    }

    fn enable_vertex_attrib_array(&mut self, location: u32) {
        self.gl.enable_vertex_attrib_array(location);
    }

    fn disable_vertex_attrib_array(&mut self, location: u32) {
        self.gl.disable_vertex_attrib_array(location);
    }

    fn vertex_attrib_pointer(
        &mut self,
        location: u32,
        size: i32,
        ty: AttribType,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        self.gl
            .vertex_attrib_pointer_with_i32(location, size, ty.to_gl(), normalized, stride, offset);
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let key = (program.0, name.to_string());
        if let Some(id) = self.uniform_ids.get(&key) {
            return Some(UniformLocation(*id));
        }
        let p = self.programs.get(&program.0)?;
        let location = self.gl.get_uniform_location(p, name);
        let id = Self::store(&mut self.next_id, &mut self.uniforms, location)?;
        self.uniform_ids.insert(key, id);
        Some(UniformLocation(id))
    }

    fn uniform1f(&mut self, location: UniformLocation, x: f32) {
        self.gl.uniform1f(self.uniforms.get(&location.0), x);
    }

    fn uniform2f(&mut self, location: UniformLocation, x: f32, y: f32) {
        self.gl.uniform2f(self.uniforms.get(&location.0), x, y);
    }

    fn uniform3f(&mut self, location: UniformLocation, x: f32, y: f32, z: f32) {
        self.gl.uniform3f(self.uniforms.get(&location.0), x, y, z);
    }

    fn uniform4f(&mut self, location: UniformLocation, x: f32, y: f32, z: f32, w: f32) {
        self.gl.uniform4f(self.uniforms.get(&location.0), x, y, z, w);
    }

    fn uniform1i(&mut self, location: UniformLocation, x: i32) {
        self.gl.uniform1i(self.uniforms.get(&location.0), x);
    }

    fn uniform2i(&mut self, location: UniformLocation, x: i32, y: i32) {
        self.gl.uniform2i(self.uniforms.get(&location.0), x, y);
    }

    fn uniform3i(&mut self, location: UniformLocation, x: i32, y: i32, z: i32) {
        self.gl.uniform3i(self.uniforms.get(&location.0), x, y, z);
    }

    fn uniform4i(&mut self, location: UniformLocation, x: i32, y: i32, z: i32, w: i32) {
        self.gl.uniform4i(self.uniforms.get(&location.0), x, y, z, w);
    }

    fn uniform_matrix2fv(&mut self, location: UniformLocation, transpose: bool, data: &[f32; 4]) {
        self.gl
            .uniform_matrix2fv_with_f32_array(self.uniforms.get(&location.0), transpose, data);
    }

    fn uniform_matrix3fv(&mut self, location: UniformLocation, transpose: bool, data: &[f32; 9]) {
        self.gl
            .uniform_matrix3fv_with_f32_array(self.uniforms.get(&location.0), transpose, data);
    }

    fn uniform_matrix4fv(&mut self, location: UniformLocation, transpose: bool, data: &[f32; 16]) {
        self.gl
            .uniform_matrix4fv_with_f32_array(self.uniforms.get(&location.0), transpose, data);
    }

    fn draw_arrays(&mut self, topology: Topology, first: i32, count: i32) {
        self.gl.draw_arrays(topology.to_gl(), first, count);
    }

    fn read_pixels(&mut self, x: i32, y: i32, width: u32, height: u32) -> Vec<u8> {
        let Some(len) = rgba_byte_len(width, height) else { return Vec::new() };
        let mut pixels = vec![0u8; len];
        let result = self.gl.read_pixels_with_opt_u8_array(
            x,
            y,
            width as i32,
            height as i32,
            consts::RGBA,
            consts::UNSIGNED_BYTE,
            Some(&mut pixels),
        );
        if let Err(err) = result {
            log::error!("readPixels failed: {err:?}");
        }
        pixels
    }
}
