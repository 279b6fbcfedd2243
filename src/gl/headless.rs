// ── Headless GPU context ──────────────────────────────────────────────────────
//
// An in-memory `GlContext` that records every call instead of talking to a
// driver.  The demo binary renders through it, and the tests use it to count
// binds, draws and blend changes.
//
// `HeadlessContext` is moved into the renderer; keep a `HeadlessHandle`
// (obtained with `handle()`) to inspect the call log, lose or restore the
// context, or make the next shader compile fail.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::{
    rgba_byte_len, AttribType, BlendEquation, BlendFactor, BufferId, BufferTarget, BufferUsage,
    Capability, ClearMask, FramebufferId, FramebufferStatus, GlContext, ProgramId, RenderbufferId,
    ShaderId, ShaderStage, TextureFilter, TextureId, TextureWrap, Topology, UniformLocation,
};

// ── Call log ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub enum UniformValue {
    Float(Vec<f32>),
    Int(Vec<i32>),
    Matrix(Vec<f32>),
}

/// One recorded GL call.
#[derive(Clone, Debug, PartialEq)]
pub enum GlCall {
    Enable(Capability),
    Disable(Capability),
    Viewport(i32, i32, i32, i32),
    Scissor(i32, i32, i32, i32),
    ClearColor([f32; 4]),
    Clear(ClearMask),
    BlendEquation(BlendEquation),
    BlendFunc(BlendFactor, BlendFactor),
    BlendFuncSeparate(BlendFactor, BlendFactor, BlendFactor, BlendFactor),
    ActiveTexture(u32),
    CreateTexture(TextureId),
    BindTexture(Option<TextureId>),
    TexFilter(TextureFilter, TextureFilter),
    TexWrap(TextureWrap, TextureWrap),
    PixelStorePremultiply(bool),
    TexImage2d { width: u32, height: u32, has_pixels: bool },
    DeleteTexture(TextureId),
    CreateFramebuffer(FramebufferId),
    BindFramebuffer(Option<FramebufferId>),
    FramebufferTexture2d(Option<TextureId>),
    CreateRenderbuffer(RenderbufferId),
    BindRenderbuffer(Option<RenderbufferId>),
    RenderbufferStorage(u32, u32),
    FramebufferRenderbuffer(Option<RenderbufferId>),
    DeleteFramebuffer(FramebufferId),
    DeleteRenderbuffer(RenderbufferId),
    CreateShader(ShaderId, ShaderStage),
    CompileShader(ShaderId),
    DeleteShader(ShaderId),
    CreateProgram(ProgramId),
    LinkProgram(ProgramId),
    UseProgram(Option<ProgramId>),
    DeleteProgram(ProgramId),
    CreateBuffer(BufferId),
    BindBuffer(BufferTarget, Option<BufferId>),
    BufferData { target: BufferTarget, size: usize },
    BufferSubData { target: BufferTarget, offset: usize, data: Vec<u8> },
    DeleteBuffer(BufferId),
    EnableVertexAttribArray(u32),
    DisableVertexAttribArray(u32),
    VertexAttribPointer { location: u32, size: i32, ty: AttribType, normalized: bool, stride: i32, offset: i32 },
    Uniform { name: String, value: UniformValue },
    DrawArrays(Topology, i32, i32),
    ReadPixels(u32, u32),
}

// ── Shared state ──────────────────────────────────────────────────────────────

#[derive(Debug)]
struct State {
    calls: Vec<GlCall>,
    lost: bool,
    next_id: u32,
    width: u32,
    height: u32,
    max_texture_units: u32,
    max_texture_size: u32,
    extensions: Vec<String>,
    fail_compile: Option<ShaderStage>,
    fail_link: bool,
    framebuffer_status: FramebufferStatus,
    clear_color: [f32; 4],
    pixels: Option<Vec<u8>>,
    shader_stages: HashMap<u32, ShaderStage>,
    attribs: HashMap<(u32, String), u32>,
    uniforms: HashMap<u32, String>,
    uniform_ids: HashMap<(u32, String), u32>,
}

impl State {
    fn next(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

/// The driver side of the headless context. Cheap to clone.
#[derive(Clone, Debug)]
pub struct HeadlessHandle(Rc<RefCell<State>>);

impl HeadlessHandle {
    pub fn calls(&self) -> Vec<GlCall> {
        self.0.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.0.borrow_mut().calls.clear();
    }

    /// Number of recorded calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&GlCall) -> bool) -> usize {
        self.0.borrow().calls.iter().filter(|c| pred(c)).count()
    }

    pub fn draw_calls(&self) -> usize {
        self.count(|c| matches!(c, GlCall::DrawArrays(..)))
    }

    /// Most recent value written to the uniform called `name`.
    pub fn last_uniform(&self, name: &str) -> Option<UniformValue> {
        self.0.borrow().calls.iter().rev().find_map(|c| match c {
            GlCall::Uniform { name: n, value } if n == name => Some(value.clone()),
            _ => None,
        })
    }

    /// Bytes of the most recent `buffer_sub_data` upload.
    pub fn last_upload(&self) -> Option<Vec<u8>> {
        self.0.borrow().calls.iter().rev().find_map(|c| match c {
            GlCall::BufferSubData { data, .. } => Some(data.clone()),
            _ => None,
        })
    }

    pub fn lose_context(&self) {
        self.0.borrow_mut().lost = true;
    }

    pub fn restore_context(&self) {
        self.0.borrow_mut().lost = false;
    }

    pub fn is_lost(&self) -> bool {
        self.0.borrow().lost
    }

    /// Make every subsequent compile of `stage` shaders fail.
    pub fn fail_compile(&self, stage: Option<ShaderStage>) {
        self.0.borrow_mut().fail_compile = stage;
    }

    pub fn fail_link(&self, fail: bool) {
        self.0.borrow_mut().fail_link = fail;
    }

    pub fn set_framebuffer_status(&self, status: FramebufferStatus) {
        self.0.borrow_mut().framebuffer_status = status;
    }

    pub fn set_max_texture_units(&self, units: u32) {
        self.0.borrow_mut().max_texture_units = units;
    }

    pub fn set_extensions(&self, extensions: &[&str]) {
        self.0.borrow_mut().extensions = extensions.iter().map(|s| s.to_string()).collect();
    }

    /// Pixels returned by the next `read_pixels`, instead of the clear color.
    pub fn set_pixels(&self, pixels: Vec<u8>) {
        self.0.borrow_mut().pixels = Some(pixels);
    }
}

// ── HeadlessContext ───────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct HeadlessContext {
    state: Rc<RefCell<State>>,
}

impl HeadlessContext {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            state: Rc::new(RefCell::new(State {
                calls: Vec::new(),
                lost: false,
                next_id: 0,
                width,
                height,
                max_texture_units: 16,
                max_texture_size: 4096,
                extensions: vec!["OES_texture_float".into(), "WEBGL_lose_context".into()],
                fail_compile: None,
                fail_link: false,
                framebuffer_status: FramebufferStatus::Complete,
                clear_color: [0.0; 4],
                pixels: None,
                shader_stages: HashMap::new(),
                attribs: HashMap::new(),
                uniforms: HashMap::new(),
                uniform_ids: HashMap::new(),
            })),
        }
    }

    pub fn handle(&self) -> HeadlessHandle {
        HeadlessHandle(Rc::clone(&self.state))
    }

    /// Record `call` unless the context is lost (a lost context swallows calls).
    fn record(&self, call: GlCall) {
        let mut s = self.state.borrow_mut();
        if !s.lost {
            s.calls.push(call);
        }
    }

    fn create(&self, make: impl FnOnce(u32) -> GlCall) -> Option<u32> {
        let mut s = self.state.borrow_mut();
        if s.lost {
            return None;
        }
        let id = s.next();
        s.calls.push(make(id));
        Some(id)
    }

    fn uniform(&self, location: UniformLocation, value: UniformValue) {
        let name = self.state.borrow().uniforms.get(&location.0).cloned().unwrap_or_default();
        self.record(GlCall::Uniform { name, value });
    }
}

impl GlContext for HeadlessContext {
    fn is_context_lost(&self) -> bool {
        self.state.borrow().lost
    }

    fn drawing_buffer_size(&self) -> (u32, u32) {
        let s = self.state.borrow();
        (s.width, s.height)
    }

    fn set_drawing_buffer_size(&mut self, width: u32, height: u32) {
        let mut s = self.state.borrow_mut();
        s.width = width;
        s.height = height;
    }

    fn supported_extensions(&self) -> Vec<String> {
        self.state.borrow().extensions.clone()
    }

    fn get_extension(&mut self, name: &str) -> bool {
        self.state.borrow().extensions.iter().any(|e| e == name)
    }

    fn max_texture_units(&self) -> u32 {
        self.state.borrow().max_texture_units
    }

    fn max_texture_size(&self) -> u32 {
        self.state.borrow().max_texture_size
    }

    fn enable(&mut self, cap: Capability) {
        self.record(GlCall::Enable(cap));
    }

    fn disable(&mut self, cap: Capability) {
        self.record(GlCall::Disable(cap));
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.record(GlCall::Viewport(x, y, width, height));
    }

    fn scissor(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.record(GlCall::Scissor(x, y, width, height));
    }

    fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.state.borrow_mut().clear_color = [r, g, b, a];
        self.record(GlCall::ClearColor([r, g, b, a]));
    }

    fn clear(&mut self, mask: ClearMask) {
        self.record(GlCall::Clear(mask));
    }

    fn blend_equation(&mut self, equation: BlendEquation) {
        self.record(GlCall::BlendEquation(equation));
    }

    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.record(GlCall::BlendFunc(src, dst));
    }

    fn blend_func_separate(
        &mut self,
        src_rgb: BlendFactor,
        dst_rgb: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    ) {
        self.record(GlCall::BlendFuncSeparate(src_rgb, dst_rgb, src_alpha, dst_alpha));
    }

    fn active_texture(&mut self, unit: u32) {
        self.record(GlCall::ActiveTexture(unit));
    }

    fn create_texture(&mut self) -> Option<TextureId> {
        self.create(|id| GlCall::CreateTexture(TextureId(id))).map(TextureId)
    }

    fn bind_texture(&mut self, texture: Option<TextureId>) {
        self.record(GlCall::BindTexture(texture));
    }

    fn tex_filter(&mut self, min: TextureFilter, mag: TextureFilter) {
        self.record(GlCall::TexFilter(min, mag));
    }

    fn tex_wrap(&mut self, s: TextureWrap, t: TextureWrap) {
        self.record(GlCall::TexWrap(s, t));
    }

    fn pixel_store_premultiply_alpha(&mut self, premultiply: bool) {
        self.record(GlCall::PixelStorePremultiply(premultiply));
    }

    fn tex_image_2d(&mut self, width: u32, height: u32, pixels: Option<&[u8]>) {
        self.record(GlCall::TexImage2d { width, height, has_pixels: pixels.is_some() });
    }

    fn delete_texture(&mut self, texture: TextureId) {
        self.record(GlCall::DeleteTexture(texture));
    }

    fn create_framebuffer(&mut self) -> Option<FramebufferId> {
        self.create(|id| GlCall::CreateFramebuffer(FramebufferId(id))).map(FramebufferId)
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferId>) {
        self.record(GlCall::BindFramebuffer(framebuffer));
    }

    fn framebuffer_texture_2d(&mut self, texture: Option<TextureId>) {
        self.record(GlCall::FramebufferTexture2d(texture));
    }

    fn create_renderbuffer(&mut self) -> Option<RenderbufferId> {
        self.create(|id| GlCall::CreateRenderbuffer(RenderbufferId(id))).map(RenderbufferId)
    }

    fn bind_renderbuffer(&mut self, renderbuffer: Option<RenderbufferId>) {
        self.record(GlCall::BindRenderbuffer(renderbuffer));
    }

    fn renderbuffer_storage_depth_stencil(&mut self, width: u32, height: u32) {
        self.record(GlCall::RenderbufferStorage(width, height));
    }

    fn framebuffer_renderbuffer_depth_stencil(&mut self, renderbuffer: Option<RenderbufferId>) {
        self.record(GlCall::FramebufferRenderbuffer(renderbuffer));
    }

    fn check_framebuffer_status(&self) -> FramebufferStatus {
        self.state.borrow().framebuffer_status
    }

    fn delete_framebuffer(&mut self, framebuffer: FramebufferId) {
        self.record(GlCall::DeleteFramebuffer(framebuffer));
    }

    fn delete_renderbuffer(&mut self, renderbuffer: RenderbufferId) {
        self.record(GlCall::DeleteRenderbuffer(renderbuffer));
    }

    fn create_shader(&mut self, stage: ShaderStage) -> Option<ShaderId> {
        let id = self.create(|id| GlCall::CreateShader(ShaderId(id), stage))?;
        self.state.borrow_mut().shader_stages.insert(id, stage);
        Some(ShaderId(id))
    }

    fn shader_source(&mut self, _shader: ShaderId, _source: &str) {}

    fn compile_shader(&mut self, shader: ShaderId) {
        self.record(GlCall::CompileShader(shader));
    }

    fn shader_compile_status(&self, shader: ShaderId) -> bool {
        let s = self.state.borrow();
        match (s.fail_compile, s.shader_stages.get(&shader.0)) {
            (Some(failing), Some(stage)) => failing != *stage,
            _ => true,
        }
    }

    fn shader_info_log(&self, shader: ShaderId) -> String {
        if self.shader_compile_status(shader) {
            String::new()
        } else {
            "ERROR: 0:1: syntax error".into()
        }
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        self.record(GlCall::DeleteShader(shader));
    }

    fn create_program(&mut self) -> Option<ProgramId> {
        self.create(|id| GlCall::CreateProgram(ProgramId(id))).map(ProgramId)
    }

    fn attach_shader(&mut self, _program: ProgramId, _shader: ShaderId) {}

    fn link_program(&mut self, program: ProgramId) {
        self.record(GlCall::LinkProgram(program));
    }

    fn program_link_status(&self, _program: ProgramId) -> bool {
        !self.state.borrow().fail_link
    }

    fn program_info_log(&self, program: ProgramId) -> String {
        if self.program_link_status(program) {
            String::new()
        } else {
            "link failed: varying mismatch".into()
        }
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        self.record(GlCall::UseProgram(program));
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.record(GlCall::DeleteProgram(program));
    }

    fn create_buffer(&mut self) -> Option<BufferId> {
        self.create(|id| GlCall::CreateBuffer(BufferId(id))).map(BufferId)
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferId>) {
        self.record(GlCall::BindBuffer(target, buffer));
    }

    fn buffer_data_size(&mut self, target: BufferTarget, size: usize, _usage: BufferUsage) {
        self.record(GlCall::BufferData { target, size });
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8], _usage: BufferUsage) {
        self.record(GlCall::BufferData { target, size: data.len() });
    }

    fn buffer_sub_data(&mut self, target: BufferTarget, offset: usize, data: &[u8]) {
        self.record(GlCall::BufferSubData { target, offset, data: data.to_vec() });
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        self.record(GlCall::DeleteBuffer(buffer));
    }

    fn attrib_location(&mut self, program: ProgramId, name: &str) -> Option<u32> {
        let mut s = self.state.borrow_mut();
        if s.lost {
            return None;
        }
        let next = s.attribs.keys().filter(|(p, _)| *p == program.0).count() as u32;
        Some(*s.attribs.entry((program.0, name.to_string())).or_insert(next))
    }

    fn enable_vertex_attrib_array(&mut self, location: u32) {
        self.record(GlCall::EnableVertexAttribArray(location));
    }

    fn disable_vertex_attrib_array(&mut self, location: u32) {
        self.record(GlCall::DisableVertexAttribArray(location));
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
        self.record(GlCall::VertexAttribPointer { location, size, ty, normalized, stride, offset });
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let mut s = self.state.borrow_mut();
        if s.lost {
            return None;
        }
        let key = (program.0, name.to_string());
        if let Some(id) = s.uniform_ids.get(&key) {
            return Some(UniformLocation(*id));
        }
        let id = s.next();
        s.uniform_ids.insert(key, id);
        s.uniforms.insert(id, name.to_string());
        Some(UniformLocation(id))
    }

    fn uniform1f(&mut self, location: UniformLocation, x: f32) {
        self.uniform(location, UniformValue::Float(vec![x]));
    }

    fn uniform2f(&mut self, location: UniformLocation, x: f32, y: f32) {
        self.uniform(location, UniformValue::Float(vec![x, y]));
    }

    fn uniform3f(&mut self, location: UniformLocation, x: f32, y: f32, z: f32) {
        self.uniform(location, UniformValue::Float(vec![x, y, z]));
    }

    fn uniform4f(&mut self, location: UniformLocation, x: f32, y: f32, z: f32, w: f32) {
        self.uniform(location, UniformValue::Float(vec![x, y, z, w]));
    }

    fn uniform1i(&mut self, location: UniformLocation, x: i32) {
        self.uniform(location, UniformValue::Int(vec![x]));
    }

    fn uniform2i(&mut self, location: UniformLocation, x: i32, y: i32) {
        self.uniform(location, UniformValue::Int(vec![x, y]));
    }

    fn uniform3i(&mut self, location: UniformLocation, x: i32, y: i32, z: i32) {
        self.uniform(location, UniformValue::Int(vec![x, y, z]));
    }

    fn uniform4i(&mut self, location: UniformLocation, x: i32, y: i32, z: i32, w: i32) {
        self.uniform(location, UniformValue::Int(vec![x, y, z, w]));
    }

    fn uniform_matrix2fv(&mut self, location: UniformLocation, _transpose: bool, data: &[f32; 4]) {
        self.uniform(location, UniformValue::Matrix(data.to_vec()));
    }

    fn uniform_matrix3fv(&mut self, location: UniformLocation, _transpose: bool, data: &[f32; 9]) {
        self.uniform(location, UniformValue::Matrix(data.to_vec()));
    }

    fn uniform_matrix4fv(&mut self, location: UniformLocation, _transpose: bool, data: &[f32; 16]) {
        self.uniform(location, UniformValue::Matrix(data.to_vec()));
    }

    fn draw_arrays(&mut self, topology: Topology, first: i32, count: i32) {
        self.record(GlCall::DrawArrays(topology, first, count));
    }

    fn read_pixels(&mut self, _x: i32, _y: i32, width: u32, height: u32) -> Vec<u8> {
        self.record(GlCall::ReadPixels(width, height));
        let Some(len) = rgba_byte_len(width, height) else { return Vec::new() };
        let mut s = self.state.borrow_mut();
        if let Some(pixels) = s.pixels.take() {
            if pixels.len() == len {
                return pixels;
            }
        }
        let [r, g, b, a] = s.clear_color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        [r, g, b, a].repeat(len / 4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lost_context_swallows_calls_and_refuses_creation() {
        let mut gl = HeadlessContext::new(8, 8);
        let handle = gl.handle();
        handle.lose_context();
        gl.enable(Capability::Blend);
        assert!(gl.create_texture().is_none());
        assert!(handle.calls().is_empty());

        handle.restore_context();
        assert!(gl.create_texture().is_some());
        assert_eq!(handle.calls().len(), 1);
    }

    #[test]
    fn uniform_calls_are_recorded_by_name() {
        let mut gl = HeadlessContext::new(8, 8);
        let handle = gl.handle();
        let program = gl.create_program().unwrap();
        let loc = gl.uniform_location(program, "uAlpha").unwrap();
        assert_eq!(gl.uniform_location(program, "uAlpha"), Some(loc));
        gl.uniform1f(loc, 0.5);
        assert_eq!(handle.last_uniform("uAlpha"), Some(UniformValue::Float(vec![0.5])));
    }

    #[test]
    fn read_pixels_returns_clear_color() {
        let mut gl = HeadlessContext::new(2, 1);
        gl.clear_color(1.0, 0.0, 0.0, 1.0);
        assert_eq!(gl.read_pixels(0, 0, 2, 1), vec![255, 0, 0, 255, 255, 0, 0, 255]);
    }
}
