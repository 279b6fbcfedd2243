// =============================================================================
// RENDERER — GPU state tracker, pipeline registry and frame orchestrator
//
// Every GL state change goes through one of the `set_*` methods below.  Each
// compares the request against `GpuBindingState` and does nothing when the
// value is already bound; otherwise it flushes the current pipeline first so
// batched vertices are drawn with the state they were recorded under.
//
// Frame shape:
//
//   pre_render()                      clear, pipelines' on_pre_render
//   render(scene, children, .., cam)  once per camera
//   post_render()                     snapshot, pipelines' on_post_render
//
// While the context is lost all three are no-ops.
// =============================================================================

pub mod blend;
pub mod pipeline;
pub mod snapshot;
pub mod state;

use std::collections::HashMap;

use log::{debug, info, warn};

use crate::camera::Camera;
use crate::color::{get_tint_append_float_alpha, get_tint_from_floats, Color};
use crate::config::RendererConfig;
use crate::error::{RenderError, Result};
use crate::gameobject::Renderable;
use crate::gl::{
    rgba_byte_len, BlendEquation, BufferId, BufferTarget, BufferUsage, Capability, ClearMask,
    FramebufferId, FramebufferStatus, GlContext, ProgramId, RenderbufferId, ShaderId, ShaderStage,
    TextureFilter, TextureId, TextureWrap, UniformLocation,
};
use crate::scene::Scene;

pub use blend::{BlendFunc, BlendMode, BlendModeId, BlendModes};
pub use pipeline::{
    BitmapMaskPipeline, FlatTintPipeline, ForwardDiffuseLightPipeline, Pipeline, PipelineRegistry,
    TextureTintPipeline, BITMAP_MASK, FLAT_TINT, LIGHT_2D, TEXTURE_TINT,
};
pub use snapshot::{ImageKind, Snapshot, SnapshotCallback};
pub use state::{GpuBindingState, ScissorRect, ScissorState};

use snapshot::SnapshotRequest;

/// Runs with the renderer when the context is lost or restored.
pub type ContextCallback = Box<dyn FnMut(&mut Renderer)>;

const DEFAULT_PIPELINES: [&str; 4] = [TEXTURE_TINT, FLAT_TINT, BITMAP_MASK, LIGHT_2D];

// ── TextureOptions ────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureOptions {
    pub min_filter: TextureFilter,
    pub mag_filter: TextureFilter,
    pub wrap_s: TextureWrap,
    pub wrap_t: TextureWrap,
    pub premultiply_alpha: bool,
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self {
            min_filter: TextureFilter::Linear,
            mag_filter: TextureFilter::Linear,
            wrap_s: TextureWrap::ClampToEdge,
            wrap_t: TextureWrap::ClampToEdge,
            premultiply_alpha: false,
        }
    }
}

impl TextureOptions {
    pub fn filtered(filter: TextureFilter) -> Self {
        Self { min_filter: filter, mag_filter: filter, ..Self::default() }
    }
}

// ── Renderer ──────────────────────────────────────────────────────────────────

pub struct Renderer {
    gl: Box<dyn GlContext>,
    config: RendererConfig,
    /// Drawing-buffer size: game size times resolution, floored.
    width: u32,
    height: u32,
    context_lost: bool,
    destroyed: bool,
    state: GpuBindingState,
    blend_modes: BlendModes,
    current_blend: Option<BlendModeId>,
    pipelines: PipelineRegistry,
    current_pipeline: Option<String>,
    blank_texture: Option<TextureId>,
    native_textures: Vec<TextureId>,
    framebuffer_renderbuffers: HashMap<FramebufferId, RenderbufferId>,
    supported_extensions: Vec<String>,
    enabled_extensions: Vec<String>,
    max_textures: u32,
    max_texture_size: u32,
    snapshot_request: Option<SnapshotRequest>,
    lost_callbacks: Vec<ContextCallback>,
    restored_callbacks: Vec<ContextCallback>,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("context_lost", &self.context_lost)
            .field("pipelines", &self.pipelines.names())
            .field("current_pipeline", &self.current_pipeline)
            .field("current_blend", &self.current_blend)
            .finish_non_exhaustive()
    }
}

impl Renderer {
    /// Validate `config`, then build every default resource on `gl`.
    pub fn new(gl: Box<dyn GlContext>, config: RendererConfig) -> Result<Self> {
        config.validate()?;
        if gl.is_context_lost() {
            return Err(RenderError::ContextUnavailable);
        }

        let width = (config.width as f32 * config.resolution).floor() as u32;
        let height = (config.height as f32 * config.resolution).floor() as u32;
        let mut renderer = Self {
            gl,
            config,
            width,
            height,
            context_lost: false,
            destroyed: false,
            state: GpuBindingState::default(),
            blend_modes: BlendModes::new(),
            current_blend: None,
            pipelines: PipelineRegistry::new(),
            current_pipeline: None,
            blank_texture: None,
            native_textures: Vec::new(),
            framebuffer_renderbuffers: HashMap::new(),
            supported_extensions: Vec::new(),
            enabled_extensions: Vec::new(),
            max_textures: 0,
            max_texture_size: 0,
            snapshot_request: None,
            lost_callbacks: Vec::new(),
            restored_callbacks: Vec::new(),
        };
        renderer.init()?;
        Ok(renderer)
    }

    /// (Re)build GPU state and the default pipelines on the current context.
    fn init(&mut self) -> Result<()> {
        self.supported_extensions = self.gl.supported_extensions();
        self.enabled_extensions.clear();

        let gpu_units = self.gl.max_texture_units();
        self.max_textures = match self.config.max_textures {
            0 => gpu_units,
            n => n.min(gpu_units),
        };
        let gpu_size = self.gl.max_texture_size();
        self.max_texture_size = match self.config.max_texture_size {
            0 => gpu_size,
            n => n.min(gpu_size),
        };

        self.state = GpuBindingState::new(self.max_textures);
        self.state.scissor = ScissorState::new(self.width as i32, self.height as i32);
        self.current_blend = None;
        self.current_pipeline = None;

        self.gl.disable(Capability::DepthTest);
        self.gl.disable(Capability::CullFace);
        self.gl.enable(Capability::Blend);
        let [r, g, b, a] = self.config.clear_color();
        self.gl.clear_color(r, g, b, a);

        let blank = self.create_texture_2d(1, 1, Some(&[255, 255, 255, 255]), TextureOptions::default())?;
        self.blank_texture = Some(blank);

        self.add_default_pipelines()?;
        self.boot();

        self.resize(self.config.width, self.config.height);
        self.set_blend_mode(BlendModeId::NORMAL);

        info!(
            "renderer ready: {}x{} @{}x, {} texture units, max texture {}",
            self.width, self.height, self.config.resolution, self.max_textures, self.max_texture_size
        );
        Ok(())
    }

    fn add_default_pipelines(&mut self) -> Result<()> {
        let texture_tint = TextureTintPipeline::new(self)?;
        self.add_pipeline(TEXTURE_TINT, Box::new(texture_tint));
        let flat_tint = FlatTintPipeline::new(self)?;
        self.add_pipeline(FLAT_TINT, Box::new(flat_tint));
        let bitmap_mask = BitmapMaskPipeline::new(self)?;
        self.add_pipeline(BITMAP_MASK, Box::new(bitmap_mask));
        let light = ForwardDiffuseLightPipeline::new(self)?;
        self.add_pipeline(LIGHT_2D, Box::new(light));
        Ok(())
    }

    /// Run every pipeline's boot hook.
    pub fn boot(&mut self) {
        self.each_pipeline(|pipeline, renderer| pipeline.boot(renderer));
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn gl(&self) -> &dyn GlContext {
        self.gl.as_ref()
    }

    pub fn gl_mut(&mut self) -> &mut dyn GlContext {
        self.gl.as_mut()
    }

    pub fn state(&self) -> &GpuBindingState {
        &self.state
    }

    pub fn is_context_lost(&self) -> bool {
        self.context_lost
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn blank_texture(&self) -> Option<TextureId> {
        self.blank_texture
    }

    pub fn get_max_textures(&self) -> u32 {
        self.max_textures
    }

    pub fn get_max_texture_size(&self) -> u32 {
        self.max_texture_size
    }

    pub fn current_pipeline_name(&self) -> Option<&str> {
        self.current_pipeline.as_deref()
    }

    pub fn current_blend_mode(&self) -> Option<BlendModeId> {
        self.current_blend
    }

    pub fn blend_modes(&self) -> &BlendModes {
        &self.blend_modes
    }

    // ── Extensions ────────────────────────────────────────────────────────

    pub fn supported_extensions(&self) -> &[String] {
        &self.supported_extensions
    }

    pub fn has_extension(&self, name: &str) -> bool {
        self.supported_extensions.iter().any(|e| e == name)
    }

    /// Enable an extension. `false` if the context does not offer it.
    pub fn get_extension(&mut self, name: &str) -> bool {
        if !self.has_extension(name) {
            return false;
        }
        if self.enabled_extensions.iter().any(|e| e == name) {
            return true;
        }
        let enabled = self.gl.get_extension(name);
        if enabled {
            self.enabled_extensions.push(name.to_string());
        }
        enabled
    }

    // ── Pipelines ─────────────────────────────────────────────────────────

    /// Register a pipeline. A name that is already taken keeps its pipeline;
    /// the new one is destroyed and `false` is returned.
    pub fn add_pipeline(&mut self, name: &str, pipeline: Box<dyn Pipeline>) -> bool {
        match self.pipelines.insert(name, pipeline) {
            Ok(()) => {
                debug!("pipeline '{name}' registered");
                true
            }
            Err(mut rejected) => {
                warn!("pipeline '{name}' already exists");
                rejected.destroy(self);
                false
            }
        }
    }

    pub fn has_pipeline(&self, name: &str) -> bool {
        self.pipelines.contains(name)
    }

    pub fn get_pipeline(&self, name: &str) -> Option<&dyn Pipeline> {
        self.pipelines.get(name)
    }

    pub fn get_pipeline_mut(&mut self, name: &str) -> Option<&mut (dyn Pipeline + 'static)> {
        self.pipelines.get_mut(name)
    }

    pub fn pipeline_names(&self) -> Vec<String> {
        self.pipelines.names()
    }

    /// Unregister a pipeline and hand it back. The caller owns its GPU
    /// resources from here on.
    pub fn remove_pipeline(&mut self, name: &str) -> Option<Box<dyn Pipeline>> {
        if self.current_pipeline.as_deref() == Some(name) {
            self.flush();
            self.current_pipeline = None;
        }
        let removed = self.pipelines.remove(name);
        if removed.is_some() {
            debug!("pipeline '{name}' removed");
        }
        removed
    }

    /// Run `f` with the named pipeline lifted out of the registry. `None`
    /// when the pipeline is unknown or already running further up the stack.
    pub fn with_pipeline<R>(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut dyn Pipeline, &mut Renderer) -> R,
    ) -> Option<R> {
        let mut pipeline = self.pipelines.take(name)?;
        let result = f(pipeline.as_mut(), self);
        if let Some(mut orphan) = self.pipelines.restore(name, pipeline) {
            // Removed while it was running.
            orphan.destroy(self);
        }
        Some(result)
    }

    /// `with_pipeline` for a concrete pipeline type.
    pub fn with_pipeline_as<T: Pipeline, R>(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut T, &mut Renderer) -> R,
    ) -> Option<R> {
        self.with_pipeline(name, |pipeline, renderer| {
            match pipeline.as_any_mut().downcast_mut::<T>() {
                Some(concrete) => Some(f(concrete, renderer)),
                None => {
                    warn!("pipeline '{name}' is not a {}", std::any::type_name::<T>());
                    None
                }
            }
        })
        .flatten()
    }

    /// Call `f` on every registered pipeline, in registration order.
    pub fn each_pipeline(&mut self, mut f: impl FnMut(&mut dyn Pipeline, &mut Renderer)) {
        for name in self.pipelines.names() {
            self.with_pipeline(&name, |pipeline, renderer| f(pipeline, renderer));
        }
    }

    /// Make `pipeline` current. Rebinds only when the pipeline, its program
    /// or its vertex buffer differ from what the GPU has bound; `on_bind`
    /// runs every time.
    pub fn set_pipeline(&mut self, pipeline: &mut dyn Pipeline, object: Option<&dyn Renderable>) {
        let core = pipeline.core();
        let is_current = self.current_pipeline.as_deref() == Some(core.name.as_str());
        let bound = is_current
            && self.state.program == Some(core.program)
            && self.state.vertex_buffer == Some(core.vertex_buffer);

        if !bound {
            if is_current {
                // Lifted out of the registry, so `flush` cannot reach it.
                pipeline.flush(self);
            } else {
                self.flush();
            }
            self.current_pipeline = Some(pipeline.name().to_string());
            pipeline.bind(self);
        }
        pipeline.on_bind(self, object);
    }

    /// `set_pipeline` by registry name. `false` if the name is unknown.
    pub fn set_pipeline_by_name(&mut self, name: &str, object: Option<&dyn Renderable>) -> bool {
        self.with_pipeline(name, |pipeline, renderer| renderer.set_pipeline(pipeline, object))
            .is_some()
    }

    /// Draw whatever the current pipeline has batched.
    pub fn flush(&mut self) {
        if let Some(name) = self.current_pipeline.clone() {
            self.with_pipeline(&name, |pipeline, renderer| pipeline.flush(renderer));
        }
    }

    // ── Bindings ──────────────────────────────────────────────────────────

    pub fn set_texture_2d(&mut self, texture: Option<TextureId>, unit: u32) {
        if unit >= self.state.texture_units() {
            warn!("texture unit {unit} out of range (max {})", self.state.texture_units());
            return;
        }
        if self.state.texture(unit) == texture {
            return;
        }
        self.flush();
        if self.state.active_unit != unit {
            self.gl.active_texture(unit);
            self.state.active_unit = unit;
        }
        self.gl.bind_texture(texture);
        self.state.textures[unit as usize] = texture;
    }

    /// Bind the 1x1 white texture to unit 0 unless unit 0 is already active
    /// with something bound.
    pub fn set_blank_texture(&mut self, force: bool) {
        if force || self.state.active_unit != 0 || self.state.texture(0).is_none() {
            self.set_texture_2d(self.blank_texture, 0);
        }
    }

    pub fn set_program(&mut self, program: Option<ProgramId>) {
        if self.state.program == program {
            return;
        }
        self.flush();
        self.gl.use_program(program);
        self.state.program = program;
    }

    pub fn set_vertex_buffer(&mut self, buffer: Option<BufferId>) {
        if self.state.vertex_buffer == buffer {
            return;
        }
        self.flush();
        self.gl.bind_buffer(BufferTarget::Array, buffer);
        self.state.vertex_buffer = buffer;
    }

    pub fn set_index_buffer(&mut self, buffer: Option<BufferId>) {
        if self.state.index_buffer == buffer {
            return;
        }
        self.flush();
        self.gl.bind_buffer(BufferTarget::ElementArray, buffer);
        self.state.index_buffer = buffer;
    }

    /// Bind a framebuffer, or the default one for `None`.
    pub fn set_framebuffer(&mut self, framebuffer: Option<FramebufferId>) {
        if self.state.framebuffer == framebuffer {
            return;
        }
        self.flush();
        self.gl.bind_framebuffer(framebuffer);
        self.state.framebuffer = framebuffer;
    }

    // ── Blend modes ───────────────────────────────────────────────────────

    /// Switch blend state. Returns whether anything was issued.
    pub fn set_blend_mode(&mut self, id: BlendModeId) -> bool {
        if id == BlendModeId::SKIP_CHECK || self.current_blend == Some(id) {
            return false;
        }
        let mode = match self.blend_modes.get(id) {
            Some(mode) => *mode,
            None => {
                warn!("blend mode {id:?} does not exist, using NORMAL");
                match self.blend_modes.get(BlendModeId::NORMAL) {
                    Some(mode) => *mode,
                    None => return false,
                }
            }
        };

        self.flush();
        self.gl.enable(Capability::Blend);
        self.gl.blend_equation(mode.equation);
        match mode.func {
            BlendFunc::Combined { src, dst } => self.gl.blend_func(src, dst),
            BlendFunc::Separate { src_rgb, dst_rgb, src_alpha, dst_alpha } => {
                self.gl.blend_func_separate(src_rgb, dst_rgb, src_alpha, dst_alpha)
            }
        }
        self.current_blend = Some(id);
        true
    }

    pub fn add_blend_mode(&mut self, func: BlendFunc, equation: BlendEquation) -> BlendModeId {
        self.blend_modes.add(BlendMode { func, equation })
    }

    pub fn update_blend_mode(&mut self, id: BlendModeId, func: BlendFunc, equation: BlendEquation) -> bool {
        let updated = self.blend_modes.update(id, BlendMode { func, equation });
        if updated && self.current_blend == Some(id) {
            // Force the next set_blend_mode to re-issue.
            self.current_blend = None;
        }
        updated
    }

    pub fn remove_blend_mode(&mut self, id: BlendModeId) -> bool {
        let removed = self.blend_modes.remove(id);
        if removed && self.current_blend == Some(id) {
            self.current_blend = None;
        }
        removed
    }

    // ── Scissor ───────────────────────────────────────────────────────────

    /// Save the current scissor and apply a new one. Coordinates are
    /// drawing-buffer pixels, top-left origin.
    pub fn push_scissor(&mut self, x: i32, y: i32, width: i32, height: i32) -> bool {
        if !self.state.scissor.push() {
            warn!("scissor stack overflow, ignoring push");
            return false;
        }
        self.set_scissor(x, y, width, height);
        true
    }

    pub fn pop_scissor(&mut self) {
        match self.state.scissor.pop() {
            Some([x, y, width, height]) => self.set_scissor(x, y, width, height),
            None => warn!("scissor stack underflow"),
        }
    }

    pub fn set_scissor(&mut self, x: i32, y: i32, width: i32, height: i32) {
        let rect = [x, y, width, height];
        if self.state.scissor.current != rect {
            self.flush();
            self.state.scissor.current = rect;
        }

        let full = [0, 0, self.width as i32, self.height as i32];
        if rect == full {
            if self.state.scissor.enabled {
                self.gl.disable(Capability::ScissorTest);
                self.state.scissor.enabled = false;
            }
            return;
        }

        if !self.state.scissor.enabled {
            self.gl.enable(Capability::ScissorTest);
            self.state.scissor.enabled = true;
        }
        if width > 0 && height > 0 {
            let flipped = [x, self.height as i32 - y - height, width, height];
            if self.state.scissor.last_issued != Some(flipped) {
                let [fx, fy, fw, fh] = flipped;
                self.gl.scissor(fx, fy, fw, fh);
                self.state.scissor.last_issued = Some(flipped);
            }
        }
    }

    // ── Resize ────────────────────────────────────────────────────────────

    /// Resize to a new game size. The drawing buffer becomes
    /// `size * resolution`.
    pub fn resize(&mut self, width: u32, height: u32) {
        let resolution = self.config.resolution;
        self.config.width = width;
        self.config.height = height;
        self.width = (width as f32 * resolution).floor() as u32;
        self.height = (height as f32 * resolution).floor() as u32;

        self.gl.set_drawing_buffer_size(self.width, self.height);
        self.gl.viewport(0, 0, self.width as i32, self.height as i32);

        self.each_pipeline(|pipeline, _| pipeline.resize(width as f32, height as f32, resolution));

        let (w, h) = (self.width as i32, self.height as i32);
        self.state.scissor.current = [0, 0, w, h];
        self.gl.scissor(0, 0, w, h);
        self.state.scissor.last_issued = Some([0, 0, w, h]);
        if self.state.scissor.enabled {
            self.gl.disable(Capability::ScissorTest);
            self.state.scissor.enabled = false;
        }
        debug!("resized to {}x{}", self.width, self.height);
    }

    // ── Frame ─────────────────────────────────────────────────────────────

    pub fn pre_render(&mut self) {
        if self.destroyed {
            return;
        }
        if !self.context_lost && self.gl.is_context_lost() {
            self.on_context_lost();
        }
        if self.context_lost {
            return;
        }

        let [r, g, b, a] = self.config.clear_color();
        self.gl.clear_color(r, g, b, a);
        if self.config.clear_before_render {
            self.gl.clear(ClearMask::ALL);
        }

        self.each_pipeline(|pipeline, renderer| pipeline.on_pre_render(renderer));
    }

    /// Draw `children` through `camera`, in order.
    pub fn render(&mut self, scene: &Scene, children: &[&dyn Renderable], interpolation: f32, camera: &mut Camera) {
        if self.context_lost || self.destroyed {
            return;
        }

        {
            let camera: &Camera = camera;
            self.each_pipeline(|pipeline, renderer| pipeline.on_render(renderer, scene, camera));
        }

        self.pre_render_camera(camera);

        for child in children {
            if !child.will_render(camera) {
                continue;
            }

            let blend = child.blend_mode();
            if self.current_blend != Some(blend) {
                self.set_blend_mode(blend);
            }

            let mask = child.mask();
            if let Some(mask) = mask {
                mask.pre_render_webgl(self, *child, camera);
            }

            child.render_webgl(self, camera, interpolation);

            if let Some(mask) = mask {
                mask.post_render_webgl(self, camera);
            }
        }

        self.flush();
        self.set_blend_mode(BlendModeId::NORMAL);
        self.post_render_camera(camera);
    }

    fn camera_viewport(&self, camera: &Camera) -> [i32; 4] {
        let resolution = self.config.resolution;
        [
            (camera.x * resolution).floor() as i32,
            (camera.y * resolution).floor() as i32,
            (camera.width() * resolution).floor() as i32,
            (camera.height() * resolution).floor() as i32,
        ]
    }

    /// Clip to the camera's viewport and paint its background.
    pub fn pre_render_camera(&mut self, camera: &Camera) {
        let [x, y, width, height] = self.camera_viewport(camera);
        self.push_scissor(x, y, width, height);

        let background = camera.background_color;
        if camera.transparent || background.is_transparent() {
            return;
        }
        let tint = Self::overlay_tint(background, background.alpha_gl());
        self.with_pipeline_as::<FlatTintPipeline, _>(FLAT_TINT, |flat, renderer| {
            flat.fill_rect(renderer, x as f32, y as f32, width as f32, height as f32, tint);
            flat.flush(renderer);
        });
    }

    /// Draw flash and fade overlays, then restore the scissor.
    pub fn post_render_camera(&mut self, camera: &mut Camera) {
        let overlays: Vec<(Color, f32)> =
            [camera.flash_effect.overlay(), camera.fade_effect.overlay()].into_iter().flatten().collect();

        if !overlays.is_empty() {
            let [x, y, width, height] = self.camera_viewport(camera);
            self.with_pipeline_as::<FlatTintPipeline, _>(FLAT_TINT, |flat, renderer| {
                for (color, alpha) in overlays {
                    let tint = Self::overlay_tint(color, alpha);
                    flat.fill_rect(renderer, x as f32, y as f32, width as f32, height as f32, tint);
                }
                flat.flush(renderer);
            });
        }

        camera.dirty = false;
        self.pop_scissor();
    }

    fn overlay_tint(color: Color, alpha: f32) -> u32 {
        let [r, g, b, _] = color.gl();
        get_tint_append_float_alpha(get_tint_from_floats(r, g, b, 1.0), alpha)
    }

    pub fn post_render(&mut self) {
        if self.context_lost || self.destroyed {
            return;
        }
        self.flush();

        if let Some(request) = self.snapshot_request.take() {
            let result = snapshot::capture(self.gl.as_mut(), request.kind, request.quality);
            if let Ok(shot) = &result {
                debug!("snapshot captured: {}x{} {}", shot.width, shot.height, shot.kind.mime());
            }
            (request.callback)(result);
        }

        self.each_pipeline(|pipeline, renderer| pipeline.on_post_render(renderer));
    }

    /// Capture the drawing buffer at the end of the current frame. A later
    /// request replaces a pending one.
    pub fn snapshot(&mut self, callback: SnapshotCallback, kind: ImageKind, quality: f32) {
        self.snapshot_request = Some(SnapshotRequest { callback, kind, quality });
    }

    pub fn has_pending_snapshot(&self) -> bool {
        self.snapshot_request.is_some()
    }

    // ── Context loss ──────────────────────────────────────────────────────

    pub fn on_context_lost_callback(&mut self, callback: ContextCallback) {
        self.lost_callbacks.push(callback);
    }

    pub fn on_context_restored_callback(&mut self, callback: ContextCallback) {
        self.restored_callbacks.push(callback);
    }

    /// Stop issuing GPU work until the context comes back.
    pub fn on_context_lost(&mut self) {
        if self.context_lost {
            return;
        }
        self.context_lost = true;
        info!("WebGL context lost");

        let mut callbacks = std::mem::take(&mut self.lost_callbacks);
        for callback in &mut callbacks {
            callback(self);
        }
        callbacks.append(&mut self.lost_callbacks);
        self.lost_callbacks = callbacks;
    }

    /// Rebuild every GPU resource the renderer owns on the restored context.
    ///
    /// Default pipelines are recreated. Custom pipelines held handles into
    /// the dead context and are dropped; re-add them from a restore callback.
    pub fn on_context_restored(&mut self) -> Result<()> {
        if !self.context_lost {
            return Ok(());
        }
        if self.gl.is_context_lost() {
            return Err(RenderError::ContextLost);
        }

        for (name, _) in self.pipelines.drain() {
            if !DEFAULT_PIPELINES.contains(&name.as_str()) {
                warn!("pipeline '{name}' was dropped with the lost context");
            }
        }
        self.native_textures.clear();
        self.framebuffer_renderbuffers.clear();
        self.blank_texture = None;

        self.context_lost = false;
        self.init()?;
        info!("WebGL context restored");

        let mut callbacks = std::mem::take(&mut self.restored_callbacks);
        for callback in &mut callbacks {
            callback(self);
        }
        callbacks.append(&mut self.restored_callbacks);
        self.restored_callbacks = callbacks;
        Ok(())
    }

    // ── Resource factories ────────────────────────────────────────────────

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderId> {
        let shader = self
            .gl
            .create_shader(stage)
            .ok_or(RenderError::ResourceCreation("shader"))?;
        self.gl.shader_source(shader, source);
        self.gl.compile_shader(shader);
        if !self.gl.shader_compile_status(shader) {
            let log = self.gl.shader_info_log(shader);
            self.gl.delete_shader(shader);
            return Err(RenderError::ShaderCompile { stage, log });
        }
        Ok(shader)
    }

    /// Compile and link a program.
    pub fn create_program(&mut self, vertex_source: &str, fragment_source: &str) -> Result<ProgramId> {
        let vs = self.compile_shader(ShaderStage::Vertex, vertex_source)?;
        let fs = match self.compile_shader(ShaderStage::Fragment, fragment_source) {
            Ok(fs) => fs,
            Err(e) => {
                self.gl.delete_shader(vs);
                return Err(e);
            }
        };

        let Some(program) = self.gl.create_program() else {
            self.gl.delete_shader(vs);
            self.gl.delete_shader(fs);
            return Err(RenderError::ResourceCreation("program"));
        };
        self.gl.attach_shader(program, vs);
        self.gl.attach_shader(program, fs);
        self.gl.link_program(program);
        self.gl.delete_shader(vs);
        self.gl.delete_shader(fs);

        if !self.gl.program_link_status(program) {
            let log = self.gl.program_info_log(program);
            self.gl.delete_program(program);
            return Err(RenderError::ProgramLink(log));
        }
        Ok(program)
    }

    /// Dynamic-size vertex buffer with `size` bytes of storage.
    pub fn create_vertex_buffer(&mut self, size: usize, usage: BufferUsage) -> Result<BufferId> {
        let buffer = self
            .gl
            .create_buffer()
            .ok_or(RenderError::ResourceCreation("vertex buffer"))?;
        self.set_vertex_buffer(Some(buffer));
        self.gl.buffer_data_size(BufferTarget::Array, size, usage);
        self.set_vertex_buffer(None);
        Ok(buffer)
    }

    /// Vertex buffer initialised with `data`.
    pub fn create_vertex_buffer_with(&mut self, data: &[u8], usage: BufferUsage) -> Result<BufferId> {
        let buffer = self
            .gl
            .create_buffer()
            .ok_or(RenderError::ResourceCreation("vertex buffer"))?;
        self.set_vertex_buffer(Some(buffer));
        self.gl.buffer_data(BufferTarget::Array, data, usage);
        self.set_vertex_buffer(None);
        Ok(buffer)
    }

    pub fn create_index_buffer(&mut self, data: &[u8], usage: BufferUsage) -> Result<BufferId> {
        let buffer = self
            .gl
            .create_buffer()
            .ok_or(RenderError::ResourceCreation("index buffer"))?;
        self.set_index_buffer(Some(buffer));
        self.gl.buffer_data(BufferTarget::ElementArray, data, usage);
        self.set_index_buffer(None);
        Ok(buffer)
    }

    /// Allocate an RGBA8 texture. `pixels`, when given, must hold
    /// `width * height * 4` bytes.
    pub fn create_texture_2d(
        &mut self,
        width: u32,
        height: u32,
        pixels: Option<&[u8]>,
        options: TextureOptions,
    ) -> Result<TextureId> {
        self.check_texture_upload(width, height, pixels)?;

        let texture = self
            .gl
            .create_texture()
            .ok_or(RenderError::ResourceCreation("texture"))?;
        self.set_texture_2d(Some(texture), 0);
        self.gl.tex_filter(options.min_filter, options.mag_filter);
        self.gl.tex_wrap(options.wrap_s, options.wrap_t);
        self.gl.pixel_store_premultiply_alpha(options.premultiply_alpha);
        self.gl.tex_image_2d(width, height, pixels);
        self.set_texture_2d(None, 0);

        self.native_textures.push(texture);
        Ok(texture)
    }

    /// Upload RGBA pixels. Non-power-of-two sizes are forced to clamp, as
    /// WebGL 1 cannot repeat them.
    pub fn create_texture_from_source(
        &mut self,
        width: u32,
        height: u32,
        pixels: &[u8],
        filter: TextureFilter,
        repeat: bool,
    ) -> Result<TextureId> {
        let mut options = TextureOptions::filtered(filter);
        if repeat && width.is_power_of_two() && height.is_power_of_two() {
            options.wrap_s = TextureWrap::Repeat;
            options.wrap_t = TextureWrap::Repeat;
        }
        self.create_texture_2d(width, height, Some(pixels), options)
    }

    /// Copy canvas pixels into `target`, or into a new texture when `None`.
    pub fn canvas_to_texture(
        &mut self,
        width: u32,
        height: u32,
        pixels: &[u8],
        target: Option<TextureId>,
    ) -> Result<TextureId> {
        let Some(texture) = target else {
            return self.create_texture_2d(width, height, Some(pixels), TextureOptions::default());
        };
        self.check_texture_upload(width, height, Some(pixels))?;
        self.set_texture_2d(Some(texture), 0);
        self.gl.pixel_store_premultiply_alpha(true);
        self.gl.tex_image_2d(width, height, Some(pixels));
        self.set_texture_2d(None, 0);
        Ok(texture)
    }

    fn check_texture_upload(&self, width: u32, height: u32, pixels: Option<&[u8]>) -> Result<()> {
        if self.max_texture_size > 0 && (width > self.max_texture_size || height > self.max_texture_size) {
            return Err(RenderError::ResourceCreation("texture (exceeds max texture size)"));
        }
        let len = rgba_byte_len(width, height)
            .ok_or(RenderError::ResourceCreation("texture (size overflows)"))?;
        match pixels {
            Some(pixels) if pixels.len() != len => {
                Err(RenderError::ResourceCreation("texture (pixel data does not match size)"))
            }
            _ => Ok(()),
        }
    }

    pub fn set_texture_filter(&mut self, texture: TextureId, filter: TextureFilter) {
        self.set_texture_2d(Some(texture), 0);
        self.gl.tex_filter(filter, filter);
        self.set_texture_2d(None, 0);
    }

    /// Render target backed by `texture`, optionally with a depth/stencil
    /// attachment.
    pub fn create_framebuffer(
        &mut self,
        width: u32,
        height: u32,
        texture: TextureId,
        depth_stencil: bool,
    ) -> Result<FramebufferId> {
        let framebuffer = self
            .gl
            .create_framebuffer()
            .ok_or(RenderError::ResourceCreation("framebuffer"))?;
        self.set_framebuffer(Some(framebuffer));

        let mut renderbuffer = None;
        if depth_stencil {
            match self.gl.create_renderbuffer() {
                Some(rb) => {
                    self.gl.bind_renderbuffer(Some(rb));
                    self.gl.renderbuffer_storage_depth_stencil(width, height);
                    self.gl.framebuffer_renderbuffer_depth_stencil(Some(rb));
                    renderbuffer = Some(rb);
                }
                None => {
                    self.set_framebuffer(None);
                    self.gl.delete_framebuffer(framebuffer);
                    return Err(RenderError::ResourceCreation("renderbuffer"));
                }
            }
        }

        self.gl.framebuffer_texture_2d(Some(texture));
        let status = self.gl.check_framebuffer_status();
        self.set_framebuffer(None);

        if status != FramebufferStatus::Complete {
            if let Some(rb) = renderbuffer {
                self.gl.delete_renderbuffer(rb);
            }
            self.gl.delete_framebuffer(framebuffer);
            return Err(RenderError::FramebufferIncomplete(status));
        }
        if let Some(rb) = renderbuffer {
            self.framebuffer_renderbuffers.insert(framebuffer, rb);
        }
        Ok(framebuffer)
    }

    pub fn delete_texture(&mut self, texture: TextureId) {
        self.gl.delete_texture(texture);
        self.state.forget_texture(texture);
        self.native_textures.retain(|t| *t != texture);
    }

    pub fn delete_framebuffer(&mut self, framebuffer: FramebufferId) {
        if self.state.framebuffer == Some(framebuffer) {
            self.set_framebuffer(None);
        }
        if let Some(rb) = self.framebuffer_renderbuffers.remove(&framebuffer) {
            self.gl.delete_renderbuffer(rb);
        }
        self.gl.delete_framebuffer(framebuffer);
    }

    pub fn delete_program(&mut self, program: ProgramId) {
        if self.state.program == Some(program) {
            self.state.program = None;
        }
        self.gl.delete_program(program);
    }

    pub fn delete_buffer(&mut self, buffer: BufferId) {
        if self.state.vertex_buffer == Some(buffer) {
            self.state.vertex_buffer = None;
        }
        if self.state.index_buffer == Some(buffer) {
            self.state.index_buffer = None;
        }
        self.gl.delete_buffer(buffer);
    }

    // ── Uniforms ──────────────────────────────────────────────────────────

    fn uniform(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        self.set_program(Some(program));
        self.gl.uniform_location(program, name)
    }

    pub fn set_float1(&mut self, program: ProgramId, name: &str, x: f32) {
        if let Some(loc) = self.uniform(program, name) {
            self.gl.uniform1f(loc, x);
        }
    }

    pub fn set_float2(&mut self, program: ProgramId, name: &str, x: f32, y: f32) {
        if let Some(loc) = self.uniform(program, name) {
            self.gl.uniform2f(loc, x, y);
        }
    }

    pub fn set_float3(&mut self, program: ProgramId, name: &str, x: f32, y: f32, z: f32) {
        if let Some(loc) = self.uniform(program, name) {
            self.gl.uniform3f(loc, x, y, z);
        }
    }

    pub fn set_float4(&mut self, program: ProgramId, name: &str, x: f32, y: f32, z: f32, w: f32) {
        if let Some(loc) = self.uniform(program, name) {
            self.gl.uniform4f(loc, x, y, z, w);
        }
    }

    pub fn set_int1(&mut self, program: ProgramId, name: &str, x: i32) {
        if let Some(loc) = self.uniform(program, name) {
            self.gl.uniform1i(loc, x);
        }
    }

    pub fn set_int2(&mut self, program: ProgramId, name: &str, x: i32, y: i32) {
        if let Some(loc) = self.uniform(program, name) {
            self.gl.uniform2i(loc, x, y);
        }
    }

    pub fn set_int3(&mut self, program: ProgramId, name: &str, x: i32, y: i32, z: i32) {
        if let Some(loc) = self.uniform(program, name) {
            self.gl.uniform3i(loc, x, y, z);
        }
    }

    pub fn set_int4(&mut self, program: ProgramId, name: &str, x: i32, y: i32, z: i32, w: i32) {
        if let Some(loc) = self.uniform(program, name) {
            self.gl.uniform4i(loc, x, y, z, w);
        }
    }

    pub fn set_matrix2(&mut self, program: ProgramId, name: &str, transpose: bool, matrix: &[f32; 4]) {
        if let Some(loc) = self.uniform(program, name) {
            self.gl.uniform_matrix2fv(loc, transpose, matrix);
        }
    }

    pub fn set_matrix3(&mut self, program: ProgramId, name: &str, transpose: bool, matrix: &[f32; 9]) {
        if let Some(loc) = self.uniform(program, name) {
            self.gl.uniform_matrix3fv(loc, transpose, matrix);
        }
    }

    pub fn set_matrix4(&mut self, program: ProgramId, name: &str, transpose: bool, matrix: &[f32; 16]) {
        if let Some(loc) = self.uniform(program, name) {
            self.gl.uniform_matrix4fv(loc, transpose, matrix);
        }
    }

    // ── Teardown ──────────────────────────────────────────────────────────

    /// Release every pipeline and texture. The renderer does nothing after
    /// this.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        for (_, mut pipeline) in self.pipelines.drain() {
            pipeline.destroy(self);
        }
        self.current_pipeline = None;
        for texture in std::mem::take(&mut self.native_textures) {
            self.gl.delete_texture(texture);
        }
        for (framebuffer, renderbuffer) in std::mem::take(&mut self.framebuffer_renderbuffers) {
            self.gl.delete_renderbuffer(renderbuffer);
            self.gl.delete_framebuffer(framebuffer);
        }
        self.blank_texture = None;
        self.snapshot_request = None;
        self.lost_callbacks.clear();
        self.restored_callbacks.clear();
        self.destroyed = true;
        debug!("renderer destroyed");
    }
}
