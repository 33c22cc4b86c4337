//! Scripted stand-ins for the driver, the GL entry points and the camera producer.

use std::collections::HashMap;
use std::ffi::{CStr, c_void};
use std::ptr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::{Condvar, Mutex};

use crate::egl::{
    ApiVersion, EGL_CONTEXT_CLIENT_VERSION, EGL_OPENGL_ES3_BIT_KHR, EGL_RENDERABLE_TYPE,
    EGL_SUCCESS, EGLint, EglApi, EglConfig, EglContext, EglDisplay, EglSurface, NativeWindow,
};
use crate::error::{RenderError, SessionError};
use crate::gles::GlesApi;
use crate::platform::GpuPlatform;
use crate::renderer::{Renderer, SurfaceSize};
use crate::session::{FrameNotifier, SurfaceTextureListener, TextureReady};
use crate::texture::{ExternalTexture, FrameSource};

const EGL_BAD_CONFIG: EGLint = 0x3005;
const EGL_BAD_MATCH: EGLint = 0x3009;
const EGL_BAD_NATIVE_WINDOW: EGLint = 0x300B;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn handle(id: usize) -> *mut c_void {
    ptr::without_provenance_mut(id)
}

pub fn fake_window() -> NativeWindow {
    // SAFETY: never dereferenced; the fakes only compare addresses.
    unsafe { NativeWindow::from_raw(handle(0x7000)) }.expect("non-null")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EglCall {
    GetDisplay,
    Initialize,
    ChooseConfig(ApiVersion),
    CreateContext(ApiVersion),
    QueryContext,
    CreateWindowSurface,
    MakeCurrent { bind: bool },
    SwapInterval,
    SwapBuffers,
    DestroySurface,
    DestroyContext,
    Terminate,
    ReleaseThread,
}

/// Holds a fake call until the test opens it. Once open it stays open.
#[derive(Clone, Default)]
pub struct Gate {
    inner: Arc<(Mutex<GateState>, Condvar)>,
}

#[derive(Default)]
struct GateState {
    open: bool,
    entered: usize,
}

impl Gate {
    pub fn open(&self) {
        self.inner.0.lock().open = true;
        self.inner.1.notify_all();
    }

    /// Number of calls that have reached the gate so far.
    pub fn entered(&self) -> usize {
        self.inner.0.lock().entered
    }

    fn wait(&self) {
        let mut state = self.inner.0.lock();
        state.entered += 1;
        while !state.open {
            self.inner.1.wait(&mut state);
        }
    }
}

struct EglState {
    calls: Vec<EglCall>,
    error: EGLint,
    next_handle: usize,
    failing_config: Vec<ApiVersion>,
    failing_context: Vec<ApiVersion>,
    fail_window_surface: bool,
    make_current_ok: bool,
    swap_ok: bool,
    teardown_ok: bool,
    contexts: Vec<(usize, EGLint)>,
    surfaces: Vec<usize>,
    init_gate: Option<Gate>,
}

pub struct FakeEgl {
    state: Mutex<EglState>,
}

impl Default for FakeEgl {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeEgl {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(EglState {
                calls: Vec::new(),
                error: EGL_SUCCESS,
                next_handle: 0x100,
                failing_config: Vec::new(),
                failing_context: Vec::new(),
                fail_window_surface: false,
                make_current_ok: true,
                swap_ok: true,
                teardown_ok: true,
                contexts: Vec::new(),
                surfaces: Vec::new(),
                init_gate: None,
            }),
        }
    }

    pub fn failing_config(self, version: ApiVersion) -> Self {
        self.state.lock().failing_config.push(version);
        self
    }

    pub fn failing_context(self, version: ApiVersion) -> Self {
        self.state.lock().failing_context.push(version);
        self
    }

    pub fn failing_window_surface(self) -> Self {
        self.state.lock().fail_window_surface = true;
        self
    }

    pub fn block_initialize(&self) -> Gate {
        let gate = Gate::default();
        self.state.lock().init_gate = Some(gate.clone());
        gate
    }

    pub fn set_make_current_ok(&self, ok: bool) {
        self.state.lock().make_current_ok = ok;
    }

    pub fn set_swap_ok(&self, ok: bool) {
        self.state.lock().swap_ok = ok;
    }

    pub fn set_teardown_ok(&self, ok: bool) {
        self.state.lock().teardown_ok = ok;
    }

    pub fn calls(&self) -> Vec<EglCall> {
        self.state.lock().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&EglCall) -> bool) -> usize {
        self.state.lock().calls.iter().filter(|c| pred(c)).count()
    }

    pub fn config_attempts(&self) -> Vec<ApiVersion> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                EglCall::ChooseConfig(v) => Some(v),
                _ => None,
            })
            .collect()
    }

    pub fn context_attempts(&self) -> Vec<ApiVersion> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                EglCall::CreateContext(v) => Some(v),
                _ => None,
            })
            .collect()
    }

    pub fn live_contexts(&self) -> Vec<usize> {
        self.state.lock().contexts.iter().map(|(id, _)| *id).collect()
    }

    pub fn live_surfaces(&self) -> Vec<usize> {
        self.state.lock().surfaces.clone()
    }

    fn record(&self, call: EglCall) -> parking_lot::MutexGuard<'_, EglState> {
        let mut state = self.state.lock();
        state.calls.push(call);
        state
    }
}

fn attribute(attributes: &[EGLint], key: EGLint) -> Option<EGLint> {
    attributes
        .chunks(2)
        .find(|pair| pair[0] == key)
        .and_then(|pair| pair.get(1).copied())
}

impl EglApi for FakeEgl {
    fn get_display(&self) -> Option<EglDisplay> {
        let _ = self.record(EglCall::GetDisplay);
        Some(EglDisplay(handle(1)))
    }

    fn initialize(&self, _display: EglDisplay) -> Option<(EGLint, EGLint)> {
        let gate = self.record(EglCall::Initialize).init_gate.clone();
        if let Some(gate) = gate {
            gate.wait();
        }
        Some((1, 5))
    }

    fn choose_config(&self, _display: EglDisplay, attributes: &[EGLint]) -> Option<EglConfig> {
        let version = match attribute(attributes, EGL_RENDERABLE_TYPE) {
            Some(EGL_OPENGL_ES3_BIT_KHR) => ApiVersion::Gles3,
            _ => ApiVersion::Gles2,
        };
        let mut state = self.record(EglCall::ChooseConfig(version));
        if state.failing_config.contains(&version) {
            state.error = EGL_BAD_CONFIG;
            return None;
        }
        Some(EglConfig(handle(0x10 + version.client_version() as usize)))
    }

    fn create_context(
        &self,
        _display: EglDisplay,
        _config: EglConfig,
        attributes: &[EGLint],
    ) -> Option<EglContext> {
        let client = attribute(attributes, EGL_CONTEXT_CLIENT_VERSION).unwrap_or(1);
        let version = if client >= 3 {
            ApiVersion::Gles3
        } else {
            ApiVersion::Gles2
        };
        let mut state = self.record(EglCall::CreateContext(version));
        if state.failing_context.contains(&version) {
            state.error = EGL_BAD_MATCH;
            return None;
        }
        let id = state.next_handle;
        state.next_handle += 1;
        state.contexts.push((id, client));
        Some(EglContext(handle(id)))
    }

    fn query_context(
        &self,
        _display: EglDisplay,
        context: EglContext,
        attribute: EGLint,
    ) -> Option<EGLint> {
        let state = self.record(EglCall::QueryContext);
        if attribute != EGL_CONTEXT_CLIENT_VERSION {
            return None;
        }
        state
            .contexts
            .iter()
            .find(|(id, _)| *id == context.0.addr())
            .map(|(_, client)| *client)
    }

    fn create_window_surface(
        &self,
        _display: EglDisplay,
        _config: EglConfig,
        _window: &NativeWindow,
    ) -> Option<EglSurface> {
        let mut state = self.record(EglCall::CreateWindowSurface);
        if state.fail_window_surface {
            state.error = EGL_BAD_NATIVE_WINDOW;
            return None;
        }
        let id = state.next_handle;
        state.next_handle += 1;
        state.surfaces.push(id);
        Some(EglSurface(handle(id)))
    }

    fn make_current(
        &self,
        _display: EglDisplay,
        _surface: Option<EglSurface>,
        context: Option<EglContext>,
    ) -> bool {
        let bind = context.is_some();
        let mut state = self.record(EglCall::MakeCurrent { bind });
        let ok = if bind {
            state.make_current_ok
        } else {
            state.teardown_ok
        };
        if !ok {
            state.error = EGL_BAD_MATCH;
        }
        ok
    }

    fn swap_interval(&self, _display: EglDisplay, _interval: EGLint) -> bool {
        let _ = self.record(EglCall::SwapInterval);
        true
    }

    fn swap_buffers(&self, _display: EglDisplay, _surface: EglSurface) -> bool {
        self.record(EglCall::SwapBuffers).swap_ok
    }

    fn destroy_surface(&self, _display: EglDisplay, surface: EglSurface) -> bool {
        let mut state = self.record(EglCall::DestroySurface);
        state.surfaces.retain(|id| *id != surface.0.addr());
        state.teardown_ok
    }

    fn destroy_context(&self, _display: EglDisplay, context: EglContext) -> bool {
        let mut state = self.record(EglCall::DestroyContext);
        state.contexts.retain(|(id, _)| *id != context.0.addr());
        state.teardown_ok
    }

    fn terminate(&self, _display: EglDisplay) -> bool {
        self.record(EglCall::Terminate).teardown_ok
    }

    fn release_thread(&self) -> bool {
        self.record(EglCall::ReleaseThread).teardown_ok
    }

    fn get_error(&self) -> EGLint {
        std::mem::replace(&mut self.state.lock().error, EGL_SUCCESS)
    }

    fn get_proc_address(&self, _name: &CStr) -> *const c_void {
        ptr::null()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    CreateShader { id: u32, kind: u32 },
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    LinkProgram(u32),
    UseProgram(Option<u32>),
    DeleteProgram(u32),
    UniformMatrix4 { location: u32, matrix: [f32; 16] },
    CreateBuffer(u32),
    BindBuffer { target: u32, buffer: Option<u32> },
    BufferData { target: u32, data: Vec<u8>, usage: u32 },
    DeleteBuffer(u32),
    VertexAttribPointer { index: u32, size: i32 },
    CreateTexture(u32),
    BindTexture { target: u32, texture: Option<u32> },
    DeleteTexture(u32),
    Viewport { width: i32, height: i32 },
    Clear(u32),
    DrawElements { mode: u32, count: i32, element_type: u32, offset: i32 },
}

#[derive(Default)]
struct GlState {
    calls: Vec<GlCall>,
    next_id: u32,
    sources: HashMap<u32, String>,
    failing_sources: Vec<String>,
    fail_link: bool,
    locations: HashMap<String, u32>,
    hidden: Vec<String>,
    buffers: Vec<u32>,
    programs: Vec<u32>,
}

impl GlState {
    fn alloc(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Records every call; object names come from one counter starting at 1.
#[derive(Default)]
pub struct RecordingGles {
    state: Mutex<GlState>,
}

impl RecordingGles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shaders whose source equals `source` fail to compile.
    pub fn fail_compile(&self, source: &str) {
        self.state.lock().failing_sources.push(source.to_string());
    }

    pub fn fail_link(&self) {
        self.state.lock().fail_link = true;
    }

    /// Reports no active uniform or attribute named `name`.
    pub fn hide_location(&self, name: &str) {
        self.state.lock().hidden.push(name.to_string());
    }

    pub fn calls(&self) -> Vec<GlCall> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    pub fn uniform(&self, name: &str) -> Option<u32> {
        self.state.lock().locations.get(name).copied()
    }

    pub fn live_buffers(&self) -> Vec<u32> {
        self.state.lock().buffers.clone()
    }

    pub fn live_programs(&self) -> Vec<u32> {
        self.state.lock().programs.clone()
    }

    fn push(&self, call: GlCall) {
        self.state.lock().calls.push(call);
    }

    fn location(&self, name: &str) -> Option<u32> {
        let mut state = self.state.lock();
        if state.hidden.iter().any(|h| h == name) {
            return None;
        }
        if let Some(id) = state.locations.get(name) {
            return Some(*id);
        }
        let id = state.locations.len() as u32;
        state.locations.insert(name.to_string(), id);
        Some(id)
    }
}

impl GlesApi for RecordingGles {
    fn create_shader(&self, kind: u32) -> Result<u32, String> {
        let mut state = self.state.lock();
        let id = state.alloc();
        state.calls.push(GlCall::CreateShader { id, kind });
        Ok(id)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        self.state.lock().sources.insert(shader, source.to_string());
    }

    fn compile_shader(&self, shader: u32) {
        self.push(GlCall::CompileShader(shader));
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        let state = self.state.lock();
        match state.sources.get(&shader) {
            Some(src) => !state.failing_sources.contains(src),
            None => false,
        }
    }

    fn shader_info_log(&self, shader: u32) -> String {
        format!("ERROR: 0:1: shader {shader} rejected")
    }

    fn delete_shader(&self, shader: u32) {
        self.push(GlCall::DeleteShader(shader));
    }

    fn create_program(&self) -> Result<u32, String> {
        let mut state = self.state.lock();
        let id = state.alloc();
        state.programs.push(id);
        state.calls.push(GlCall::CreateProgram(id));
        Ok(id)
    }

    fn attach_shader(&self, _program: u32, _shader: u32) {}

    fn link_program(&self, program: u32) {
        self.push(GlCall::LinkProgram(program));
    }

    fn program_link_status(&self, _program: u32) -> bool {
        !self.state.lock().fail_link
    }

    fn program_info_log(&self, program: u32) -> String {
        format!("program {program}: varyings mismatch")
    }

    fn use_program(&self, program: Option<u32>) {
        self.push(GlCall::UseProgram(program));
    }

    fn delete_program(&self, program: u32) {
        let mut state = self.state.lock();
        state.programs.retain(|p| *p != program);
        state.calls.push(GlCall::DeleteProgram(program));
    }

    fn uniform_location(&self, _program: u32, name: &str) -> Option<u32> {
        self.location(name)
    }

    fn attrib_location(&self, _program: u32, name: &str) -> Option<u32> {
        self.location(name)
    }

    fn uniform_matrix_4(&self, location: u32, matrix: &[f32; 16]) {
        self.push(GlCall::UniformMatrix4 {
            location,
            matrix: *matrix,
        });
    }

    fn create_buffer(&self) -> Result<u32, String> {
        let mut state = self.state.lock();
        let id = state.alloc();
        state.buffers.push(id);
        state.calls.push(GlCall::CreateBuffer(id));
        Ok(id)
    }

    fn bind_buffer(&self, target: u32, buffer: Option<u32>) {
        self.push(GlCall::BindBuffer { target, buffer });
    }

    fn buffer_data(&self, target: u32, data: &[u8], usage: u32) {
        self.push(GlCall::BufferData {
            target,
            data: data.to_vec(),
            usage,
        });
    }

    fn delete_buffer(&self, buffer: u32) {
        let mut state = self.state.lock();
        state.buffers.retain(|b| *b != buffer);
        state.calls.push(GlCall::DeleteBuffer(buffer));
    }

    fn enable_vertex_attrib_array(&self, _index: u32) {}

    fn vertex_attrib_pointer_f32(&self, index: u32, size: i32, _stride: i32, _offset: i32) {
        self.push(GlCall::VertexAttribPointer { index, size });
    }

    fn create_texture(&self) -> Result<u32, String> {
        let mut state = self.state.lock();
        let id = state.alloc();
        state.calls.push(GlCall::CreateTexture(id));
        Ok(id)
    }

    fn bind_texture(&self, target: u32, texture: Option<u32>) {
        self.push(GlCall::BindTexture { target, texture });
    }

    fn tex_parameter_i32(&self, _target: u32, _parameter: u32, _value: i32) {}

    fn delete_texture(&self, texture: u32) {
        self.push(GlCall::DeleteTexture(texture));
    }

    fn active_texture(&self, _unit: u32) {}

    fn viewport(&self, _x: i32, _y: i32, width: i32, height: i32) {
        self.push(GlCall::Viewport { width, height });
    }

    fn clear_color(&self, _red: f32, _green: f32, _blue: f32, _alpha: f32) {}

    fn clear(&self, mask: u32) {
        self.push(GlCall::Clear(mask));
    }

    fn draw_elements(&self, mode: u32, count: i32, element_type: u32, offset: i32) {
        self.push(GlCall::DrawElements {
            mode,
            count,
            element_type,
            offset,
        });
    }

    fn get_error(&self) -> u32 {
        glow::NO_ERROR
    }
}

#[derive(Default)]
struct SourceState {
    transform: [f32; 16],
    updates: usize,
    fail_updates: bool,
    buffer_size: Option<(u32, u32)>,
    notifier: Option<FrameNotifier>,
    released: bool,
}

/// Test-side view of a [`FakeFrameSource`].
#[derive(Clone, Default)]
pub struct FakeSource {
    state: Arc<Mutex<SourceState>>,
}

impl FakeSource {
    /// Simulates the producer queueing a new image. `false` if the signal went nowhere.
    pub fn fire_frame_available(&self) -> bool {
        let notifier = self.state.lock().notifier.clone();
        notifier.is_some_and(|n| n.notify())
    }

    pub fn fail_updates(&self) {
        self.state.lock().fail_updates = true;
    }

    pub fn updates(&self) -> usize {
        self.state.lock().updates
    }

    pub fn buffer_size(&self) -> Option<(u32, u32)> {
        self.state.lock().buffer_size
    }

    pub fn is_released(&self) -> bool {
        self.state.lock().released
    }
}

pub struct FakeFrameSource {
    shared: FakeSource,
}

impl FrameSource for FakeFrameSource {
    fn update_tex_image(&mut self) -> Result<(), String> {
        let mut state = self.shared.state.lock();
        if state.released {
            return Err("source released".to_string());
        }
        if state.fail_updates {
            return Err("abandoned buffer queue".to_string());
        }
        state.updates += 1;
        Ok(())
    }

    fn transform_matrix(&self) -> [f32; 16] {
        self.shared.state.lock().transform
    }

    fn set_default_buffer_size(&mut self, width: u32, height: u32) {
        self.shared.state.lock().buffer_size = Some((width, height));
    }

    fn set_frame_available_listener(&mut self, notifier: FrameNotifier) {
        self.shared.state.lock().notifier = Some(notifier);
    }

    fn producer_window(&self) -> Option<NativeWindow> {
        // SAFETY: never dereferenced.
        unsafe { NativeWindow::from_raw(handle(0x5000)) }
    }

    fn release(&mut self) {
        let mut state = self.shared.state.lock();
        state.released = true;
        state.notifier = None;
    }
}

fn fake_source(transform: [f32; 16]) -> (FakeFrameSource, FakeSource) {
    let shared = FakeSource::default();
    shared.state.lock().transform = transform;
    (
        FakeFrameSource {
            shared: shared.clone(),
        },
        shared,
    )
}

pub fn fake_texture(name: u32, transform: [f32; 16]) -> (ExternalTexture, FakeSource) {
    let (source, handle) = fake_source(transform);
    (ExternalTexture::new(name, Box::new(source)), handle)
}

pub struct FakePlatform {
    pub egl: FakeEgl,
    sources: Mutex<Vec<FakeSource>>,
    released_windows: AtomicUsize,
    thread_names: Mutex<Vec<String>>,
    panic_on_thread_start: bool,
}

impl FakePlatform {
    pub fn with_egl(egl: FakeEgl) -> Self {
        Self {
            egl,
            sources: Mutex::new(Vec::new()),
            released_windows: AtomicUsize::new(0),
            thread_names: Mutex::new(Vec::new()),
            panic_on_thread_start: false,
        }
    }

    pub fn panicking_thread_start(mut self) -> Self {
        self.panic_on_thread_start = true;
        self
    }

    pub fn released_sources(&self) -> usize {
        self.sources
            .lock()
            .iter()
            .filter(|s| s.is_released())
            .count()
    }

    pub fn last_source(&self) -> Option<FakeSource> {
        self.sources.lock().last().cloned()
    }

    pub fn released_windows(&self) -> usize {
        self.released_windows.load(Ordering::SeqCst)
    }

    /// Names of the render threads that have started, in order.
    pub fn thread_names(&self) -> Vec<String> {
        self.thread_names.lock().clone()
    }
}

impl GpuPlatform for FakePlatform {
    fn egl(&self) -> &dyn EglApi {
        &self.egl
    }

    fn on_render_thread_start(&self) {
        let name = std::thread::current().name().unwrap_or_default().to_string();
        self.thread_names.lock().push(name);
        if self.panic_on_thread_start {
            panic!("scripted thread start panic");
        }
    }

    fn load_gles(&self) -> Result<Box<dyn GlesApi>, SessionError> {
        Ok(Box::new(RecordingGles::new()))
    }

    fn create_frame_source(&self, _name: u32) -> Result<Box<dyn FrameSource>, SessionError> {
        let (source, handle) = fake_source(crate::quad::IDENTITY_MATRIX);
        self.sources.lock().push(handle);
        Ok(Box::new(source))
    }

    fn release_window(&self, _window: NativeWindow) {
        self.released_windows.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererEvent {
    Created(SurfaceSize),
    ListenerReady,
    Changed(SurfaceSize),
    Frame,
    FrameFailed,
    Destroyed,
}

/// Shared, ordered record of renderer callbacks and listener notifications.
#[derive(Clone, Default)]
pub struct RendererLog {
    events: Arc<Mutex<Vec<RendererEvent>>>,
}

impl RendererLog {
    pub fn events(&self) -> Vec<RendererEvent> {
        self.events.lock().clone()
    }

    fn push(&self, event: RendererEvent) {
        self.events.lock().push(event);
    }
}

#[derive(Clone, Default)]
pub struct ScriptedRenderer {
    log: RendererLog,
    fail_create: bool,
    panic_create: bool,
    fail_frames: bool,
    frame_gate: Option<Gate>,
}

impl ScriptedRenderer {
    pub fn log(&self) -> RendererLog {
        self.log.clone()
    }

    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn panicking_create(mut self) -> Self {
        self.panic_create = true;
        self
    }

    pub fn failing_frames(mut self) -> Self {
        self.fail_frames = true;
        self
    }

    /// Frames block inside `on_frame_available` until `gate` opens.
    pub fn gated_frames(mut self, gate: Gate) -> Self {
        self.frame_gate = Some(gate);
        self
    }
}

impl Renderer for ScriptedRenderer {
    fn on_surface_created(
        &mut self,
        _gl: &dyn GlesApi,
        _texture: &mut ExternalTexture,
        size: SurfaceSize,
    ) -> Result<(), RenderError> {
        if self.panic_create {
            panic!("scripted renderer panic");
        }
        if self.fail_create {
            return Err(RenderError::ShaderCompile {
                stage: "vertex",
                log: "scripted failure".to_string(),
            });
        }
        self.log.push(RendererEvent::Created(size));
        Ok(())
    }

    fn on_surface_changed(&mut self, _texture: &mut ExternalTexture, size: SurfaceSize) {
        self.log.push(RendererEvent::Changed(size));
    }

    fn on_frame_available(
        &mut self,
        _gl: &dyn GlesApi,
        texture: &mut ExternalTexture,
    ) -> Result<(), RenderError> {
        if let Some(gate) = &self.frame_gate {
            gate.wait();
        }
        if self.fail_frames {
            self.log.push(RendererEvent::FrameFailed);
            return Err(RenderError::TextureUpdate("scripted failure".to_string()));
        }
        texture
            .update_tex_image()
            .map_err(RenderError::TextureUpdate)?;
        self.log.push(RendererEvent::Frame);
        Ok(())
    }

    fn on_surface_destroyed(&mut self, _gl: &dyn GlesApi, _texture: &mut ExternalTexture) {
        self.log.push(RendererEvent::Destroyed);
    }
}

#[derive(Default)]
pub struct RecordingListener {
    log: Option<RendererLog>,
    ready: Mutex<Vec<TextureReady>>,
    failures: Mutex<Vec<SessionError>>,
}

impl RecordingListener {
    /// Also appends `ListenerReady` to `log`, to check ordering against renderer callbacks.
    pub fn with_log(log: RendererLog) -> Self {
        Self {
            log: Some(log),
            ..Self::default()
        }
    }

    pub fn ready(&self) -> Vec<TextureReady> {
        self.ready.lock().clone()
    }

    pub fn failures(&self) -> Vec<SessionError> {
        self.failures.lock().clone()
    }
}

impl SurfaceTextureListener for RecordingListener {
    fn on_surface_texture_ready(&self, ready: TextureReady) {
        if let Some(log) = &self.log {
            log.push(RendererEvent::ListenerReady);
        }
        self.ready.lock().push(ready);
    }

    fn on_session_failed(&self, error: SessionError) {
        self.failures.lock().push(error);
    }
}
