//! Thin, object-safe view of the EGL 1.4 entry points the session needs.
//!
//! The core never links against libEGL itself; the platform crate supplies an [`EglApi`]
//! implementation backed by the real driver, and tests supply a scripted fake.

use std::ffi::{CStr, c_void};

pub type EGLint = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EglDisplay(pub *mut c_void);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EglContext(pub *mut c_void);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EglSurface(pub *mut c_void);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EglConfig(pub *mut c_void);

/// Platform window (`ANativeWindow*` on Android) that a window surface is created against.
///
/// A plain handle: copying it does not take a reference. Whoever acquired the window releases it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeWindow(*mut c_void);

// SAFETY: the handle is an opaque, reference-counted native object. It is only dereferenced by
// the driver on the render thread that owns the session; other threads just carry it.
unsafe impl Send for NativeWindow {}
unsafe impl Sync for NativeWindow {}

impl NativeWindow {
    /// # Safety
    /// `ptr` must be a live native window handle and stay valid until the platform releases it.
    pub unsafe fn from_raw(ptr: *mut c_void) -> Option<Self> {
        if ptr.is_null() { None } else { Some(Self(ptr)) }
    }

    pub fn as_ptr(&self) -> *mut c_void {
        self.0
    }
}

pub const EGL_SUCCESS: EGLint = 0x3000;
pub const EGL_NONE: EGLint = 0x3038;
pub const EGL_RED_SIZE: EGLint = 0x3024;
pub const EGL_GREEN_SIZE: EGLint = 0x3023;
pub const EGL_BLUE_SIZE: EGLint = 0x3022;
pub const EGL_ALPHA_SIZE: EGLint = 0x3021;
pub const EGL_RENDERABLE_TYPE: EGLint = 0x3040;
pub const EGL_SURFACE_TYPE: EGLint = 0x3033;
pub const EGL_WINDOW_BIT: EGLint = 0x0004;
pub const EGL_OPENGL_ES2_BIT: EGLint = 0x0004;
pub const EGL_OPENGL_ES3_BIT_KHR: EGLint = 0x0000_0040;
pub const EGL_CONTEXT_CLIENT_VERSION: EGLint = 0x3098;
/// `EGL_RECORDABLE_ANDROID`: lets the surface feed a video encoder.
pub const EGL_RECORDABLE_ANDROID: EGLint = 0x3142;

/// GLES client API generation requested from EGL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ApiVersion {
    Gles2,
    Gles3,
}

impl ApiVersion {
    pub fn client_version(self) -> EGLint {
        match self {
            Self::Gles2 => 2,
            Self::Gles3 => 3,
        }
    }

    pub fn renderable_bit(self) -> EGLint {
        match self {
            Self::Gles2 => EGL_OPENGL_ES2_BIT,
            Self::Gles3 => EGL_OPENGL_ES3_BIT_KHR,
        }
    }

    /// Next version to try when this one cannot be negotiated.
    pub fn fallback(self) -> Option<Self> {
        match self {
            Self::Gles3 => Some(Self::Gles2),
            Self::Gles2 => None,
        }
    }
}

/// RGBA8888 window config for `version`, optionally recordable.
pub fn config_attributes(version: ApiVersion, recordable: bool) -> Vec<EGLint> {
    let mut attribs = vec![
        EGL_RED_SIZE,
        8,
        EGL_GREEN_SIZE,
        8,
        EGL_BLUE_SIZE,
        8,
        EGL_ALPHA_SIZE,
        8,
        EGL_RENDERABLE_TYPE,
        version.renderable_bit(),
        EGL_SURFACE_TYPE,
        EGL_WINDOW_BIT,
    ];
    if recordable {
        attribs.extend_from_slice(&[EGL_RECORDABLE_ANDROID, 1]);
    }
    attribs.push(EGL_NONE);
    attribs
}

pub fn context_attributes(version: ApiVersion) -> [EGLint; 3] {
    [EGL_CONTEXT_CLIENT_VERSION, version.client_version(), EGL_NONE]
}

/// EGL entry points, one method per driver call.
///
/// Failing calls return `None`/`false`; the caller reads `get_error` for the code.
pub trait EglApi: Send + Sync {
    fn get_display(&self) -> Option<EglDisplay>;
    fn initialize(&self, display: EglDisplay) -> Option<(EGLint, EGLint)>;
    fn choose_config(&self, display: EglDisplay, attributes: &[EGLint]) -> Option<EglConfig>;
    fn create_context(
        &self,
        display: EglDisplay,
        config: EglConfig,
        attributes: &[EGLint],
    ) -> Option<EglContext>;
    fn query_context(
        &self,
        display: EglDisplay,
        context: EglContext,
        attribute: EGLint,
    ) -> Option<EGLint>;
    fn create_window_surface(
        &self,
        display: EglDisplay,
        config: EglConfig,
        window: &NativeWindow,
    ) -> Option<EglSurface>;
    /// Binds `surface`/`context` on the calling thread; `None` for both unbinds.
    fn make_current(
        &self,
        display: EglDisplay,
        surface: Option<EglSurface>,
        context: Option<EglContext>,
    ) -> bool;
    fn swap_interval(&self, display: EglDisplay, interval: EGLint) -> bool;
    fn swap_buffers(&self, display: EglDisplay, surface: EglSurface) -> bool;
    fn destroy_surface(&self, display: EglDisplay, surface: EglSurface) -> bool;
    fn destroy_context(&self, display: EglDisplay, context: EglContext) -> bool;
    fn terminate(&self, display: EglDisplay) -> bool;
    fn release_thread(&self) -> bool;
    fn get_error(&self) -> EGLint;
    fn get_proc_address(&self, name: &CStr) -> *const c_void;
}
