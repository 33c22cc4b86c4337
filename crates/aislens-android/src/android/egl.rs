use std::ffi::{CStr, c_char, c_int, c_void};
use std::ptr;

use aislens_gl::egl::{
    EGLint, EglApi, EglConfig, EglContext, EglDisplay, EglSurface, NativeWindow,
};
use jni::sys::{JNIEnv, jobject};

pub type RawDisplay = *mut c_void;
pub type RawContext = *mut c_void;
pub type RawSurface = *mut c_void;
pub type RawConfig = *mut c_void;
pub type EGLBoolean = c_int;
pub type EGLNativeDisplayType = *mut c_void;

#[repr(C)]
pub struct ANativeWindow {
    _private: [u8; 0],
}

pub const EGL_FALSE: EGLBoolean = 0;
pub const EGL_DEFAULT_DISPLAY: EGLNativeDisplayType = ptr::null_mut();
pub const EGL_NO_DISPLAY: RawDisplay = ptr::null_mut();
pub const EGL_NO_CONTEXT: RawContext = ptr::null_mut();
pub const EGL_NO_SURFACE: RawSurface = ptr::null_mut();
pub const EGL_NONE: EGLint = 0x3038;
pub const EGL_OPENGL_ES_API: EGLint = 0x30A0;

#[link(name = "android")]
unsafe extern "C" {
    pub fn ANativeWindow_fromSurface(env: *mut JNIEnv, surface: jobject) -> *mut ANativeWindow;
    pub fn ANativeWindow_toSurface(env: *mut JNIEnv, window: *mut ANativeWindow) -> jobject;
    pub fn ANativeWindow_release(window: *mut ANativeWindow);
}

#[link(name = "EGL")]
unsafe extern "C" {
    fn eglGetDisplay(display_id: EGLNativeDisplayType) -> RawDisplay;
    fn eglInitialize(dpy: RawDisplay, major: *mut EGLint, minor: *mut EGLint) -> EGLBoolean;
    fn eglTerminate(dpy: RawDisplay) -> EGLBoolean;
    fn eglBindAPI(api: EGLint) -> EGLBoolean;
    fn eglChooseConfig(
        dpy: RawDisplay,
        attrib_list: *const EGLint,
        configs: *mut RawConfig,
        config_size: EGLint,
        num_config: *mut EGLint,
    ) -> EGLBoolean;
    fn eglCreateContext(
        dpy: RawDisplay,
        config: RawConfig,
        share_context: RawContext,
        attrib_list: *const EGLint,
    ) -> RawContext;
    fn eglQueryContext(
        dpy: RawDisplay,
        ctx: RawContext,
        attribute: EGLint,
        value: *mut EGLint,
    ) -> EGLBoolean;
    fn eglDestroyContext(dpy: RawDisplay, ctx: RawContext) -> EGLBoolean;
    fn eglCreateWindowSurface(
        dpy: RawDisplay,
        config: RawConfig,
        win: *mut ANativeWindow,
        attrib_list: *const EGLint,
    ) -> RawSurface;
    fn eglDestroySurface(dpy: RawDisplay, surface: RawSurface) -> EGLBoolean;
    fn eglMakeCurrent(
        dpy: RawDisplay,
        draw: RawSurface,
        read: RawSurface,
        ctx: RawContext,
    ) -> EGLBoolean;
    fn eglSwapInterval(dpy: RawDisplay, interval: EGLint) -> EGLBoolean;
    fn eglSwapBuffers(dpy: RawDisplay, surface: RawSurface) -> EGLBoolean;
    fn eglReleaseThread() -> EGLBoolean;
    fn eglGetProcAddress(procname: *const c_char) -> *const c_void;
    fn eglGetError() -> EGLint;
}

/// [`EglApi`] over the system libEGL.
#[derive(Debug, Default, Clone, Copy)]
pub struct AndroidEgl;

// SAFETY (all blocks below): plain libEGL calls. Handles were produced by this same driver and
// attribute lists are EGL_NONE-terminated arrays that outlive the call.
impl EglApi for AndroidEgl {
    fn get_display(&self) -> Option<EglDisplay> {
        let dpy = unsafe { eglGetDisplay(EGL_DEFAULT_DISPLAY) };
        (dpy != EGL_NO_DISPLAY).then_some(EglDisplay(dpy))
    }

    fn initialize(&self, display: EglDisplay) -> Option<(EGLint, EGLint)> {
        let mut major: EGLint = 0;
        let mut minor: EGLint = 0;
        if unsafe { eglInitialize(display.0, &mut major, &mut minor) } == EGL_FALSE {
            return None;
        }
        if unsafe { eglBindAPI(EGL_OPENGL_ES_API) } == EGL_FALSE {
            tracing::error!("eglBindAPI failed: 0x{:x}", unsafe { eglGetError() });
        }
        Some((major, minor))
    }

    fn choose_config(&self, display: EglDisplay, attributes: &[EGLint]) -> Option<EglConfig> {
        debug_assert_eq!(attributes.last(), Some(&EGL_NONE));
        let mut config: RawConfig = ptr::null_mut();
        let mut num: EGLint = 0;
        let ok = unsafe {
            eglChooseConfig(display.0, attributes.as_ptr(), &mut config, 1, &mut num)
        } != EGL_FALSE;
        (ok && num > 0).then_some(EglConfig(config))
    }

    fn create_context(
        &self,
        display: EglDisplay,
        config: EglConfig,
        attributes: &[EGLint],
    ) -> Option<EglContext> {
        debug_assert_eq!(attributes.last(), Some(&EGL_NONE));
        let ctx =
            unsafe { eglCreateContext(display.0, config.0, EGL_NO_CONTEXT, attributes.as_ptr()) };
        (ctx != EGL_NO_CONTEXT).then_some(EglContext(ctx))
    }

    fn query_context(
        &self,
        display: EglDisplay,
        context: EglContext,
        attribute: EGLint,
    ) -> Option<EGLint> {
        let mut value: EGLint = 0;
        let ok = unsafe { eglQueryContext(display.0, context.0, attribute, &mut value) };
        (ok != EGL_FALSE).then_some(value)
    }

    fn create_window_surface(
        &self,
        display: EglDisplay,
        config: EglConfig,
        window: &NativeWindow,
    ) -> Option<EglSurface> {
        let attribs = [EGL_NONE];
        let surface = unsafe {
            eglCreateWindowSurface(
                display.0,
                config.0,
                window.as_ptr().cast::<ANativeWindow>(),
                attribs.as_ptr(),
            )
        };
        (surface != EGL_NO_SURFACE).then_some(EglSurface(surface))
    }

    fn make_current(
        &self,
        display: EglDisplay,
        surface: Option<EglSurface>,
        context: Option<EglContext>,
    ) -> bool {
        let surface = surface.map_or(EGL_NO_SURFACE, |s| s.0);
        let context = context.map_or(EGL_NO_CONTEXT, |c| c.0);
        unsafe { eglMakeCurrent(display.0, surface, surface, context) != EGL_FALSE }
    }

    fn swap_interval(&self, display: EglDisplay, interval: EGLint) -> bool {
        unsafe { eglSwapInterval(display.0, interval) != EGL_FALSE }
    }

    fn swap_buffers(&self, display: EglDisplay, surface: EglSurface) -> bool {
        unsafe { eglSwapBuffers(display.0, surface.0) != EGL_FALSE }
    }

    fn destroy_surface(&self, display: EglDisplay, surface: EglSurface) -> bool {
        unsafe { eglDestroySurface(display.0, surface.0) != EGL_FALSE }
    }

    fn destroy_context(&self, display: EglDisplay, context: EglContext) -> bool {
        unsafe { eglDestroyContext(display.0, context.0) != EGL_FALSE }
    }

    fn terminate(&self, display: EglDisplay) -> bool {
        unsafe { eglTerminate(display.0) != EGL_FALSE }
    }

    fn release_thread(&self) -> bool {
        unsafe { eglReleaseThread() != EGL_FALSE }
    }

    fn get_error(&self) -> EGLint {
        unsafe { eglGetError() }
    }

    fn get_proc_address(&self, name: &CStr) -> *const c_void {
        unsafe { eglGetProcAddress(name.as_ptr()) }
    }
}
