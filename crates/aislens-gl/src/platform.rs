use std::ffi::CString;

use crate::egl::{EglApi, NativeWindow};
use crate::error::SessionError;
use crate::gles::{GlesApi, GlowGles};
use crate::texture::FrameSource;

/// Everything a render thread needs from the host platform.
pub trait GpuPlatform: Send + Sync + 'static {
    fn egl(&self) -> &dyn EglApi;

    /// Runs on every render thread before any EGL call, e.g. to adjust scheduling priority.
    fn on_render_thread_start(&self) {}

    /// Resolves GL entry points. Called once per session with the new context current.
    fn load_gles(&self) -> Result<Box<dyn GlesApi>, SessionError> {
        let egl = self.egl();
        // SAFETY: the session context was made current on this thread just before this call and
        // the returned API object never leaves the render thread.
        let gl = unsafe {
            GlowGles::from_loader_function(|name| match CString::new(name) {
                Ok(name) => egl.get_proc_address(&name),
                Err(_) => std::ptr::null(),
            })
        };
        Ok(Box::new(gl))
    }

    /// Wraps the freshly allocated texture `name` in a producer binding.
    fn create_frame_source(&self, name: u32) -> Result<Box<dyn FrameSource>, SessionError>;

    /// Returns a window handle handed over by `surface_available` once its session is gone.
    fn release_window(&self, _window: NativeWindow) {}
}
