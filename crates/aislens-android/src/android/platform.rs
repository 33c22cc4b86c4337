use aislens_gl::{
    EglApi, FrameSource, GpuPlatform, NativeWindow, SessionError, SurfaceTextureListener,
    TextureReady,
};

use super::bridge;
use super::egl::{ANativeWindow_release, AndroidEgl};
use super::surface_texture::AndroidFrameSource;

const RENDER_THREAD_NICE: libc::c_int = -2;

#[derive(Debug, Default)]
pub struct AndroidPlatform {
    egl: AndroidEgl,
}

impl GpuPlatform for AndroidPlatform {
    fn egl(&self) -> &dyn EglApi {
        &self.egl
    }

    fn on_render_thread_start(&self) {
        // Apps may not be allowed a negative nice value; default scheduling is fine then.
        // SAFETY: plain syscalls on the calling thread's own id.
        unsafe {
            let tid = libc::gettid() as libc::id_t;
            if libc::setpriority(libc::PRIO_PROCESS, tid, RENDER_THREAD_NICE) != 0 {
                tracing::debug!(tid, "render thread priority unchanged");
            }
        }
    }

    fn create_frame_source(&self, name: u32) -> Result<Box<dyn FrameSource>, SessionError> {
        match AndroidFrameSource::new(name) {
            Ok(source) => Ok(Box::new(source)),
            Err(e) => Err(SessionError::FrameSource(format!("{e:#}"))),
        }
    }

    fn release_window(&self, window: NativeWindow) {
        // SAFETY: the window was acquired with ANativeWindow_fromSurface in nativeSurfaceAvailable
        // and this is its only release.
        unsafe { ANativeWindow_release(window.as_ptr().cast()) };
    }
}

/// Forwards session outcomes to the static `NativeBridge` callbacks.
///
/// Runs on the render thread; the Kotlin side hops to the main looper itself.
pub struct JavaListener;

impl SurfaceTextureListener for JavaListener {
    fn on_surface_texture_ready(&self, ready: TextureReady) {
        if let Err(e) = bridge::notify_ready(&ready) {
            tracing::error!(error = %format!("{e:#}"), "failed to deliver onSurfaceTextureReady");
        }
    }

    fn on_session_failed(&self, error: SessionError) {
        if let Err(e) = bridge::notify_failed(&error.to_string()) {
            tracing::error!(error = %format!("{e:#}"), "failed to deliver onSessionFailed");
        }
    }
}
