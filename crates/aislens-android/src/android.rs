//! JNI surface bridge.
//!
//! Kotlin counterpart: `info.hntr.aislens.NativeBridge`, an `object` whose `@JvmStatic external`
//! functions are implemented here and whose static callbacks (`attachFrameListener`,
//! `onSurfaceTextureReady`, `onSessionFailed`) are invoked from the render thread.

mod bridge;
mod egl;
mod platform;
mod surface_texture;

use std::sync::{Arc, OnceLock};

use aislens_gl::{
    DefaultQuadRenderer, InlineExecutor, NativeWindow, SessionConfig, SessionError,
    SurfaceSessionManager,
};
use jni::JNIEnv;
use jni::objects::{JClass, JObject};
use jni::sys::{JNI_FALSE, JNI_TRUE, jboolean, jint};
use parking_lot::Mutex;

use self::bridge::FRAME_NOTIFIER;
use self::egl::ANativeWindow_fromSurface;
use self::platform::{AndroidPlatform, JavaListener};

static MANAGER: OnceLock<Mutex<SurfaceSessionManager>> = OnceLock::new();

fn manager() -> &'static Mutex<SurfaceSessionManager> {
    MANAGER.get_or_init(|| {
        let mut manager = SurfaceSessionManager::new(
            Arc::new(AndroidPlatform::default()),
            Box::new(|| Box::new(DefaultQuadRenderer::builtin())),
            SessionConfig::default(),
        );
        manager.set_listener(Arc::new(JavaListener), Arc::new(InlineExecutor));
        Mutex::new(manager)
    })
}

/// Surfaces lifecycle misuse to Kotlin as `IllegalStateException`; everything else is logged.
fn report(env: &mut JNIEnv, op: &str, err: &SessionError) {
    tracing::error!(op, error = %err, "surface bridge call failed");
    if matches!(
        err,
        SessionError::SessionAlreadyActive | SessionError::NoActiveSession { .. }
    ) {
        let _ = env.throw_new("java/lang/IllegalStateException", err.to_string());
    }
}

fn dimension(v: jint) -> u32 {
    u32::try_from(v).unwrap_or(0)
}

/// `NativeBridge.nativeInit()`: must run once on the main thread before any other call.
#[unsafe(no_mangle)]
pub extern "system" fn Java_info_hntr_aislens_NativeBridge_nativeInit(
    mut env: JNIEnv,
    class: JClass,
) {
    crate::logging::init();
    if let Err(e) = bridge::install(&mut env, &class) {
        tracing::error!(error = %format!("{e:#}"), "nativeInit failed");
        let _ = env.throw_new("java/lang/IllegalStateException", format!("{e:#}"));
        return;
    }
    let _ = manager();
    tracing::info!("aislens bridge initialised");
}

/// `TextureView.SurfaceTextureListener.onSurfaceTextureAvailable`, with `surface` wrapping the
/// view's SurfaceTexture.
#[unsafe(no_mangle)]
pub extern "system" fn Java_info_hntr_aislens_NativeBridge_nativeSurfaceAvailable(
    mut env: JNIEnv,
    _class: JClass,
    surface: JObject,
    width: jint,
    height: jint,
) -> jboolean {
    // SAFETY: `surface` is a live android.view.Surface local reference for this call.
    let raw = unsafe { ANativeWindow_fromSurface(env.get_native_interface(), surface.as_raw()) };
    // SAFETY: a non-null result carries one acquired reference, released by the platform when
    // the session ends.
    let Some(window) = (unsafe { NativeWindow::from_raw(raw.cast()) }) else {
        tracing::error!("ANativeWindow_fromSurface failed");
        return JNI_FALSE;
    };

    let res = manager()
        .lock()
        .surface_available(window, dimension(width), dimension(height));
    match res {
        Ok(()) => JNI_TRUE,
        Err(e) => {
            if matches!(e, SessionError::SessionAlreadyActive) {
                // SAFETY: the rejected window was never handed to a session.
                unsafe { egl::ANativeWindow_release(raw) };
            }
            report(&mut env, "surface_available", &e);
            JNI_FALSE
        }
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_info_hntr_aislens_NativeBridge_nativeSurfaceSizeChanged(
    mut env: JNIEnv,
    _class: JClass,
    width: jint,
    height: jint,
) {
    let res = manager()
        .lock()
        .surface_size_changed(dimension(width), dimension(height));
    if let Err(e) = res {
        report(&mut env, "surface_size_changed", &e);
    }
}

/// Return value goes straight back from `onSurfaceTextureDestroyed`.
#[unsafe(no_mangle)]
pub extern "system" fn Java_info_hntr_aislens_NativeBridge_nativeSurfaceDestroyed(
    mut env: JNIEnv,
    _class: JClass,
) -> jboolean {
    let res = manager().lock().surface_destroyed();
    match res {
        Ok(true) => JNI_TRUE,
        Ok(false) => JNI_FALSE,
        Err(e) => {
            report(&mut env, "surface_destroyed", &e);
            JNI_TRUE
        }
    }
}

/// Called by the listener `attachFrameListener` installs on the session's SurfaceTexture.
#[unsafe(no_mangle)]
pub extern "system" fn Java_info_hntr_aislens_NativeBridge_nativeFrameAvailable(
    _env: JNIEnv,
    _class: JClass,
) {
    if !FRAME_NOTIFIER.notify() {
        tracing::trace!("frame signal without a live session");
    }
}
