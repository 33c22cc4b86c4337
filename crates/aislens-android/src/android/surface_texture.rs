use std::ffi::c_int;

use aislens_gl::{FrameNotifier, FrameSource, NativeWindow};
use anyhow::{Context, bail};
use jni::JNIEnv;
use jni::objects::{GlobalRef, JValue};
use jni::sys::{JNIEnv as RawEnv, jobject};

use super::bridge::{self, FRAME_NOTIFIER};
use super::egl::{ANativeWindow, ANativeWindow_release};

#[repr(C)]
pub struct ASurfaceTexture {
    _private: [u8; 0],
}

#[link(name = "android")]
unsafe extern "C" {
    fn ASurfaceTexture_fromSurfaceTexture(
        env: *mut RawEnv,
        surface_texture: jobject,
    ) -> *mut ASurfaceTexture;
    fn ASurfaceTexture_release(st: *mut ASurfaceTexture);
    fn ASurfaceTexture_acquireANativeWindow(st: *mut ASurfaceTexture) -> *mut ANativeWindow;
    fn ASurfaceTexture_updateTexImage(st: *mut ASurfaceTexture) -> c_int;
    fn ASurfaceTexture_getTransformMatrix(st: *mut ASurfaceTexture, mtx: *mut f32);
}

/// `android.graphics.SurfaceTexture` attached to the session's external texture.
///
/// Created on the render thread with the session context current, so the Java object attaches
/// to that context's texture name.
pub struct AndroidFrameSource {
    java: Option<GlobalRef>,
    native: *mut ASurfaceTexture,
    window: *mut ANativeWindow,
    notifier: Option<FrameNotifier>,
}

impl AndroidFrameSource {
    pub fn new(texture_name: u32) -> anyhow::Result<Self> {
        let mut env = bridge::env()?;
        let name = i32::try_from(texture_name).context("texture name out of range")?;
        let local = env
            .new_object(
                "android/graphics/SurfaceTexture",
                "(I)V",
                &[JValue::Int(name)],
            )
            .context("new SurfaceTexture")?;
        let java = env.new_global_ref(&local).context("SurfaceTexture global ref")?;

        // SAFETY: `java` keeps the SurfaceTexture alive for as long as `native` is used.
        let native =
            unsafe { ASurfaceTexture_fromSurfaceTexture(env.get_native_interface(), java.as_raw()) };
        if native.is_null() {
            bail!("ASurfaceTexture_fromSurfaceTexture returned null");
        }
        // SAFETY: `native` was just checked.
        let window = unsafe { ASurfaceTexture_acquireANativeWindow(native) };
        if window.is_null() {
            // SAFETY: matching release for the acquire above.
            unsafe { ASurfaceTexture_release(native) };
            bail!("ASurfaceTexture_acquireANativeWindow returned null");
        }

        tracing::debug!(texture = texture_name, "SurfaceTexture attached");
        Ok(Self {
            java: Some(java),
            native,
            window,
            notifier: None,
        })
    }

    fn call_java(&self, env: &mut JNIEnv, name: &str, sig: &str, args: &[JValue]) {
        let Some(java) = &self.java else {
            return;
        };
        if let Err(e) = env.call_method(java, name, sig, args) {
            tracing::error!(method = name, error = %e, "SurfaceTexture call failed");
            let _ = env.exception_clear();
        }
    }
}

impl FrameSource for AndroidFrameSource {
    fn update_tex_image(&mut self) -> Result<(), String> {
        if self.native.is_null() {
            return Err("SurfaceTexture released".to_string());
        }
        // SAFETY: non-null and only used on the render thread with the context current.
        let status = unsafe { ASurfaceTexture_updateTexImage(self.native) };
        if status == 0 {
            Ok(())
        } else {
            Err(format!("ASurfaceTexture_updateTexImage: {status}"))
        }
    }

    fn transform_matrix(&self) -> [f32; 16] {
        let mut matrix = aislens_gl::quad::IDENTITY_MATRIX;
        if !self.native.is_null() {
            // SAFETY: the matrix buffer holds the 16 floats the call writes.
            unsafe { ASurfaceTexture_getTransformMatrix(self.native, matrix.as_mut_ptr()) };
        }
        matrix
    }

    fn set_default_buffer_size(&mut self, width: u32, height: u32) {
        let (Ok(w), Ok(h)) = (i32::try_from(width), i32::try_from(height)) else {
            tracing::warn!(width, height, "buffer size out of range");
            return;
        };
        match bridge::env() {
            Ok(mut env) => self.call_java(
                &mut env,
                "setDefaultBufferSize",
                "(II)V",
                &[JValue::Int(w), JValue::Int(h)],
            ),
            Err(e) => tracing::error!(error = %e, "no JNI env for setDefaultBufferSize"),
        }
    }

    fn set_frame_available_listener(&mut self, notifier: FrameNotifier) {
        FRAME_NOTIFIER.install(notifier.clone());
        self.notifier = Some(notifier);
        let Some(java) = &self.java else {
            return;
        };
        if let Err(e) = bridge::attach_frame_listener(java) {
            tracing::error!(error = %e, "failed to register frame listener");
        }
    }

    fn producer_window(&self) -> Option<NativeWindow> {
        // SAFETY: the window reference is held until `release`.
        unsafe { NativeWindow::from_raw(self.window.cast()) }
    }

    fn release(&mut self) {
        if let Some(notifier) = self.notifier.take() {
            // A successor session may already own the slot.
            FRAME_NOTIFIER.clear_if_owned(&notifier);
        }
        if !self.window.is_null() {
            // SAFETY: matching release for the acquire in `new`.
            unsafe { ANativeWindow_release(self.window) };
            self.window = std::ptr::null_mut();
        }
        if !self.native.is_null() {
            // SAFETY: matching release for `ASurfaceTexture_fromSurfaceTexture`.
            unsafe { ASurfaceTexture_release(self.native) };
            self.native = std::ptr::null_mut();
        }
        if let Ok(mut env) = bridge::env() {
            self.call_java(&mut env, "release", "()V", &[]);
        }
        self.java = None;
        tracing::debug!("SurfaceTexture released");
    }
}

impl Drop for AndroidFrameSource {
    fn drop(&mut self) {
        if !self.native.is_null() {
            self.release();
        }
    }
}
