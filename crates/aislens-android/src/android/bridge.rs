use std::sync::OnceLock;

use aislens_gl::{NotifierSlot, TextureReady};
use anyhow::Context;
use jni::objects::{GlobalRef, JClass, JObject, JValue};
use jni::{JNIEnv, JavaVM};

use super::egl::ANativeWindow_toSurface;

/// Where `nativeFrameAvailable` forwards the producer's frame callbacks.
pub static FRAME_NOTIFIER: NotifierSlot = NotifierSlot::new();

struct Bridge {
    vm: JavaVM,
    /// `NativeBridge` class; render threads cannot resolve app classes through `FindClass`.
    class: GlobalRef,
}

static BRIDGE: OnceLock<Bridge> = OnceLock::new();

pub fn install(env: &mut JNIEnv, class: &JClass) -> anyhow::Result<()> {
    if BRIDGE.get().is_some() {
        return Ok(());
    }
    let vm = env.get_java_vm().context("retrieve JavaVM")?;
    let class = env
        .new_global_ref(class)
        .context("global ref for NativeBridge")?;
    let _ = BRIDGE.set(Bridge { vm, class });
    Ok(())
}

fn bridge() -> anyhow::Result<&'static Bridge> {
    BRIDGE.get().context("NativeBridge.nativeInit has not run")
}

/// JNI env for the calling thread; render threads stay attached until they exit.
pub fn env() -> anyhow::Result<JNIEnv<'static>> {
    bridge()?
        .vm
        .attach_current_thread_permanently()
        .context("attach thread to JVM")
}

fn call_static(
    env: &mut JNIEnv,
    name: &'static str,
    sig: &'static str,
    args: &[JValue],
) -> anyhow::Result<()> {
    let class = <&JClass>::from(bridge()?.class.as_obj());
    if let Err(e) = env.call_static_method(class, name, sig, args) {
        let _ = env.exception_describe();
        let _ = env.exception_clear();
        return Err(e).with_context(|| format!("NativeBridge.{name}"));
    }
    Ok(())
}

pub fn attach_frame_listener(surface_texture: &GlobalRef) -> anyhow::Result<()> {
    let mut env = env()?;
    call_static(
        &mut env,
        "attachFrameListener",
        "(Landroid/graphics/SurfaceTexture;)V",
        &[JValue::Object(surface_texture.as_obj())],
    )
}

pub fn notify_ready(ready: &TextureReady) -> anyhow::Result<()> {
    let window = ready
        .producer_window
        .context("texture has no producer window")?;
    let mut env = env()?;
    // SAFETY: the window stays acquired by the frame source for the whole session.
    let raw = unsafe { ANativeWindow_toSurface(env.get_native_interface(), window.as_ptr().cast()) };
    if raw.is_null() {
        anyhow::bail!("ANativeWindow_toSurface returned null");
    }
    // SAFETY: `raw` is a fresh local reference owned by this frame.
    let surface = unsafe { JObject::from_raw(raw) };

    let texture = i32::try_from(ready.texture_name).context("texture name out of range")?;
    let width = i32::try_from(ready.size.width).context("width out of range")?;
    let height = i32::try_from(ready.size.height).context("height out of range")?;
    let res = call_static(
        &mut env,
        "onSurfaceTextureReady",
        "(Landroid/view/Surface;III)V",
        &[
            JValue::Object(&surface),
            JValue::Int(texture),
            JValue::Int(width),
            JValue::Int(height),
        ],
    );
    let _ = env.delete_local_ref(surface);
    res
}

pub fn notify_failed(message: &str) -> anyhow::Result<()> {
    let mut env = env()?;
    let message = env.new_string(message).context("error message string")?;
    call_static(
        &mut env,
        "onSessionFailed",
        "(Ljava/lang/String;)V",
        &[JValue::Object(&message)],
    )
}
