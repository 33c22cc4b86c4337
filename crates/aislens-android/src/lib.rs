//! Android host for `aislens-gl`: libEGL bindings, `ASurfaceTexture` frame sources and the JNI
//! bridge that forwards `TextureView` surface callbacks into a `SurfaceSessionManager`.

pub mod logging;

#[cfg(target_os = "android")]
mod android;
