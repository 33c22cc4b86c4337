//! Camera preview through a dedicated GLES render thread.
//!
//! A [`SurfaceSessionManager`] turns UI surface lifecycle events into one render session per
//! surface. Each session owns a [`GraphicsContext`] (EGL display, context and window surface plus
//! an external texture fed by the camera) and drives a [`Renderer`] on its own thread.
//! Platform specifics come in through [`GpuPlatform`].

pub mod camera;
pub mod context;
pub mod egl;
pub mod error;
pub mod gles;
pub mod platform;
pub mod quad;
pub mod renderer;
pub mod session;
pub mod texture;

#[cfg(test)]
mod fake;

pub use camera::{CameraBinding, CameraDevice, CameraError};
pub use context::{ContextConfig, GraphicsContext};
pub use egl::{ApiVersion, EglApi, NativeWindow};
pub use error::{RenderError, SessionError};
pub use gles::{GlesApi, GlowGles};
pub use platform::GpuPlatform;
pub use quad::{
    BuiltinShaders, DefaultQuadRenderer, DirectoryShaders, QuadRendererConfig, ShaderAssets,
};
pub use renderer::{Renderer, SurfaceSize};
pub use session::{
    ChannelExecutor, FrameNotifier, InlineExecutor, ListenerExecutor, NotifierSlot,
    RendererFactory, SessionConfig, SessionState, SurfaceSessionManager, SurfaceTextureListener,
    TextureReady, channel_executor,
};
pub use texture::{ExternalTexture, FrameSource};
