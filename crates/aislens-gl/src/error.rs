use crate::egl::EGLint;

/// Failures raised while building or driving a render session.
///
/// Context/surface negotiation failures and renderer initialisation failures are fatal to the
/// session. `SessionAlreadyActive` and `NoActiveSession` signal that the host drove the surface
/// lifecycle out of order.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    #[error("eglGetDisplay returned EGL_NO_DISPLAY")]
    NoDisplay,
    #[error("eglInitialize failed: 0x{code:x}")]
    Initialize { code: EGLint },
    #[error("no usable GLES context (last EGL error 0x{code:x})")]
    NoUsableContext { code: EGLint },
    #[error("eglCreateWindowSurface failed: 0x{code:x}")]
    WindowSurface { code: EGLint },
    #[error("eglMakeCurrent failed: 0x{code:x}")]
    MakeCurrent { code: EGLint },
    #[error("GL call failed during {op}: {error}")]
    Gl { op: &'static str, error: String },
    #[error("failed to bind frame source: {0}")]
    FrameSource(String),
    #[error("renderer initialisation failed: {0}")]
    Renderer(#[from] RenderError),
    #[error("failed to spawn render thread: {0}")]
    ThreadSpawn(String),
    #[error("render thread panicked")]
    RenderThreadPanicked,
    #[error("render thread has already exited")]
    RenderThreadExited,
    #[error("a surface session is already active")]
    SessionAlreadyActive,
    #[error("{op} called without an active surface session")]
    NoActiveSession { op: &'static str },
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum RenderError {
    #[error("shader asset {name} unavailable: {reason}")]
    ShaderAsset { name: String, reason: String },
    #[error("{stage} shader compile error: {log}")]
    ShaderCompile { stage: &'static str, log: String },
    #[error("program link error: {log}")]
    ProgramLink { log: String },
    #[error("program has no active {kind} named {name}")]
    MissingLocation { kind: &'static str, name: &'static str },
    #[error("GL object creation failed: {0}")]
    Gl(String),
    #[error("failed to latch external texture image: {0}")]
    TextureUpdate(String),
    #[error("renderer used before on_surface_created")]
    NotInitialized,
}
