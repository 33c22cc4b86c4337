use std::sync::Arc;

use crate::egl::{
    ApiVersion, EGL_CONTEXT_CLIENT_VERSION, EGLint, EglApi, EglConfig, EglContext, EglDisplay,
    EglSurface, NativeWindow, config_attributes, context_attributes,
};
use crate::error::SessionError;
use crate::gles::{GlesApi, TEXTURE_EXTERNAL_OES};
use crate::platform::GpuPlatform;
use crate::texture::ExternalTexture;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextConfig {
    /// First GLES version tried; lower versions are tried in turn if it cannot be negotiated.
    pub preferred_api: ApiVersion,
    /// Request `EGL_RECORDABLE_ANDROID` so the window can also feed an encoder.
    pub recordable: bool,
    pub swap_interval: EGLint,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            preferred_api: ApiVersion::Gles3,
            recordable: false,
            swap_interval: 1,
        }
    }
}

/// The complete display/context/surface triple. Only exists when every handle is valid.
struct EglBinding {
    display: EglDisplay,
    context: EglContext,
    surface: EglSurface,
    version: ApiVersion,
}

/// Tears down whatever part of the triple was created if construction bails out early.
struct PendingEgl<'a> {
    egl: &'a dyn EglApi,
    display: Option<EglDisplay>,
    initialized: bool,
    context: Option<EglContext>,
    surface: Option<EglSurface>,
    current: bool,
}

impl<'a> PendingEgl<'a> {
    fn new(egl: &'a dyn EglApi) -> Self {
        Self {
            egl,
            display: None,
            initialized: false,
            context: None,
            surface: None,
            current: false,
        }
    }

    fn commit(mut self, version: ApiVersion) -> Option<EglBinding> {
        let binding = EglBinding {
            display: self.display.take()?,
            context: self.context.take()?,
            surface: self.surface.take()?,
            version,
        };
        self.initialized = false;
        Some(binding)
    }
}

impl Drop for PendingEgl<'_> {
    fn drop(&mut self) {
        let Some(dpy) = self.display else {
            return;
        };
        if !self.initialized {
            return;
        }
        tracing::debug!("rolling back partial EGL setup");
        if self.current {
            let released = self.egl.make_current(dpy, None, None);
            tracing::debug!(released, "eglMakeCurrent(EGL_NO_CONTEXT)");
        }
        if let Some(surface) = self.surface {
            let released = self.egl.destroy_surface(dpy, surface);
            tracing::debug!(released, "eglDestroySurface");
        }
        if let Some(context) = self.context {
            let released = self.egl.destroy_context(dpy, context);
            tracing::debug!(released, "eglDestroyContext");
        }
        let released = self.egl.terminate(dpy);
        tracing::debug!(released, "eglTerminate");
        let released = self.egl.release_thread();
        tracing::debug!(released, "eglReleaseThread");
    }
}

/// Owns the EGL triple, the GL entry points and the external texture for one session.
///
/// Lives on the render thread for its whole life; the context is current only there.
pub struct GraphicsContext {
    platform: Arc<dyn GpuPlatform>,
    config: ContextConfig,
    binding: Option<EglBinding>,
    gl: Option<Box<dyn GlesApi>>,
    texture: Option<ExternalTexture>,
}

impl GraphicsContext {
    pub fn new(platform: Arc<dyn GpuPlatform>, config: ContextConfig) -> Self {
        Self {
            platform,
            config,
            binding: None,
            gl: None,
            texture: None,
        }
    }

    /// Brings up display, context and window surface against `window`, makes them current and
    /// allocates the external texture. Returns the texture name.
    pub fn create_surface(&mut self, window: &NativeWindow) -> Result<u32, SessionError> {
        if self.binding.is_some() {
            tracing::warn!("create_surface called on a live context; tearing it down first");
            self.destroy_surface();
        }

        let platform = Arc::clone(&self.platform);
        let egl = platform.egl();
        let mut pending = PendingEgl::new(egl);

        let dpy = egl.get_display().ok_or(SessionError::NoDisplay)?;
        pending.display = Some(dpy);

        let (major, minor) = egl.initialize(dpy).ok_or_else(|| SessionError::Initialize {
            code: egl.get_error(),
        })?;
        pending.initialized = true;
        tracing::debug!(major, minor, "EGL initialized");

        let (config, context, version) = self.negotiate_context(egl, dpy)?;
        pending.context = Some(context);

        let surface = egl
            .create_window_surface(dpy, config, window)
            .ok_or_else(|| SessionError::WindowSurface {
                code: egl.get_error(),
            })?;
        pending.surface = Some(surface);

        if !egl.make_current(dpy, Some(surface), Some(context)) {
            return Err(SessionError::MakeCurrent {
                code: egl.get_error(),
            });
        }
        pending.current = true;

        if !egl.swap_interval(dpy, self.config.swap_interval) {
            tracing::warn!(
                interval = self.config.swap_interval,
                "eglSwapInterval failed: 0x{:x}",
                egl.get_error()
            );
        }

        let gl = platform.load_gles()?;
        let texture = create_external_texture(gl.as_ref(), platform.as_ref())?;
        let name = texture.name();

        let Some(binding) = pending.commit(version) else {
            return Err(SessionError::NoUsableContext {
                code: egl.get_error(),
            });
        };
        self.binding = Some(binding);
        self.gl = Some(gl);
        self.texture = Some(texture);
        tracing::info!(?version, texture = name, "GLES context ready");
        Ok(name)
    }

    fn negotiate_context(
        &self,
        egl: &dyn EglApi,
        dpy: EglDisplay,
    ) -> Result<(EglConfig, EglContext, ApiVersion), SessionError> {
        let mut version = self.config.preferred_api;
        loop {
            match try_context(egl, dpy, version, self.config.recordable) {
                Ok((config, context)) => return Ok((config, context, version)),
                Err(code) => match version.fallback() {
                    Some(next) => {
                        tracing::warn!(
                            ?version,
                            ?next,
                            "GLES context unavailable (0x{code:x}), falling back"
                        );
                        version = next;
                    }
                    None => {
                        tracing::error!(?version, "no GLES context could be negotiated");
                        return Err(SessionError::NoUsableContext { code });
                    }
                },
            }
        }
    }

    /// Re-binds this context and surface on the calling thread.
    pub fn make_current(&self) -> bool {
        let Some(b) = &self.binding else {
            tracing::warn!("make_current on a destroyed context");
            return false;
        };
        let egl = self.platform.egl();
        let ok = egl.make_current(b.display, Some(b.surface), Some(b.context));
        if !ok {
            tracing::error!("eglMakeCurrent failed: 0x{:x}", egl.get_error());
        }
        ok
    }

    pub fn swap_buffers(&self) -> bool {
        let Some(b) = &self.binding else {
            tracing::warn!("swap_buffers on a destroyed context");
            return false;
        };
        let egl = self.platform.egl();
        let ok = egl.swap_buffers(b.display, b.surface);
        if !ok {
            tracing::error!("eglSwapBuffers failed: 0x{:x}", egl.get_error());
        }
        ok
    }

    /// Releases the external texture and the EGL triple. Safe to call repeatedly; individual
    /// failures are logged and the context always ends up fully invalid.
    ///
    /// The display is terminated only after the context is unbound and its surface and context
    /// destroyed, since EGL handles are invalid once their display is terminated.
    pub fn destroy_surface(&mut self) {
        if let Some(mut texture) = self.texture.take() {
            texture.release();
            if let Some(gl) = &self.gl {
                gl.delete_texture(texture.name());
            }
        }
        self.gl = None;

        let Some(b) = self.binding.take() else {
            return;
        };
        let egl = self.platform.egl();
        tracing::debug!("disposing EGL resources");
        let released = egl.make_current(b.display, None, None);
        tracing::debug!(released, "eglMakeCurrent(EGL_NO_CONTEXT)");
        let released = egl.destroy_surface(b.display, b.surface);
        tracing::debug!(released, "eglDestroySurface");
        let released = egl.destroy_context(b.display, b.context);
        tracing::debug!(released, "eglDestroyContext");
        let released = egl.terminate(b.display);
        tracing::debug!(released, "eglTerminate");
        let released = egl.release_thread();
        tracing::debug!(released, "eglReleaseThread");
    }

    pub fn is_valid(&self) -> bool {
        self.binding.is_some()
    }

    pub fn api_version(&self) -> Option<ApiVersion> {
        self.binding.as_ref().map(|b| b.version)
    }

    pub fn texture(&self) -> Option<&ExternalTexture> {
        self.texture.as_ref()
    }

    /// GL entry points and the external texture, borrowed together for a renderer call.
    pub fn parts_mut(&mut self) -> Option<(&dyn GlesApi, &mut ExternalTexture)> {
        match (&self.gl, &mut self.texture) {
            (Some(gl), Some(texture)) => Some((gl.as_ref(), texture)),
            _ => None,
        }
    }
}

impl Drop for GraphicsContext {
    fn drop(&mut self) {
        self.destroy_surface();
    }
}

fn try_context(
    egl: &dyn EglApi,
    dpy: EglDisplay,
    version: ApiVersion,
    recordable: bool,
) -> Result<(EglConfig, EglContext), EGLint> {
    let Some(config) = egl.choose_config(dpy, &config_attributes(version, recordable)) else {
        let code = egl.get_error();
        tracing::error!(?version, "unable to find RGBA8888 config: 0x{code:x}");
        return Err(code);
    };

    let Some(context) = egl.create_context(dpy, config, &context_attributes(version)) else {
        let code = egl.get_error();
        tracing::error!(?version, "eglCreateContext failed: 0x{code:x}");
        return Err(code);
    };

    match egl.query_context(dpy, context, EGL_CONTEXT_CLIENT_VERSION) {
        Some(client) if client >= version.client_version() => {
            tracing::debug!(client, "EGLContext created");
            Ok((config, context))
        }
        reported => {
            let code = egl.get_error();
            tracing::error!(?version, ?reported, "context does not report requested version");
            let _ = egl.destroy_context(dpy, context);
            Err(code)
        }
    }
}

fn create_external_texture(
    gl: &dyn GlesApi,
    platform: &dyn GpuPlatform,
) -> Result<ExternalTexture, SessionError> {
    let name = gl.create_texture().map_err(|error| SessionError::Gl {
        op: "glGenTextures",
        error,
    })?;
    gl.bind_texture(TEXTURE_EXTERNAL_OES, Some(name));
    gl.tex_parameter_i32(TEXTURE_EXTERNAL_OES, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
    gl.tex_parameter_i32(TEXTURE_EXTERNAL_OES, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
    gl.tex_parameter_i32(TEXTURE_EXTERNAL_OES, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32);
    gl.tex_parameter_i32(TEXTURE_EXTERNAL_OES, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);

    let code = gl.get_error();
    if code != glow::NO_ERROR {
        gl.delete_texture(name);
        return Err(SessionError::Gl {
            op: "external texture setup",
            error: format!("0x{code:x}"),
        });
    }

    match platform.create_frame_source(name) {
        Ok(source) => Ok(ExternalTexture::new(name, source)),
        Err(e) => {
            gl.delete_texture(name);
            Err(e)
        }
    }
}
