use crate::error::RenderError;
use crate::gles::GlesApi;
use crate::texture::ExternalTexture;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Draws the camera texture onto the session surface.
///
/// All methods run on the render thread with the session context current. A renderer instance
/// lives for exactly one session.
pub trait Renderer: Send {
    /// One-time GPU setup. An error aborts the session.
    fn on_surface_created(
        &mut self,
        gl: &dyn GlesApi,
        texture: &mut ExternalTexture,
        size: SurfaceSize,
    ) -> Result<(), RenderError>;

    /// New surface dimensions. GPU objects from `on_surface_created` stay as they are.
    fn on_surface_changed(&mut self, texture: &mut ExternalTexture, size: SurfaceSize);

    /// Latches the newest camera image and draws it. The caller presents the result.
    fn on_frame_available(
        &mut self,
        gl: &dyn GlesApi,
        texture: &mut ExternalTexture,
    ) -> Result<(), RenderError>;

    /// Releases renderer-owned GPU objects before the context goes away.
    fn on_surface_destroyed(&mut self, gl: &dyn GlesApi, texture: &mut ExternalTexture);
}
