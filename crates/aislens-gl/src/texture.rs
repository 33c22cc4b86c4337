use crate::egl::NativeWindow;
use crate::session::FrameNotifier;

/// Producer-facing half of the external texture (a `SurfaceTexture` on Android).
///
/// Every method is called on the render thread with the session context current.
pub trait FrameSource {
    /// Latches the most recent producer image into the bound texture.
    fn update_tex_image(&mut self) -> Result<(), String>;
    /// Column-major texture-coordinate transform for the latched image.
    fn transform_matrix(&self) -> [f32; 16];
    fn set_default_buffer_size(&mut self, width: u32, height: u32);
    /// Routes producer "new frame" callbacks to `notifier`.
    fn set_frame_available_listener(&mut self, notifier: FrameNotifier);
    /// Window the camera producer renders into; valid until `release`.
    fn producer_window(&self) -> Option<NativeWindow>;
    fn release(&mut self);
}

/// GPU texture name bound as `GL_TEXTURE_EXTERNAL_OES`, paired with its producer binding.
///
/// Owned by [`crate::GraphicsContext`]; renderers borrow it per call and cannot release it.
pub struct ExternalTexture {
    name: u32,
    source: Box<dyn FrameSource>,
}

impl ExternalTexture {
    pub(crate) fn new(name: u32, source: Box<dyn FrameSource>) -> Self {
        Self { name, source }
    }

    pub fn name(&self) -> u32 {
        self.name
    }

    pub fn update_tex_image(&mut self) -> Result<(), String> {
        self.source.update_tex_image()
    }

    pub fn transform_matrix(&self) -> [f32; 16] {
        self.source.transform_matrix()
    }

    pub fn producer_window(&self) -> Option<NativeWindow> {
        self.source.producer_window()
    }

    pub fn set_default_buffer_size(&mut self, width: u32, height: u32) {
        self.source.set_default_buffer_size(width, height);
    }

    pub(crate) fn attach_listener(&mut self, notifier: FrameNotifier) {
        self.source.set_frame_available_listener(notifier);
    }

    pub(crate) fn release(&mut self) {
        self.source.release();
    }
}
