//! Producer-side bookkeeping: when to open the camera and what it should render into.
//!
//! The device itself stays behind [`CameraDevice`]; the host wires its platform callbacks
//! (open succeeded, disconnected, error) into [`CameraBinding`].

use crate::egl::NativeWindow;
use crate::renderer::SurfaceSize;
use crate::session::TextureReady;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CameraError {
    #[error("no texture is ready to receive camera frames")]
    NoTarget,
    #[error("session texture exposes no producer window")]
    NoProducerWindow,
    #[error("capture session configuration failed: {0}")]
    Configure(String),
    #[error("camera device error {0}")]
    Device(i32),
    #[error("camera disconnected")]
    Disconnected,
}

/// An opened camera.
pub trait CameraDevice {
    /// Starts a repeating preview request whose only output is `window`, sized `size`.
    fn start_preview(&mut self, window: NativeWindow, size: SurfaceSize)
    -> Result<(), CameraError>;
    fn close(&mut self);
}

/// Tracks the texture target and the opened device for one camera.
#[derive(Debug)]
pub struct CameraBinding<D: CameraDevice> {
    camera_id: String,
    target: Option<TextureReady>,
    device: Option<D>,
    opening: bool,
}

impl<D: CameraDevice> CameraBinding<D> {
    pub fn new(camera_id: impl Into<String>) -> Self {
        Self {
            camera_id: camera_id.into(),
            target: None,
            device: None,
            opening: false,
        }
    }

    pub fn camera_id(&self) -> &str {
        &self.camera_id
    }

    /// Records the session texture. Returns whether the host should open the camera now.
    pub fn on_texture_ready(&mut self, ready: TextureReady) -> bool {
        self.target = Some(ready);
        self.should_open()
    }

    /// A texture is waiting and no device is held or being opened.
    pub fn should_open(&self) -> bool {
        self.target.is_some() && self.device.is_none() && !self.opening
    }

    /// Claims the pending open. `false` if opening now would be redundant.
    pub fn begin_open(&mut self) -> bool {
        if !self.should_open() {
            return false;
        }
        self.opening = true;
        tracing::debug!(camera = %self.camera_id, "opening camera");
        true
    }

    /// Keeps `device`, the handle delivered by the open callback, and starts preview into the
    /// session texture. On failure the device is closed again.
    pub fn on_opened(&mut self, mut device: D) -> Result<(), CameraError> {
        self.opening = false;
        if let Some(mut stale) = self.device.take() {
            tracing::warn!(camera = %self.camera_id, "replacing an already opened device");
            stale.close();
        }

        let res = match self.target {
            None => Err(CameraError::NoTarget),
            Some(TextureReady {
                producer_window: None,
                ..
            }) => Err(CameraError::NoProducerWindow),
            Some(TextureReady {
                producer_window: Some(window),
                size,
                ..
            }) => device.start_preview(window, size),
        };

        match res {
            Ok(()) => {
                tracing::info!(camera = %self.camera_id, "camera preview started");
                self.device = Some(device);
                Ok(())
            }
            Err(e) => {
                tracing::error!(camera = %self.camera_id, error = %e, "camera preview failed");
                device.close();
                Err(e)
            }
        }
    }

    pub fn on_disconnected(&mut self) -> CameraError {
        tracing::warn!(camera = %self.camera_id, "camera disconnected");
        self.release_device();
        CameraError::Disconnected
    }

    pub fn on_error(&mut self, code: i32) -> CameraError {
        tracing::error!(camera = %self.camera_id, code, "camera device error");
        self.release_device();
        CameraError::Device(code)
    }

    /// Closes the device and forgets the texture; the next session must report readiness again.
    pub fn close(&mut self) {
        self.release_device();
        self.target = None;
    }

    pub fn device(&self) -> Option<&D> {
        self.device.as_ref()
    }

    pub fn target(&self) -> Option<&TextureReady> {
        self.target.as_ref()
    }

    fn release_device(&mut self) {
        self.opening = false;
        if let Some(mut device) = self.device.take() {
            device.close();
        }
    }
}
