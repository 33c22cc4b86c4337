use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crossbeam_channel::Receiver;

use crate::context::{ContextConfig, GraphicsContext};
use crate::egl::NativeWindow;
use crate::error::SessionError;
use crate::platform::GpuPlatform;
use crate::renderer::{Renderer, SurfaceSize};

use super::control::{FrameNotifier, RenderMessage};
use super::listener::{ListenerExecutor, SurfaceTextureListener, TextureReady};
use super::state::{SessionShared, SessionState};

#[derive(Clone)]
pub(crate) struct ListenerBinding {
    pub(crate) listener: Arc<dyn SurfaceTextureListener>,
    pub(crate) executor: Arc<dyn ListenerExecutor>,
}

impl ListenerBinding {
    fn ready(&self, ready: TextureReady) {
        let listener = Arc::clone(&self.listener);
        self.executor
            .execute(Box::new(move || listener.on_surface_texture_ready(ready)));
    }

    fn failed(&self, error: SessionError) {
        let listener = Arc::clone(&self.listener);
        self.executor
            .execute(Box::new(move || listener.on_session_failed(error)));
    }
}

pub(crate) struct RunnerArgs {
    pub(crate) platform: Arc<dyn GpuPlatform>,
    pub(crate) renderer: Box<dyn Renderer>,
    pub(crate) window: NativeWindow,
    pub(crate) size: SurfaceSize,
    pub(crate) context: ContextConfig,
    pub(crate) rx: Receiver<RenderMessage>,
    pub(crate) notifier: FrameNotifier,
    pub(crate) shared: Arc<SessionShared>,
    pub(crate) listener: Option<ListenerBinding>,
}

/// Render thread entry point. Owns every GL object of the session until it returns.
pub(crate) fn run(args: RunnerArgs) {
    let shared = Arc::clone(&args.shared);
    let listener = args.listener.clone();
    let platform = Arc::clone(&args.platform);
    let window = args.window;

    let res = panic::catch_unwind(AssertUnwindSafe(move || {
        args.platform.on_render_thread_start();
        Runner::start(args)
    }));
    if res.is_err() {
        tracing::error!("render thread panicked");
        if shared.mark_failed(SessionError::RenderThreadPanicked) {
            if let Some(listener) = &listener {
                listener.failed(SessionError::RenderThreadPanicked);
            }
        }
        shared.reset();
    }
    platform.release_window(window);
}

struct Runner {
    context: GraphicsContext,
    renderer: Box<dyn Renderer>,
    renderer_live: bool,
    size: SurfaceSize,
    shared: Arc<SessionShared>,
}

impl Runner {
    fn start(args: RunnerArgs) {
        let RunnerArgs {
            platform,
            renderer,
            window,
            size,
            context,
            rx,
            notifier,
            shared,
            listener,
        } = args;

        let mut runner = Self {
            context: GraphicsContext::new(platform, context),
            renderer,
            renderer_live: false,
            size,
            shared: Arc::clone(&shared),
        };

        match runner.configure(&window, notifier) {
            Ok(ready) => {
                shared.transition(SessionState::Ready);
                shared.mark_ready();
                match &listener {
                    Some(listener) => listener.ready(ready),
                    None => tracing::warn!("surface texture ready but no listener is set"),
                }
                shared.transition(SessionState::Active);
                runner.process(&rx);
            }
            Err(e) => {
                tracing::error!(error = %e, "surface session failed to start");
                shared.transition(SessionState::Stopping);
                shared.mark_failed(e.clone());
                if let Some(listener) = &listener {
                    listener.failed(e);
                }
            }
        }

        runner.teardown();
        shared.transition(SessionState::Idle);
    }

    fn configure(
        &mut self,
        window: &NativeWindow,
        notifier: FrameNotifier,
    ) -> Result<TextureReady, SessionError> {
        let texture_name = self.context.create_surface(window)?;
        let api_version = self.context.api_version();
        let (Some(api_version), Some((gl, texture))) = (api_version, self.context.parts_mut())
        else {
            return Err(SessionError::Gl {
                op: "create_surface",
                error: "context incomplete after creation".to_string(),
            });
        };

        self.renderer.on_surface_created(gl, texture, self.size)?;
        self.renderer_live = true;
        // Producer buffers match the view until the host reconfigures them.
        texture.set_default_buffer_size(self.size.width, self.size.height);
        texture.attach_listener(notifier);

        Ok(TextureReady {
            texture_name,
            producer_window: texture.producer_window(),
            size: self.size,
            api_version,
        })
    }

    fn process(&mut self, rx: &Receiver<RenderMessage>) {
        for msg in rx.iter() {
            if msg == RenderMessage::Stop {
                break;
            }
            self.handle(msg);
        }

        self.shared.transition(SessionState::Stopping);
        // Work that was queued before (or raced in behind) the stop request still runs.
        for msg in rx.try_iter() {
            self.handle(msg);
        }
    }

    fn handle(&mut self, msg: RenderMessage) {
        match msg {
            RenderMessage::Resize(size) => {
                self.size = size;
                if let Some((_, texture)) = self.context.parts_mut() {
                    self.renderer.on_surface_changed(texture, size);
                }
            }
            RenderMessage::FrameAvailable => self.draw_frame(),
            RenderMessage::Stop => {}
        }
    }

    fn draw_frame(&mut self) {
        if !self.context.make_current() {
            tracing::warn!("skipping frame: context could not be made current");
            return;
        }
        let Some((gl, texture)) = self.context.parts_mut() else {
            return;
        };
        if let Err(e) = self.renderer.on_frame_available(gl, texture) {
            tracing::warn!(error = %e, "skipping frame");
            return;
        }
        if !self.context.swap_buffers() {
            tracing::debug!("frame drawn but not presented");
        }
    }

    fn teardown(&mut self) {
        if self.renderer_live {
            if let Some((gl, texture)) = self.context.parts_mut() {
                self.renderer.on_surface_destroyed(gl, texture);
            }
            self.renderer_live = false;
        }
        self.context.destroy_surface();
    }
}
