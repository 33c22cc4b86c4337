use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Sender, unbounded};

use crate::context::ContextConfig;
use crate::egl::NativeWindow;
use crate::error::SessionError;
use crate::platform::GpuPlatform;
use crate::renderer::{Renderer, SurfaceSize};

use super::control::{FrameNotifier, RenderMessage};
use super::listener::{ListenerExecutor, SurfaceTextureListener};
use super::runner::{self, ListenerBinding, RunnerArgs};
use super::state::{SessionShared, SessionState};

/// Builds the renderer for each new session.
pub type RendererFactory = Box<dyn Fn() -> Box<dyn Renderer> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub context: ContextConfig,
    /// Name given to every render thread.
    pub thread_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            context: ContextConfig::default(),
            thread_name: "aislens-render".to_string(),
        }
    }
}

struct ActiveSession {
    tx: Sender<RenderMessage>,
    shared: Arc<SessionShared>,
    join: JoinHandle<()>,
    size: SurfaceSize,
}

impl ActiveSession {
    fn post(&self, msg: RenderMessage) -> Result<(), SessionError> {
        self.tx
            .send(msg)
            .map_err(|_| SessionError::RenderThreadExited)
    }
}

/// Maps UI surface lifecycle events onto at most one render session at a time.
///
/// Every method is meant to be called from the UI thread. Each session gets its own render
/// thread and its own renderer; all GL work for the session happens on that thread.
pub struct SurfaceSessionManager {
    platform: Arc<dyn GpuPlatform>,
    renderer_factory: RendererFactory,
    config: SessionConfig,
    listener: Option<ListenerBinding>,
    session: Option<ActiveSession>,
    retired: Vec<JoinHandle<()>>,
    next_id: u64,
}

impl SurfaceSessionManager {
    pub fn new(
        platform: Arc<dyn GpuPlatform>,
        renderer_factory: RendererFactory,
        config: SessionConfig,
    ) -> Self {
        Self {
            platform,
            renderer_factory,
            config,
            listener: None,
            session: None,
            retired: Vec::new(),
            next_id: 1,
        }
    }

    /// Registers the listener for sessions started after this call.
    pub fn set_listener(
        &mut self,
        listener: Arc<dyn SurfaceTextureListener>,
        executor: Arc<dyn ListenerExecutor>,
    ) {
        self.listener = Some(ListenerBinding { listener, executor });
    }

    /// Starts a session rendering into `window`.
    ///
    /// Returns as soon as the render thread is launched; readiness is reported through the
    /// listener. The window is handed back to the platform when the session ends.
    pub fn surface_available(
        &mut self,
        window: NativeWindow,
        width: u32,
        height: u32,
    ) -> Result<(), SessionError> {
        if self.session.is_some() {
            tracing::warn!("surface_available while a session is active");
            return Err(SessionError::SessionAlreadyActive);
        }
        self.retired.retain(|join| !join.is_finished());

        let id = self.next_id;
        self.next_id += 1;
        let size = SurfaceSize::new(width, height);
        let shared = Arc::new(SessionShared::new(id));
        let (tx, rx) = unbounded();

        let args = RunnerArgs {
            platform: Arc::clone(&self.platform),
            renderer: (self.renderer_factory)(),
            window,
            size,
            context: self.config.context,
            rx,
            notifier: FrameNotifier::new(tx.clone()),
            shared: Arc::clone(&shared),
            listener: self.listener.clone(),
        };

        shared.transition(SessionState::Starting);
        let join = thread::Builder::new()
            .name(self.config.thread_name.clone())
            .spawn(move || runner::run(args))
            .map_err(|e| {
                tracing::error!(error = %e, "failed to spawn render thread");
                self.platform.release_window(window);
                SessionError::ThreadSpawn(e.to_string())
            })?;

        tracing::info!(session = id, width, height, "surface session started");
        self.session = Some(ActiveSession {
            tx,
            shared,
            join,
            size,
        });
        Ok(())
    }

    /// Queues a resize. Blocks until the session is ready, so it never overtakes initialisation.
    pub fn surface_size_changed(&mut self, width: u32, height: u32) -> Result<(), SessionError> {
        let session = self.session.as_mut().ok_or(SessionError::NoActiveSession {
            op: "surface_size_changed",
        })?;
        session.shared.wait_ready()?;
        let size = SurfaceSize::new(width, height);
        session.size = size;
        session.post(RenderMessage::Resize(size))
    }

    /// Queues one draw-and-present pass.
    pub fn frame_available(&self) -> Result<(), SessionError> {
        let session = self.session.as_ref().ok_or(SessionError::NoActiveSession {
            op: "frame_available",
        })?;
        session.shared.wait_ready()?;
        session.post(RenderMessage::FrameAvailable)
    }

    /// Ends the current session. Work queued before this call is still processed; teardown runs
    /// on the render thread afterwards.
    ///
    /// Always `Ok(true)`: the UI side may release its surface immediately. A second call for the
    /// same surface fails with [`SessionError::NoActiveSession`].
    pub fn surface_destroyed(&mut self) -> Result<bool, SessionError> {
        let session = self.session.take().ok_or(SessionError::NoActiveSession {
            op: "surface_destroyed",
        })?;
        if session.post(RenderMessage::Stop).is_err() {
            tracing::debug!("render thread already exited before stop");
        }
        tracing::info!("surface session stopping");
        self.retired.push(session.join);
        Ok(true)
    }

    /// State of the current session, `Idle` if there is none.
    pub fn session_state(&self) -> SessionState {
        self.session
            .as_ref()
            .map_or(SessionState::Idle, |s| s.shared.state())
    }

    pub fn surface_size(&self) -> Option<SurfaceSize> {
        self.session.as_ref().map(|s| s.size)
    }

    /// Handle for producers that signal frames from their own threads.
    pub fn frame_notifier(&self) -> Option<FrameNotifier> {
        self.session
            .as_ref()
            .map(|s| FrameNotifier::new(s.tx.clone()))
    }

    /// Waits for every render thread whose session has been stopped.
    pub fn join_retired(&mut self) {
        for join in self.retired.drain(..) {
            if join.join().is_err() {
                tracing::error!("render thread terminated abnormally");
            }
        }
    }
}

impl Drop for SurfaceSessionManager {
    fn drop(&mut self) {
        if self.session.is_some() {
            let _ = self.surface_destroyed();
        }
        self.join_retired();
    }
}
