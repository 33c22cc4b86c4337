use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::egl::{ApiVersion, NativeWindow};
use crate::error::SessionError;
use crate::renderer::SurfaceSize;

/// Everything a camera producer needs to start rendering into the session's texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureReady {
    pub texture_name: u32,
    /// Window the producer should target; owned by the session's frame source.
    pub producer_window: Option<NativeWindow>,
    /// Current UI surface size, to match the producer's buffer size.
    pub size: SurfaceSize,
    pub api_version: ApiVersion,
}

/// Host-side observer of a session's startup outcome.
pub trait SurfaceTextureListener: Send + Sync {
    /// Fired exactly once per successful session, after the renderer is initialised.
    fn on_surface_texture_ready(&self, ready: TextureReady);
    /// Fired once if the session could not be brought up.
    fn on_session_failed(&self, error: SessionError);
}

pub type ListenerTask = Box<dyn FnOnce() + Send>;

/// Scheduling context on which listener callbacks run.
pub trait ListenerExecutor: Send + Sync {
    fn execute(&self, task: ListenerTask);
}

/// Runs callbacks directly on the render thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineExecutor;

impl ListenerExecutor for InlineExecutor {
    fn execute(&self, task: ListenerTask) {
        task();
    }
}

/// Queues callbacks for a host-owned loop (typically the UI thread) to run.
#[derive(Clone)]
pub struct ChannelExecutor {
    tx: Sender<ListenerTask>,
}

impl ListenerExecutor for ChannelExecutor {
    fn execute(&self, task: ListenerTask) {
        if self.tx.send(task).is_err() {
            tracing::warn!("listener loop is gone; dropping callback");
        }
    }
}

/// Executor plus the receiving end the host drains with `for task in rx.try_iter() { task() }`.
pub fn channel_executor() -> (ChannelExecutor, Receiver<ListenerTask>) {
    let (tx, rx) = unbounded();
    (ChannelExecutor { tx }, rx)
}
