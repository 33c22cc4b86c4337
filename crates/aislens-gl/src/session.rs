mod control;
mod listener;
mod manager;
mod runner;
mod state;

pub use control::{FrameNotifier, NotifierSlot};
pub use listener::{
    ChannelExecutor, InlineExecutor, ListenerExecutor, ListenerTask, SurfaceTextureListener,
    TextureReady, channel_executor,
};
pub use manager::{RendererFactory, SessionConfig, SurfaceSessionManager};
pub use state::SessionState;
