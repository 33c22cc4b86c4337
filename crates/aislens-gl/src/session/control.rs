use crossbeam_channel::Sender;
use parking_lot::Mutex;

use crate::renderer::SurfaceSize;

/// Work items for the render thread, executed strictly in post order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RenderMessage {
    Resize(SurfaceSize),
    FrameAvailable,
    Stop,
}

/// Producer-side handle that marshals "new frame" signals onto the render thread.
///
/// Cheap to clone and safe to call from any thread. Signals raised after the render thread has
/// exited are dropped.
#[derive(Debug, Clone)]
pub struct FrameNotifier {
    tx: Sender<RenderMessage>,
}

impl FrameNotifier {
    pub(crate) fn new(tx: Sender<RenderMessage>) -> Self {
        Self { tx }
    }

    /// Returns `false` if the session is gone and the signal was discarded.
    pub fn notify(&self) -> bool {
        if self.tx.send(RenderMessage::FrameAvailable).is_ok() {
            true
        } else {
            tracing::trace!("frame signal dropped: render thread has exited");
            false
        }
    }

    /// Whether both handles feed the same render thread.
    pub fn is_same_session(&self, other: &FrameNotifier) -> bool {
        self.tx.same_channel(&other.tx)
    }
}

/// Process-wide home for the live session's notifier, for producers that can only reach native
/// code through a static entry point.
///
/// A retiring session may still be tearing down after its successor installed a notifier, so
/// clearing is conditional on ownership.
#[derive(Debug, Default)]
pub struct NotifierSlot {
    current: Mutex<Option<FrameNotifier>>,
}

impl NotifierSlot {
    pub const fn new() -> Self {
        Self {
            current: Mutex::new(None),
        }
    }

    pub fn install(&self, notifier: FrameNotifier) {
        *self.current.lock() = Some(notifier);
    }

    /// Empties the slot if it still holds `owner`'s session. Returns whether it did.
    pub fn clear_if_owned(&self, owner: &FrameNotifier) -> bool {
        let mut current = self.current.lock();
        if current.as_ref().is_some_and(|n| n.is_same_session(owner)) {
            *current = None;
            true
        } else {
            false
        }
    }

    /// Signals the installed session. `false` if there is none or it has exited.
    pub fn notify(&self) -> bool {
        self.current
            .lock()
            .as_ref()
            .is_some_and(FrameNotifier::notify)
    }
}
