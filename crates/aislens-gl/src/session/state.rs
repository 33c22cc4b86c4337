use std::sync::atomic::{AtomicU8, Ordering};

use parking_lot::{Condvar, Mutex};

use crate::error::SessionError;

/// Lifecycle of one surface session, as driven by its render thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    /// No render thread.
    Idle = 0,
    /// Render thread launched, GLES context not yet usable.
    Starting = 1,
    /// Context, external texture and renderer initialised.
    Ready = 2,
    /// Listener notified; resize and frame work is being processed.
    Active = 3,
    /// Stop received; draining queued work before teardown.
    Stopping = 4,
}

impl SessionState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Starting,
            2 => Self::Ready,
            3 => Self::Active,
            4 => Self::Stopping,
            _ => Self::Idle,
        }
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Idle, Starting)
                | (Starting, Ready)
                | (Starting, Stopping)
                | (Ready, Active)
                | (Active, Stopping)
                | (Stopping, Idle)
        )
    }
}

enum Readiness {
    Pending,
    Ready,
    Failed(SessionError),
}

/// State shared between the manager (UI side) and one render thread.
pub(crate) struct SessionShared {
    id: u64,
    state: AtomicU8,
    readiness: Mutex<Readiness>,
    readiness_cv: Condvar,
}

impl SessionShared {
    pub(crate) fn new(id: u64) -> Self {
        Self {
            id,
            state: AtomicU8::new(SessionState::Idle as u8),
            readiness: Mutex::new(Readiness::Pending),
            readiness_cv: Condvar::new(),
        }
    }

    pub(crate) fn state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub(crate) fn transition(&self, next: SessionState) {
        let prev = SessionState::from_u8(self.state.swap(next as u8, Ordering::AcqRel));
        debug_assert!(
            prev.can_transition_to(next),
            "illegal session transition {prev:?} -> {next:?}"
        );
        tracing::debug!(session = self.id, ?prev, ?next, "session state");
    }

    pub(crate) fn mark_ready(&self) {
        let mut readiness = self.readiness.lock();
        if matches!(*readiness, Readiness::Pending) {
            *readiness = Readiness::Ready;
        }
        self.readiness_cv.notify_all();
    }

    /// Records a startup failure. Returns `false` if the outcome was already decided.
    pub(crate) fn mark_failed(&self, error: SessionError) -> bool {
        let mut readiness = self.readiness.lock();
        let first = matches!(*readiness, Readiness::Pending);
        if first {
            *readiness = Readiness::Failed(error);
        }
        self.readiness_cv.notify_all();
        first
    }

    /// Forces the state back to `Idle` after the render thread unwound mid-lifecycle.
    pub(crate) fn reset(&self) {
        let prev = SessionState::from_u8(self.state.swap(SessionState::Idle as u8, Ordering::AcqRel));
        tracing::debug!(session = self.id, ?prev, "session state reset");
    }

    /// Blocks until the render thread has either become ready or given up.
    pub(crate) fn wait_ready(&self) -> Result<(), SessionError> {
        let mut readiness = self.readiness.lock();
        loop {
            match &*readiness {
                Readiness::Pending => self.readiness_cv.wait(&mut readiness),
                Readiness::Ready => return Ok(()),
                Readiness::Failed(e) => return Err(e.clone()),
            }
        }
    }
}
