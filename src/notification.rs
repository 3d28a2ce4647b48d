//! Transient operator notifications
//!
//! At most one notification is visible. A new one replaces the current one
//! and restarts the auto-dismiss timer, so visibility is always measured from
//! the most recent `notify`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{info, warn};

use crate::constants::timing::NOTIFICATION_DURATION_MS;
use crate::timer::{self, TimerHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
}

#[derive(Debug, Default)]
struct SinkState {
    current: Option<Notification>,
    /// Bumped on every notify; a timer only clears the notification it was armed for
    generation: u64,
    dismiss_timer: Option<TimerHandle>,
}

/// Shared handle to the single notification slot
#[derive(Debug, Clone)]
pub struct NotificationSink {
    state: Arc<Mutex<SinkState>>,
    visible_for: Duration,
}

impl Default for NotificationSink {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink {
    pub fn new() -> Self {
        Self::with_duration(Duration::from_millis(NOTIFICATION_DURATION_MS))
    }

    pub fn with_duration(visible_for: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(SinkState::default())),
            visible_for,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SinkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Show `message`, replacing whatever is visible
    ///
    /// Outside a tokio runtime the message stays until replaced or dismissed.
    pub fn notify(&self, message: impl Into<String>, kind: NotificationKind) {
        let message = message.into();
        match kind {
            NotificationKind::Success => info!(message = %message, "Notification"),
            NotificationKind::Failure => warn!(message = %message, "Failure notification"),
        }

        let mut state = self.lock();
        state.generation += 1;
        let armed_for = state.generation;
        state.current = Some(Notification { message, kind });

        let shared = Arc::clone(&self.state);
        let timer = timer::schedule_once(self.visible_for, move || {
            let mut state = shared.lock().unwrap_or_else(PoisonError::into_inner);
            if state.generation == armed_for {
                state.current = None;
            }
        });
        // Replacing the handle aborts the previous timer
        state.dismiss_timer = timer;
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notify(message, NotificationKind::Success);
    }

    pub fn failure(&self, message: impl Into<String>) {
        self.notify(message, NotificationKind::Failure);
    }

    /// Close the visible notification early
    pub fn dismiss(&self) {
        let mut state = self.lock();
        state.current = None;
        if let Some(timer) = state.dismiss_timer.take() {
            timer.cancel();
        }
    }

    pub fn current(&self) -> Option<Notification> {
        self.lock().current.clone()
    }

    /// Number of notifications raised so far
    pub fn issued(&self) -> u64 {
        self.lock().generation
    }
}
