//! Cancellable timers on the tokio runtime
//!
//! Every scheduled callback is owned by a [`TimerHandle`]. Cancelling or
//! dropping the handle aborts the task, so nothing fires after its owner
//! has been disabled or torn down. Scheduling needs a tokio runtime on the
//! calling thread; without one nothing is scheduled and `None` comes back.

use std::future::Future;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::warn;

/// Owner of one scheduled task
#[derive(Debug)]
pub struct TimerHandle {
    task: JoinHandle<()>,
}

impl TimerHandle {
    /// Stop the timer; a callback that has not run yet never will
    pub fn cancel(self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn current_runtime() -> Option<Handle> {
    match Handle::try_current() {
        Ok(handle) => Some(handle),
        Err(err) => {
            warn!(error = %err, "No tokio runtime, timer not scheduled");
            None
        }
    }
}

/// Run `callback` once after `delay`
pub fn schedule_once<F>(delay: Duration, callback: F) -> Option<TimerHandle>
where
    F: FnOnce() + Send + 'static,
{
    let task = current_runtime()?.spawn(async move {
        time::sleep(delay).await;
        callback();
    });
    Some(TimerHandle { task })
}

/// Run `callback` every `period`, first one period from now
///
/// A slow callback delays the following ticks instead of triggering a burst.
pub fn schedule_every<F, Fut>(period: Duration, mut callback: F) -> Option<TimerHandle>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let task = current_runtime()?.spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            callback().await;
        }
    });
    Some(TimerHandle { task })
}
