use std::time::Duration;

use tokio::task::AbortHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Owner of a running countdown task. Dropping it cancels the countdown.
#[derive(Debug)]
pub struct CountdownHandle {
    abort: AbortHandle,
}

impl CountdownHandle {
    /// Stop the countdown; neither callback runs afterwards.
    pub fn cancel(self) {
        drop(self);
    }

    /// Whether the task has finished, by completing or by being cancelled.
    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }
}

impl Drop for CountdownHandle {
    fn drop(&mut self) {
        self.abort.abort();
    }
}

/// Run `on_tick(remaining)` every `tick` until `total` has elapsed, then `on_done()`.
///
/// Must be called inside a tokio runtime. A zero `tick` is treated as one millisecond.
pub fn schedule_countdown<T, D>(
    total: Duration,
    tick: Duration,
    mut on_tick: T,
    on_done: D,
) -> CountdownHandle
where
    T: FnMut(Duration) + Send + 'static,
    D: FnOnce() + Send + 'static,
{
    let tick = tick.max(Duration::from_millis(1));
    let task = tokio::spawn(async move {
        let mut remaining = total;
        let mut interval = tokio::time::interval_at(Instant::now() + tick, tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        while !remaining.is_zero() {
            interval.tick().await;
            remaining = remaining.saturating_sub(tick);
            on_tick(remaining);
        }
        on_done();
    });
    CountdownHandle {
        abort: task.abort_handle(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/publish/countdown.rs"]
mod tests;
