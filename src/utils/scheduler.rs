//! Repeating refresh task owned by a view
//!
//! The task is aborted when it is cancelled or dropped, so a view that goes
//! away takes its timer with it.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

pub struct ScheduledTask {
    name: String,
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Run `tick` now and then every `period`, until cancelled or until
    /// `lifetime` has elapsed.
    pub fn every<F, Fut>(
        name: impl Into<String>,
        period: Duration,
        lifetime: Option<Duration>,
        mut tick: F,
    ) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let task_name = name.clone();
        let handle = tokio::spawn(async move {
            let deadline = lifetime.map(|lifetime| Instant::now() + lifetime);
            let mut interval = tokio::time::interval(period);
            // A slow refresh pushes the next one back instead of bursting
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                let tick_at = interval.tick().await;
                if deadline.is_some_and(|deadline| tick_at >= deadline) {
                    debug!("Scheduled task '{}' reached its lifetime", task_name);
                    break;
                }
                tick().await;
            }
        });

        debug!("Scheduled task '{}' every {:?}", name, period);
        Self { name, handle }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop the task; an in-flight tick is dropped at its next await point
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        if !self.handle.is_finished() {
            debug!("Cancelling scheduled task '{}'", self.name);
        }
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_task(period: Duration, lifetime: Option<Duration>) -> (ScheduledTask, Arc<AtomicUsize>) {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        let task = ScheduledTask::every("test", period, lifetime, move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        (task, ticks)
    }

    #[tokio::test]
    async fn first_tick_runs_immediately_then_repeats() {
        let (task, ticks) = counting_task(Duration::from_millis(20), None);
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(ticks.load(Ordering::SeqCst) >= 1);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(ticks.load(Ordering::SeqCst) >= 2);
        task.cancel();
    }

    #[tokio::test]
    async fn cancelled_task_stops_ticking() {
        let (task, ticks) = counting_task(Duration::from_millis(10), None);
        tokio::time::sleep(Duration::from_millis(25)).await;
        task.cancel();

        // Let the abort land before sampling
        tokio::time::sleep(Duration::from_millis(5)).await;
        let after_cancel = ticks.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), after_cancel);
    }

    #[tokio::test]
    async fn dropped_task_stops_ticking() {
        let (task, ticks) = counting_task(Duration::from_millis(10), None);
        drop(task);
        tokio::time::sleep(Duration::from_millis(5)).await;
        let after_drop = ticks.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), after_drop);
    }

    #[tokio::test]
    async fn task_finishes_after_lifetime() {
        let (task, _ticks) = counting_task(Duration::from_millis(10), Some(Duration::from_millis(30)));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(task.is_finished());
    }
}
