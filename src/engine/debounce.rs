// Single-slot cancellable timer

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Runs a task after a quiet period; each new schedule replaces the pending one
///
/// Only the waiting phase is cancellable. Once the delay elapses the task is
/// spawned on its own and a later `schedule` or `cancel` no longer affects it.
#[derive(Default)]
pub struct Debouncer {
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to start after `delay`, cancelling any pending task
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule<F>(&self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = pending.take() {
            previous.abort();
        }

        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(task);
        }));
    }

    /// Cancel the pending task; returns true if one was still waiting
    pub fn cancel(&self) -> bool {
        let handle = self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        match handle {
            Some(handle) => {
                let was_waiting = !handle.is_finished();
                handle.abort();
                was_waiting
            }
            None => false,
        }
    }

    /// Whether a task is waiting for its delay to elapse
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn test_only_last_schedule_runs() {
        let debouncer = Debouncer::new();
        let fired = Arc::new(Mutex::new(Vec::new()));

        for label in ["A", "B", "C"] {
            let fired = Arc::clone(&fired);
            debouncer.schedule(Duration::from_millis(500), async move {
                fired.lock().unwrap().push(label);
            });
            sleep(Duration::from_millis(100)).await;
        }

        sleep(Duration::from_millis(600)).await;
        assert_eq!(*fired.lock().unwrap(), vec!["C"]);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_run() {
        let debouncer = Debouncer::new();
        let fired = Arc::new(Mutex::new(false));

        let flag = Arc::clone(&fired);
        debouncer.schedule(Duration::from_millis(500), async move {
            *flag.lock().unwrap() = true;
        });
        assert!(debouncer.is_pending());
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());

        sleep(Duration::from_secs(2)).await;
        assert!(!*fired.lock().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_separated_calls_both_run() {
        let debouncer = Debouncer::new();
        let count = Arc::new(Mutex::new(0));

        for _ in 0..2 {
            let count = Arc::clone(&count);
            debouncer.schedule(Duration::from_millis(100), async move {
                *count.lock().unwrap() += 1;
            });
            sleep(Duration::from_millis(300)).await;
        }

        assert_eq!(*count.lock().unwrap(), 2);
    }
}
