use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Runs only the last of a burst of scheduled tasks, once `delay` has passed
/// without a newer one.
///
/// Scheduling cancels a task that is still waiting out its delay. A task
/// that has started running is left alone and finishes; tasks run one at a
/// time in the order they fired.
pub struct Debouncer {
    delay: Duration,
    waiting: Option<JoinHandle<()>>,
    gate: Arc<Mutex<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            waiting: None,
            gate: Arc::new(Mutex::new(())),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn schedule<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();

        let delay = self.delay;
        let gate = Arc::clone(&self.gate);
        self.waiting = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Detach so a later cancel cannot interrupt the task mid-write.
            tokio::spawn(async move {
                let _running = gate.lock().await;
                task.await;
            });
        }));
    }

    /// Drop the waiting task, if any. Returns whether one was dropped.
    pub fn cancel(&mut self) -> bool {
        match self.waiting.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    /// A task is scheduled and still inside its quiet period.
    pub fn is_pending(&self) -> bool {
        self.waiting
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Cancel the waiting task and run `task` right away, after any task
    /// already running.
    pub async fn run_now<F>(&mut self, task: F)
    where
        F: Future<Output = ()>,
    {
        self.cancel();
        let _running = self.gate.lock().await;
        task.await;
    }

    /// Wait for a task that already fired to finish.
    pub async fn settle(&self) {
        let _running = self.gate.lock().await;
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
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_task(counter: &Arc<AtomicUsize>, value: usize) -> impl Future<Output = ()> + Send + 'static {
        let counter = Arc::clone(counter);
        async move {
            counter.store(value, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_runs_last_task_once() {
        let last = Arc::new(AtomicUsize::new(0));
        let runs = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(Duration::from_millis(500));

        for value in 1..=5 {
            let last = Arc::clone(&last);
            let runs = Arc::clone(&runs);
            debouncer.schedule(async move {
                last.store(value, Ordering::SeqCst);
                runs.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        assert!(debouncer.is_pending());
        assert_eq!(runs.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(!debouncer.is_pending());
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(last.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_waiting_task() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(Duration::from_millis(500));

        debouncer.schedule(counting_task(&counter, 7));
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_now_replaces_waiting_task() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(Duration::from_millis(500));

        debouncer.schedule(counting_task(&counter, 1));
        debouncer.run_now(counting_task(&counter, 2)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_quiet_periods_each_fire() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(Duration::from_millis(500));

        for _ in 0..2 {
            let runs = Arc::clone(&runs);
            debouncer.schedule(async move {
                runs.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(700)).await;
        }

        debouncer.settle().await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }
}
