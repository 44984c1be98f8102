use std::future::Future;
use std::sync::Arc;
use tokio::sync::{AcquireError, Semaphore};
use tokio::task::JoinHandle;

/// Spawns tokio tasks, optionally capping how many run at once.
///
/// A bounded spawner waits for a permit before spawning; the permit moves into the
/// task and is released when the task ends, including by panic.
pub struct LimitedSpawner {
    semaphore: Option<Arc<Semaphore>>,
}

impl LimitedSpawner {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            semaphore: Some(Arc::new(Semaphore::new(max_concurrent))),
        }
    }

    pub fn unbounded() -> Self {
        Self { semaphore: None }
    }

    pub fn with_limit(limit: Option<usize>) -> Self {
        match limit {
            Some(max_concurrent) => Self::new(max_concurrent),
            None => Self::unbounded(),
        }
    }

    pub async fn spawn<F>(&self, f: F) -> Result<JoinHandle<F::Output>, AcquireError>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let Some(semaphore) = &self.semaphore else {
            return Ok(tokio::spawn(f));
        };

        let permit = Arc::clone(semaphore).acquire_owned().await?;
        Ok(tokio::spawn(async move {
            let _permit = permit;
            f.await
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::sleep;

    async fn peak_concurrency(spawner: &LimitedSpawner, tasks: usize) -> usize {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..tasks {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            let handle = spawner
                .spawn(async move {
                    let current = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(current, Ordering::SeqCst);
                    sleep(Duration::from_millis(50)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                })
                .await
                .unwrap();
            handles.push(handle);
        }

        for handle in handles {
            handle.await.unwrap();
        }
        peak.load(Ordering::SeqCst)
    }

    #[tokio::test]
    async fn test_basic_spawn() {
        let spawner = LimitedSpawner::new(2);
        let handle = spawner.spawn(async { 42 }).await.unwrap();
        assert_eq!(handle.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_concurrent_limit() {
        let spawner = LimitedSpawner::new(2);
        assert!(peak_concurrency(&spawner, 5).await <= 2);
    }

    #[tokio::test]
    async fn test_unbounded_runs_everything_at_once() {
        let spawner = LimitedSpawner::with_limit(None);
        assert_eq!(peak_concurrency(&spawner, 8).await, 8);
    }

    #[tokio::test]
    async fn test_zero_limit_never_spawns() {
        let spawner = LimitedSpawner::new(0);
        let result =
            tokio::time::timeout(Duration::from_millis(100), spawner.spawn(async { 42 })).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_task_failure_releases_permit() {
        let spawner = LimitedSpawner::new(1);

        let handle = spawner
            .spawn(async {
                panic!("Test panic");
            })
            .await
            .unwrap();
        assert!(handle.await.is_err());

        let handle = spawner.spawn(async { 42 }).await.unwrap();
        assert_eq!(handle.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_single_permit_runs_in_order() {
        let spawner = LimitedSpawner::with_limit(Some(1));
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for i in 0..3 {
            let order = Arc::clone(&order);
            let handle = spawner
                .spawn(async move {
                    order.lock().unwrap().push(i);
                    sleep(Duration::from_millis(20)).await;
                })
                .await
                .unwrap();
            handles.push(handle);
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }
}
