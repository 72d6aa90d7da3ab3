//! Cancellable submit completion
//!
//! After an accepted submit the host waits a fixed delay before closing.
//! The wait runs as a tokio task so that closing or dropping the host can
//! abort it; the host only changes its own state once it has awaited the
//! task to completion.

use formwright_core::{FormError, FormResult};
use std::future::Future;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

/// Handle to a pending submit completion
#[derive(Debug, Default)]
pub struct SubmitTask {
    handle: Option<JoinHandle<FormResult<()>>>,
}

impl SubmitTask {
    /// Spawn `fut` on the current runtime
    pub fn spawn<F>(fut: F) -> FormResult<Self>
    where
        F: Future<Output = FormResult<()>> + Send + 'static,
    {
        let runtime = Handle::try_current()
            .map_err(|e| FormError::internal(format!("submit needs a tokio runtime: {}", e)))?;
        Ok(Self {
            handle: Some(runtime.spawn(fut)),
        })
    }

    /// A task that completes after `delay`
    pub fn delay(delay: Duration) -> FormResult<Self> {
        Self::spawn(async move {
            tokio::time::sleep(delay).await;
            Ok(())
        })
    }

    /// Whether there is a task that has not been awaited or aborted
    pub fn is_pending(&self) -> bool {
        self.handle.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Abort the task; a later `wait` reports `Cancelled`
    pub fn abort(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("Aborted pending submit");
        }
    }

    /// Wait for the task to finish
    pub async fn wait(&mut self) -> FormResult<()> {
        let Some(handle) = self.handle.take() else {
            return Err(FormError::Cancelled);
        };

        match handle.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(FormError::Cancelled),
            Err(e) => Err(FormError::internal(format!("submit task failed: {}", e))),
        }
    }
}

impl Drop for SubmitTask {
    fn drop(&mut self) {
        self.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_delay_completes() {
        let mut task = SubmitTask::delay(Duration::from_secs(1)).unwrap();
        assert!(task.is_pending());
        assert!(task.wait().await.is_ok());
        assert!(!task.is_pending());
        assert!(task.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_reports_cancelled() {
        let mut task = SubmitTask::delay(Duration::from_secs(60)).unwrap();
        task.abort();
        assert!(matches!(task.wait().await, Err(FormError::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_the_future() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let task = SubmitTask::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            flag.store(true, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();

        drop(task);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_error_is_passed_through() {
        let mut task = SubmitTask::spawn(async { Err(FormError::internal("backend down")) }).unwrap();
        assert!(matches!(task.wait().await, Err(FormError::Internal(_))));
    }

    #[test]
    fn test_spawn_without_runtime() {
        assert!(SubmitTask::delay(Duration::from_millis(1)).is_err());
    }

    #[test]
    fn test_block_on_wait() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut task = rt.block_on(async { SubmitTask::delay(Duration::from_millis(1)) }).unwrap();
        tokio_test::assert_ok!(rt.block_on(task.wait()));
    }
}
