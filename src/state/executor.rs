use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutorState {
    pub loading: bool,
    pub error: Option<String>,
}

/// Runs one-shot async operations (form submits, logins) and tracks
/// `loading`/`error` for them.
///
/// Overlapping `execute` calls are not serialized: they share one slot and
/// whichever finishes last wins. Callers are expected to block re-entry
/// themselves, e.g. by disabling the trigger while `is_loading()`.
#[derive(Clone)]
pub struct AsyncExecutor {
    state: Arc<watch::Sender<ExecutorState>>,
}

impl Default for AsyncExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Clears `loading` when the execute future completes or is dropped
struct LoadingGuard<'a> {
    state: &'a watch::Sender<ExecutorState>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.loading = false);
    }
}

impl AsyncExecutor {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ExecutorState::default());
        Self {
            state: Arc::new(state),
        }
    }

    /// Await `operation`, returning its value or `None` after recording the
    /// failure message.
    pub async fn execute<T, E, Fut>(&self, operation: Fut) -> Option<T>
    where
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });
        let _guard = LoadingGuard { state: &self.state };

        match operation.await {
            Ok(value) => Some(value),
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(target: "executor", "Operation failed: {}", message);
                self.state.send_modify(|s| s.error = Some(message));
                None
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn clear_error(&self) {
        self.state.send_if_modified(|s| s.error.take().is_some());
    }

    pub fn snapshot(&self) -> ExecutorState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ExecutorState> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_success_returns_value() {
        let executor = AsyncExecutor::new();
        let result = executor.execute(async { Ok::<_, anyhow::Error>("token") }).await;

        assert_eq!(result, Some("token"));
        assert_eq!(executor.snapshot(), ExecutorState::default());
    }

    #[tokio::test]
    async fn test_failure_records_message_and_clears_loading() {
        let executor = AsyncExecutor::new();
        let result: Option<()> = executor
            .execute(async { Err(anyhow!("Invalid credentials")) })
            .await;

        assert_eq!(result, None);
        assert!(!executor.is_loading());
        assert_eq!(executor.error().as_deref(), Some("Invalid credentials"));

        executor.clear_error();
        assert_eq!(executor.error(), None);
    }

    #[tokio::test]
    async fn test_new_call_clears_previous_error() {
        let executor = AsyncExecutor::new();
        executor
            .execute(async { Err::<(), _>("first".to_string()) })
            .await;
        assert!(executor.error().is_some());

        let (tx, rx) = oneshot::channel::<Result<u8, String>>();
        let background = executor.clone();
        let task = tokio::spawn(async move {
            background
                .execute(async move { rx.await.unwrap_or_else(|e| Err(e.to_string())) })
                .await
        });

        let mut updates = executor.subscribe();
        updates.wait_for(|s| s.loading).await.unwrap();
        assert_eq!(executor.error(), None);

        tx.send(Ok(9)).unwrap();
        assert_eq!(task.await.unwrap(), Some(9));
        assert!(!executor.is_loading());
    }

    #[tokio::test]
    async fn test_dropped_call_still_clears_loading() {
        let executor = AsyncExecutor::new();
        let pending = executor.execute(std::future::pending::<Result<(), String>>());

        let timed_out = tokio::time::timeout(std::time::Duration::from_millis(10), pending).await;
        assert!(timed_out.is_err());
        assert!(!executor.is_loading());
    }
}
