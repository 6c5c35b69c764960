use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Snapshot of an asynchronous value.
///
/// While `loading` is true neither `data` nor `error` is set; once settled
/// exactly one of them is.
#[derive(Debug, Clone, PartialEq)]
pub struct AsyncState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> AsyncState<T> {
    pub fn pending() -> Self {
        Self {
            data: None,
            loading: true,
            error: None,
        }
    }

    pub fn succeeded(value: T) -> Self {
        Self {
            data: Some(value),
            loading: false,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            data: None,
            loading: false,
            error: Some(message.into()),
        }
    }

    pub fn is_settled(&self) -> bool {
        !self.loading
    }
}

impl<T> Default for AsyncState<T> {
    fn default() -> Self {
        Self::pending()
    }
}

type BoxedFuture<T> = Pin<Box<dyn Future<Output = Result<T, String>> + Send>>;
type Producer<T> = Box<dyn Fn() -> BoxedFuture<T> + Send + Sync>;

struct Shared<T> {
    state: watch::Sender<AsyncState<T>>,
    mounted: AtomicBool,
    /// Sequence number of the most recently started run
    started: AtomicU64,
    /// Sequence number of the most recently applied settlement
    latest_settled: AtomicU64,
}

impl<T> Shared<T> {
    fn settle(&self, seq: u64, outcome: Result<T, String>) {
        // All reads and writes of `mounted`/`latest_settled` that gate state
        // changes happen inside the watch lock.
        let applied = self.state.send_if_modified(|state| {
            if !self.mounted.load(Ordering::SeqCst) {
                return false;
            }
            if seq <= self.latest_settled.load(Ordering::SeqCst) {
                return false;
            }
            self.latest_settled.store(seq, Ordering::SeqCst);
            *state = match outcome {
                Ok(value) => AsyncState::succeeded(value),
                Err(message) => {
                    tracing::warn!(target: "async_state", "Run {} failed: {}", seq, message);
                    AsyncState::failed(message)
                }
            };
            true
        });

        if !applied {
            tracing::debug!(
                target: "async_state",
                "Discarded result of run {} (unmounted or superseded)",
                seq
            );
        }
    }
}

/// Auto-running async value keyed on a dependency value.
///
/// The producer runs when the resource is mounted and again whenever the
/// dependencies change. Each run is numbered; a run's result is applied only
/// while the resource is mounted and only if no later-numbered run has
/// already settled, so a slow stale response never overwrites a fresher one.
///
/// Unmounting stops state updates but does not abort in-flight work; the
/// spawned task finishes and its result is dropped.
///
/// Runs are spawned with `tokio::spawn`, so `mount`, `refresh` and
/// `set_deps` must be called from within a Tokio runtime.
pub struct AsyncResource<T, D = ()> {
    producer: Producer<T>,
    deps: D,
    shared: Arc<Shared<T>>,
}

impl<T, D> AsyncResource<T, D>
where
    T: Send + Sync + 'static,
    D: PartialEq,
{
    /// Create an unmounted resource in the initial loading state
    pub fn new<F, Fut, E>(producer: F, deps: D) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Display + Send,
    {
        let producer: Producer<T> = Box::new(move || -> BoxedFuture<T> {
            let fut = producer();
            Box::pin(async move { fut.await.map_err(|e| e.to_string()) })
        });
        let (state, _) = watch::channel(AsyncState::pending());

        Self {
            producer,
            deps,
            shared: Arc::new(Shared {
                state,
                mounted: AtomicBool::new(false),
                started: AtomicU64::new(0),
                latest_settled: AtomicU64::new(0),
            }),
        }
    }

    /// Mount and start the first run
    pub fn mount(&self) -> JoinHandle<()> {
        let shared = &self.shared;
        shared.state.send_if_modified(|_| {
            shared.mounted.store(true, Ordering::SeqCst);
            // Anything started before this mount belongs to an older lifetime
            shared
                .latest_settled
                .store(shared.started.load(Ordering::SeqCst), Ordering::SeqCst);
            false
        });
        self.start_run()
    }

    /// Stop applying results. In-flight runs keep going but are discarded.
    pub fn unmount(&self) {
        let shared = &self.shared;
        shared.state.send_if_modified(|_| {
            shared.mounted.store(false, Ordering::SeqCst);
            false
        });
    }

    pub fn is_mounted(&self) -> bool {
        self.shared.mounted.load(Ordering::SeqCst)
    }

    /// Replace the dependencies, re-running only if they differ from the
    /// current ones. Returns the new run when one was started.
    pub fn set_deps(&mut self, deps: D) -> Option<JoinHandle<()>> {
        if self.deps == deps {
            return None;
        }
        self.deps = deps;
        self.refresh()
    }

    pub fn deps(&self) -> &D {
        &self.deps
    }

    /// Re-run unconditionally. Does nothing while unmounted.
    pub fn refresh(&self) -> Option<JoinHandle<()>> {
        if !self.is_mounted() {
            return None;
        }
        Some(self.start_run())
    }

    /// Current state snapshot
    pub fn state(&self) -> AsyncState<T>
    where
        T: Clone,
    {
        self.shared.state.borrow().clone()
    }

    /// Receiver that observes every state change
    pub fn subscribe(&self) -> watch::Receiver<AsyncState<T>> {
        self.shared.state.subscribe()
    }

    fn start_run(&self) -> JoinHandle<()> {
        let seq = self.shared.started.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.state.send_modify(|state| *state = AsyncState::pending());
        tracing::debug!(target: "async_state", "Starting run {}", seq);

        let fut = (self.producer)();
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            let outcome = fut.await;
            shared.settle(seq, outcome);
        })
    }
}

impl<T, D> Drop for AsyncResource<T, D> {
    fn drop(&mut self) {
        let shared = &self.shared;
        shared.state.send_if_modified(|_| {
            shared.mounted.store(false, Ordering::SeqCst);
            false
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    type Gate = oneshot::Sender<Result<u32, String>>;

    type GatedProducer = Box<dyn Fn() -> BoxedFuture<u32> + Send + Sync>;

    /// A producer whose n-th run resolves when the n-th gate is opened
    fn gated(runs: usize) -> (GatedProducer, Vec<Gate>) {
        let mut gates = Vec::new();
        let mut receivers = VecDeque::new();
        for _ in 0..runs {
            let (tx, rx) = oneshot::channel();
            gates.push(tx);
            receivers.push_back(rx);
        }
        let receivers = Arc::new(Mutex::new(receivers));
        let producer: GatedProducer = Box::new(move || -> BoxedFuture<u32> {
            let next = receivers.lock().unwrap().pop_front();
            Box::pin(async move {
                match next {
                    Some(rx) => rx.await.unwrap_or_else(|_| Err("gate dropped".to_string())),
                    None => Err("no run expected".to_string()),
                }
            })
        });
        (producer, gates)
    }

    #[tokio::test]
    async fn test_loading_until_resolved() {
        let (producer, mut gates) = gated(1);
        let resource = AsyncResource::new(producer, ());

        let run = resource.mount();
        assert_eq!(resource.state(), AsyncState::pending());

        gates.remove(0).send(Ok(42)).unwrap();
        run.await.unwrap();
        assert_eq!(resource.state(), AsyncState::succeeded(42));
    }

    #[tokio::test]
    async fn test_rejection_sets_error() {
        let (producer, mut gates) = gated(1);
        let resource = AsyncResource::new(producer, ());

        let run = resource.mount();
        gates.remove(0).send(Err("503 Service Unavailable".into())).unwrap();
        run.await.unwrap();

        let state = resource.state();
        assert!(!state.loading);
        assert_eq!(state.data, None);
        assert_eq!(state.error.as_deref(), Some("503 Service Unavailable"));
    }

    #[tokio::test]
    async fn test_unchanged_deps_do_not_rerun() {
        let (producer, mut gates) = gated(2);
        let mut resource = AsyncResource::new(producer, "page=1");

        let run = resource.mount();
        gates.remove(0).send(Ok(1)).unwrap();
        run.await.unwrap();

        assert!(resource.set_deps("page=1").is_none());
        assert_eq!(resource.state(), AsyncState::succeeded(1));

        let rerun = resource.set_deps("page=2").expect("deps changed");
        assert_eq!(resource.state(), AsyncState::pending());
        gates.remove(0).send(Ok(2)).unwrap();
        rerun.await.unwrap();
        assert_eq!(resource.state(), AsyncState::succeeded(2));
    }

    #[tokio::test]
    async fn test_stale_run_does_not_overwrite_fresher_result() {
        let (producer, mut gates) = gated(2);
        let mut resource = AsyncResource::new(producer, 1);

        let first = resource.mount();
        let second = resource.set_deps(2).unwrap();

        let first_gate = gates.remove(0);
        gates.remove(0).send(Ok(200)).unwrap();
        second.await.unwrap();
        assert_eq!(resource.state(), AsyncState::succeeded(200));

        first_gate.send(Ok(100)).unwrap();
        first.await.unwrap();
        assert_eq!(resource.state(), AsyncState::succeeded(200));
    }

    #[tokio::test]
    async fn test_unmount_discards_in_flight_result() {
        let (producer, mut gates) = gated(1);
        let resource = AsyncResource::new(producer, ());
        let mut updates = resource.subscribe();

        let run = resource.mount();
        updates.borrow_and_update();
        resource.unmount();
        assert!(resource.refresh().is_none());

        gates.remove(0).send(Ok(7)).unwrap();
        run.await.unwrap();

        assert_eq!(resource.state(), AsyncState::pending());
        assert!(!updates.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_remount_ignores_run_from_previous_mount() {
        let (producer, mut gates) = gated(2);
        let resource = AsyncResource::new(producer, ());

        let old_run = resource.mount();
        resource.unmount();
        let new_run = resource.mount();
        assert!(resource.is_mounted());

        // The old run finishes first but belongs to the earlier mount
        gates.remove(0).send(Ok(100)).unwrap();
        old_run.await.unwrap();
        assert_eq!(resource.state(), AsyncState::pending());

        gates.remove(0).send(Ok(1)).unwrap();
        new_run.await.unwrap();
        assert_eq!(resource.state(), AsyncState::succeeded(1));
    }

    #[tokio::test]
    async fn test_subscribers_see_settlement() {
        let (producer, mut gates) = gated(1);
        let resource = AsyncResource::new(producer, ());
        let mut updates = resource.subscribe();

        let _run = resource.mount();
        gates.remove(0).send(Ok(5)).unwrap();

        let settled = updates.wait_for(|s| s.is_settled()).await.unwrap().clone();
        assert_eq!(settled.data, Some(5));
    }
}
