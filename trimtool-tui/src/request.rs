//! Request controller: loading, error and data for one async operation.
//!
//! A [`RequestController`] owns the state of a single backend call site. Every
//! dispatch cancels the previous unresolved one, so only the latest request
//! can change what the view shows. Dropping the controller (or calling
//! [`RequestController::detach`]) cancels whatever is still in flight.
//!
//! # Example
//!
//! ```ignore
//! let client = client.clone();
//! let mut listings = RequestController::new(
//!     operation(move |query: UnprocessedQuery, cancel| {
//!         let client = client.clone();
//!         async move { Ok(client.unprocessed_listings(&query, &cancel).await?) }
//!     }),
//!     RequestOptions::default(),
//! )
//! .with_wakeup(wakeup.clone());
//!
//! listings.attach(UnprocessedQuery::default());
//! ```

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use futures::future::BoxFuture;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use trimtool_lib::ApiError;

use crate::wakeup::WakeupSender;

/// Outcome of an operation that did not produce a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    /// The cancellation token fired. Never shown to the user.
    #[error("cancelled")]
    Cancelled,
    /// Any other failure, with a human-readable message.
    #[error("{0}")]
    Failed(String),
}

impl From<ApiError> for OperationError {
    fn from(err: ApiError) -> Self {
        if err.is_cancelled() {
            Self::Cancelled
        } else {
            Self::Failed(err.to_string())
        }
    }
}

/// A reported (non-cancellation) failure, returned to whoever awaited the
/// request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct OperationFailed {
    pub message: String,
}

/// The async function a controller drives.
pub type Operation<A, T> =
    Arc<dyn Fn(A, CancellationToken) -> BoxFuture<'static, Result<T, OperationError>> + Send + Sync>;

/// Wraps an async closure as an [`Operation`].
pub fn operation<A, T, F, Fut>(f: F) -> Operation<A, T>
where
    F: Fn(A, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, OperationError>> + Send + 'static,
{
    Arc::new(move |args: A, token: CancellationToken| f(args, token).boxed())
}

/// Observable state of a controller.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestState<T> {
    /// Last successfully resolved value.
    pub data: Option<T>,
    /// True from dispatch until the current request settles.
    pub loading: bool,
    /// Last reported failure; cleared when a new request starts.
    pub error: Option<String>,
}

impl<T> Default for RequestState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

/// Re-trigger policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Skip the request normally issued by [`RequestController::attach`].
    pub lazy: bool,
}

impl RequestOptions {
    pub fn lazy() -> Self {
        Self { lazy: true }
    }
}

struct Shared<T> {
    state: RequestState<T>,
    generation: u64,
    active: Option<CancellationToken>,
}

/// Loading/error/data binding for one operation.
///
/// Not `Clone`: the controller is owned by exactly one view, and its
/// lifetime bounds every request it issued.
pub struct RequestController<A, T> {
    operation: Operation<A, T>,
    options: RequestOptions,
    shared: Arc<Mutex<Shared<T>>>,
    teardown: CancellationToken,
    wakeup: Option<WakeupSender>,
    tracked: Option<A>,
}

impl<A, T> RequestController<A, T>
where
    A: Send + 'static,
    T: Clone + Send + 'static,
{
    pub fn new(operation: Operation<A, T>, options: RequestOptions) -> Self {
        Self {
            operation,
            options,
            shared: Arc::new(Mutex::new(Shared {
                state: RequestState::default(),
                generation: 0,
                active: None,
            })),
            teardown: CancellationToken::new(),
            wakeup: None,
            tracked: None,
        }
    }

    /// Signal `sender` on every state change.
    pub fn with_wakeup(mut self, sender: WakeupSender) -> Self {
        self.wakeup = Some(sender);
        self
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> RequestState<T> {
        lock(&self.shared).state.clone()
    }

    /// Borrow the current state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&RequestState<T>) -> R) -> R {
        f(&lock(&self.shared).state)
    }

    pub fn is_loading(&self) -> bool {
        self.read(|s| s.loading)
    }

    /// Dispatch the operation.
    ///
    /// The previous unresolved request is cancelled and the state flips to
    /// loading before this returns; the returned future only waits for
    /// settlement. It resolves to `Ok(Some(value))` on success, `Ok(None)`
    /// when cancelled or superseded, and `Err` for a reported failure of the
    /// current request.
    pub fn request(
        &self,
        args: A,
    ) -> impl Future<Output = Result<Option<T>, OperationFailed>> + Send + use<A, T> {
        let token = self.teardown.child_token();
        let pending = if self.teardown.is_cancelled() {
            None
        } else {
            let generation = self.begin(token.clone());
            Some((generation, (self.operation)(args, token.clone())))
        };

        let shared = Arc::clone(&self.shared);
        let teardown = self.teardown.clone();
        let wakeup = self.wakeup.clone();

        async move {
            let Some((generation, operation)) = pending else {
                return Ok(None);
            };

            let result = tokio::select! {
                biased;
                _ = token.cancelled() => Err(OperationError::Cancelled),
                result = operation => result,
            };

            if teardown.is_cancelled() {
                log::debug!("request #{} settled after teardown", generation);
                return Ok(None);
            }

            let outcome = settle(&shared, generation, result);
            if let Some(wakeup) = &wakeup {
                wakeup.send();
            }
            outcome
        }
    }

    /// Dispatch on a background task; the outcome only lands in the state.
    pub fn dispatch(&self, args: A) {
        let request = self.request(args);
        tokio::spawn(async move {
            if let Err(e) = request.await {
                log::warn!("background request failed: {}", e);
            }
        });
    }

    /// Cancel the in-flight request, if any. `error` is left untouched.
    pub fn cancel(&self) {
        {
            let mut shared = lock(&self.shared);
            if let Some(token) = shared.active.take() {
                token.cancel();
            }
            shared.state.loading = false;
        }
        self.notify();
    }

    /// Cancel everything and stop reacting to settlements.
    pub fn detach(&self) {
        self.teardown.cancel();
    }

    pub fn is_detached(&self) -> bool {
        self.teardown.is_cancelled()
    }

    fn begin(&self, token: CancellationToken) -> u64 {
        let generation = {
            let mut shared = lock(&self.shared);
            if let Some(previous) = shared.active.replace(token) {
                previous.cancel();
            }
            shared.generation += 1;
            shared.state.loading = true;
            shared.state.error = None;
            shared.generation
        };
        log::debug!("request #{} dispatched", generation);
        self.notify();
        generation
    }

    fn notify(&self) {
        if let Some(wakeup) = &self.wakeup {
            wakeup.send();
        }
    }
}

impl<A, T> RequestController<A, T>
where
    A: Clone + PartialEq + Send + 'static,
    T: Clone + Send + 'static,
{
    /// Bind the controller to its initial dependency value.
    ///
    /// Issues one request unless the controller is lazy.
    pub fn attach(&mut self, initial: A) {
        if self.options.lazy {
            self.tracked = Some(initial);
        } else {
            self.track(initial);
        }
    }

    /// Re-request when `value` differs from the last tracked value.
    ///
    /// Returns whether a request was issued.
    pub fn track(&mut self, value: A) -> bool {
        if self.tracked.as_ref() == Some(&value) {
            return false;
        }
        self.tracked = Some(value.clone());
        self.dispatch(value);
        true
    }

    /// The last tracked dependency value.
    pub fn tracked(&self) -> Option<&A> {
        self.tracked.as_ref()
    }

    /// Re-issue the request for the tracked value (retry, refresh after a
    /// mutation). Does nothing before [`attach`](Self::attach).
    pub fn refresh(&self) {
        if let Some(value) = self.tracked.clone() {
            self.dispatch(value);
        }
    }
}

impl<A, T> Drop for RequestController<A, T> {
    fn drop(&mut self) {
        self.teardown.cancel();
    }
}

fn settle<T: Clone>(
    shared: &Mutex<Shared<T>>,
    generation: u64,
    result: Result<T, OperationError>,
) -> Result<Option<T>, OperationFailed> {
    let mut shared = lock(shared);
    if shared.generation != generation {
        log::debug!("request #{} superseded by #{}", generation, shared.generation);
        return Ok(None);
    }

    shared.state.loading = false;
    shared.active = None;

    match result {
        Ok(value) => {
            shared.state.data = Some(value.clone());
            Ok(Some(value))
        }
        Err(OperationError::Cancelled) => {
            log::debug!("request #{} cancelled", generation);
            Ok(None)
        }
        Err(OperationError::Failed(message)) => {
            log::warn!("request #{} failed: {}", generation, message);
            shared.state.error = Some(message.clone());
            Err(OperationFailed { message })
        }
    }
}

fn lock<T>(shared: &Mutex<Shared<T>>) -> MutexGuard<'_, Shared<T>> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tokio::time::sleep;

    use super::*;
    use crate::wakeup;

    /// Sleeps `delay` ms, then yields the delay back (or fails on 0).
    fn delayed() -> Operation<u64, u64> {
        operation(|delay: u64, _cancel| async move {
            sleep(Duration::from_millis(delay)).await;
            if delay == 0 {
                Err(OperationError::Failed("boom".into()))
            } else {
                Ok(delay)
            }
        })
    }

    fn counting(calls: Arc<AtomicUsize>) -> Operation<String, String> {
        operation(move |value: String, _cancel| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok(value.to_uppercase()) }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_sets_data_and_clears_loading() {
        let ctl = RequestController::new(delayed(), RequestOptions::default());
        let pending = ctl.request(10);
        assert!(ctl.is_loading());

        assert_eq!(pending.await, Ok(Some(10)));
        let state = ctl.state();
        assert_eq!(state.data, Some(10));
        assert!(!state.loading);
        assert_eq!(state.error, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_stored_and_returned() {
        let ctl = RequestController::new(delayed(), RequestOptions::default());
        let result = ctl.request(0).await;

        assert_eq!(
            result,
            Err(OperationFailed {
                message: "boom".into()
            })
        );
        let state = ctl.state();
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some("boom"));
        assert_eq!(state.data, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_latest_request_is_reflected() {
        let ctl = RequestController::new(delayed(), RequestOptions::default());
        let slow = ctl.request(200);
        let fast = ctl.request(50);

        let (slow, fast) = tokio::join!(slow, fast);
        assert_eq!(slow, Ok(None));
        assert_eq!(fast, Ok(Some(50)));
        assert_eq!(ctl.state().data, Some(50));
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_request_cannot_clobber_newer_one() {
        let ctl = RequestController::new(delayed(), RequestOptions::default());
        let first = ctl.request(50);
        let second = ctl.request(200);

        // The superseded request settles first; the newer one is still running.
        assert_eq!(first.await, Ok(None));
        assert!(ctl.is_loading());
        assert_eq!(second.await, Ok(Some(200)));
        assert!(!ctl.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_failure_is_swallowed() {
        let ctl = RequestController::new(delayed(), RequestOptions::default());
        let failing = ctl.request(0);
        let ok = ctl.request(30);

        let (failing, ok) = tokio::join!(failing, ok);
        assert_eq!(failing, Ok(None));
        assert_eq!(ok, Ok(Some(30)));
        assert_eq!(ctl.state().error, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_resolves_quietly() {
        let ctl = RequestController::new(delayed(), RequestOptions::default());
        let pending = ctl.request(1_000);
        ctl.cancel();

        assert_eq!(pending.await, Ok(None));
        let state = ctl.state();
        assert!(!state.loading);
        assert_eq!(state.error, None);
        assert_eq!(state.data, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_keeps_previous_error() {
        let ctl = RequestController::new(delayed(), RequestOptions::default());
        let _ = ctl.request(0).await;
        ctl.cancel();
        assert_eq!(ctl.state().error.as_deref(), Some("boom"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_request_clears_error() {
        let ctl = RequestController::new(delayed(), RequestOptions::default());
        let _ = ctl.request(0).await;
        let pending = ctl.request(5);
        assert_eq!(ctl.state().error, None);
        assert_eq!(pending.await, Ok(Some(5)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_detach_stops_state_changes() {
        let ctl = RequestController::new(delayed(), RequestOptions::default());
        let pending = ctl.request(100);
        ctl.detach();

        assert_eq!(pending.await, Ok(None));
        assert_eq!(ctl.state().data, None);

        // Requests after teardown never run.
        assert_eq!(ctl.request(5).await, Ok(None));
        assert_eq!(ctl.state().data, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_outstanding_token() {
        let seen = Arc::new(Mutex::new(None::<CancellationToken>));
        let captured = Arc::clone(&seen);
        let op = operation(move |_: (), cancel: CancellationToken| {
            *captured.lock().unwrap() = Some(cancel.clone());
            async move {
                cancel.cancelled().await;
                Err::<(), _>(OperationError::Cancelled)
            }
        });

        let ctl = RequestController::new(op, RequestOptions::default());
        let pending = ctl.request(());
        drop(ctl);

        assert_eq!(pending.await, Ok(None));
        assert!(seen.lock().unwrap().as_ref().unwrap().is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_attach_requests_unless_lazy() {
        let calls = Arc::new(AtomicUsize::new(0));

        let mut eager = RequestController::new(counting(Arc::clone(&calls)), RequestOptions::default());
        eager.attach("a".to_string());
        sleep(Duration::from_millis(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(eager.state().data.as_deref(), Some("A"));

        let mut lazy = RequestController::new(counting(Arc::clone(&calls)), RequestOptions::lazy());
        lazy.attach("a".to_string());
        sleep(Duration::from_millis(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Lazy only suppresses the initial request.
        assert!(lazy.track("b".to_string()));
        sleep(Duration::from_millis(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_track_requests_once_per_distinct_value() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut ctl = RequestController::new(counting(Arc::clone(&calls)), RequestOptions::default());

        ctl.attach("toyota".to_string());
        assert!(!ctl.track("toyota".to_string()));
        assert!(ctl.track("kia".to_string()));
        assert!(!ctl.track("kia".to_string()));
        sleep(Duration::from_millis(1)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(ctl.state().data.as_deref(), Some("KIA"));
        assert_eq!(ctl.tracked().map(String::as_str), Some("kia"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_reuses_tracked_value() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut ctl = RequestController::new(counting(Arc::clone(&calls)), RequestOptions::lazy());

        ctl.refresh();
        sleep(Duration::from_millis(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        ctl.attach("rio".to_string());
        ctl.refresh();
        sleep(Duration::from_millis(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(ctl.state().data.as_deref(), Some("RIO"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_state_changes_send_wakeups() {
        let (tx, mut rx) = wakeup::channel();
        let ctl = RequestController::new(delayed(), RequestOptions::default()).with_wakeup(tx);

        let pending = ctl.request(10);
        assert_eq!(rx.recv().await, Some(()));
        pending.await.unwrap();
        assert_eq!(rx.recv().await, Some(()));
    }

    #[test]
    fn test_api_errors_map_to_operation_errors() {
        assert_eq!(OperationError::from(ApiError::Cancelled), OperationError::Cancelled);
        assert_eq!(
            OperationError::from(ApiError::http(404, "Listing not found")),
            OperationError::Failed("Listing not found".into())
        );
    }
}
