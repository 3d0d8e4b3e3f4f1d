//! Deferred outcomes
//!
//! A [`DeferredOutcome`] owns a single-resolution future of an eventual
//! [`Outcome`]. The combinator surface mirrors the synchronous one, operating
//! after resolution; every derived value is itself deferred ("async poison" is
//! monotonic and one-directional, enforced here by the type system: no
//! combinator returns a plain [`Outcome`]).
//!
//! Resolution happens exactly once — combinators consume the value, so double
//! resolution is unrepresentable. A deferred outcome is also directly
//! awaitable via its [`Future`] impl, yielding the plain [`Outcome`] without
//! going through any combinator.

use crate::dispatch::FailureHandlers;
use crate::failure::Failure;
use crate::outcome::Outcome;
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// An [`Outcome`] that has not resolved yet.
pub struct DeferredOutcome<T, E = Failure> {
    inner: BoxFuture<'static, Outcome<T, E>>,
}

impl<T, E> fmt::Debug for DeferredOutcome<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DeferredOutcome(<unresolved>)")
    }
}

impl<T, E> Future for DeferredOutcome<T, E> {
    type Output = Outcome<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.get_mut().inner.as_mut().poll(cx)
    }
}

impl<T, E> DeferredOutcome<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Lift an already-resolved outcome into the deferred kind.
    ///
    /// There is no inverse: a chain never converts back to synchronous.
    pub fn from_outcome(outcome: Outcome<T, E>) -> Self {
        Self {
            inner: Box::pin(std::future::ready(outcome)),
        }
    }

    /// Wrap a future of an outcome.
    pub fn from_future(future: impl Future<Output = Outcome<T, E>> + Send + 'static) -> Self {
        Self {
            inner: Box::pin(future),
        }
    }

    /// Apply `f` to the success value after resolution.
    pub fn map<U>(self, f: impl FnOnce(T) -> U + Send + 'static) -> DeferredOutcome<U, E>
    where
        U: Send + 'static,
    {
        DeferredOutcome::from_future(async move { self.await.map(f) })
    }

    /// Chain an outcome-returning step after resolution.
    pub fn and_then<U>(
        self,
        f: impl FnOnce(T) -> Outcome<U, E> + Send + 'static,
    ) -> DeferredOutcome<U, E>
    where
        U: Send + 'static,
    {
        DeferredOutcome::from_future(async move { self.await.and_then(f) })
    }

    /// Chain a further deferred step after resolution.
    pub fn map_deferred<U>(
        self,
        f: impl FnOnce(T) -> DeferredOutcome<U, E> + Send + 'static,
    ) -> DeferredOutcome<U, E>
    where
        U: Send + 'static,
    {
        DeferredOutcome::from_future(async move {
            match self.await {
                Outcome::Ok(value) => f(value).await,
                Outcome::Fail(failure) => Outcome::Fail(failure),
            }
        })
    }

    /// Apply `f` to the failure payload after resolution.
    pub fn map_failure<F>(self, f: impl FnOnce(E) -> F + Send + 'static) -> DeferredOutcome<T, F>
    where
        F: Send + 'static,
    {
        DeferredOutcome::from_future(async move { self.await.map_failure(f) })
    }

    /// Chain a recovery step on the failure channel after resolution.
    pub fn or_else<F>(
        self,
        f: impl FnOnce(E) -> Outcome<T, F> + Send + 'static,
    ) -> DeferredOutcome<T, F>
    where
        F: Send + 'static,
    {
        DeferredOutcome::from_future(async move { self.await.or_else(f) })
    }

    /// Observe the success value when the chain resolves; the side effect
    /// fires only at resolution time.
    pub fn inspect(self, f: impl FnOnce(&T) + Send + 'static) -> Self {
        Self::from_future(async move { self.await.inspect(f) })
    }

    /// Observe the failure payload when the chain resolves.
    pub fn inspect_failure(self, f: impl FnOnce(&E) + Send + 'static) -> Self {
        Self::from_future(async move { self.await.inspect_failure(f) })
    }

    /// Deferred variant test.
    pub async fn is_ok(self) -> bool {
        self.await.is_ok()
    }

    /// Deferred variant test.
    pub async fn has_failed(self) -> bool {
        self.await.has_failed()
    }

    /// Deferred safe extraction, caller-discriminated.
    pub async fn into_result(self) -> Result<T, E> {
        self.await.into_result()
    }

    /// Deferred extraction with a default.
    pub async fn unwrap_or(self, default: T) -> T {
        self.await.unwrap_or(default)
    }

    /// Deferred branch match; returns the branch value directly.
    pub async fn match_with<R>(
        self,
        ok: impl FnOnce(T) -> R,
        failed: impl FnOnce(E) -> R,
    ) -> R {
        self.await.match_with(ok, failed)
    }
}

impl<T> DeferredOutcome<T, Failure>
where
    T: Send + 'static,
{
    /// Wrap a raw fallible future; its error side is captured as an
    /// [`UNKNOWN_FAILURE`](crate::UNKNOWN_FAILURE) failure with the cause
    /// retained.
    pub fn from_try_future<Er>(
        future: impl Future<Output = Result<T, Er>> + Send + 'static,
    ) -> Self
    where
        Er: std::error::Error + Send + Sync + 'static,
    {
        Self::from_future(async move {
            match future.await {
                Ok(value) => Outcome::Ok(value),
                Err(error) => Outcome::Fail(Failure::unknown(Arc::new(error))),
            }
        })
    }

    /// Wrap the sequencer's resolution channel.
    ///
    /// If the sender side is dropped before resolving, the driver aborted
    /// fatally (wiring fault); awaiting propagates that abort.
    pub fn from_oneshot(receiver: oneshot::Receiver<Outcome<T, Failure>>) -> Self {
        Self::from_future(async move {
            match receiver.await {
                Ok(outcome) => outcome,
                Err(_) => panic!("effect sequencer aborted before resolving its outcome"),
            }
        })
    }

    /// Deferred forced extraction; fatal on failure, as [`Outcome::expect`].
    pub async fn expect(self, message: &str) -> T {
        self.await.expect(message)
    }

    /// Dispatch the eventual failure through a code-keyed handler map.
    pub fn recover(self, handlers: FailureHandlers<T>) -> Self {
        Self::from_future(async move {
            match self.await {
                Outcome::Ok(value) => Outcome::Ok(value),
                Outcome::Fail(failure) => handlers.dispatch(failure).resolve().await,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::{fail, ok};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, thiserror::Error)]
    #[error("boom")]
    struct Boom;

    #[tokio::test]
    async fn directly_awaitable_without_combinators() {
        let deferred = DeferredOutcome::from_outcome(ok(7));
        assert_eq!(deferred.await, ok(7));
    }

    #[tokio::test]
    async fn combinators_operate_after_resolution() {
        let deferred = DeferredOutcome::from_future(async { ok(20) })
            .map(|v| v + 1)
            .and_then(|v| ok(v * 2));
        assert_eq!(deferred.await, ok(42));
    }

    #[tokio::test]
    async fn failure_passes_through_map() {
        let deferred = DeferredOutcome::from_outcome(fail::<i32>("ERROR", "boom")).map(|v| v + 1);
        assert_eq!(deferred.await, fail("ERROR", "boom"));
    }

    #[tokio::test]
    async fn inspect_fires_only_at_resolution() {
        let fired = std::sync::Arc::new(AtomicUsize::new(0));
        let observer = fired.clone();
        let deferred = DeferredOutcome::from_future(async { ok(1) })
            .inspect(move |_| {
                observer.fetch_add(1, Ordering::SeqCst);
            });
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        let _ = deferred.await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn try_future_rejection_becomes_unknown_failure() {
        let deferred: DeferredOutcome<i32> =
            DeferredOutcome::from_try_future(async { Err::<i32, _>(Boom) });
        let failure = deferred.await.into_failure().expect("failed");
        assert_eq!(failure.code(), crate::UNKNOWN_FAILURE);
        assert_eq!(failure.message(), "boom");
    }

    #[tokio::test]
    async fn deferred_scalar_extraction() {
        let deferred: DeferredOutcome<i32> = DeferredOutcome::from_outcome(fail("ERROR", "boom"));
        assert_eq!(deferred.unwrap_or(3).await, 3);

        let deferred = DeferredOutcome::from_outcome(ok(1));
        assert!(deferred.is_ok().await);
    }
}
