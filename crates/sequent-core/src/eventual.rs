//! Ready-or-pending run results
//!
//! [`Eventual`] is what a sequenced run hands back: either an already-resolved
//! [`Outcome`] (the body never touched a deferred value) or a
//! [`DeferredOutcome`] (the one-way mode transition fired). The lift to
//! `Pending` is monotonic — there is no operation converting a pending chain
//! back to `Ready`.

use crate::deferred::DeferredOutcome;
use crate::failure::Failure;
use crate::outcome::Outcome;

/// A resolved outcome or a deferred one.
#[derive(Debug)]
pub enum Eventual<T, E = Failure> {
    /// Resolved synchronously.
    Ready(Outcome<T, E>),
    /// Resolution is still pending; the value is permanently deferred.
    Pending(DeferredOutcome<T, E>),
}

impl<T, E> Eventual<T, E> {
    /// True once the chain has gone deferred.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// The resolved outcome, if the run stayed synchronous.
    pub fn ready(self) -> Option<Outcome<T, E>> {
        match self {
            Self::Ready(outcome) => Some(outcome),
            Self::Pending(_) => None,
        }
    }

    /// Resolve either variant to a plain outcome.
    pub async fn resolve(self) -> Outcome<T, E> {
        match self {
            Self::Ready(outcome) => outcome,
            Self::Pending(deferred) => deferred.await,
        }
    }
}

impl<T, E> Eventual<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Lift to the deferred kind unconditionally (one-way).
    pub fn into_deferred(self) -> DeferredOutcome<T, E> {
        match self {
            Self::Ready(outcome) => DeferredOutcome::from_outcome(outcome),
            Self::Pending(deferred) => deferred,
        }
    }

    /// Map the success channel, preserving readiness: a ready value stays
    /// ready, a pending value stays pending.
    pub fn map<U>(self, f: impl FnOnce(T) -> U + Send + 'static) -> Eventual<U, E>
    where
        U: Send + 'static,
    {
        match self {
            Self::Ready(outcome) => Eventual::Ready(outcome.map(f)),
            Self::Pending(deferred) => Eventual::Pending(deferred.map(f)),
        }
    }

    /// Map the failure channel, preserving readiness.
    pub fn map_failure<F>(self, f: impl FnOnce(E) -> F + Send + 'static) -> Eventual<T, F>
    where
        F: Send + 'static,
    {
        match self {
            Self::Ready(outcome) => Eventual::Ready(outcome.map_failure(f)),
            Self::Pending(deferred) => Eventual::Pending(deferred.map_failure(f)),
        }
    }
}
