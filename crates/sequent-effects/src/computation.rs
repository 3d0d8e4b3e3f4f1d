//! The binding façade
//!
//! [`Computation`] pairs a reusable body definition with an immutable
//! [`BindingSet`]. `inject` layers bindings (later wins), `run` hands the
//! body to the trampoline, and `delegate` packages it for inline stepping
//! inside another body via [`Scope::call`](crate::Scope::call).

use crate::scope::Scope;
use crate::sequencer::{self, SyncStep};
use crate::signal::{new_slot, ErasedOutcome, ErasedValue, Frame};
use futures::future::BoxFuture;
use sequent_core::{
    BindingSet, CapabilityBinding, DeferredOutcome, Eventual, Failure, Outcome,
};
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::debug;

type BodyFn<T> = dyn Fn(Scope) -> BoxFuture<'static, Outcome<T, Failure>> + Send + Sync;

/// A suspendable computation definition bound to a set of capabilities.
///
/// The definition is reusable: every [`run`](Computation::run) and
/// [`delegate`](Computation::delegate) instantiates a fresh body, so
/// concurrent runs with different binding sets never interfere.
pub struct Computation<T> {
    body: Arc<BodyFn<T>>,
    bindings: BindingSet,
}

impl<T> Clone for Computation<T> {
    fn clone(&self) -> Self {
        Self {
            body: self.body.clone(),
            bindings: self.bindings.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Computation<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Computation")
            .field("bindings", &self.bindings)
            .finish()
    }
}

impl<T: Send + 'static> Computation<T> {
    /// Define a computation from an outcome-returning body.
    pub fn new<F, Fut>(body: F) -> Self
    where
        F: Fn(Scope) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Outcome<T, Failure>> + Send + 'static,
    {
        Self {
            body: Arc::new(move |scope| Box::pin(body(scope))),
            bindings: BindingSet::new(),
        }
    }

    /// Define a computation from a plain-value body; completion boxes the
    /// value as `Ok`.
    pub fn from_value<F, Fut>(body: F) -> Self
    where
        F: Fn(Scope) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        Self::new(move |scope| {
            let value = body(scope);
            async move { Outcome::Ok(value.await) }
        })
    }

    /// A new computation with `bindings` layered over the existing set;
    /// later bindings win on key collision.
    pub fn inject(&self, bindings: impl IntoIterator<Item = CapabilityBinding>) -> Self {
        Self {
            body: self.body.clone(),
            bindings: self.bindings.extend(bindings),
        }
    }

    /// Run the computation.
    ///
    /// The result is `Ready` if the body never touched a deferred value.
    /// Otherwise the first deferred value switches the run to the
    /// asynchronous driver, a `Pending` result is returned immediately, and
    /// the driver runs to completion whether or not the deferred outcome is
    /// ever observed.
    pub fn run(&self) -> Eventual<T> {
        match sequencer::drive_sync(vec![self.frame()]) {
            SyncStep::Done(outcome) => Eventual::Ready(downcast_outcome(outcome)),
            SyncStep::Transition { stack, pending } => {
                debug!("spawning asynchronous driver");
                let (tx, rx) = oneshot::channel();
                tokio::spawn(async move {
                    let outcome = sequencer::drive_async(stack, pending).await;
                    let _ = tx.send(downcast_outcome::<T>(outcome));
                });
                Eventual::Pending(DeferredOutcome::from_oneshot(rx))
            }
        }
    }

    /// Package this computation for inline stepping inside another body.
    ///
    /// The handle carries its own binding set; capability requests it cannot
    /// satisfy forward outward to the enclosing scopes at the point of
    /// [`Scope::call`](crate::Scope::call).
    pub fn delegate(&self) -> Delegated<T> {
        Delegated {
            frame: self.frame(),
            _marker: PhantomData,
        }
    }

    fn frame(&self) -> Frame {
        let slot = new_slot();
        let scope = Scope::new(slot.clone());
        let typed = (self.body)(scope);
        let body = Box::pin(async move {
            typed
                .await
                .map(|value| Box::new(value) as ErasedValue)
        });
        Frame {
            body,
            slot,
            bindings: self.bindings.clone(),
        }
    }
}

/// A one-shot handle to a nested computation, consumed by
/// [`Scope::call`](crate::Scope::call).
pub struct Delegated<T> {
    frame: Frame,
    _marker: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for Delegated<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Delegated")
    }
}

impl<T> Delegated<T> {
    pub(crate) fn into_frame(self) -> Frame {
        self.frame
    }
}

fn downcast_outcome<T: Send + 'static>(outcome: ErasedOutcome) -> Outcome<T, Failure> {
    outcome.map(|value| match value.downcast::<T>() {
        Ok(boxed) => *boxed,
        Err(_) => panic!("sequencer completed with a mismatched result type"),
    })
}
