//! The body-side handle of the suspension protocol
//!
//! A [`Scope`] is handed to every computation body. Its methods are the only
//! legitimate suspension points of a body: each one emits a single
//! [`Signal`](crate::signal::Signal) and resumes with the driver's answer.
//! Awaiting a foreign future directly still works — the sequencer treats it
//! as a deferred value — but only scope methods participate in
//! short-circuiting and capability resolution.

use crate::computation::Delegated;
use crate::signal::{ErasedValue, Resume, SharedSlot, Signal};
use sequent_core::{CapabilityDecl, DeferredOutcome, Failure, Outcome};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// Handle through which a computation body suspends.
#[derive(Clone)]
pub struct Scope {
    slot: SharedSlot,
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Scope")
    }
}

impl Scope {
    pub(crate) fn new(slot: SharedSlot) -> Self {
        Self { slot }
    }

    /// Request a capability by its declaration.
    ///
    /// Resumes with the value bound in the nearest enclosing binding set. An
    /// unbound key is a wiring defect and aborts the run fatally.
    pub async fn require<T: Send + Sync + 'static>(&self, decl: &CapabilityDecl<T>) -> Arc<T> {
        let key = decl.key();
        match self.suspend(Signal::Capability(key)).await {
            Resume::Capability(value) => match value.downcast::<T>() {
                Ok(typed) => typed,
                Err(_) => panic!("capability `{key}` bound with a mismatched type"),
            },
            _ => panic!("sequencer protocol violation: expected a capability resume for `{key}`"),
        }
    }

    /// Surface an outcome and unwrap it: a `Fail` aborts the whole run with
    /// that failure as the final result; an `Ok` resumes with its payload.
    pub async fn eval<T: Send + 'static>(&self, outcome: Outcome<T>) -> T {
        let erased = outcome.map(|value| Box::new(value) as ErasedValue);
        let resume = self
            .suspend(Signal::Value {
                outcome: erased,
                unwrap: true,
            })
            .await;
        resumed_value(resume, "an unwrapped outcome")
    }

    /// Surface an outcome for inspection only: a `Fail` still aborts the run,
    /// but an `Ok` resumes the body with no payload.
    pub async fn observe<T: Send + 'static>(&self, outcome: Outcome<T>) {
        let erased = outcome.map(|value| Box::new(value) as ErasedValue);
        match self
            .suspend(Signal::Value {
                outcome: erased,
                unwrap: false,
            })
            .await
        {
            Resume::Unit => {}
            _ => panic!("sequencer protocol violation: expected a unit resume"),
        }
    }

    /// Wait for a deferred outcome. The first such wait in a run triggers the
    /// one-way switch to the asynchronous driver; a `Fail` resolution aborts
    /// the run.
    pub async fn wait<T: Send + 'static>(&self, deferred: DeferredOutcome<T>) -> T {
        let erased = Box::pin(async move {
            deferred.await.map(|value| Box::new(value) as ErasedValue)
        });
        let resume = self.suspend(Signal::Deferred(erased)).await;
        resumed_value(resume, "a deferred outcome")
    }

    /// Wait for a raw infallible future, treated as a deferred value.
    pub async fn wait_future<T, Fut>(&self, future: Fut) -> T
    where
        T: Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        let erased = Box::pin(async move {
            Outcome::Ok(Box::new(future.await) as ErasedValue)
        });
        let resume = self.suspend(Signal::Deferred(erased)).await;
        resumed_value(resume, "a deferred value")
    }

    /// Wait for a raw fallible future; its error side is captured as an
    /// `UNKNOWN_FAILURE` failure, which then aborts the run.
    pub async fn wait_try<T, Er, Fut>(&self, future: Fut) -> T
    where
        T: Send + 'static,
        Er: std::error::Error + Send + Sync + 'static,
        Fut: Future<Output = Result<T, Er>> + Send + 'static,
    {
        let erased = Box::pin(async move {
            match future.await {
                Ok(value) => Outcome::Ok(Box::new(value) as ErasedValue),
                Err(error) => Outcome::Fail(Failure::unknown(Arc::new(error))),
            }
        });
        let resume = self.suspend(Signal::Deferred(erased)).await;
        resumed_value(resume, "a deferred value")
    }

    /// Step a delegated computation inline. Its unresolved capability
    /// requests forward outward to this scope's bindings and beyond; its
    /// failure aborts this run; its success resumes with the unwrapped
    /// payload.
    pub async fn call<T: Send + 'static>(&self, delegated: Delegated<T>) -> T {
        let resume = self.suspend(Signal::Delegate(delegated.into_frame())).await;
        resumed_value(resume, "a delegated computation")
    }

    async fn suspend(&self, signal: Signal) -> Resume {
        SuspendFuture {
            slot: self.slot.clone(),
            signal: Some(signal),
        }
        .await
    }
}

fn resumed_value<T: Send + 'static>(resume: Resume, what: &str) -> T {
    match resume {
        Resume::Value(value) => match value.downcast::<T>() {
            Ok(boxed) => *boxed,
            Err(_) => panic!("sequencer resumed {what} with a mismatched payload type"),
        },
        _ => panic!("sequencer protocol violation: expected a value resume for {what}"),
    }
}

/// Two-phase suspension: the first poll publishes the signal and parks; the
/// next poll picks up the driver's resume.
struct SuspendFuture {
    slot: SharedSlot,
    signal: Option<Signal>,
}

impl Future for SuspendFuture {
    type Output = Resume;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Resume> {
        let this = self.get_mut();
        let mut slot = this.slot.lock();
        if let Some(signal) = this.signal.take() {
            slot.signal = Some(signal);
            return Poll::Pending;
        }
        match slot.resume.take() {
            Some(resume) => Poll::Ready(resume),
            None => {
                // Polled again before the driver answered; self-wake so a
                // spurious poll cannot strand the body.
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }
}
