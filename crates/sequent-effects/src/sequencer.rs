//! The trampoline drivers
//!
//! One run is a stack of [`Frame`]s: the root body at the bottom, one frame
//! per live delegation above it. The synchronous driver steps the top frame
//! with a no-op waker until the run completes or the first deferred value
//! appears; the asynchronous driver continues with the ambient waker and the
//! same interpretation rules.
//!
//! Interpretation rules, applied identically in both drivers:
//!
//! - capability request: resolve from the innermost binding set outward;
//!   unresolved at the outermost scope is fatal
//! - delegation: push a frame; a nested failure aborts every enclosing frame;
//!   nested success resumes the parent with the unwrapped payload
//! - surfaced outcome: `Fail` ends the run immediately (left-biased
//!   short-circuit — no later step runs); `Ok` resumes with or without its
//!   payload depending on the unwrap flag
//! - deferred value: one-way transition out of the synchronous driver; the
//!   asynchronous driver awaits it, aborts on `Fail`, resumes on `Ok`

use crate::signal::{ErasedFuture, ErasedOutcome, Frame, Resume, Signal};
use sequent_core::Outcome;
use std::any::Any;
use std::future::poll_fn;
use std::sync::Arc;
use std::task::{Context, Poll};
use tracing::debug;

/// Where the synchronous driver stopped.
pub(crate) enum SyncStep {
    /// The run finished without ever going asynchronous.
    Done(ErasedOutcome),
    /// First deferred value encountered: hand the live stack (and the
    /// deferred future, when the body suspended through the scope) to the
    /// asynchronous driver.
    Transition {
        stack: Vec<Frame>,
        pending: Option<ErasedFuture>,
    },
}

/// Step the run synchronously until completion or the mode transition.
pub(crate) fn drive_sync(mut stack: Vec<Frame>) -> SyncStep {
    let mut cx = Context::from_waker(futures::task::noop_waker_ref());
    loop {
        let poll = match stack.last_mut() {
            Some(frame) => frame.body.as_mut().poll(&mut cx),
            None => panic!("sequencer frame stack underflow"),
        };
        match poll {
            Poll::Ready(outcome) => {
                if let Some(done) = settle(&mut stack, outcome) {
                    return SyncStep::Done(done);
                }
            }
            Poll::Pending => {
                let signal = take_signal(&stack);
                match signal {
                    None => {
                        // The body awaited a foreign future: a deferred value
                        // by definition, so the transition fires here too.
                        debug!("foreign await in synchronous phase; switching drivers");
                        return SyncStep::Transition {
                            stack,
                            pending: None,
                        };
                    }
                    Some(Signal::Deferred(future)) => {
                        debug!("first deferred value; switching drivers");
                        return SyncStep::Transition {
                            stack,
                            pending: Some(future),
                        };
                    }
                    Some(signal) => {
                        if let Some(done) = interpret(&mut stack, signal) {
                            return SyncStep::Done(done);
                        }
                    }
                }
            }
        }
    }
}

/// Continue a run after the mode transition. `pending` is the deferred value
/// that triggered it, if the body suspended through the scope.
pub(crate) async fn drive_async(
    mut stack: Vec<Frame>,
    mut pending: Option<ErasedFuture>,
) -> ErasedOutcome {
    loop {
        if let Some(future) = pending.take() {
            match future.await {
                Outcome::Fail(failure) => {
                    debug!(code = failure.code(), "deferred value failed; aborting run");
                    return Outcome::Fail(failure);
                }
                Outcome::Ok(value) => write_resume(&stack, Resume::Value(value)),
            }
        }
        match poll_step(&mut stack).await {
            Step::Done(outcome) => {
                if let Some(done) = settle(&mut stack, outcome) {
                    return done;
                }
            }
            Step::Suspended(Signal::Deferred(future)) => {
                debug!(signal = "deferred", "awaiting deferred value in order");
                pending = Some(future);
            }
            Step::Suspended(signal) => {
                if let Some(done) = interpret(&mut stack, signal) {
                    return done;
                }
            }
        }
    }
}

enum Step {
    Done(ErasedOutcome),
    Suspended(Signal),
}

/// Poll the top frame once with the ambient waker. `Pending` without a
/// published signal means a genuine foreign await, which parks this driver
/// until the foreign future wakes it.
async fn poll_step(stack: &mut [Frame]) -> Step {
    poll_fn(|cx| {
        let poll = match stack.last_mut() {
            Some(frame) => frame.body.as_mut().poll(cx),
            None => panic!("sequencer frame stack underflow"),
        };
        match poll {
            Poll::Ready(outcome) => Poll::Ready(Step::Done(outcome)),
            Poll::Pending => match take_signal(stack) {
                Some(signal) => Poll::Ready(Step::Suspended(signal)),
                None => Poll::Pending,
            },
        }
    })
    .await
}

/// Apply the capability, delegation, and surfaced-outcome rules. Returns the
/// final outcome when the run aborts.
fn interpret(stack: &mut Vec<Frame>, signal: Signal) -> Option<ErasedOutcome> {
    debug!(signal = signal.kind(), depth = stack.len(), "suspension");
    match signal {
        Signal::Capability(key) => {
            let value = resolve_capability(stack, key);
            write_resume(stack, Resume::Capability(value));
            None
        }
        Signal::Delegate(frame) => {
            stack.push(frame);
            None
        }
        Signal::Value { outcome, unwrap } => match outcome {
            Outcome::Fail(failure) => {
                debug!(code = failure.code(), "surfaced failure; aborting run");
                Some(Outcome::Fail(failure))
            }
            Outcome::Ok(value) => {
                let resume = if unwrap {
                    Resume::Value(value)
                } else {
                    Resume::Unit
                };
                write_resume(stack, resume);
                None
            }
        },
        Signal::Deferred(_) => unreachable!("deferred signals are handled by the drivers"),
    }
}

/// Retire the completed top frame. A failure is transitive: it aborts every
/// enclosing frame. A success either resumes the parent with the unwrapped
/// payload or, at the root, becomes the run's result.
fn settle(stack: &mut Vec<Frame>, outcome: ErasedOutcome) -> Option<ErasedOutcome> {
    stack.pop();
    match outcome {
        failed @ Outcome::Fail(_) => Some(failed),
        Outcome::Ok(value) => match stack.last() {
            Some(parent) => {
                parent.slot.lock().resume = Some(Resume::Value(value));
                None
            }
            None => Some(Outcome::Ok(value)),
        },
    }
}

/// Resolve a capability key from the innermost binding set outward through
/// every enclosing delegation scope. Unresolved at the outermost scope is a
/// wiring defect and aborts the run fatally.
fn resolve_capability(stack: &[Frame], key: &'static str) -> Arc<dyn Any + Send + Sync> {
    for frame in stack.iter().rev() {
        if let Some(value) = frame.bindings.resolve(key) {
            return value;
        }
    }
    panic!("capability `{key}` is not bound in any enclosing scope");
}

fn take_signal(stack: &[Frame]) -> Option<Signal> {
    stack.last().and_then(|frame| frame.slot.lock().signal.take())
}

fn write_resume(stack: &[Frame], resume: Resume) {
    if let Some(frame) = stack.last() {
        frame.slot.lock().resume = Some(resume);
    }
}
