//! Sequent Core - Outcome Algebra Foundation
//!
//! This crate provides the value model underneath the effect sequencer:
//! type-discriminated outcome values, structured failures, deferred outcomes,
//! code-keyed failure dispatch, and the capability registry. It contains no
//! interpreter logic; the trampoline lives in `sequent-effects`.
//!
//! # Layers
//!
//! - [`Outcome`]: the `Ok`/`Fail` tagged value and its synchronous combinators
//! - [`Failure`]: structured error payload (code, message, opaque cause)
//! - [`DeferredOutcome`]: a single-resolution, directly-awaitable outcome;
//!   once a chain goes deferred every derived value stays deferred
//! - [`FailureHandlers`]: recover/transform/pass-through dispatch by code
//! - [`CapabilityDecl`] / [`BindingSet`]: typed capability slots and the
//!   immutable binding map a run resolves against
//!
//! # Error taxonomy
//!
//! Domain failures travel as [`Failure`] values and always propagate by
//! short-circuit. Host-level errors are converted at the boundary by
//! [`from_throwable`] / [`wrap_throwable`]. The only fatal paths are forced
//! unwrap ([`Outcome::expect`]) and unresolved capability wiring, which the
//! sequencer reports.

#![forbid(unsafe_code)]

pub mod capability;
pub mod deferred;
pub mod dispatch;
pub mod eventual;
pub mod failure;
pub mod outcome;

pub use capability::{
    unknown_failure_binding, BindingSet, CapabilityBinding, CapabilityDecl, FailureFactory,
    UNKNOWN_FAILURE_FACTORY,
};
pub use deferred::DeferredOutcome;
pub use dispatch::FailureHandlers;
pub use eventual::Eventual;
pub use failure::{Cause, Failure, PanicCause, UNKNOWN_FAILURE};
pub use outcome::{
    fail, fail_code, fail_code_with, fail_with, from_throwable, from_throwable_mapped, ok,
    wrap_throwable, wrap_throwable_mapped, Outcome,
};
