//! Sequent Effects - Trampoline Effect Sequencer
//!
//! This crate executes suspendable computation bodies over the value model of
//! `sequent-core`. A body is an async block handed a [`Scope`]; every scope
//! method is a suspension point that the sequencer interprets: surfaced
//! outcomes short-circuit on failure, capability requests resolve lexically
//! through the delegation chain, delegated computations step inline, and the
//! first deferred value switches the run one-way from the synchronous driver
//! to the asynchronous one.
//!
//! # Entry point
//!
//! Define a [`Computation`], layer capability bindings with
//! [`Computation::inject`], and start it with [`Computation::run`]. A run
//! that never touches a deferred value completes synchronously as
//! [`Eventual::Ready`]; otherwise the caller gets [`Eventual::Pending`]
//! immediately and the run continues on the tokio runtime to completion,
//! observed or not.
//!
//! ```
//! use sequent_core::{CapabilityDecl, Eventual, Outcome};
//! use sequent_effects::Computation;
//!
//! const FACTOR: CapabilityDecl<i64> = CapabilityDecl::new("demo.factor");
//!
//! let scaled = Computation::from_value(|scope| async move {
//!     let factor = scope.require(&FACTOR).await;
//!     21 * *factor
//! });
//!
//! match scaled.inject([FACTOR.implementation(2)]).run() {
//!     Eventual::Ready(Outcome::Ok(value)) => assert_eq!(value, 42),
//!     other => panic!("unexpected result: {other:?}"),
//! }
//! ```

#![forbid(unsafe_code)]

mod computation;
mod scope;
mod sequencer;
mod signal;

pub use computation::{Computation, Delegated};
pub use scope::Scope;
