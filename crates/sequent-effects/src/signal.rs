//! The suspension protocol between a computation body and its driver
//!
//! A body suspends by writing exactly one [`Signal`] into its shared [`Slot`]
//! and returning `Pending`; the driver classifies the signal, acts on it, and
//! answers by writing a [`Resume`] before polling the body again. Payloads
//! cross the slot type-erased; the typed ends live in
//! [`Scope`](crate::Scope) and the façade.

use futures::future::BoxFuture;
use parking_lot::Mutex;
use sequent_core::{BindingSet, Failure, Outcome};
use std::any::Any;
use std::sync::Arc;

/// Type-erased success payload crossing the suspension slot.
pub(crate) type ErasedValue = Box<dyn Any + Send>;

/// Outcome with an erased success payload; the failure side stays concrete so
/// drivers can short-circuit on it.
pub(crate) type ErasedOutcome = Outcome<ErasedValue, Failure>;

/// Erased body or deferred-value future.
pub(crate) type ErasedFuture = BoxFuture<'static, ErasedOutcome>;

/// One level of the sequencer's frame stack: a body future, its suspension
/// slot, and the binding set lexically scoped to it.
pub(crate) struct Frame {
    pub(crate) body: ErasedFuture,
    pub(crate) slot: SharedSlot,
    pub(crate) bindings: BindingSet,
}

/// The four suspension signals a body may emit.
pub(crate) enum Signal {
    /// An outcome surfaced mid-body. `unwrap` distinguishes
    /// unwrap-on-suspension (resume with the success payload) from
    /// inspection-only (resume with no payload). A `Fail` aborts the whole
    /// run either way.
    Value {
        outcome: ErasedOutcome,
        unwrap: bool,
    },
    /// A deferred value; encountering the first one is the one-way
    /// synchronous-to-asynchronous mode transition.
    Deferred(ErasedFuture),
    /// A capability request, resolved against the frame stack from the
    /// innermost binding set outward.
    Capability(&'static str),
    /// A nested computation stepped inline in its own frame.
    Delegate(Frame),
}

impl Signal {
    /// Classification label for driver logging.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Value { .. } => "value",
            Self::Deferred(_) => "deferred",
            Self::Capability(_) => "capability",
            Self::Delegate(_) => "delegate",
        }
    }
}

/// The driver's answer to a suspension.
pub(crate) enum Resume {
    /// Inspection-only observation: no payload.
    Unit,
    /// An unwrapped success payload (value, deferred, or delegation result).
    Value(ErasedValue),
    /// A resolved capability implementation.
    Capability(Arc<dyn Any + Send + Sync>),
}

/// Single-slot mailbox shared by one body and its driver. At most one of the
/// fields is occupied at any time.
#[derive(Default)]
pub(crate) struct Slot {
    pub(crate) signal: Option<Signal>,
    pub(crate) resume: Option<Resume>,
}

pub(crate) type SharedSlot = Arc<Mutex<Slot>>;

pub(crate) fn new_slot() -> SharedSlot {
    Arc::new(Mutex::new(Slot::default()))
}
