//! Success-or-failure outcome values and their synchronous combinators
//!
//! [`Outcome`] is a two-variant tagged value: `Ok` carrying a success payload
//! or `Fail` carrying a structured [`Failure`]. Values are immutable once
//! constructed and are transformed, never mutated, by the combinators here.
//!
//! Chaining into each downstream kind is closed, explicitly-typed dispatch:
//! each target kind has its own method.
//!
//! - plain value rung: [`Outcome::map`]
//! - outcome rung: [`Outcome::and_then`] / [`Outcome::or_else`]
//! - deferred rung: [`Outcome::map_deferred`]
//! - raw deferred rung: [`Outcome::and_then_future`], which captures the
//!   error side as an [`UNKNOWN_FAILURE`](crate::UNKNOWN_FAILURE) failure

use crate::deferred::DeferredOutcome;
use crate::dispatch::FailureHandlers;
use crate::eventual::Eventual;
use crate::failure::{Cause, Failure, PanicCause};
use std::borrow::Cow;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// A success value or a structured failure. There is no third state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T, E = Failure> {
    /// The computation produced a value.
    Ok(T),
    /// The computation failed with a structured payload.
    Fail(E),
}

/// Box a plain value as a successful outcome.
pub fn ok<T>(value: T) -> Outcome<T> {
    Outcome::Ok(value)
}

/// Construct a failed outcome from a code and message.
pub fn fail<T>(code: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Outcome<T> {
    Outcome::Fail(Failure::new(code, message))
}

/// Construct a failed outcome that retains an opaque cause.
pub fn fail_with<T>(
    code: impl Into<Cow<'static, str>>,
    message: impl Into<String>,
    cause: Cause,
) -> Outcome<T> {
    Outcome::Fail(Failure::with_cause(code, message, cause))
}

/// Curried form of [`fail`]: fix the code, supply messages later.
pub fn fail_code<T>(code: impl Into<Cow<'static, str>>) -> impl Fn(String) -> Outcome<T> {
    let code = code.into();
    move |message| Outcome::Fail(Failure::new(code.clone(), message))
}

/// Curried form of [`fail_with`]: fix the code, supply message and cause later.
pub fn fail_code_with<T>(
    code: impl Into<Cow<'static, str>>,
) -> impl Fn(String, Cause) -> Outcome<T> {
    let code = code.into();
    move |message, cause| Outcome::Fail(Failure::with_cause(code.clone(), message, cause))
}

/// Run a fallible thunk at a host boundary, capturing errors and panics as
/// [`UNKNOWN_FAILURE`](crate::UNKNOWN_FAILURE) failures.
pub fn from_throwable<T, E, F>(thunk: F) -> Outcome<T>
where
    F: FnOnce() -> Result<T, E>,
    E: std::error::Error + Send + Sync + 'static,
{
    from_throwable_mapped(thunk, Failure::unknown)
}

/// Like [`from_throwable`], with a custom cause-to-failure mapper.
pub fn from_throwable_mapped<T, E, F, M>(thunk: F, mapper: M) -> Outcome<T>
where
    F: FnOnce() -> Result<T, E>,
    E: std::error::Error + Send + Sync + 'static,
    M: FnOnce(Cause) -> Failure,
{
    match catch_unwind(AssertUnwindSafe(thunk)) {
        Ok(Ok(value)) => Outcome::Ok(value),
        Ok(Err(error)) => Outcome::Fail(mapper(Arc::new(error))),
        Err(payload) => Outcome::Fail(mapper(Arc::new(PanicCause::from_payload(payload)))),
    }
}

/// Wrap a fallible function so every call yields an [`Outcome`] instead of
/// throwing across the boundary.
pub fn wrap_throwable<A, T, E, F>(f: F) -> impl Fn(A) -> Outcome<T>
where
    F: Fn(A) -> Result<T, E>,
    E: std::error::Error + Send + Sync + 'static,
{
    move |arg| from_throwable(|| f(arg))
}

/// Like [`wrap_throwable`], with a custom cause-to-failure mapper.
pub fn wrap_throwable_mapped<A, T, E, F, M>(f: F, mapper: M) -> impl Fn(A) -> Outcome<T>
where
    F: Fn(A) -> Result<T, E>,
    E: std::error::Error + Send + Sync + 'static,
    M: Fn(Cause) -> Failure,
{
    move |arg| from_throwable_mapped(|| f(arg), &mapper)
}

impl<T, E> Outcome<T, E> {
    /// Variant test: true for `Ok`.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Variant test: true for `Fail`.
    pub fn has_failed(&self) -> bool {
        matches!(self, Self::Fail(_))
    }

    /// Apply `f` to the success value; a `Fail` passes through unchanged and
    /// `f` is never invoked.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U, E> {
        match self {
            Self::Ok(value) => Outcome::Ok(f(value)),
            Self::Fail(failure) => Outcome::Fail(failure),
        }
    }

    /// Chain an outcome-returning step on the success channel.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Outcome<U, E>) -> Outcome<U, E> {
        match self {
            Self::Ok(value) => f(value),
            Self::Fail(failure) => Outcome::Fail(failure),
        }
    }

    /// Chain a deferred step; the whole expression becomes deferred and stays
    /// deferred from here on.
    pub fn map_deferred<U>(
        self,
        f: impl FnOnce(T) -> DeferredOutcome<U, E>,
    ) -> DeferredOutcome<U, E>
    where
        U: Send + 'static,
        E: Send + 'static,
    {
        match self {
            Self::Ok(value) => f(value),
            Self::Fail(failure) => DeferredOutcome::from_outcome(Outcome::Fail(failure)),
        }
    }

    /// Apply `f` to the failure payload; an `Ok` passes through unchanged.
    pub fn map_failure<F>(self, f: impl FnOnce(E) -> F) -> Outcome<T, F> {
        match self {
            Self::Ok(value) => Outcome::Ok(value),
            Self::Fail(failure) => Outcome::Fail(f(failure)),
        }
    }

    /// Chain an outcome-returning recovery step on the failure channel.
    pub fn or_else<F>(self, f: impl FnOnce(E) -> Outcome<T, F>) -> Outcome<T, F> {
        match self {
            Self::Ok(value) => Outcome::Ok(value),
            Self::Fail(failure) => f(failure),
        }
    }

    /// Invoke the matching branch and return its result directly, with no
    /// further boxing.
    pub fn match_with<R>(self, ok: impl FnOnce(T) -> R, failed: impl FnOnce(E) -> R) -> R {
        match self {
            Self::Ok(value) => ok(value),
            Self::Fail(failure) => failed(failure),
        }
    }

    /// Observe the success value without consuming the outcome's identity.
    pub fn inspect(self, f: impl FnOnce(&T)) -> Self {
        if let Self::Ok(value) = &self {
            f(value);
        }
        self
    }

    /// Observe the failure payload without consuming the outcome's identity.
    pub fn inspect_failure(self, f: impl FnOnce(&E)) -> Self {
        if let Self::Fail(failure) = &self {
            f(failure);
        }
        self
    }

    /// Safe extraction: the success value or the failure, caller-discriminated.
    ///
    /// Performs no narrowing decision itself and never aborts.
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Self::Ok(value) => Ok(value),
            Self::Fail(failure) => Err(failure),
        }
    }

    /// The success value, if any.
    pub fn into_ok(self) -> Option<T> {
        match self {
            Self::Ok(value) => Some(value),
            Self::Fail(_) => None,
        }
    }

    /// The failure payload, if any.
    pub fn into_failure(self) -> Option<E> {
        match self {
            Self::Ok(_) => None,
            Self::Fail(failure) => Some(failure),
        }
    }

    /// The success value, or `default` on failure.
    pub fn unwrap_or(self, default: T) -> T {
        match self {
            Self::Ok(value) => value,
            Self::Fail(_) => default,
        }
    }

    /// Borrowing view of both channels.
    pub fn as_ref(&self) -> Outcome<&T, &E> {
        match self {
            Self::Ok(value) => Outcome::Ok(value),
            Self::Fail(failure) => Outcome::Fail(failure),
        }
    }
}

impl<T> Outcome<T, Failure> {
    /// Forced extraction: the success value, or a fatal abort carrying
    /// `message` plus the serialized failure.
    ///
    /// This is one of the two user-visible fatal paths; prefer
    /// [`Outcome::into_result`] or [`Outcome::unwrap_or`] for data conditions.
    pub fn expect(self, message: &str) -> T {
        match self {
            Self::Ok(value) => value,
            Self::Fail(failure) => panic!("{message}: {}", failure.serialized()),
        }
    }

    /// Dispatch a failure through a code-keyed handler map.
    ///
    /// A registered code invokes its handler exactly; an unregistered code
    /// passes the `Fail` through unchanged; an `Ok` is never touched. The
    /// result is [`Eventual`] because a registered handler may itself be
    /// deferred.
    pub fn recover(self, handlers: FailureHandlers<T>) -> Eventual<T> {
        match self {
            Self::Ok(value) => Eventual::Ready(Outcome::Ok(value)),
            Self::Fail(failure) => handlers.dispatch(failure),
        }
    }

    /// Chain a raw fallible future; its error side is captured as an
    /// [`UNKNOWN_FAILURE`](crate::UNKNOWN_FAILURE) failure.
    pub fn and_then_future<U, Er, Fut, F>(self, f: F) -> DeferredOutcome<U>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<U, Er>> + Send + 'static,
        Er: std::error::Error + Send + Sync + 'static,
        U: Send + 'static,
    {
        match self {
            Self::Ok(value) => DeferredOutcome::from_try_future(f(value)),
            Self::Fail(failure) => DeferredOutcome::from_outcome(Outcome::Fail(failure)),
        }
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Ok(value),
            Err(error) => Self::Fail(error),
        }
    }
}

impl<T, E> From<Outcome<T, E>> for Result<T, E> {
    fn from(outcome: Outcome<T, E>) -> Self {
        outcome.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Debug, thiserror::Error)]
    #[error("boom")]
    struct Boom;

    #[test]
    fn map_transforms_success_only() {
        assert_eq!(ok(2).map(|x| x * 3), Outcome::Ok(6));
        let failed: Outcome<i32> = fail("ERROR", "boom");
        assert_eq!(failed.map(|x| x * 3), fail("ERROR", "boom"));
    }

    #[test]
    fn map_never_invokes_on_failure() {
        let called = Cell::new(false);
        let failed: Outcome<i32> = fail("ERROR", "boom");
        let _ = failed.map(|x| {
            called.set(true);
            x
        });
        assert!(!called.get());
    }

    #[test]
    fn and_then_short_circuits() {
        let chained = ok(2).and_then(|x| ok(x + 1)).and_then(|_| {
            fail::<i32>("ERROR", "mid")
        });
        assert_eq!(chained, fail("ERROR", "mid"));
    }

    #[test]
    fn map_failure_leaves_success_untouched() {
        let succeeded = ok(1).map_failure(|f: Failure| f.with_message("rewritten"));
        assert_eq!(succeeded, ok(1));

        let rewritten = fail::<i32>("ERROR", "boom").map_failure(|f| f.with_message("rewritten"));
        assert_eq!(rewritten, fail("ERROR", "rewritten"));
    }

    #[test]
    fn match_with_returns_branch_value_directly() {
        let doubled = ok(21).match_with(|v| v * 2, |_| 0);
        assert_eq!(doubled, 42);
        let fallback = fail::<i32>("ERROR", "boom").match_with(|v| v, |_| -1);
        assert_eq!(fallback, -1);
    }

    #[test]
    fn safe_extraction_never_aborts() {
        let failed: Outcome<i32> = fail("ERROR", "boom");
        assert!(!failed.is_ok());
        assert!(failed.has_failed());
        assert_eq!(failed.clone().unwrap_or(7), 7);
        assert_eq!(
            failed.into_result().err().map(|f| f.code().to_string()),
            Some("ERROR".to_string())
        );
    }

    #[test]
    #[should_panic(expected = "nope")]
    fn expect_aborts_with_serialized_failure() {
        let failed: Outcome<i32> = fail("ERROR", "boom");
        let _ = failed.expect("nope");
    }

    #[test]
    fn inspect_fires_on_matching_variant_only() {
        let seen = Cell::new(0);
        let outcome = ok(5).inspect(|v| seen.set(*v)).inspect_failure(|_| seen.set(-1));
        assert_eq!(seen.get(), 5);
        assert_eq!(outcome, ok(5));
    }

    #[test]
    fn from_throwable_captures_errors() {
        let outcome: Outcome<i32> = from_throwable(|| Err(Boom));
        let failure = outcome.into_failure().expect("failed");
        assert_eq!(failure.code(), crate::UNKNOWN_FAILURE);
        assert_eq!(failure.message(), "boom");
    }

    #[test]
    fn from_throwable_captures_panics() {
        let outcome: Outcome<i32> = from_throwable(|| -> Result<i32, Boom> {
            panic!("exploded");
        });
        let failure = outcome.into_failure().expect("failed");
        assert_eq!(failure.code(), crate::UNKNOWN_FAILURE);
        assert_eq!(failure.message(), "exploded");
    }

    #[test]
    fn wrap_throwable_produces_reusable_boundary() {
        let parse = wrap_throwable(|s: &str| s.parse::<i32>());
        assert_eq!(parse("42"), ok(42));
        assert!(parse("nope").has_failed());
    }

    #[test]
    fn curried_fail_with_retains_the_cause() {
        let invalid = fail_code_with::<i32>("INVALID");
        let failure = invalid("bad input".to_string(), Arc::new(Boom))
            .into_failure()
            .expect("failed");
        assert_eq!(failure.code(), "INVALID");
        assert_eq!(failure.message(), "bad input");
        assert!(failure.cause().is_some());
    }

    #[test]
    fn as_ref_borrows_both_channels() {
        let succeeded = ok(5);
        assert_eq!(succeeded.as_ref().into_ok(), Some(&5));
        assert_eq!(succeeded, ok(5));

        let failed: Outcome<i32> = fail("ERROR", "boom");
        assert_eq!(
            failed.as_ref().into_failure().map(Failure::code),
            Some("ERROR")
        );
    }

    #[test]
    fn mapped_wrap_assigns_a_custom_code() {
        let parse = wrap_throwable_mapped(
            |s: &str| s.parse::<i32>(),
            |cause| Failure::with_cause("PARSE", "not a number", cause),
        );
        let failure = parse("nope").into_failure().expect("failed");
        assert_eq!(failure.code(), "PARSE");
        assert_eq!(failure.message(), "not a number");
    }

    #[test]
    fn curried_fail_fixes_the_code() {
        let invalid = fail_code::<i32>("INVALID");
        let outcome = invalid("missing field".to_string());
        assert_eq!(outcome, fail("INVALID", "missing field"));
    }
}
