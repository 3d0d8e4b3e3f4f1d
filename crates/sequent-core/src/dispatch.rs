//! Code-keyed failure dispatch
//!
//! A [`FailureHandlers`] map pattern-matches failures by code: a registered
//! code invokes its handler exactly; a missing code passes the failure
//! through completely unchanged; success values are never touched. Handlers
//! may recover (return `Ok`), transform (return a different `Fail`), or be
//! deferred themselves.

use crate::deferred::DeferredOutcome;
use crate::eventual::Eventual;
use crate::failure::Failure;
use crate::outcome::Outcome;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

enum Handler<T> {
    Sync(Box<dyn FnOnce(Failure) -> Outcome<T> + Send>),
    Deferred(Box<dyn FnOnce(Failure) -> DeferredOutcome<T> + Send>),
}

/// Builder-style mapping from failure code to recovery handler.
pub struct FailureHandlers<T> {
    handlers: HashMap<Cow<'static, str>, Handler<T>>,
}

impl<T> Default for FailureHandlers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for FailureHandlers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FailureHandlers")
            .field("codes", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<T> FailureHandlers<T> {
    /// An empty handler map; every failure passes through.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a synchronous handler for `code`. Re-registering a code
    /// replaces the earlier handler.
    pub fn on(
        mut self,
        code: impl Into<Cow<'static, str>>,
        handler: impl FnOnce(Failure) -> Outcome<T> + Send + 'static,
    ) -> Self {
        self.handlers
            .insert(code.into(), Handler::Sync(Box::new(handler)));
        self
    }

    /// Register a deferred handler for `code`; dispatching it lifts the whole
    /// expression to the deferred kind.
    pub fn on_deferred(
        mut self,
        code: impl Into<Cow<'static, str>>,
        handler: impl FnOnce(Failure) -> DeferredOutcome<T> + Send + 'static,
    ) -> Self {
        self.handlers
            .insert(code.into(), Handler::Deferred(Box::new(handler)));
        self
    }

    /// True if a handler is registered for `code`.
    pub fn handles(&self, code: &str) -> bool {
        self.handlers.contains_key(code)
    }

    /// Dispatch one failure: registered code runs its handler, unregistered
    /// code passes the failure through unchanged.
    pub(crate) fn dispatch(mut self, failure: Failure) -> Eventual<T> {
        match self.handlers.remove(failure.code()) {
            None => Eventual::Ready(Outcome::Fail(failure)),
            Some(Handler::Sync(handler)) => Eventual::Ready(handler(failure)),
            Some(Handler::Deferred(handler)) => Eventual::Pending(handler(failure)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::{fail, ok};

    #[test]
    fn handles_reports_registered_codes_only() {
        let handlers = FailureHandlers::<i32>::new()
            .on("ERROR", |_| ok(0))
            .on_deferred("SLOW", |_| DeferredOutcome::from_outcome(ok(0)));
        assert!(handlers.handles("ERROR"));
        assert!(handlers.handles("SLOW"));
        assert!(!handlers.handles("OTHER"));
    }

    #[test]
    fn registered_code_invokes_handler_exactly() {
        let handlers = FailureHandlers::new().on("ERROR", |f| ok(f.message().len()));
        let recovered = fail::<usize>("ERROR", "boom").recover(handlers);
        assert_eq!(recovered.ready(), Some(ok(4)));
    }

    #[test]
    fn unregistered_code_passes_through_unchanged() {
        let handlers = FailureHandlers::new().on("OTHER", |_| ok(0));
        let passed = fail::<usize>("ERROR", "boom").recover(handlers);
        assert_eq!(passed.ready(), Some(fail("ERROR", "boom")));
    }

    #[test]
    fn success_passes_through_regardless_of_handlers() {
        let handlers = FailureHandlers::new().on("ERROR", |_| ok(0));
        let untouched = ok(9).recover(handlers);
        assert_eq!(untouched.ready(), Some(ok(9)));
    }

    #[test]
    fn handler_may_transform_instead_of_recover() {
        let handlers =
            FailureHandlers::new().on("ERROR", |f| fail("WRAPPED", format!("saw: {}", f.message())));
        let transformed = fail::<usize>("ERROR", "boom").recover(handlers);
        assert_eq!(transformed.ready(), Some(fail("WRAPPED", "saw: boom")));
    }

    #[tokio::test]
    async fn deferred_handler_lifts_to_pending() {
        let handlers = FailureHandlers::new()
            .on_deferred("ERROR", |_| DeferredOutcome::from_future(async { ok(5) }));
        let recovered = fail::<i32>("ERROR", "boom").recover(handlers);
        assert!(recovered.is_pending());
        assert_eq!(recovered.resolve().await, ok(5));
    }
}
