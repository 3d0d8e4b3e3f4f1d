//! Algebraic law property tests for the outcome algebra.
//!
//! Verifies the functor laws on both channels, failure invariance under
//! success-channel maps, and handler-map dispatch completeness.

use proptest::prelude::*;
use sequent_core::{fail, ok, FailureHandlers, Outcome};

fn arb_outcome() -> impl Strategy<Value = Outcome<i64>> {
    prop_oneof![
        any::<i64>().prop_map(ok),
        "[A-Z]{1,8}".prop_flat_map(|code| {
            ".{0,16}".prop_map(move |message| fail(code.clone(), message))
        }),
    ]
}

proptest! {
    #[test]
    fn map_identity_is_a_noop(outcome in arb_outcome()) {
        prop_assert_eq!(outcome.clone().map(|v| v), outcome);
    }

    #[test]
    fn map_composes(outcome in arb_outcome(), a in -1000i64..1000, b in -1000i64..1000) {
        let f = move |v: i64| v.wrapping_add(a);
        let g = move |v: i64| v.wrapping_mul(b);
        let stepwise = outcome.clone().map(f).map(g);
        let composed = outcome.map(move |v| g(f(v)));
        prop_assert_eq!(stepwise, composed);
    }

    #[test]
    fn failures_are_invariant_under_map(code in "[A-Z]{1,8}", message in ".{0,16}", a in any::<i64>()) {
        let failed: Outcome<i64> = fail(code.clone(), message.clone());
        prop_assert_eq!(failed.map(|v| v.wrapping_add(a)), fail(code, message));
    }

    #[test]
    fn successes_are_invariant_under_map_failure(value in any::<i64>()) {
        let outcome = ok(value).map_failure(|f| f.with_message("rewritten"));
        prop_assert_eq!(outcome, ok(value));
    }

    #[test]
    fn map_failure_composes(code in "[A-Z]{1,8}", message in ".{0,16}") {
        let failed: Outcome<i64> = fail(code.clone(), message.clone());
        let stepwise = failed
            .clone()
            .map_failure(|f| {
                let tagged = format!("a:{}", f.message());
                f.with_message(tagged)
            })
            .map_failure(|f| {
                let tagged = format!("b:{}", f.message());
                f.with_message(tagged)
            });
        let composed = failed.map_failure(|f| f.with_message(format!("b:a:{message}")));
        prop_assert_eq!(stepwise, composed);
    }

    #[test]
    fn registered_handler_result_is_exact(message in ".{0,16}") {
        let handlers = FailureHandlers::new().on("ERROR", |f| ok(f.message().len() as i64));
        let recovered = fail::<i64>("ERROR", message.clone()).recover(handlers);
        prop_assert_eq!(recovered.ready(), Some(ok(message.len() as i64)));
    }

    #[test]
    fn absent_code_passes_through_unchanged(code in "[A-Z]{1,8}", message in ".{0,16}") {
        prop_assume!(code != "HANDLED");
        let handlers = FailureHandlers::new().on("HANDLED", |_| ok(0i64));
        let passed = fail::<i64>(code.clone(), message.clone()).recover(handlers);
        prop_assert_eq!(passed.ready(), Some(fail(code, message)));
    }

    #[test]
    fn success_ignores_handler_map(value in any::<i64>()) {
        let handlers = FailureHandlers::new().on("ERROR", |_| ok(0i64));
        prop_assert_eq!(ok(value).recover(handlers).ready(), Some(ok(value)));
    }
}
