//! Calling convention for business methods that report their result as a
//! named outcome.
//!
//! A business method takes a registration step from its caller and wraps its
//! own logic in either `with_handlers` or `returning`:
//!
//! ```rust
//! use outback::dispatcher::{Dispatcher, Outcomes};
//! use outback::error::DispatchError;
//! use outback::producer::{returning, with_handlers};
//!
//! fn body<R>(amount: u32, outcomes: &mut Outcomes<'_, '_, &'static str, R>) -> Result<(), DispatchError> {
//!     if amount == 0 {
//!         return outcomes.trigger("rejected", ());
//!     }
//!     outcomes.trigger("accepted", (amount,))
//! }
//!
//! fn deposit<'h, R>(
//!     amount: u32,
//!     on: impl FnOnce(&mut Dispatcher<'h, &'static str, R>) -> Result<(), DispatchError>,
//! ) -> Result<R, DispatchError> {
//!     with_handlers(on, |outcomes| body(amount, outcomes))
//! }
//!
//! let message = deposit(5, |on| {
//!     on.of("accepted", |amount: u32| format!("deposited {}", amount))?
//!         .of("rejected", || "nothing to deposit".to_string())?;
//!     Ok(())
//! })?;
//! assert_eq!(message, "deposited 5");
//!
//! let outcome = returning(|outcomes| body(0, outcomes))?.expect("triggered");
//! assert!(outcome.is(&"rejected"));
//! # Ok::<(), DispatchError>(())
//! ```

use crate::{
    dispatcher::{Dispatcher, Outcomes},
    error::DispatchError,
    outcome::Outcome,
};
use log::debug;
use std::{fmt::Debug, hash::Hash};

/// Runs `body` in a fresh dispatch session whose handlers are declared by
/// `registration`, and returns what the handler that ran produced.
///
/// The registration step runs once, before `body`. Errors from either are
/// returned as they are; otherwise the session must end with exactly one
/// handled outcome (`NoOutcome` / `UnhandledOutcome` if not).
pub fn with_handlers<'h, K, R, F, B>(registration: F, body: B) -> Result<R, DispatchError>
where
    K: Eq + Hash + Debug,
    F: FnOnce(&mut Dispatcher<'h, K, R>) -> Result<(), DispatchError>,
    B: FnOnce(&mut Outcomes<'_, 'h, K, R>) -> Result<(), DispatchError>,
{
    let mut dispatcher = Dispatcher::new();

    registration(&mut dispatcher)?;
    body(&mut Outcomes::new(&mut dispatcher))?;

    let result = dispatcher.conclude();
    if let Err(e) = &result {
        debug!("with_handlers - session failed: {}", e);
    }
    result
}

/// Runs `body` without any handlers and hands back the outcome it triggered,
/// so callers can inspect it directly. `None` if nothing was triggered; when
/// triggered repeatedly the last outcome wins.
pub fn returning<K, B>(body: B) -> Result<Option<Outcome<K>>, DispatchError>
where
    K: Eq + Hash + Debug,
    B: FnOnce(&mut Outcomes<'_, 'static, K, ()>) -> Result<(), DispatchError>,
{
    let mut dispatcher = Dispatcher::returning();

    body(&mut Outcomes::new(&mut dispatcher))?;

    Ok(dispatcher.into_outcome())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Check {
        Passed,
        Failed,
    }

    fn check<R>(value: i32, outcomes: &mut Outcomes<'_, '_, Check, R>) -> Result<(), DispatchError> {
        if value < 0 {
            return outcomes.trigger(Check::Failed, (value,));
        }
        outcomes.trigger(Check::Passed, ())
    }

    #[test]
    fn test_with_handlers_returns_handler_result() {
        let result = with_handlers(
            |on| {
                on.of(Check::Passed, || "passed")?
                    .of(Check::Failed, |_value: i32| "failed")?;
                Ok(())
            },
            |outcomes| check(-1, outcomes),
        );

        assert_eq!(result, Ok("failed"));
    }

    #[test]
    fn test_registration_error_stops_session() {
        let mut body_ran = false;
        let result = with_handlers(
            |on| {
                on.of(Check::Passed, || ())?.of(Check::Passed, || ())?;
                Ok(())
            },
            |outcomes| {
                body_ran = true;
                check(1, outcomes)
            },
        );

        assert!(matches!(result, Err(DispatchError::DuplicateOutcome { .. })));
        assert!(!body_ran);
    }

    #[test]
    fn test_returning_hands_back_outcome() {
        let outcome = returning(|outcomes| check(-3, outcomes))
            .unwrap()
            .expect("triggered outcome");

        assert_eq!(outcome.extract::<(i32,)>(), Ok((Check::Failed, (-3,))));
    }

    #[test]
    fn test_returning_without_trigger() {
        let outcome = returning::<Check, _>(|_outcomes| Ok(())).unwrap();
        assert!(outcome.is_none());
    }
}
