use crate::{
    error::DispatchError,
    handler::{BoxHandler, Handler},
    payload::{IntoPayload, Payload},
};
use log::{debug, trace, warn};
use std::{collections::HashMap, fmt::Debug, hash::Hash};

/// Observable progress of a dispatch session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing triggered yet, bindings may still be arriving.
    Idle,
    /// An outcome was triggered but no handler ran for it (yet).
    Triggered,
    /// The handler bound to the triggered outcome ran.
    Handled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Bindings are consulted and conclusion is enforced.
    Handlers,
    /// No bindings, the triggered outcome is handed back as a value.
    Returning,
}

enum Binding<'h, R> {
    Pending(BoxHandler<'h, R>),
    Fired,
}

impl<'h, R> Binding<'h, R> {
    /// Takes handler out, leaving `Fired` at that place.
    fn take_pending(&mut self) -> Option<BoxHandler<'h, R>> {
        match std::mem::replace(self, Binding::Fired) {
            Binding::Pending(handler) => Some(handler),
            Binding::Fired => None,
        }
    }
}

/// Single dispatch session: collects handler bindings, records the triggered
/// outcome and routes its payload to the matching handler.
///
/// Registration and triggering can be interleaved in any order. A handler
/// bound before the trigger runs as soon as the trigger arrives, a handler
/// bound after it runs as soon as it is registered. At most one handler runs
/// per session and `conclude` verifies that exactly one did.
///
/// ```rust
/// use outback::dispatcher::Dispatcher;
///
/// let mut dispatcher = Dispatcher::new();
/// dispatcher
///     .of("success", |id: u32| format!("created {}", id))?
///     .of("validation_failed", || "invalid".to_string())?;
///
/// dispatcher.trigger("success", (7u32,))?;
///
/// assert_eq!(dispatcher.conclude()?, "created 7");
/// # Ok::<(), outback::error::DispatchError>(())
/// ```
pub struct Dispatcher<'h, K, R = ()> {
    bindings: HashMap<K, Binding<'h, R>>,

    /// Identifier passed to the first accepted `trigger` call.
    triggered: Option<K>,

    /// Values that came with the trigger, until a handler consumes them.
    payload: Option<Payload>,

    /// Value produced by the handler that ran.
    result: Option<R>,

    mode: Mode,
}

impl<'h, K, R> Default for Dispatcher<'h, K, R>
where
    K: Eq + Hash + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'h, K, R> Dispatcher<'h, K, R>
where
    K: Eq + Hash + Debug,
{
    pub fn new() -> Self {
        Self::with_mode(Mode::Handlers)
    }

    /// Creates a session that never consults bindings and accepts repeated
    /// triggers, keeping the last one.
    pub(crate) fn returning() -> Self {
        Self::with_mode(Mode::Returning)
    }

    fn with_mode(mode: Mode) -> Self {
        Self {
            bindings: HashMap::new(),
            triggered: None,
            payload: None,
            result: None,
            mode,
        }
    }

    pub fn state(&self) -> SessionState {
        match (&self.triggered, &self.result) {
            (None, _) => SessionState::Idle,
            (Some(_), None) => SessionState::Triggered,
            (Some(_), Some(_)) => SessionState::Handled,
        }
    }

    pub fn is_handled(&self) -> bool {
        self.result.is_some()
    }

    /// Identifier of the triggered outcome, if any.
    pub fn triggered(&self) -> Option<&K> {
        self.triggered.as_ref()
    }

    /// Indicates if a handler is bound to `outcome`, fired or not.
    pub fn is_bound(&self, outcome: &K) -> bool {
        self.bindings.contains_key(outcome)
    }

    /// Binds `handler` to `outcome`.
    ///
    /// Fails with `MissingHandler` when no handler is given and with
    /// `DuplicateOutcome` when `outcome` is already bound in this session,
    /// whether or not that binding already ran. If `outcome` is the one
    /// already triggered, the handler runs right away.
    pub fn register<H, Args>(
        &mut self,
        outcome: K,
        handler: Option<H>,
    ) -> Result<&mut Self, DispatchError>
    where
        H: Handler<Args, R> + 'h,
        Args: 'h,
        R: 'h,
    {
        let handler = handler.ok_or_else(|| DispatchError::missing_handler(&outcome))?;

        if self.bindings.contains_key(&outcome) {
            return Err(DispatchError::duplicate(&outcome));
        }

        trace!("Dispatcher::register - outcome: {:?}", outcome);

        let handler = handler.into_boxed();
        if self.triggered.as_ref() == Some(&outcome) {
            self.bindings.insert(outcome, Binding::Fired);
            self.fire(handler)?;
        } else {
            self.bindings.insert(outcome, Binding::Pending(handler));
        }
        Ok(self)
    }

    /// Shorthand for `register(outcome, Some(handler))`.
    pub fn of<H, Args>(&mut self, outcome: K, handler: H) -> Result<&mut Self, DispatchError>
    where
        H: Handler<Args, R> + 'h,
        Args: 'h,
        R: 'h,
    {
        self.register(outcome, Some(handler))
    }

    /// Records `outcome` with its payload as the session's outcome and runs
    /// the bound handler, if there is one already.
    ///
    /// A second trigger is rejected with `AlreadyHandled` and leaves the
    /// session untouched. Returns `Ok(())` so business logic can
    /// `return outcomes.trigger(..)` right away.
    pub fn trigger<P>(&mut self, outcome: K, payload: P) -> Result<(), DispatchError>
    where
        P: IntoPayload,
    {
        let payload = payload.into_payload();

        if self.mode == Mode::Returning {
            if let Some(previous) = &self.triggered {
                warn!(
                    "Dispatcher::trigger - outcome {:?} replaces already triggered {:?}",
                    outcome, previous
                );
            }
            trace!("Dispatcher::trigger - returning outcome: {:?}", outcome);
            self.triggered = Some(outcome);
            self.payload = Some(payload);
            return Ok(());
        }

        if let Some(previous) = &self.triggered {
            return Err(DispatchError::AlreadyHandled {
                outcome: format!("{:?}", previous),
                attempted: format!("{:?}", outcome),
            });
        }

        trace!(
            "Dispatcher::trigger - outcome: {:?}, payload: {:?}",
            outcome,
            payload
        );

        let handler = self
            .bindings
            .get_mut(&outcome)
            .and_then(Binding::take_pending);

        self.triggered = Some(outcome);
        self.payload = Some(payload);

        match handler {
            Some(handler) => self.fire(handler),
            None => Ok(()),
        }
    }

    /// Runs `handler` with the recorded payload.
    fn fire(&mut self, handler: BoxHandler<'h, R>) -> Result<(), DispatchError> {
        let payload = self.payload.take().unwrap_or_default();

        match handler(payload) {
            Ok(result) => {
                debug!("Dispatcher::fire - handled outcome: {:?}", self.triggered);
                self.result = Some(result);
                Ok(())
            }
            Err(source) => Err(DispatchError::PayloadMismatch {
                outcome: self
                    .triggered
                    .as_ref()
                    .map(|outcome| format!("{:?}", outcome))
                    .unwrap_or_default(),
                source,
            }),
        }
    }

    /// Ends the session, returning the value produced by the handler that ran.
    ///
    /// Fails with `NoOutcome` if nothing was triggered and with
    /// `UnhandledOutcome` if the triggered outcome found no handler.
    pub fn conclude(self) -> Result<R, DispatchError> {
        match (self.triggered, self.result) {
            (None, _) => Err(DispatchError::NoOutcome),
            (Some(outcome), None) => Err(DispatchError::unhandled(&outcome)),
            (Some(_), Some(result)) => Ok(result),
        }
    }

    /// Ends the session without enforcing anything, handing back the
    /// triggered outcome. Payload is empty if a handler already consumed it.
    pub fn into_outcome(self) -> Option<crate::outcome::Outcome<K>> {
        let payload = self.payload.unwrap_or_default();
        self.triggered
            .map(|key| crate::outcome::Outcome::new(key, payload))
    }
}

/// Trigger-only view of a `Dispatcher`, handed to business logic so it can
/// report its outcome but not declare handlers.
pub struct Outcomes<'s, 'h, K, R = ()> {
    dispatcher: &'s mut Dispatcher<'h, K, R>,
}

impl<'s, 'h, K, R> Outcomes<'s, 'h, K, R>
where
    K: Eq + Hash + Debug,
{
    pub fn new(dispatcher: &'s mut Dispatcher<'h, K, R>) -> Self {
        Self { dispatcher }
    }

    /// See `Dispatcher::trigger`.
    pub fn trigger<P>(&mut self, outcome: K, payload: P) -> Result<(), DispatchError>
    where
        P: IntoPayload,
    {
        self.dispatcher.trigger(outcome, payload)
    }

    pub fn state(&self) -> SessionState {
        self.dispatcher.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_handler_registered_before_trigger() {
        let mut dispatcher = Dispatcher::new();
        dispatcher
            .of("a", || "a")
            .unwrap()
            .of("b", || "b")
            .unwrap();
        assert_eq!(dispatcher.state(), SessionState::Idle);

        dispatcher.trigger("b", ()).unwrap();
        assert_eq!(dispatcher.state(), SessionState::Handled);
        assert_eq!(dispatcher.conclude(), Ok("b"));
    }

    #[test]
    fn test_handler_registered_after_trigger() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.trigger("a", (1u8,)).unwrap();
        assert_eq!(dispatcher.state(), SessionState::Triggered);

        dispatcher.of("a", |n: u8| n + 1).unwrap();
        assert_eq!(dispatcher.conclude(), Ok(2));
    }

    #[test]
    fn test_only_matching_handler_runs() {
        let calls = RefCell::new(vec![]);
        let mut dispatcher = Dispatcher::new();
        dispatcher
            .of("a", || calls.borrow_mut().push("a"))
            .unwrap()
            .of("b", || calls.borrow_mut().push("b"))
            .unwrap();
        dispatcher.trigger("a", ()).unwrap();
        dispatcher.of("c", || calls.borrow_mut().push("c")).unwrap();
        dispatcher.conclude().unwrap();

        assert_eq!(calls.into_inner(), vec!["a"]);
    }

    #[test]
    fn test_missing_handler() {
        let mut dispatcher: Dispatcher<'_, &str> = Dispatcher::new();
        let err = dispatcher.register("a", None::<fn()>).err();

        assert_eq!(
            err,
            Some(DispatchError::MissingHandler {
                outcome: r#""a""#.into()
            })
        );
        assert!(!dispatcher.is_bound(&"a"));
    }

    #[test]
    fn test_duplicate_before_and_after_firing() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.of("a", || ()).unwrap();
        assert!(matches!(
            dispatcher.of("a", || ()).err(),
            Some(DispatchError::DuplicateOutcome { .. })
        ));

        dispatcher.trigger("a", ()).unwrap();
        assert!(dispatcher.is_handled());
        assert!(matches!(
            dispatcher.of("a", || ()).err(),
            Some(DispatchError::DuplicateOutcome { .. })
        ));
    }

    #[test]
    fn test_second_trigger_is_rejected() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.of("a", || 1).unwrap().of("b", || 2).unwrap();
        dispatcher.trigger("a", ()).unwrap();

        assert_eq!(
            dispatcher.trigger("b", ()),
            Err(DispatchError::AlreadyHandled {
                outcome: r#""a""#.into(),
                attempted: r#""b""#.into(),
            })
        );
        assert_eq!(dispatcher.triggered(), Some(&"a"));
        assert_eq!(dispatcher.conclude(), Ok(1));
    }

    #[test]
    fn test_conclude_errors() {
        let dispatcher: Dispatcher<'_, &str> = Dispatcher::new();
        assert_eq!(dispatcher.conclude(), Err(DispatchError::NoOutcome));

        let mut dispatcher = Dispatcher::new();
        dispatcher.of("a", || ()).unwrap();
        dispatcher.trigger("b", ()).unwrap();
        assert_eq!(
            dispatcher.conclude(),
            Err(DispatchError::UnhandledOutcome {
                outcome: r#""b""#.into()
            })
        );
    }

    #[test]
    fn test_payload_mismatch() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.of("a", |_n: u32| ()).unwrap();

        assert!(matches!(
            dispatcher.trigger("a", ("not a number",)),
            Err(DispatchError::PayloadMismatch { .. })
        ));
        assert!(!dispatcher.is_handled());
    }

    #[test]
    fn test_returning_mode_keeps_last_trigger() {
        let mut dispatcher: Dispatcher<'_, &str> = Dispatcher::returning();
        dispatcher.trigger("a", (1u8,)).unwrap();
        dispatcher.trigger("b", (2u8,)).unwrap();

        let outcome = dispatcher.into_outcome().expect("triggered outcome");
        assert!(outcome.is(&"b"));
        assert_eq!(outcome.payload().get::<u8>(0), Some(&2));
    }
}
