//! Test double for business methods following the outcome convention.
//!
//! Only stubbing is provided, there is no way to verify which methods were
//! invoked on the double. Verify the calls in separate tests instead.
//!
//! ```rust
//! use outback::stub::OutcomeStub;
//!
//! let users = OutcomeStub::with_outcome("register_user", "success", ("john".to_string(),));
//!
//! let greeting = users.invoke("register_user", |on| {
//!     on.of("success", |name: String| format!("welcome {}", name))?
//!         .of("validation_failed", |_name: String| "try again".to_string())?;
//!     Ok(())
//! })?;
//!
//! assert_eq!(greeting, "welcome john");
//! # Ok::<(), outback::error::StubError>(())
//! ```

use crate::{
    dispatcher::Dispatcher,
    error::{DispatchError, StubError},
    outcome::Outcome,
    payload::{IntoPayload, Payload},
    producer,
};
use log::debug;
use std::{
    any::{type_name, Any},
    collections::HashMap,
    fmt::Debug,
    hash::Hash,
};

/// Produces a fresh copy of the canned outcome on every invocation.
type CannedOutcome<K> = Box<dyn Fn() -> (K, Payload)>;

/// What a stubbed method name is bound to.
enum Stubbed<K> {
    Outcome(CannedOutcome<K>),

    /// Plain value returned by a method that doesn't report outcomes.
    Value(Box<dyn Any>),
}

/// A method name holds one binding; stubbing it again, either way, replaces it.
pub struct OutcomeStub<K> {
    methods: HashMap<String, Stubbed<K>>,
}

impl<K> Default for OutcomeStub<K> {
    fn default() -> Self {
        Self {
            methods: HashMap::new(),
        }
    }
}

impl<K> OutcomeStub<K>
where
    K: Eq + Hash + Debug + Clone + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a stub with `method` already bound to `outcome`.
    pub fn with_outcome<M, P>(method: M, outcome: K, payload: P) -> Self
    where
        M: ToString,
        P: IntoPayload + Clone + 'static,
    {
        let mut stub = Self::new();
        stub.stub(method, outcome, payload);
        stub
    }

    /// Binds `method` to `outcome` triggered with `payload`.
    pub fn stub<M, P>(&mut self, method: M, outcome: K, payload: P) -> &mut Self
    where
        M: ToString,
        P: IntoPayload + Clone + 'static,
    {
        let method = method.to_string();
        debug!("OutcomeStub::stub - method: {}, outcome: {:?}", method, outcome);

        self.methods.insert(
            method,
            Stubbed::Outcome(Box::new(move || {
                (outcome.clone(), payload.clone().into_payload())
            })),
        );
        self
    }

    /// Binds `method` to a plain value, read back with `value`.
    pub fn stub_value<M, T>(&mut self, method: M, value: T) -> &mut Self
    where
        M: ToString,
        T: Clone + 'static,
    {
        let method = method.to_string();
        debug!("OutcomeStub::stub_value - method: {}", method);

        self.methods.insert(method, Stubbed::Value(Box::new(value)));
        self
    }

    pub fn responds_to(&self, method: &str) -> bool {
        self.methods.contains_key(method)
    }

    /// Invokes stubbed `method` with the caller's registration step; the
    /// canned outcome is triggered regardless of anything else.
    pub fn invoke<'h, R, F>(&self, method: &str, registration: F) -> Result<R, StubError>
    where
        F: FnOnce(&mut Dispatcher<'h, K, R>) -> Result<(), DispatchError>,
    {
        let canned = self.canned(method)?;

        Ok(producer::with_handlers(registration, |outcomes| {
            let (outcome, payload) = canned();
            outcomes.trigger(outcome, payload)
        })?)
    }

    /// Invokes stubbed `method` without handlers, returning the canned outcome.
    pub fn invoke_returning(&self, method: &str) -> Result<Option<Outcome<K>>, StubError> {
        let canned = self.canned(method)?;

        Ok(producer::returning(|outcomes| {
            let (outcome, payload) = canned();
            outcomes.trigger(outcome, payload)
        })?)
    }

    /// Returns a copy of the value stubbed for `method`.
    pub fn value<T>(&self, method: &str) -> Result<T, StubError>
    where
        T: Clone + 'static,
    {
        match self.lookup(method)? {
            Stubbed::Value(value) => {
                value
                    .downcast_ref::<T>()
                    .cloned()
                    .ok_or_else(|| StubError::ValueType {
                        method: method.to_string(),
                        expected: type_name::<T>(),
                    })
            }
            Stubbed::Outcome(_) => Err(StubError::StubbedAs {
                method: method.to_string(),
                stubbed: "an outcome",
            }),
        }
    }

    fn canned(&self, method: &str) -> Result<&CannedOutcome<K>, StubError> {
        match self.lookup(method)? {
            Stubbed::Outcome(canned) => Ok(canned),
            Stubbed::Value(_) => Err(StubError::StubbedAs {
                method: method.to_string(),
                stubbed: "a plain value",
            }),
        }
    }

    fn lookup(&self, method: &str) -> Result<&Stubbed<K>, StubError> {
        self.methods
            .get(method)
            .ok_or_else(|| StubError::UnknownMethod(method.to_string()))
    }
}
