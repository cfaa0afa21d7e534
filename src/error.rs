use thiserror::Error;

/// Failures raised while a dispatch session is running or concluding.
///
/// Outcome identifiers are rendered with their `Debug` representation so the
/// error type does not need to be generic over the identifier type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Same identifier bound twice in one session.
    #[error("outcome {outcome} already has a handler")]
    DuplicateOutcome { outcome: String },

    /// `register` was called without a callback.
    #[error("no handler provided for outcome {outcome}")]
    MissingHandler { outcome: String },

    /// A second trigger arrived after the session already took an outcome.
    #[error("outcome {outcome} already handled, cannot trigger {attempted}")]
    AlreadyHandled { outcome: String, attempted: String },

    /// Session concluded with a triggered identifier nobody registered for.
    #[error("no outcome handler for outcome {outcome}")]
    UnhandledOutcome { outcome: String },

    /// Session concluded without any trigger.
    #[error("no outcome selected")]
    NoOutcome,

    /// Handler arguments do not line up with the triggered payload.
    #[error("payload mismatch for outcome {outcome}: {source}")]
    PayloadMismatch {
        outcome: String,
        #[source]
        source: PayloadError,
    },
}

impl DispatchError {
    pub(crate) fn duplicate<K: std::fmt::Debug>(outcome: &K) -> Self {
        Self::DuplicateOutcome {
            outcome: format!("{:?}", outcome),
        }
    }

    pub(crate) fn missing_handler<K: std::fmt::Debug>(outcome: &K) -> Self {
        Self::MissingHandler {
            outcome: format!("{:?}", outcome),
        }
    }

    pub(crate) fn unhandled<K: std::fmt::Debug>(outcome: &K) -> Self {
        Self::UnhandledOutcome {
            outcome: format!("{:?}", outcome),
        }
    }
}

/// Raised when a payload is read back as a tuple of the wrong shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("expected {expected} values, got {actual}")]
    Arity { expected: usize, actual: usize },

    #[error("value {index} is a {actual}, not a {expected}")]
    Type {
        index: usize,
        expected: &'static str,
        actual: &'static str,
    },
}

/// Setup-time failure raised when the outcome capability is attached to a
/// target the inclusion policy rejects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("cannot attach outcome capability to {target}: category {category} is denied")]
    Denied { target: String, category: String },

    #[error("cannot attach outcome capability to {target}: only targets in {} are allowed", .allowed.join(", "))]
    NotAllowed { target: String, allowed: Vec<String> },
}

/// Failures specific to the test double.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StubError {
    #[error("no stubbed method named {0}")]
    UnknownMethod(String),

    #[error("stubbed value for {method} is not a {expected}")]
    ValueType {
        method: String,
        expected: &'static str,
    },

    #[error("method {method} is stubbed as {stubbed}")]
    StubbedAs {
        method: String,
        stubbed: &'static str,
    },

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
