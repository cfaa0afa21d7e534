use crate::{
    dispatcher::{Dispatcher, Outcomes},
    error::{DispatchError, PolicyError},
    outcome::Outcome,
    policy::{InclusionPolicy, TargetDescriptor},
    producer,
};
use log::debug;
use std::{fmt::Debug, hash::Hash};

/// Grants a business type the ability to report outcomes.
///
/// The capability is held as a field by the type that uses it and can only be
/// obtained through `attach`, which evaluates the inclusion policy once.
///
/// ```rust
/// use outback::capability::OutcomeCapability;
/// use outback::policy::{InclusionPolicy, TargetDescriptor};
///
/// let policy = InclusionPolicy::default();
///
/// let service = TargetDescriptor::new("Checkout").category("service");
/// assert!(OutcomeCapability::attach(&policy, service).is_ok());
///
/// let model = TargetDescriptor::new("Order").category("model");
/// assert!(OutcomeCapability::attach(&policy, model).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct OutcomeCapability {
    target: TargetDescriptor,
}

impl OutcomeCapability {
    pub fn attach(
        policy: &InclusionPolicy,
        target: TargetDescriptor,
    ) -> Result<Self, PolicyError> {
        policy.check(&target)?;
        debug!("OutcomeCapability::attach - target: {}", target.name);

        Ok(Self { target })
    }

    pub fn target(&self) -> &TargetDescriptor {
        &self.target
    }

    /// See `producer::with_handlers`.
    pub fn with_handlers<'h, K, R, F, B>(&self, registration: F, body: B) -> Result<R, DispatchError>
    where
        K: Eq + Hash + Debug,
        F: FnOnce(&mut Dispatcher<'h, K, R>) -> Result<(), DispatchError>,
        B: FnOnce(&mut Outcomes<'_, 'h, K, R>) -> Result<(), DispatchError>,
    {
        producer::with_handlers(registration, body)
    }

    /// See `producer::returning`.
    pub fn returning<K, B>(&self, body: B) -> Result<Option<Outcome<K>>, DispatchError>
    where
        K: Eq + Hash + Debug,
        B: FnOnce(&mut Outcomes<'_, 'static, K, ()>) -> Result<(), DispatchError>,
    {
        producer::returning(body)
    }
}
