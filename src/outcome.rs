use crate::{
    error::PayloadError,
    payload::{FromPayload, Payload},
};

/// Outcome taken by a business method, as handed back in return mode:
/// the identifier it triggered and the values it passed along.
#[derive(Debug)]
pub struct Outcome<K> {
    key: K,
    payload: Payload,
}

impl<K> Outcome<K> {
    pub(crate) fn new(key: K, payload: Payload) -> Self {
        Self { key, payload }
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Indicates if this outcome was triggered under `key`.
    pub fn is(&self, key: &K) -> bool
    where
        K: PartialEq,
    {
        &self.key == key
    }

    pub fn into_parts(self) -> (K, Payload) {
        (self.key, self.payload)
    }

    /// Splits the outcome and reads the payload back as tuple `T`.
    pub fn extract<T: FromPayload>(self) -> Result<(K, T), PayloadError> {
        Ok((self.key, self.payload.extract()?))
    }
}
