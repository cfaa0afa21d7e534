use crate::error::PayloadError;
use std::{
    any::{type_name, Any},
    fmt,
};

/// Single type-erased payload value, tagged with the name of its type so
/// mismatches can be reported in terms the caller recognises.
struct Value {
    inner: Box<dyn Any>,
    type_name: &'static str,
}

/// Ordered values that travel with a triggered outcome.
///
/// Business methods build a payload from a tuple through `IntoPayload`,
/// handlers read it back through `FromPayload`. Order is preserved end to end.
///
/// ```rust
/// use outback::payload::{FromPayload, IntoPayload};
///
/// let payload = ("a".to_string(), 2u32).into_payload();
/// let (a, b) = <(String, u32)>::from_payload(payload).unwrap();
/// assert_eq!((a.as_str(), b), ("a", 2));
/// ```
#[derive(Default)]
pub struct Payload {
    values: Vec<Value>,
}

impl Payload {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    /// Appends value at the end of the payload.
    pub fn push<T: 'static>(&mut self, value: T) {
        self.values.push(Value {
            inner: Box::new(value),
            type_name: type_name::<T>(),
        });
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Borrows value at `index` if it exists and is a `T`.
    pub fn get<T: 'static>(&self, index: usize) -> Option<&T> {
        self.values.get(index)?.inner.downcast_ref::<T>()
    }

    /// Consumes the payload, reading it back as tuple `T`.
    pub fn extract<T: FromPayload>(self) -> Result<T, PayloadError> {
        T::from_payload(self)
    }

    fn check_arity(&self, expected: usize) -> Result<(), PayloadError> {
        if self.values.len() != expected {
            return Err(PayloadError::Arity {
                expected,
                actual: self.values.len(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.values.iter().map(|v| v.type_name))
            .finish()
    }
}

/// Types that can be turned into a `Payload`. Implemented for tuples of up to
/// six `'static` values and for `Payload` itself.
pub trait IntoPayload {
    fn into_payload(self) -> Payload;
}

impl IntoPayload for Payload {
    fn into_payload(self) -> Payload {
        self
    }
}

/// Types that can be read back from a `Payload`, checking both arity and the
/// type of every value.
pub trait FromPayload: Sized {
    fn from_payload(payload: Payload) -> Result<Self, PayloadError>;
}

fn take_next<T: 'static>(
    values: &mut impl Iterator<Item = (usize, Value)>,
    expected: usize,
) -> Result<T, PayloadError> {
    let (index, Value { inner, type_name: actual }) =
        values.next().ok_or(PayloadError::Arity {
            expected,
            actual: 0,
        })?;

    inner
        .downcast::<T>()
        .map(|value| *value)
        .map_err(|_| PayloadError::Type {
            index,
            expected: type_name::<T>(),
            actual,
        })
}

macro_rules! implement_tuple_payload {
    ($count:expr; $($ty:ident),*) => {
        #[allow(non_snake_case, unused_mut)]
        impl<$($ty: 'static,)*> IntoPayload for ($($ty,)*) {
            fn into_payload(self) -> Payload {
                let ($($ty,)*) = self;
                let mut payload = Payload::with_capacity($count);
                $(
                    payload.push($ty);
                )*
                payload
            }
        }

        #[allow(unused_mut, unused_variables)]
        impl<$($ty: 'static,)*> FromPayload for ($($ty,)*) {
            fn from_payload(payload: Payload) -> Result<Self, PayloadError> {
                payload.check_arity($count)?;
                let mut values = payload.values.into_iter().enumerate();

                Ok(($(
                    take_next::<$ty>(&mut values, $count)?,
                )*))
            }
        }
    };
}

implement_tuple_payload!(0;);
implement_tuple_payload!(1; T1);
implement_tuple_payload!(2; T1, T2);
implement_tuple_payload!(3; T1, T2, T3);
implement_tuple_payload!(4; T1, T2, T3, T4);
implement_tuple_payload!(5; T1, T2, T3, T4, T5);
implement_tuple_payload!(6; T1, T2, T3, T4, T5, T6);
