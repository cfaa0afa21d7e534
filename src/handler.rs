use crate::{
    error::PayloadError,
    payload::{FromPayload, Payload},
};

/// Type-erased handler stored by the dispatcher. Consumes the triggered
/// payload and produces the session's result.
pub type BoxHandler<'h, R> = Box<dyn FnOnce(Payload) -> Result<R, PayloadError> + 'h>;

/// Main 'entrypoint' for outcome handlers. Closures taking up to six owned
/// arguments implement this trait, `Args` being the tuple of their argument
/// types. Arguments are read from the payload in order; a payload of a
/// different shape is reported instead of calling the closure.
///
/// ```rust
/// use outback::handler::Handler;
/// use outback::payload::IntoPayload;
///
/// let handler = |name: String, age: u32| format!("{} ({})", name, age);
/// let result = handler.handle(("john".to_string(), 42u32).into_payload());
///
/// assert_eq!(result.unwrap(), "john (42)");
/// ```
pub trait Handler<Args, R>: Sized {
    /// Extracts arguments from `payload` and runs user defined logic.
    fn handle(self, payload: Payload) -> Result<R, PayloadError>;

    /// Turns Self into `BoxHandler`, hiding the `Args` type.
    fn into_boxed<'h>(self) -> BoxHandler<'h, R>
    where
        Self: 'h,
        Args: 'h,
        R: 'h,
    {
        Box::new(move |payload| self.handle(payload))
    }
}

macro_rules! implement_handler {
    ($($ty:ident),*) => {
        #[allow(non_snake_case)]
        impl<F, R, $($ty,)*> Handler<($($ty,)*), R> for F
        where
            F: FnOnce($($ty,)*) -> R,
            ($($ty,)*): FromPayload,
        {
            fn handle(self, payload: Payload) -> Result<R, PayloadError> {
                let ($($ty,)*) = <($($ty,)*) as FromPayload>::from_payload(payload)?;
                Ok(self($($ty,)*))
            }
        }
    };
}

implement_handler!();
implement_handler!(T1);
implement_handler!(T1, T2);
implement_handler!(T1, T2, T3);
implement_handler!(T1, T2, T3, T4);
implement_handler!(T1, T2, T3, T4, T5);
implement_handler!(T1, T2, T3, T4, T5, T6);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::IntoPayload;

    #[test]
    fn test_zero_arity() {
        let handler = || "called";
        assert_eq!(handler.handle(().into_payload()), Ok("called"));
    }

    #[test]
    fn test_arguments_are_passed_in_order() {
        let handler = |a: String, b: String, c: String| vec![a, b, c];
        let payload = ("a".to_string(), "b".to_string(), "c".to_string()).into_payload();

        assert_eq!(
            handler.handle(payload).expect("valid payload"),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn test_boxed_handler_borrows_state() {
        let mut calls = vec![];
        {
            let boxed: BoxHandler<'_, ()> = (|n: u8| calls.push(n)).into_boxed();
            boxed((7u8,).into_payload()).expect("valid payload");
        }
        assert_eq!(calls, vec![7]);
    }

    #[test]
    fn test_wrong_arity_does_not_call() {
        let mut called = false;
        let handler = |_a: u8| called = true;

        assert!(handler.handle(().into_payload()).is_err());
        assert!(!called);
    }
}
