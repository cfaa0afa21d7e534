//! Outcome dispatch for business logic.
//!
//! A business method reports exactly one named outcome, optionally with
//! payload values, and its caller supplies the handlers: exactly one of them
//! fires. Mismatches (nothing triggered, nothing handling the trigger, two
//! handlers for one outcome, two triggers) are reported as errors instead of
//! passing silently.
//!
//! ```rust
//! use outback::producer::with_handlers;
//!
//! let response = with_handlers(
//!     |on| {
//!         on.of("success", |id: u64| format!("redirect to /bookings/{}", id))?
//!             .of("insufficient_credits", || "render purchase form".to_string())?;
//!         Ok(())
//!     },
//!     |outcomes| outcomes.trigger("insufficient_credits", ()),
//! )?;
//!
//! assert_eq!(response, "render purchase form");
//! # Ok::<(), outback::error::DispatchError>(())
//! ```

pub mod capability;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod outcome;
pub mod payload;
pub mod policy;
pub mod producer;
pub mod stub;

pub use capability::OutcomeCapability;
pub use dispatcher::{Dispatcher, Outcomes, SessionState};
pub use error::{DispatchError, PayloadError, PolicyError, StubError};
pub use outcome::Outcome;
pub use payload::Payload;
pub use producer::{returning, with_handlers};
