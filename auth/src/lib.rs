//! # Wholesale Portal Authentication
//!
//! This crate implements the customer-facing authentication and session flow
//! for the wholesale ordering portal: phone-fragment matching, one-time code
//! challenges over SMS and email, session restoration, and the registration
//! path for unknown customers.
//!
//! ## Architecture
//!
//! The flow is implemented as reducers and effects:
//!
//! ```text
//! Action → Reducer → (State, Effects) → Effect Execution → More Actions
//! ```
//!
//! All timing decisions (challenge expiry, resend cooldowns, duplicate
//! suppression) read the clock from the environment, so the whole flow is
//! deterministic under test.
//!
//! ## Example: Phone Login
//!
//! ```rust,ignore
//! use wholesale_portal_auth::*;
//!
//! // 1. Customer opens the portal
//! let effects = reducer.reduce(&mut state, PortalAction::PortalOpened, &env);
//!
//! // 2. Execute effects (profile fetch + session check run in parallel)
//! // 3. Customer submits the last four digits of their phone number
//! let effects = reducer.reduce(
//!     &mut state,
//!     PortalAction::PhoneSubmitted { raw_digits: "4821".to_string() },
//!     &env,
//! );
//!
//! // 4. A unique match moves to code entry and issues an SMS code
//! assert!(matches!(state.step, AuthStep::CodeEntry(_)));
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod actions;
pub mod config;
pub mod constants;
pub mod environment;
pub mod error;
pub mod input;
pub mod providers;
pub mod reducers;
pub mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export main types for convenience
pub use actions::PortalAction;
pub use config::PortalAuthConfig;
pub use environment::PortalAuthEnvironment;
pub use error::{AuthFlowError, Result};
pub use input::{LastFour, OneTimeCode};
pub use reducers::PortalAuthReducer;
pub use state::{
    AuthSession, AuthStep, Channel, CodeEntryState, CustomerId, CustomerRecord, PortalAuthState,
    ProfileState, RegistrationRequest, WholesalerId, WholesalerProfile,
};
