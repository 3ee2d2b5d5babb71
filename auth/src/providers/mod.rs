//! Portal verifier providers.
//!
//! This module defines traits for all external dependencies used by the
//! login flow. These traits enable dependency injection and make the
//! flow logic testable.
//!
//! # Architecture
//!
//! Providers are **interfaces**, not implementations. The reducer depends
//! on these traits, and the host wires in concrete implementations.
//!
//! This enables:
//! - **Testing**: mocks (in-memory, deterministic clock)
//! - **Production**: the portal API gateway over HTTP
//! - **Development**: instrumented versions (logging, tracing)
//!
//! The verifier is the single authority on matches, codes, and sessions.
//! Nothing in this crate decides whether a code is correct; providers
//! report what the verifier said, and the reducer folds that into state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod customer;
pub mod email;
pub mod http;
pub mod registration;
pub mod session;
pub mod sms;
pub mod wholesaler;

// Re-export provider traits
pub use customer::CustomerDirectory;
pub use email::EmailChannel;
pub use http::PortalApiClient;
pub use registration::RegistrationService;
pub use session::SessionStore;
pub use sms::SmsChannel;
pub use wholesaler::WholesalerDirectory;

/// Receipt for an issued one-time code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeReceipt {
    /// When the code stops being accepted.
    pub expires_at: DateTime<Utc>,
}

/// Receipt for an accepted registration request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationReceipt {
    /// Confirmation text to show the customer.
    pub message: String,
}
