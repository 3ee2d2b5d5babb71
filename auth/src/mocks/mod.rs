//! Mock provider implementations for testing.
//!
//! This module provides in-memory implementations of all provider traits
//! for use in unit and integration tests. Channel mocks issue real
//! six-digit codes and honor expiry through the injected clock, so tests
//! exercise the same timing rules production does.

use chrono::{DateTime, Utc};

pub mod customer;
pub mod email;
pub mod registration;
pub mod session;
pub mod sms;
pub mod wholesaler;

pub use customer::MockCustomerDirectory;
pub use email::MockEmailChannel;
pub use registration::MockRegistrationService;
pub use session::MockSessionStore;
pub use sms::MockSmsChannel;
pub use wholesaler::MockWholesalerDirectory;

/// An outstanding code held by a channel mock.
#[derive(Debug, Clone)]
pub(crate) struct IssuedCode {
    pub(crate) code: String,
    pub(crate) expires_at: DateTime<Utc>,
}

/// Generate a random six-digit code.
pub(crate) fn generate_code() -> String {
    use rand::Rng;
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000))
}
