//! Portal authentication configuration.
//!
//! Configuration values should be provided by the application, not
//! hardcoded at call sites.

use crate::constants::challenge;
use crate::state::Channel;
use chrono::Duration;

/// Portal login flow configuration.
///
/// Carries the code lifetimes the gateway falls back to when the verifier
/// response does not state an expiry of its own.
#[derive(Debug, Clone)]
pub struct PortalAuthConfig {
    /// Lifetime of SMS-delivered codes.
    ///
    /// Default: 5 minutes
    pub sms_code_ttl: Duration,

    /// Lifetime of email-delivered codes.
    ///
    /// Default: 10 minutes
    pub email_code_ttl: Duration,
}

impl PortalAuthConfig {
    /// Create a configuration with the standard code lifetimes.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sms_code_ttl: Duration::seconds(challenge::SMS_CODE_TTL_SECS),
            email_code_ttl: Duration::seconds(challenge::EMAIL_CODE_TTL_SECS),
        }
    }

    /// Set the SMS code lifetime.
    #[must_use]
    pub const fn with_sms_code_ttl(mut self, ttl: Duration) -> Self {
        self.sms_code_ttl = ttl;
        self
    }

    /// Set the email code lifetime.
    #[must_use]
    pub const fn with_email_code_ttl(mut self, ttl: Duration) -> Self {
        self.email_code_ttl = ttl;
        self
    }

    /// The configured lifetime for codes on `channel`.
    #[must_use]
    pub const fn code_ttl(&self, channel: Channel) -> Duration {
        match channel {
            Channel::Sms => self.sms_code_ttl,
            Channel::Email => self.email_code_ttl,
        }
    }
}

impl Default for PortalAuthConfig {
    fn default() -> Self {
        Self::new()
    }
}
