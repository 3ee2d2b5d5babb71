//! Authentication flow constants.
//!
//! This module contains constant values used throughout the portal login flow.

/// One-time code challenge parameters.
pub mod challenge {
    /// Number of digits in a one-time code.
    pub const CODE_LENGTH: usize = 6;

    /// Lifetime of an SMS-delivered code, in seconds.
    pub const SMS_CODE_TTL_SECS: i64 = 300;

    /// Lifetime of an email-delivered code, in seconds.
    ///
    /// Email delivery is slower than SMS, so email codes live longer.
    pub const EMAIL_CODE_TTL_SECS: i64 = 600;
}

/// Code issuance guard windows.
pub mod issuance {
    /// Minimum seconds between consecutive issue requests for the same
    /// customer. Resend affordances stay disabled until this elapses.
    pub const RESEND_COOLDOWN_SECS: i64 = 60;

    /// Window in which a repeated issue request on the same channel is
    /// dropped outright, collapsing races such as a deep-link arrival
    /// followed by a manual submit.
    pub const DUPLICATE_SUPPRESS_SECS: i64 = 30;
}

/// Input field constraints.
pub mod input {
    /// Number of phone digits a customer identifies themselves with.
    pub const LAST_FOUR_LEN: usize = 4;
}

/// Portal branding fallbacks.
pub mod branding {
    /// Display name used when the wholesaler profile could not be loaded.
    pub const FALLBACK_PORTAL_NAME: &str = "Portal";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_codes_outlive_sms_codes() {
        assert!(challenge::EMAIL_CODE_TTL_SECS > challenge::SMS_CODE_TTL_SECS);
    }

    #[test]
    fn test_duplicate_window_inside_resend_cooldown() {
        // The duplicate-suppression window must close before a resend
        // becomes available, otherwise a permitted resend could be dropped.
        assert!(issuance::DUPLICATE_SUPPRESS_SECS < issuance::RESEND_COOLDOWN_SECS);
    }

    #[test]
    fn test_challenge_shape() {
        assert_eq!(challenge::CODE_LENGTH, 6);
        assert_eq!(input::LAST_FOUR_LEN, 4);
    }
}
