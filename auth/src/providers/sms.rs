//! SMS challenge channel trait.

use crate::error::Result;
use crate::input::{LastFour, OneTimeCode};
use crate::providers::ChallengeReceipt;
use crate::state::{CustomerRecord, WholesalerId};
use std::future::Future;

/// One-time codes over SMS, the primary challenge channel.
///
/// Both operations are keyed by wholesaler and phone fragment; the
/// verifier re-resolves the customer on its side, so a stale client can
/// never verify against the wrong record.
pub trait SmsChannel: Send + Sync {
    /// Ask the verifier to send a fresh code to the matched customer's
    /// phone.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The message could not be sent → `AuthFlowError::DeliveryFailed`
    /// - The verifier cannot be reached → `AuthFlowError::Transport`
    fn request_code(
        &self,
        wholesaler_id: WholesalerId,
        last_four: &LastFour,
    ) -> impl Future<Output = Result<ChallengeReceipt>> + Send;

    /// Submit a code for verification.
    ///
    /// On success the verifier establishes the session and returns the
    /// authenticated customer.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The code does not match → `AuthFlowError::InvalidCode`
    /// - The code's lifetime has passed → `AuthFlowError::ExpiredCode`
    /// - The verifier cannot be reached → `AuthFlowError::Transport`
    fn verify_code(
        &self,
        wholesaler_id: WholesalerId,
        last_four: &LastFour,
        code: &OneTimeCode,
    ) -> impl Future<Output = Result<CustomerRecord>> + Send;
}
