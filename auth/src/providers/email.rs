//! Email challenge channel trait.

use crate::error::Result;
use crate::input::OneTimeCode;
use crate::providers::ChallengeReceipt;
use crate::state::CustomerId;
use std::future::Future;

/// One-time codes over email, the fallback challenge channel.
///
/// Email operations are keyed by the already-matched customer, so they
/// are only reachable after a successful phone match put an email
/// address on the table.
pub trait EmailChannel: Send + Sync {
    /// Ask the verifier to send a fresh code to the customer's email.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The message could not be sent → `AuthFlowError::DeliveryFailed`
    /// - The verifier cannot be reached → `AuthFlowError::Transport`
    fn send_code(
        &self,
        customer_id: CustomerId,
        email: &str,
    ) -> impl Future<Output = Result<ChallengeReceipt>> + Send;

    /// Submit a code for verification.
    ///
    /// On success the verifier establishes the session. The customer was
    /// already identified by the phone match, so no record comes back.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The code does not match → `AuthFlowError::InvalidCode`
    /// - The code's lifetime has passed → `AuthFlowError::ExpiredCode`
    /// - The verifier cannot be reached → `AuthFlowError::Transport`
    fn verify_code(
        &self,
        customer_id: CustomerId,
        email: &str,
        code: &OneTimeCode,
    ) -> impl Future<Output = Result<()>> + Send;
}
