//! Session store trait.

use crate::error::Result;
use crate::state::{AuthSession, WholesalerId};
use std::future::Future;

/// Session restoration.
///
/// This trait abstracts over the credentialed session check the portal
/// runs on load. The credential itself is a server-side cookie carried
/// by the HTTP client; this trait only reports the verdict.
///
/// # Implementation Notes
///
/// - The check is read-only and idempotent
/// - There is no sign-out operation in the portal flow
pub trait SessionStore: Send + Sync {
    /// Check whether a live session exists for this wholesaler's portal.
    ///
    /// # Returns
    ///
    /// The restored session, or `None` when the customer is not signed
    /// in.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The verifier cannot be reached → `AuthFlowError::Transport`
    fn check_session(
        &self,
        wholesaler_id: WholesalerId,
    ) -> impl Future<Output = Result<Option<AuthSession>>> + Send;
}
