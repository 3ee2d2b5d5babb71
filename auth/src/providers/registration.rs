//! Registration service trait.

use crate::error::Result;
use crate::providers::RegistrationReceipt;
use crate::state::RegistrationRequest;
use std::future::Future;

/// Account requests for customers the verifier could not match.
///
/// Submission creates a pending request on the wholesaler's side. It
/// does not create a customer record, so a registered-but-unapproved
/// customer still fails the phone match.
pub trait RegistrationService: Send + Sync {
    /// Submit a registration request.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Required fields are missing or malformed → `AuthFlowError::Validation`
    /// - The service cannot be reached → `AuthFlowError::Transport`
    fn submit(
        &self,
        request: &RegistrationRequest,
    ) -> impl Future<Output = Result<RegistrationReceipt>> + Send;
}
