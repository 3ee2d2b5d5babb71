//! Customer directory provider trait.

use crate::error::Result;
use crate::input::LastFour;
use crate::state::{CustomerRecord, WholesalerId};
use std::future::Future;

/// Phone-fragment matching against a wholesaler's customer base.
///
/// Matching is scoped to a single wholesaler and succeeds only when the
/// fragment identifies exactly one customer. Zero and multiple matches
/// are distinct failures so the flow can route them differently.
pub trait CustomerDirectory: Send + Sync {
    /// Match the last four phone digits against the wholesaler's
    /// customers.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - No customer matches → `AuthFlowError::CustomerNotFound`
    /// - More than one customer matches → `AuthFlowError::AmbiguousMatch`
    /// - The verifier cannot be reached → `AuthFlowError::Transport`
    fn match_last_four(
        &self,
        wholesaler_id: WholesalerId,
        last_four: &LastFour,
    ) -> impl Future<Output = Result<CustomerRecord>> + Send;
}
