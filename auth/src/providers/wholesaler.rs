//! Wholesaler directory provider trait.

use crate::error::Result;
use crate::state::{WholesalerId, WholesalerProfile};
use std::future::Future;

/// Read access to wholesaler public profiles.
///
/// The profile is branding only. A missing or failed profile never blocks
/// the login flow; the portal falls back to placeholder branding.
pub trait WholesalerDirectory: Send + Sync {
    /// Resolve the public profile of a wholesaler.
    ///
    /// Returns `Ok(None)` when the wholesaler is unknown, which the flow
    /// treats the same as a fetch failure.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The directory cannot be reached → `AuthFlowError::Transport`
    fn resolve(
        &self,
        wholesaler_id: WholesalerId,
    ) -> impl Future<Output = Result<Option<WholesalerProfile>>> + Send;
}
