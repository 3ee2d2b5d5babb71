//! Portal authentication environment.
//!
//! This module defines the environment type for dependency injection
//! in the login flow reducers.

use crate::providers::{
    CustomerDirectory, EmailChannel, RegistrationService, SessionStore, SmsChannel,
    WholesalerDirectory,
};
use std::sync::Arc;
use wholesale_portal_core::environment::Clock;

/// Portal authentication environment.
///
/// Contains all external dependencies needed by the login flow reducers.
/// Reducers read time exclusively through [`Clock`], which keeps every
/// cooldown and expiry decision deterministic under test.
///
/// # Type Parameters
///
/// - `W`: Wholesaler directory
/// - `C`: Customer directory
/// - `S`: Session store
/// - `M`: SMS channel
/// - `E`: Email channel
/// - `R`: Registration service
#[derive(Clone)]
pub struct PortalAuthEnvironment<W, C, S, M, E, R>
where
    W: WholesalerDirectory + Clone,
    C: CustomerDirectory + Clone,
    S: SessionStore + Clone,
    M: SmsChannel + Clone,
    E: EmailChannel + Clone,
    R: RegistrationService + Clone,
{
    /// Wholesaler directory (branding).
    pub wholesalers: W,

    /// Customer directory (phone-fragment matching).
    pub customers: C,

    /// Session store (restoration check).
    pub sessions: S,

    /// SMS challenge channel.
    pub sms: M,

    /// Email challenge channel.
    pub email: E,

    /// Registration service.
    pub registrations: R,

    /// Source of the current time.
    pub clock: Arc<dyn Clock>,
}

impl<W, C, S, M, E, R> PortalAuthEnvironment<W, C, S, M, E, R>
where
    W: WholesalerDirectory + Clone,
    C: CustomerDirectory + Clone,
    S: SessionStore + Clone,
    M: SmsChannel + Clone,
    E: EmailChannel + Clone,
    R: RegistrationService + Clone,
{
    /// Create a new portal authentication environment.
    #[must_use]
    pub fn new(
        wholesalers: W,
        customers: C,
        sessions: S,
        sms: M,
        email: E,
        registrations: R,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            wholesalers,
            customers,
            sessions,
            sms,
            email,
            registrations,
            clock,
        }
    }
}
