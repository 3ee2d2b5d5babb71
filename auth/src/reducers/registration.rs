//! Access request flow for unmatched phone numbers.
//!
//! # Flow
//!
//! 1. `RegistrationSubmitted` validates the form and sends the access
//!    request to the wholesaler
//! 2. `RegistrationAccepted` shows the confirmation message from the
//!    verifier
//! 3. `RegistrationAcknowledged` returns to phone entry so the customer
//!    can try again once the wholesaler has set them up
//!
//! Submission never creates a session. The wholesaler reviews the
//! request out of band.

use crate::actions::PortalAction;
use crate::environment::PortalAuthEnvironment;
use crate::error::AuthFlowError;
use crate::providers::{
    CustomerDirectory, EmailChannel, RegistrationService, SessionStore, SmsChannel,
    WholesalerDirectory,
};
use crate::state::{AuthStep, PortalAuthState, RegistrationRequest};
use wholesale_portal_core::effect::Effect;
use wholesale_portal_core::reducer::Reducer;
use wholesale_portal_core::{smallvec, SmallVec};

/// Reducer for the registration offer and confirmation steps.
#[derive(Debug, Clone)]
pub struct RegistrationReducer<W, C, S, M, E, R> {
    _phantom: std::marker::PhantomData<(W, C, S, M, E, R)>,
}

impl<W, C, S, M, E, R> RegistrationReducer<W, C, S, M, E, R> {
    /// Create a new registration reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<W, C, S, M, E, R> Default for RegistrationReducer<W, C, S, M, E, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W, C, S, M, E, R> Reducer for RegistrationReducer<W, C, S, M, E, R>
where
    W: WholesalerDirectory + Clone + 'static,
    C: CustomerDirectory + Clone + 'static,
    S: SessionStore + Clone + 'static,
    M: SmsChannel + Clone + 'static,
    E: EmailChannel + Clone + 'static,
    R: RegistrationService + Clone + 'static,
{
    type State = PortalAuthState;
    type Action = PortalAction;
    type Environment = PortalAuthEnvironment<W, C, S, M, E, R>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ═══════════════════════════════════════════════════════════
            // RegistrationSubmitted: validate and send the access request
            // ═══════════════════════════════════════════════════════════
            PortalAction::RegistrationSubmitted {
                name,
                phone,
                email,
                business_name,
                message,
            } => {
                if !matches!(state.step, AuthStep::RegistrationOffered { .. }) {
                    tracing::warn!("Registration submitted outside the offer step");
                    return smallvec![Effect::None];
                }

                let name = name.trim().to_string();
                let phone = phone.trim().to_string();
                if name.is_empty() || phone.is_empty() {
                    state.banner = Some(AuthFlowError::Validation(
                        "Name and phone number are required".to_string(),
                    ));
                    return smallvec![Effect::None];
                }
                state.banner = None;

                let request = RegistrationRequest {
                    wholesaler_id: state.wholesaler_id,
                    name,
                    phone,
                    email,
                    business_name,
                    message,
                };
                tracing::info!("Submitting wholesaler access request");
                let registrations = env.registrations.clone();

                smallvec![Effect::Future(Box::pin(async move {
                    match registrations.submit(&request).await {
                        Ok(receipt) => Some(PortalAction::RegistrationAccepted {
                            message: receipt.message,
                        }),
                        Err(error) => Some(PortalAction::RegistrationFailed { error }),
                    }
                }))]
            }

            // ═══════════════════════════════════════════════════════════
            // RegistrationAccepted: show the confirmation
            // ═══════════════════════════════════════════════════════════
            PortalAction::RegistrationAccepted { message } => {
                tracing::info!("Access request accepted");
                state.banner = None;
                state.step = AuthStep::RegistrationSubmitted { message };
                smallvec![Effect::None]
            }

            // ═══════════════════════════════════════════════════════════
            // RegistrationFailed: stay on the form with a banner
            // ═══════════════════════════════════════════════════════════
            PortalAction::RegistrationFailed { error } => {
                if matches!(state.step, AuthStep::RegistrationOffered { .. }) {
                    tracing::warn!(%error, "Access request failed");
                    state.banner = Some(error);
                }
                smallvec![Effect::None]
            }

            // ═══════════════════════════════════════════════════════════
            // RegistrationAcknowledged: back to phone entry
            // ═══════════════════════════════════════════════════════════
            PortalAction::RegistrationAcknowledged => {
                if !matches!(state.step, AuthStep::RegistrationSubmitted { .. }) {
                    tracing::debug!("Registration acknowledged outside the confirmation step");
                    return smallvec![Effect::None];
                }
                state.step = AuthStep::PhoneEntry;
                state.banner = None;
                smallvec![Effect::None]
            }

            _ => smallvec![Effect::None],
        }
    }
}
