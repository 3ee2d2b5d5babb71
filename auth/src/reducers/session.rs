//! Portal bootstrap and session restoration.
//!
//! # Flow
//!
//! 1. `PortalOpened` kicks off the branding fetch and the session check
//!    in parallel
//! 2. `SessionChecked` with a live session short-circuits straight to
//!    `Authenticated`, skipping phone entry entirely
//! 3. `SessionChecked` without one lands on phone entry, auto-submitting
//!    a deep-link fragment exactly once if the portal was opened with one
//!
//! Branding is display-only. A missing or failing wholesaler lookup
//! degrades to fallback branding and never blocks the login flow.

use crate::actions::PortalAction;
use crate::environment::PortalAuthEnvironment;
use crate::providers::{
    CustomerDirectory, EmailChannel, RegistrationService, SessionStore, SmsChannel,
    WholesalerDirectory,
};
use crate::reducers::phone_match;
use crate::state::{AuthStep, PortalAuthState, ProfileState};
use wholesale_portal_core::effect::Effect;
use wholesale_portal_core::reducer::Reducer;
use wholesale_portal_core::{smallvec, SmallVec};

/// Reducer for portal open, branding resolution, and session restoration.
#[derive(Debug, Clone)]
pub struct SessionReducer<W, C, S, M, E, R> {
    _phantom: std::marker::PhantomData<(W, C, S, M, E, R)>,
}

impl<W, C, S, M, E, R> SessionReducer<W, C, S, M, E, R> {
    /// Create a new session reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<W, C, S, M, E, R> Default for SessionReducer<W, C, S, M, E, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W, C, S, M, E, R> Reducer for SessionReducer<W, C, S, M, E, R>
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
            // PortalOpened: fetch branding and check the session in parallel
            // ═══════════════════════════════════════════════════════════
            PortalAction::PortalOpened => {
                if !matches!(state.profile, ProfileState::NotRequested) {
                    tracing::debug!("Portal already bootstrapped, ignoring reopen");
                    return smallvec![Effect::None];
                }
                state.profile = ProfileState::Loading;

                let wholesalers = env.wholesalers.clone();
                let sessions = env.sessions.clone();
                let wholesaler_id = state.wholesaler_id;
                let session_wholesaler_id = wholesaler_id;

                smallvec![Effect::Parallel(vec![
                    Effect::Future(Box::pin(async move {
                        match wholesalers.resolve(wholesaler_id).await {
                            Ok(Some(profile)) => Some(PortalAction::ProfileResolved { profile }),
                            Ok(None) => Some(PortalAction::ProfileUnavailable),
                            Err(error) => {
                                tracing::warn!(%error, "Wholesaler profile fetch failed");
                                Some(PortalAction::ProfileUnavailable)
                            }
                        }
                    })),
                    Effect::Future(Box::pin(async move {
                        match sessions.check_session(session_wholesaler_id).await {
                            Ok(session) => Some(PortalAction::SessionChecked { session }),
                            Err(error) => {
                                tracing::warn!(
                                    %error,
                                    "Session check failed, continuing unauthenticated"
                                );
                                Some(PortalAction::SessionChecked { session: None })
                            }
                        }
                    })),
                ])]
            }

            // ═══════════════════════════════════════════════════════════
            // ProfileResolved: branding arrived
            // ═══════════════════════════════════════════════════════════
            PortalAction::ProfileResolved { profile } => {
                tracing::debug!(business_name = %profile.business_name, "Wholesaler profile loaded");
                state.profile = ProfileState::Loaded(profile);
                smallvec![Effect::None]
            }

            // ═══════════════════════════════════════════════════════════
            // ProfileUnavailable: degrade to fallback branding
            // ═══════════════════════════════════════════════════════════
            PortalAction::ProfileUnavailable => {
                state.profile = ProfileState::Unavailable;
                smallvec![Effect::None]
            }

            // ═══════════════════════════════════════════════════════════
            // SessionChecked: restore an existing session
            // ═══════════════════════════════════════════════════════════
            PortalAction::SessionChecked {
                session: Some(session),
            } => {
                tracing::info!(customer_id = %session.customer.id, "Existing session restored");
                state.banner = None;
                state.step = AuthStep::Authenticated { session };
                smallvec![Effect::None]
            }

            // ═══════════════════════════════════════════════════════════
            // SessionChecked: no session, enter the login flow
            // ═══════════════════════════════════════════════════════════
            PortalAction::SessionChecked { session: None } => {
                if !matches!(state.step, AuthStep::Unauthenticated) {
                    tracing::debug!("Session check resolved after the flow moved on, ignoring");
                    return smallvec![Effect::None];
                }

                // A deep-link fragment gets exactly one automatic attempt.
                let untried_deep_link = if state.deep_link_attempted {
                    None
                } else {
                    state.deep_link.clone()
                };

                if let Some(last_four) = untried_deep_link {
                    state.deep_link_attempted = true;
                    tracing::info!("Auto-submitting deep-link phone fragment");
                    state.step = AuthStep::Verifying {
                        last_four: last_four.clone(),
                    };
                    return smallvec![phone_match::match_effect(
                        &env.customers,
                        state.wholesaler_id,
                        last_four,
                    )];
                }

                state.step = AuthStep::PhoneEntry;
                smallvec![Effect::None]
            }

            _ => smallvec![Effect::None],
        }
    }
}
