//! Portal authentication reducers.
//!
//! This module contains pure reducer functions for the login flow.
//!
//! Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.

pub mod challenge;
pub mod phone_match;
pub mod registration;
pub mod session;

use crate::{PortalAction, PortalAuthEnvironment, PortalAuthState};
use wholesale_portal_core::{effect::Effect, reducer::Reducer, SmallVec};

// Re-export
pub use challenge::ChallengeReducer;
pub use phone_match::PhoneMatchReducer;
pub use registration::RegistrationReducer;
pub use session::SessionReducer;

/// Unified portal login reducer.
///
/// Combines the bootstrap, phone match, code challenge, and registration
/// flows into a single reducer. Routes actions to the appropriate
/// sub-reducer based on action type.
#[derive(Clone, Debug)]
pub struct PortalAuthReducer<W, C, S, M, E, R>
where
    W: crate::providers::WholesalerDirectory + Clone + 'static,
    C: crate::providers::CustomerDirectory + Clone + 'static,
    S: crate::providers::SessionStore + Clone + 'static,
    M: crate::providers::SmsChannel + Clone + 'static,
    E: crate::providers::EmailChannel + Clone + 'static,
    R: crate::providers::RegistrationService + Clone + 'static,
{
    session: SessionReducer<W, C, S, M, E, R>,
    phone: PhoneMatchReducer<W, C, S, M, E, R>,
    challenge: ChallengeReducer<W, C, S, M, E, R>,
    registration: RegistrationReducer<W, C, S, M, E, R>,
}

impl<W, C, S, M, E, R> PortalAuthReducer<W, C, S, M, E, R>
where
    W: crate::providers::WholesalerDirectory + Clone + 'static,
    C: crate::providers::CustomerDirectory + Clone + 'static,
    S: crate::providers::SessionStore + Clone + 'static,
    M: crate::providers::SmsChannel + Clone + 'static,
    E: crate::providers::EmailChannel + Clone + 'static,
    R: crate::providers::RegistrationService + Clone + 'static,
{
    /// Create a new unified portal login reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            session: SessionReducer::new(),
            phone: PhoneMatchReducer::new(),
            challenge: ChallengeReducer::new(),
            registration: RegistrationReducer::new(),
        }
    }
}

impl<W, C, S, M, E, R> Default for PortalAuthReducer<W, C, S, M, E, R>
where
    W: crate::providers::WholesalerDirectory + Clone + 'static,
    C: crate::providers::CustomerDirectory + Clone + 'static,
    S: crate::providers::SessionStore + Clone + 'static,
    M: crate::providers::SmsChannel + Clone + 'static,
    E: crate::providers::EmailChannel + Clone + 'static,
    R: crate::providers::RegistrationService + Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<W, C, S, M, E, R> Reducer for PortalAuthReducer<W, C, S, M, E, R>
where
    W: crate::providers::WholesalerDirectory + Clone + 'static,
    C: crate::providers::CustomerDirectory + Clone + 'static,
    S: crate::providers::SessionStore + Clone + 'static,
    M: crate::providers::SmsChannel + Clone + 'static,
    E: crate::providers::EmailChannel + Clone + 'static,
    R: crate::providers::RegistrationService + Clone + 'static,
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
        // Route to appropriate sub-reducer based on action type
        match action {
            // Bootstrap and session restoration
            PortalAction::PortalOpened
            | PortalAction::ProfileResolved { .. }
            | PortalAction::ProfileUnavailable
            | PortalAction::SessionChecked { .. } => self.session.reduce(state, action, env),

            // Phone match
            PortalAction::PhoneSubmitted { .. }
            | PortalAction::PhoneMatchSucceeded { .. }
            | PortalAction::PhoneMatchFailed { .. }
            | PortalAction::BackToPhoneEntry => self.phone.reduce(state, action, env),

            // Code challenge
            PortalAction::SmsIssued { .. }
            | PortalAction::SmsIssueFailed { .. }
            | PortalAction::ResendRequested
            | PortalAction::EmailFallbackRequested
            | PortalAction::EmailCodeIssued { .. }
            | PortalAction::EmailIssueFailed { .. }
            | PortalAction::CodeSubmitted { .. }
            | PortalAction::CodeAccepted { .. }
            | PortalAction::CodeRejected { .. }
            | PortalAction::CountdownTicked { .. } => self.challenge.reduce(state, action, env),

            // Registration
            PortalAction::RegistrationSubmitted { .. }
            | PortalAction::RegistrationAccepted { .. }
            | PortalAction::RegistrationFailed { .. }
            | PortalAction::RegistrationAcknowledged => {
                self.registration.reduce(state, action, env)
            }
        }
    }
}
