//! Phone fragment matching.
//!
//! # Flow
//!
//! 1. `PhoneSubmitted` normalizes the digits and asks the customer
//!    directory for a unique match scoped to this wholesaler
//! 2. `PhoneMatchSucceeded` enters code entry and fires the first SMS
//!    challenge immediately
//! 3. `PhoneMatchFailed` branches on the error: no match offers
//!    registration, an ambiguous fragment is remembered and blocked from
//!    re-submission, anything else returns to phone entry with a banner
//!
//! Matching authority lives entirely on the verifier side. This reducer
//! never sees more than the single matched customer record.

use crate::actions::PortalAction;
use crate::environment::PortalAuthEnvironment;
use crate::error::AuthFlowError;
use crate::input::LastFour;
use crate::providers::{
    CustomerDirectory, EmailChannel, RegistrationService, SessionStore, SmsChannel,
    WholesalerDirectory,
};
use crate::reducers::challenge;
use crate::state::{AuthStep, Channel, CodeEntryState, PortalAuthState, WholesalerId};
use wholesale_portal_core::effect::Effect;
use wholesale_portal_core::environment::Clock;
use wholesale_portal_core::reducer::Reducer;
use wholesale_portal_core::{smallvec, SmallVec};

/// Build the directory match effect for a normalized phone fragment.
///
/// Shared with the session reducer, which auto-submits deep-link
/// fragments through the same path as manual entry.
pub(crate) fn match_effect<C>(
    customers: &C,
    wholesaler_id: WholesalerId,
    last_four: LastFour,
) -> Effect<PortalAction>
where
    C: CustomerDirectory + Clone + 'static,
{
    let customers = customers.clone();
    Effect::Future(Box::pin(async move {
        match customers.match_last_four(wholesaler_id, &last_four).await {
            Ok(customer) => Some(PortalAction::PhoneMatchSucceeded { customer }),
            Err(error) => Some(PortalAction::PhoneMatchFailed { error }),
        }
    }))
}

/// Reducer for the phone entry and verifying steps.
#[derive(Debug, Clone)]
pub struct PhoneMatchReducer<W, C, S, M, E, R> {
    _phantom: std::marker::PhantomData<(W, C, S, M, E, R)>,
}

impl<W, C, S, M, E, R> PhoneMatchReducer<W, C, S, M, E, R> {
    /// Create a new phone match reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<W, C, S, M, E, R> Default for PhoneMatchReducer<W, C, S, M, E, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W, C, S, M, E, R> Reducer for PhoneMatchReducer<W, C, S, M, E, R>
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
            // PhoneSubmitted: normalize and look up the fragment
            // ═══════════════════════════════════════════════════════════
            PortalAction::PhoneSubmitted { raw_digits } => {
                if !matches!(state.step, AuthStep::PhoneEntry) {
                    tracing::warn!("Phone digits submitted outside the phone entry step");
                    return smallvec![Effect::None];
                }

                let last_four = match LastFour::parse(&raw_digits) {
                    Ok(last_four) => last_four,
                    Err(error) => {
                        state.banner = Some(error);
                        return smallvec![Effect::None];
                    }
                };

                // The verifier already said this fragment cannot identify
                // a single customer. Re-asking cannot change the answer.
                if state.ambiguous_fragment.as_ref() == Some(&last_four) {
                    tracing::warn!("Fragment already reported ambiguous, blocking re-submission");
                    state.banner = Some(AuthFlowError::AmbiguousMatch);
                    return smallvec![Effect::None];
                }

                state.banner = None;
                state.step = AuthStep::Verifying {
                    last_four: last_four.clone(),
                };
                smallvec![match_effect(&env.customers, state.wholesaler_id, last_four)]
            }

            // ═══════════════════════════════════════════════════════════
            // PhoneMatchSucceeded: enter code entry, SMS goes out at once
            // ═══════════════════════════════════════════════════════════
            PortalAction::PhoneMatchSucceeded { customer } => {
                let AuthStep::Verifying { last_four } = &state.step else {
                    tracing::warn!("Match succeeded outside the verifying step, ignoring");
                    return smallvec![Effect::None];
                };
                let last_four = last_four.clone();

                tracing::info!(customer_id = %customer.id, "Unique customer match, entering code entry");
                let email_available = customer.email.is_some();
                state.step = AuthStep::CodeEntry(CodeEntryState {
                    customer,
                    last_four,
                    active_channel: Channel::Sms,
                    email_available,
                    expires_at: None,
                    remaining_seconds: 0,
                    countdown_armed: false,
                });
                state.banner = None;

                challenge::issue_sms_guarded(state, &env.sms, env.clock.now())
            }

            // ═══════════════════════════════════════════════════════════
            // PhoneMatchFailed: branch on the failure kind
            // ═══════════════════════════════════════════════════════════
            PortalAction::PhoneMatchFailed { error } => {
                let AuthStep::Verifying { last_four } = &state.step else {
                    tracing::warn!("Match failure outside the verifying step, ignoring");
                    return smallvec![Effect::None];
                };
                let last_four = last_four.clone();

                match error {
                    AuthFlowError::CustomerNotFound => {
                        tracing::info!("No customer match, offering registration");
                        state.step = AuthStep::RegistrationOffered { last_four };
                        state.banner = None;
                    }
                    AuthFlowError::AmbiguousMatch => {
                        tracing::warn!("Ambiguous fragment, directing customer to the wholesaler");
                        state.ambiguous_fragment = Some(last_four);
                        state.step = AuthStep::PhoneEntry;
                        state.banner = Some(AuthFlowError::AmbiguousMatch);
                    }
                    error => {
                        tracing::warn!(%error, "Phone match failed");
                        state.step = AuthStep::PhoneEntry;
                        state.banner = Some(error);
                    }
                }
                smallvec![Effect::None]
            }

            // ═══════════════════════════════════════════════════════════
            // BackToPhoneEntry: abandon the current challenge client-side
            // ═══════════════════════════════════════════════════════════
            PortalAction::BackToPhoneEntry => {
                if !matches!(state.step, AuthStep::CodeEntry(_)) {
                    tracing::debug!("Back navigation outside code entry, ignoring");
                    return smallvec![Effect::None];
                }
                // Client-side tracking only. The outstanding code expires
                // on its own on the verifier side.
                state.step = AuthStep::PhoneEntry;
                state.issuance_in_flight = false;
                state.banner = None;
                smallvec![Effect::None]
            }

            _ => smallvec![Effect::None],
        }
    }
}
