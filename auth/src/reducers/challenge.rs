//! Code issuance, verification, and the expiry countdown.
//!
//! # Flow
//!
//! 1. A guarded issuance helper sends the SMS (or email) challenge and
//!    stamps the issuance time for cooldown tracking
//! 2. The receipt flips the active channel, records the expiry, and arms
//!    a one-second countdown tick chain
//! 3. `CodeSubmitted` verifies against whichever channel is active, and
//!    `CodeAccepted` establishes the authenticated session
//!
//! All issuance goes through [`issue_sms_guarded`] or
//! [`issue_email_guarded`]. The guards enforce the in-flight check and
//! the per-channel duplicate suppression window in one place, so the
//! automatic first SMS, resends, and the email fallback cannot race each
//! other into double sends.
//!
//! The countdown is display-only. Codes expire on the verifier side
//! regardless of what the local timer shows.

use crate::actions::PortalAction;
use crate::environment::PortalAuthEnvironment;
use crate::input::OneTimeCode;
use crate::providers::{
    ChallengeReceipt, CustomerDirectory, EmailChannel, RegistrationService, SessionStore,
    SmsChannel, WholesalerDirectory,
};
use crate::state::{AuthSession, AuthStep, Channel, PortalAuthState};
use wholesale_portal_core::effect::Effect;
use wholesale_portal_core::environment::Clock;
use wholesale_portal_core::reducer::Reducer;
use wholesale_portal_core::{smallvec, DateTime, SmallVec, Utc};

/// Issue an SMS challenge if the issuance guard allows it.
///
/// Stamps `last_sms_issued_at` and raises the in-flight flag before the
/// request leaves, so a second caller in the same window is suppressed.
pub(crate) fn issue_sms_guarded<M>(
    state: &mut PortalAuthState,
    sms: &M,
    now: DateTime<Utc>,
) -> SmallVec<[Effect<PortalAction>; 4]>
where
    M: SmsChannel + Clone + 'static,
{
    let AuthStep::CodeEntry(entry) = &state.step else {
        tracing::warn!("SMS issuance requested outside code entry");
        return smallvec![Effect::None];
    };
    if !state.issuance_allowed(Channel::Sms, now) {
        tracing::debug!("SMS issuance suppressed by the duplicate guard");
        return smallvec![Effect::None];
    }
    let wholesaler_id = state.wholesaler_id;
    let last_four = entry.last_four.clone();
    state.issuance_in_flight = true;
    state.last_sms_issued_at = Some(now);

    let sms = sms.clone();
    smallvec![Effect::Future(Box::pin(async move {
        match sms.request_code(wholesaler_id, &last_four).await {
            Ok(receipt) => Some(PortalAction::SmsIssued { receipt }),
            Err(error) => Some(PortalAction::SmsIssueFailed { error }),
        }
    }))]
}

/// Issue an email challenge if the issuance guard allows it.
///
/// Requires an email on file for the matched customer. Stamps
/// `last_email_issued_at` and raises the in-flight flag.
pub(crate) fn issue_email_guarded<E>(
    state: &mut PortalAuthState,
    email_channel: &E,
    now: DateTime<Utc>,
) -> SmallVec<[Effect<PortalAction>; 4]>
where
    E: EmailChannel + Clone + 'static,
{
    let AuthStep::CodeEntry(entry) = &state.step else {
        tracing::warn!("Email issuance requested outside code entry");
        return smallvec![Effect::None];
    };
    let Some(email) = entry.customer.email.clone() else {
        tracing::warn!("Email issuance requested for a customer without an email on file");
        return smallvec![Effect::None];
    };
    if !state.issuance_allowed(Channel::Email, now) {
        tracing::debug!("Email issuance suppressed by the duplicate guard");
        return smallvec![Effect::None];
    }
    let customer_id = entry.customer.id;
    state.issuance_in_flight = true;
    state.last_email_issued_at = Some(now);

    let email_channel = email_channel.clone();
    smallvec![Effect::Future(Box::pin(async move {
        match email_channel.send_code(customer_id, &email).await {
            Ok(receipt) => Some(PortalAction::EmailCodeIssued { receipt }),
            Err(error) => Some(PortalAction::EmailIssueFailed { error }),
        }
    }))]
}

/// Record a challenge receipt and arm the countdown if it is not
/// already ticking.
///
/// The active channel follows the receipt, not the request. A late SMS
/// receipt arriving after an email fallback flips the entry back to SMS,
/// matching whichever code most recently reached the customer.
///
/// Arming stamps the chain with a fresh generation. A chain orphaned by
/// backing out and rematching would otherwise tick into the new code
/// entry alongside the fresh chain; the stamp lets those ticks be told
/// apart and dropped.
fn apply_receipt(
    state: &mut PortalAuthState,
    channel: Channel,
    receipt: &ChallengeReceipt,
    now: DateTime<Utc>,
) -> SmallVec<[Effect<PortalAction>; 4]> {
    state.issuance_in_flight = false;
    let AuthStep::CodeEntry(entry) = &mut state.step else {
        tracing::debug!(channel = %channel, "Receipt arrived after leaving code entry, ignoring");
        return smallvec![Effect::None];
    };

    tracing::info!(channel = %channel, expires_at = %receipt.expires_at, "Challenge code issued");
    entry.active_channel = channel;
    entry.expires_at = Some(receipt.expires_at);
    entry.remaining_seconds = (receipt.expires_at - now).num_seconds().max(0);
    let arm_countdown = !entry.countdown_armed;
    entry.countdown_armed = true;
    state.banner = None;

    if arm_countdown {
        state.countdown_generation += 1;
        smallvec![Effect::Delay {
            duration: std::time::Duration::from_secs(1),
            action: Box::new(PortalAction::CountdownTicked {
                generation: state.countdown_generation,
            }),
        }]
    } else {
        // A tick chain is already running and will pick up the new
        // expiry on its next tick.
        smallvec![Effect::None]
    }
}

/// Reducer for the code entry step.
#[derive(Debug, Clone)]
pub struct ChallengeReducer<W, C, S, M, E, R> {
    _phantom: std::marker::PhantomData<(W, C, S, M, E, R)>,
}

impl<W, C, S, M, E, R> ChallengeReducer<W, C, S, M, E, R> {
    /// Create a new challenge reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<W, C, S, M, E, R> Default for ChallengeReducer<W, C, S, M, E, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W, C, S, M, E, R> Reducer for ChallengeReducer<W, C, S, M, E, R>
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
            // SmsIssued / EmailCodeIssued: receipt lands, countdown arms
            // ═══════════════════════════════════════════════════════════
            PortalAction::SmsIssued { receipt } => {
                apply_receipt(state, Channel::Sms, &receipt, env.clock.now())
            }
            PortalAction::EmailCodeIssued { receipt } => {
                apply_receipt(state, Channel::Email, &receipt, env.clock.now())
            }

            // ═══════════════════════════════════════════════════════════
            // SmsIssueFailed / EmailIssueFailed: surface the delivery error
            // ═══════════════════════════════════════════════════════════
            PortalAction::SmsIssueFailed { error } | PortalAction::EmailIssueFailed { error } => {
                state.issuance_in_flight = false;
                if matches!(state.step, AuthStep::CodeEntry(_)) {
                    tracing::warn!(%error, "Challenge issuance failed");
                    state.banner = Some(error);
                }
                smallvec![Effect::None]
            }

            // ═══════════════════════════════════════════════════════════
            // ResendRequested: re-issue on the active channel after cooldown
            // ═══════════════════════════════════════════════════════════
            PortalAction::ResendRequested => {
                let now = env.clock.now();
                let AuthStep::CodeEntry(entry) = &state.step else {
                    tracing::warn!("Resend requested outside code entry");
                    return smallvec![Effect::None];
                };
                let active_channel = entry.active_channel;

                if !state.can_resend(now) {
                    tracing::debug!("Resend requested during cooldown, ignoring");
                    return smallvec![Effect::None];
                }

                match active_channel {
                    Channel::Sms => issue_sms_guarded(state, &env.sms, now),
                    Channel::Email => issue_email_guarded(state, &env.email, now),
                }
            }

            // ═══════════════════════════════════════════════════════════
            // EmailFallbackRequested: switch delivery to the email channel
            // ═══════════════════════════════════════════════════════════
            PortalAction::EmailFallbackRequested => {
                let now = env.clock.now();
                let AuthStep::CodeEntry(entry) = &state.step else {
                    tracing::warn!("Email fallback requested outside code entry");
                    return smallvec![Effect::None];
                };
                if !entry.email_available {
                    tracing::warn!("Email fallback requested but no email is on file");
                    return smallvec![Effect::None];
                }
                issue_email_guarded(state, &env.email, now)
            }

            // ═══════════════════════════════════════════════════════════
            // CodeSubmitted: verify against the active channel
            // ═══════════════════════════════════════════════════════════
            PortalAction::CodeSubmitted { raw_code } => {
                let (active_channel, last_four, customer) = match &state.step {
                    AuthStep::CodeEntry(entry) => (
                        entry.active_channel,
                        entry.last_four.clone(),
                        entry.customer.clone(),
                    ),
                    _ => {
                        tracing::warn!("Code submitted outside code entry");
                        return smallvec![Effect::None];
                    }
                };

                let code = match OneTimeCode::parse(&raw_code) {
                    Ok(code) => code,
                    Err(error) => {
                        state.banner = Some(error);
                        return smallvec![Effect::None];
                    }
                };
                state.banner = None;

                match active_channel {
                    Channel::Sms => {
                        let sms = env.sms.clone();
                        let wholesaler_id = state.wholesaler_id;
                        smallvec![Effect::Future(Box::pin(async move {
                            match sms.verify_code(wholesaler_id, &last_four, &code).await {
                                Ok(customer) => Some(PortalAction::CodeAccepted { customer }),
                                Err(error) => Some(PortalAction::CodeRejected { error }),
                            }
                        }))]
                    }
                    Channel::Email => {
                        let Some(email) = customer.email.clone() else {
                            tracing::warn!("Email channel active without an email on file");
                            return smallvec![Effect::None];
                        };
                        let email_channel = env.email.clone();
                        smallvec![Effect::Future(Box::pin(async move {
                            match email_channel.verify_code(customer.id, &email, &code).await {
                                Ok(()) => Some(PortalAction::CodeAccepted { customer }),
                                Err(error) => Some(PortalAction::CodeRejected { error }),
                            }
                        }))]
                    }
                }
            }

            // ═══════════════════════════════════════════════════════════
            // CodeAccepted: the verifier established a session
            // ═══════════════════════════════════════════════════════════
            PortalAction::CodeAccepted { customer } => {
                // No step guard here. The verifier has already created the
                // session, so the client must reflect it even if local
                // state drifted.
                tracing::info!(customer_id = %customer.id, "Code accepted, customer authenticated");
                state.issuance_in_flight = false;
                state.banner = None;
                state.step = AuthStep::Authenticated {
                    session: AuthSession {
                        customer,
                        wholesaler_id: state.wholesaler_id,
                        authenticated_at: env.clock.now(),
                    },
                };
                smallvec![Effect::None]
            }

            // ═══════════════════════════════════════════════════════════
            // CodeRejected: stay in code entry with a banner
            // ═══════════════════════════════════════════════════════════
            PortalAction::CodeRejected { error } => {
                if matches!(state.step, AuthStep::CodeEntry(_)) {
                    tracing::warn!(%error, "Code rejected");
                    state.banner = Some(error);
                }
                smallvec![Effect::None]
            }

            // ═══════════════════════════════════════════════════════════
            // CountdownTicked: recompute remaining seconds, maybe re-arm
            // ═══════════════════════════════════════════════════════════
            PortalAction::CountdownTicked { generation } => {
                if generation != state.countdown_generation {
                    // A leftover tick from a chain a later arm replaced.
                    return smallvec![Effect::None];
                }
                let now = env.clock.now();
                let AuthStep::CodeEntry(entry) = &mut state.step else {
                    // The chain dies quietly once the customer has moved on.
                    return smallvec![Effect::None];
                };
                let Some(expires_at) = entry.expires_at else {
                    entry.countdown_armed = false;
                    return smallvec![Effect::None];
                };

                let remaining = (expires_at - now).num_seconds().max(0);
                entry.remaining_seconds = remaining;

                if remaining == 0 {
                    entry.countdown_armed = false;
                    return smallvec![Effect::None];
                }
                smallvec![Effect::Delay {
                    duration: std::time::Duration::from_secs(1),
                    action: Box::new(PortalAction::CountdownTicked { generation }),
                }]
            }

            _ => smallvec![Effect::None],
        }
    }
}
