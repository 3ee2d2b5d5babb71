//! Portal authentication actions.
//!
//! This module defines all possible actions in the customer login flow.
//! Actions split into commands (customer or host intent) and events
//! (results of async operations fed back by the effect executor).

use crate::error::AuthFlowError;
use crate::providers::ChallengeReceipt;
use crate::state::{AuthSession, CustomerRecord, WholesalerProfile};
use serde::{Deserialize, Serialize};

/// Portal login action.
///
/// This enum represents all possible inputs to the portal auth reducer:
/// - **Commands**: customer requests (`PortalOpened`, `PhoneSubmitted`, ...)
/// - **Events**: results of async operations (`PhoneMatchSucceeded`,
///   `SmsIssued`, ...)
///
/// # Architecture Note
///
/// Actions are the **only** way to communicate with the login flow.
/// The reducer is a pure function: `(State, Action, Env) → (State, Effects)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PortalAction {
    // ═══════════════════════════════════════════════════════════════════════
    // Portal Bootstrap
    // ═══════════════════════════════════════════════════════════════════════
    /// The customer opened the portal page.
    ///
    /// # Flow
    ///
    /// 1. Reducer marks the profile fetch as started
    /// 2. Profile fetch and session check run in parallel
    /// 3. `SessionChecked` decides where the flow goes next
    ///
    /// Sending this again later in the visit is a no-op.
    PortalOpened,

    /// The wholesaler profile arrived.
    ProfileResolved {
        /// The fetched profile.
        profile: WholesalerProfile,
    },

    /// The wholesaler profile could not be fetched. The portal keeps
    /// working with placeholder branding.
    ProfileUnavailable,

    /// The session check resolved.
    ///
    /// # Flow
    ///
    /// - `Some(session)`: the customer is already signed in and the flow
    ///   short-circuits to `Authenticated` with no code issuance.
    /// - `None`: the flow moves to phone entry, auto-submitting a
    ///   deep-link fragment if one is present and untried.
    SessionChecked {
        /// The restored session, if one exists.
        session: Option<AuthSession>,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Phone Match
    // ═══════════════════════════════════════════════════════════════════════
    /// The customer submitted phone digits.
    ///
    /// # Flow
    ///
    /// 1. Raw text is parsed into a four-digit fragment
    /// 2. The flow moves to `Verifying` and asks the verifier for a match
    /// 3. `PhoneMatchSucceeded` or `PhoneMatchFailed` follows
    PhoneSubmitted {
        /// Raw field text as typed by the customer.
        raw_digits: String,
    },

    /// The verifier found exactly one matching customer.
    PhoneMatchSucceeded {
        /// The matched customer.
        customer: CustomerRecord,
    },

    /// The verifier rejected the fragment.
    PhoneMatchFailed {
        /// Why the match failed.
        error: AuthFlowError,
    },

    /// The customer navigated back to the phone entry form, abandoning
    /// the current challenge. No server-side invalidation happens.
    BackToPhoneEntry,

    // ═══════════════════════════════════════════════════════════════════════
    // Code Challenge
    // ═══════════════════════════════════════════════════════════════════════
    /// An SMS code went out.
    SmsIssued {
        /// Receipt describing the outstanding code.
        receipt: ChallengeReceipt,
    },

    /// The SMS code could not be issued.
    SmsIssueFailed {
        /// Why issuance failed.
        error: AuthFlowError,
    },

    /// The customer asked for the code to be sent again on the active
    /// channel. Ignored while the resend cooldown is running.
    ResendRequested,

    /// The customer asked for the code to go to their email instead.
    /// Only honored when the matched customer has an email on file.
    EmailFallbackRequested,

    /// An email code went out.
    EmailCodeIssued {
        /// Receipt describing the outstanding code.
        receipt: ChallengeReceipt,
    },

    /// The email code could not be issued.
    EmailIssueFailed {
        /// Why issuance failed.
        error: AuthFlowError,
    },

    /// The customer submitted a one-time code.
    ///
    /// # Flow
    ///
    /// 1. Raw text is parsed into a six-digit code
    /// 2. The code is verified on the active channel
    /// 3. `CodeAccepted` or `CodeRejected` follows
    CodeSubmitted {
        /// Raw field text as typed by the customer.
        raw_code: String,
    },

    /// The verifier accepted the code and established a session.
    CodeAccepted {
        /// The authenticated customer.
        customer: CustomerRecord,
    },

    /// The verifier rejected the code. A wrong code does not consume the
    /// outstanding challenge.
    CodeRejected {
        /// Why verification failed.
        error: AuthFlowError,
    },

    /// One second of the expiry countdown elapsed. Display only; the
    /// verifier remains the authority on whether a code is still valid.
    CountdownTicked {
        /// Generation of the tick chain this tick belongs to. Ticks
        /// from a superseded chain are dropped.
        generation: u64,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Registration
    // ═══════════════════════════════════════════════════════════════════════
    /// The customer filled in the registration form offered after a
    /// failed match.
    RegistrationSubmitted {
        /// Customer's name.
        name: String,
        /// Customer's full phone number.
        phone: String,
        /// Optional email address.
        email: Option<String>,
        /// Optional business name.
        business_name: Option<String>,
        /// Optional free-text message to the wholesaler.
        message: Option<String>,
    },

    /// The registration service accepted the request.
    RegistrationAccepted {
        /// Confirmation text to show the customer.
        message: String,
    },

    /// The registration request failed.
    RegistrationFailed {
        /// Why the request failed.
        error: AuthFlowError,
    },

    /// The customer dismissed the registration confirmation, returning
    /// to phone entry.
    RegistrationAcknowledged,
}
