//! Portal authentication state types.
//!
//! This module defines the state machine for the customer login flow.
//! All types are `Clone` to support the functional architecture pattern.

use crate::constants::{branding, issuance};
use crate::error::AuthFlowError;
use crate::input::LastFour;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════
// ID Types
// ═══════════════════════════════════════════════════════════════════════

/// Unique identifier for a wholesaler tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WholesalerId(pub uuid::Uuid);

impl WholesalerId {
    /// Generate a new random `WholesalerId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for WholesalerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for WholesalerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub uuid::Uuid);

impl CustomerId {
    /// Generate a new random `CustomerId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for CustomerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Domain Records
// ═══════════════════════════════════════════════════════════════════════

/// Delivery channel for one-time codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Text message to the customer's phone.
    Sms,
    /// Message to the customer's email address.
    Email,
}

impl Channel {
    /// Get the channel name as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sms => "sms",
            Self::Email => "email",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Public profile of the wholesaler whose portal is being visited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WholesalerProfile {
    /// Wholesaler identifier.
    pub id: WholesalerId,

    /// Business name shown in the portal header.
    pub business_name: String,

    /// Optional logo URL.
    pub logo_url: Option<String>,
}

/// A customer record as returned by the verifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    /// Customer identifier.
    pub id: CustomerId,

    /// Customer's display name.
    pub name: String,

    /// Full phone number on file.
    pub phone: String,

    /// Email address on file, if any. Gates the email fallback channel.
    pub email: Option<String>,

    /// The wholesaler this customer belongs to.
    pub wholesaler_id: WholesalerId,
}

/// An authenticated session, either restored from the session check or
/// established by a successful code verification.
///
/// The session credential itself is a server-side cookie. This record is
/// the client's view of who is signed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    /// The signed-in customer.
    pub customer: CustomerRecord,

    /// The wholesaler scope of the session.
    pub wholesaler_id: WholesalerId,

    /// When the session was established or restored.
    pub authenticated_at: DateTime<Utc>,
}

/// A registration request for a customer the verifier could not match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    /// The wholesaler the customer wants an account with.
    pub wholesaler_id: WholesalerId,

    /// Customer's name.
    pub name: String,

    /// Customer's full phone number.
    pub phone: String,

    /// Optional email address.
    pub email: Option<String>,

    /// Optional business name.
    pub business_name: Option<String>,

    /// Optional free-text message to the wholesaler.
    pub message: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════
// Flow State
// ═══════════════════════════════════════════════════════════════════════

/// Lifecycle of the wholesaler profile fetch.
///
/// The profile is fetched at most once per portal visit. Failures degrade
/// to [`ProfileState::Unavailable`] and never block the login flow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum ProfileState {
    /// No fetch has been started yet.
    #[default]
    NotRequested,
    /// A fetch is in flight.
    Loading,
    /// The profile arrived.
    Loaded(WholesalerProfile),
    /// The fetch failed or the wholesaler is unknown.
    Unavailable,
}

/// Live state of the code-entry screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeEntryState {
    /// The matched customer awaiting verification.
    pub customer: CustomerRecord,

    /// The phone fragment that produced the match.
    pub last_four: LastFour,

    /// Channel the current code went out on.
    pub active_channel: Channel,

    /// Whether the email fallback may be offered.
    pub email_available: bool,

    /// Expiry of the outstanding code. `None` until the first receipt
    /// arrives.
    pub expires_at: Option<DateTime<Utc>>,

    /// Seconds left on the countdown display. Purely informational; code
    /// acceptance is decided by the verifier, not by this value.
    pub remaining_seconds: i64,

    /// Whether a countdown tick chain is currently live. Prevents a
    /// resend from stacking a second chain on top of the first.
    pub countdown_armed: bool,
}

/// The step the login flow is currently on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum AuthStep {
    /// Portal opened, session check not yet resolved.
    #[default]
    Unauthenticated,

    /// Waiting for the customer to submit their phone digits.
    PhoneEntry,

    /// A phone fragment is being matched by the verifier.
    Verifying {
        /// The fragment under verification.
        last_four: LastFour,
    },

    /// A unique match was found; waiting for the one-time code.
    CodeEntry(CodeEntryState),

    /// The customer is signed in.
    Authenticated {
        /// The established session.
        session: AuthSession,
    },

    /// No match was found; the customer may request an account.
    RegistrationOffered {
        /// The fragment that failed to match.
        last_four: LastFour,
    },

    /// A registration request went through; waiting for acknowledgement.
    RegistrationSubmitted {
        /// Confirmation text returned by the registration service.
        message: String,
    },
}

/// Root state of the portal login flow.
///
/// # Examples
///
/// ```
/// # use wholesale_portal_auth::state::{AuthStep, PortalAuthState, WholesalerId};
/// let state = PortalAuthState::new(WholesalerId::new());
/// assert_eq!(state.step, AuthStep::Unauthenticated);
/// assert!(state.banner.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortalAuthState {
    /// The wholesaler tenant this portal visit belongs to.
    pub wholesaler_id: WholesalerId,

    /// Wholesaler profile fetch lifecycle.
    pub profile: ProfileState,

    /// Current step of the flow.
    pub step: AuthStep,

    /// Phone fragment carried in the portal link, if any.
    pub deep_link: Option<LastFour>,

    /// Whether the deep-link fragment has been auto-submitted. The
    /// attempt happens at most once per portal visit.
    pub deep_link_attempted: bool,

    /// Whether a code issuance request is currently in flight.
    pub issuance_in_flight: bool,

    /// When the last SMS code request was dispatched.
    pub last_sms_issued_at: Option<DateTime<Utc>>,

    /// When the last email code request was dispatched.
    pub last_email_issued_at: Option<DateTime<Utc>>,

    /// Generation of the live countdown tick chain. Each newly armed
    /// chain takes the next generation; a tick carrying any other one
    /// belongs to a superseded chain and is dropped.
    pub countdown_generation: u64,

    /// A fragment the verifier reported as ambiguous. Resubmitting it is
    /// blocked locally; the customer is told to contact the wholesaler.
    pub ambiguous_fragment: Option<LastFour>,

    /// Error currently surfaced to the customer, if any.
    pub banner: Option<AuthFlowError>,
}

impl PortalAuthState {
    /// Create the initial state for a portal visit.
    #[must_use]
    pub fn new(wholesaler_id: WholesalerId) -> Self {
        Self {
            wholesaler_id,
            profile: ProfileState::NotRequested,
            step: AuthStep::Unauthenticated,
            deep_link: None,
            deep_link_attempted: false,
            issuance_in_flight: false,
            last_sms_issued_at: None,
            last_email_issued_at: None,
            countdown_generation: 0,
            ambiguous_fragment: None,
            banner: None,
        }
    }

    /// Create the initial state for a portal visit that arrived through a
    /// link carrying a phone fragment.
    #[must_use]
    pub fn with_deep_link(wholesaler_id: WholesalerId, last_four: LastFour) -> Self {
        Self {
            deep_link: Some(last_four),
            ..Self::new(wholesaler_id)
        }
    }

    /// Whether a code may be issued on `channel` right now.
    ///
    /// Issuance is blocked while another issue request is in flight, and
    /// for a short window after the previous request on the same channel,
    /// which collapses duplicate triggers (deep link plus manual submit)
    /// into a single observable send.
    #[must_use]
    pub fn issuance_allowed(&self, channel: Channel, now: DateTime<Utc>) -> bool {
        if self.issuance_in_flight {
            return false;
        }

        match self.last_issued_at(channel) {
            Some(issued_at) => {
                now.signed_duration_since(issued_at)
                    >= Duration::seconds(issuance::DUPLICATE_SUPPRESS_SECS)
            }
            None => true,
        }
    }

    /// Whether the resend affordance should be enabled.
    ///
    /// Resend unlocks once the cooldown has elapsed since the most recent
    /// issuance on either channel. Hosts read this instead of deriving
    /// timing rules themselves.
    #[must_use]
    pub fn can_resend(&self, now: DateTime<Utc>) -> bool {
        let most_recent = match (self.last_sms_issued_at, self.last_email_issued_at) {
            (Some(sms), Some(email)) => Some(sms.max(email)),
            (sms, email) => sms.or(email),
        };

        match most_recent {
            Some(issued_at) => {
                now.signed_duration_since(issued_at)
                    >= Duration::seconds(issuance::RESEND_COOLDOWN_SECS)
            }
            None => true,
        }
    }

    /// Name shown in the portal header.
    ///
    /// Falls back to a neutral name while the profile is loading or when
    /// it could not be fetched.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match &self.profile {
            ProfileState::Loaded(profile) => &profile.business_name,
            _ => branding::FALLBACK_PORTAL_NAME,
        }
    }

    /// Up to two uppercase initials derived from the display name, for
    /// the avatar placeholder when no logo is available.
    #[must_use]
    pub fn initials(&self) -> String {
        self.display_name()
            .split_whitespace()
            .take(2)
            .filter_map(|word| word.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }

    fn last_issued_at(&self, channel: Channel) -> Option<DateTime<Utc>> {
        match channel {
            Channel::Sms => self.last_sms_issued_at,
            Channel::Email => self.last_email_issued_at,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_735_689_600 + secs, 0).unwrap()
    }

    #[test]
    fn test_wholesaler_id_generation() {
        let id1 = WholesalerId::new();
        let id2 = WholesalerId::new();

        // IDs should be unique
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_customer_id_generation() {
        let id1 = CustomerId::new();
        let id2 = CustomerId::new();

        assert_ne!(id1, id2);
    }

    #[test]
    fn test_channel_str() {
        assert_eq!(Channel::Sms.as_str(), "sms");
        assert_eq!(Channel::Email.as_str(), "email");
    }

    #[test]
    fn test_issuance_allowed_when_fresh() {
        let state = PortalAuthState::new(WholesalerId::new());

        assert!(state.issuance_allowed(Channel::Sms, at(0)));
        assert!(state.issuance_allowed(Channel::Email, at(0)));
    }

    #[test]
    fn test_issuance_blocked_while_in_flight() {
        let mut state = PortalAuthState::new(WholesalerId::new());
        state.issuance_in_flight = true;

        assert!(!state.issuance_allowed(Channel::Sms, at(0)));
        assert!(!state.issuance_allowed(Channel::Email, at(0)));
    }

    #[test]
    fn test_duplicate_window_is_per_channel() {
        let mut state = PortalAuthState::new(WholesalerId::new());
        state.last_sms_issued_at = Some(at(0));

        // Same channel is suppressed inside the window.
        assert!(!state.issuance_allowed(Channel::Sms, at(10)));
        // The other channel is unaffected.
        assert!(state.issuance_allowed(Channel::Email, at(10)));
        // The window closes.
        assert!(state.issuance_allowed(Channel::Sms, at(30)));
    }

    #[test]
    fn test_can_resend_cooldown() {
        let mut state = PortalAuthState::new(WholesalerId::new());
        assert!(state.can_resend(at(0)));

        state.last_sms_issued_at = Some(at(0));
        assert!(!state.can_resend(at(30)));
        assert!(!state.can_resend(at(59)));
        assert!(state.can_resend(at(60)));
    }

    #[test]
    fn test_can_resend_uses_most_recent_channel() {
        let mut state = PortalAuthState::new(WholesalerId::new());
        state.last_sms_issued_at = Some(at(0));
        state.last_email_issued_at = Some(at(40));

        // 60s after the SMS but only 30s after the email switch.
        assert!(!state.can_resend(at(70)));
        assert!(state.can_resend(at(100)));
    }

    #[test]
    fn test_display_name_degrades() {
        let mut state = PortalAuthState::new(WholesalerId::new());
        assert_eq!(state.display_name(), "Portal");
        assert_eq!(state.initials(), "P");

        state.profile = ProfileState::Unavailable;
        assert_eq!(state.display_name(), "Portal");

        state.profile = ProfileState::Loaded(WholesalerProfile {
            id: state.wholesaler_id,
            business_name: "Acme Wholesale Foods".to_string(),
            logo_url: None,
        });
        assert_eq!(state.display_name(), "Acme Wholesale Foods");
        assert_eq!(state.initials(), "AW");
    }

    #[test]
    fn test_initials_single_word() {
        let mut state = PortalAuthState::new(WholesalerId::new());
        state.profile = ProfileState::Loaded(WholesalerProfile {
            id: state.wholesaler_id,
            business_name: "delicatessen".to_string(),
            logo_url: None,
        });

        assert_eq!(state.initials(), "D");
    }
}
