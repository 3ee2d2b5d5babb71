//! Error types for the portal authentication flow.

use crate::state::Channel;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for portal authentication operations.
pub type Result<T> = std::result::Result<T, AuthFlowError>;

/// Error taxonomy for the customer login flow.
///
/// Every failure the flow can surface is a tagged variant, so reducers and
/// hosts branch on the variant rather than on display text. Display text
/// exists purely for banners.
#[derive(Debug, Error, Clone, PartialEq, Serialize, Deserialize)]
pub enum AuthFlowError {
    // ═══════════════════════════════════════════════════════════
    // Phone Match Errors
    // ═══════════════════════════════════════════════════════════
    /// No customer of this wholesaler matches the submitted digits.
    #[error("No customer matches those digits")]
    CustomerNotFound,

    /// More than one customer matches the submitted digits.
    #[error("Multiple customers match those digits, please contact the wholesaler")]
    AmbiguousMatch,

    // ═══════════════════════════════════════════════════════════
    // Challenge Errors
    // ═══════════════════════════════════════════════════════════
    /// The submitted one-time code does not match the issued one.
    #[error("Incorrect verification code")]
    InvalidCode,

    /// The one-time code was correct in form but its lifetime has passed.
    #[error("Verification code has expired")]
    ExpiredCode,

    /// The code could not be delivered over the given channel.
    #[error("Could not deliver a verification code via {channel}")]
    DeliveryFailed {
        /// Channel on which delivery was attempted.
        channel: Channel,
    },

    // ═══════════════════════════════════════════════════════════
    // Input and System Errors
    // ═══════════════════════════════════════════════════════════
    /// Client-side input rejected before any request was made.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The verifier could not be reached or returned garbage.
    #[error("Network error: {0}")]
    Transport(String),
}

impl AuthFlowError {
    /// Returns `true` if the same attempt may be retried at the current
    /// step without issuing a new code.
    ///
    /// # Examples
    ///
    /// ```
    /// # use wholesale_portal_auth::AuthFlowError;
    /// assert!(AuthFlowError::InvalidCode.is_retryable());
    /// assert!(!AuthFlowError::AmbiguousMatch.is_retryable());
    /// ```
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InvalidCode
                | Self::Validation(_)
                | Self::Transport(_)
                | Self::DeliveryFailed { .. }
        )
    }

    /// Returns `true` if the flow should offer the registration path.
    ///
    /// # Examples
    ///
    /// ```
    /// # use wholesale_portal_auth::AuthFlowError;
    /// assert!(AuthFlowError::CustomerNotFound.offers_registration());
    /// assert!(!AuthFlowError::InvalidCode.offers_registration());
    /// ```
    pub const fn offers_registration(&self) -> bool {
        matches!(self, Self::CustomerNotFound)
    }

    /// Returns `true` if recovery requires issuing a fresh code.
    ///
    /// # Examples
    ///
    /// ```
    /// # use wholesale_portal_auth::AuthFlowError;
    /// assert!(AuthFlowError::ExpiredCode.requires_reissue());
    /// assert!(!AuthFlowError::InvalidCode.requires_reissue());
    /// ```
    pub const fn requires_reissue(&self) -> bool {
        matches!(self, Self::ExpiredCode)
    }

    /// Returns `true` if the flow cannot proceed with the same input and
    /// the customer must go through the wholesaler instead.
    ///
    /// # Examples
    ///
    /// ```
    /// # use wholesale_portal_auth::AuthFlowError;
    /// assert!(AuthFlowError::AmbiguousMatch.is_terminal());
    /// assert!(!AuthFlowError::Transport("timeout".to_string()).is_terminal());
    /// ```
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::AmbiguousMatch)
    }
}
