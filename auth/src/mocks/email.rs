//! Mock email challenge channel for testing.

use crate::constants::challenge;
use crate::error::{AuthFlowError, Result};
use crate::input::OneTimeCode;
use crate::mocks::{generate_code, IssuedCode};
use crate::providers::{ChallengeReceipt, EmailChannel};
use crate::state::{Channel, CustomerId};
use chrono::Duration;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use wholesale_portal_core::environment::{Clock, SystemClock};

/// Mock email channel.
///
/// Mirrors [`crate::mocks::MockSmsChannel`] on the fallback channel:
/// real six-digit codes, clock-driven expiry, and wrong codes leaving
/// the challenge standing.
#[derive(Clone)]
pub struct MockEmailChannel {
    codes: Arc<Mutex<HashMap<CustomerId, IssuedCode>>>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    send_calls: Arc<AtomicUsize>,
    fail_delivery: Arc<AtomicBool>,
}

impl MockEmailChannel {
    /// Create a mock channel reading time from `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            codes: Arc::new(Mutex::new(HashMap::new())),
            clock,
            ttl: Duration::seconds(challenge::EMAIL_CODE_TTL_SECS),
            send_calls: Arc::new(AtomicUsize::new(0)),
            fail_delivery: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Override the code lifetime.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Number of send calls made so far.
    #[must_use]
    pub fn send_calls(&self) -> usize {
        self.send_calls.load(Ordering::SeqCst)
    }

    /// Make subsequent send calls fail with a delivery error.
    pub fn set_delivery_failure(&self, failing: bool) {
        self.fail_delivery.store(failing, Ordering::SeqCst);
    }

    /// Read the outstanding code for a customer, the way a customer
    /// would read it out of their inbox.
    ///
    /// # Errors
    ///
    /// Returns error if the internal lock is poisoned.
    pub fn issued_code(&self, customer_id: CustomerId) -> Result<Option<String>> {
        Ok(self
            .codes
            .lock()
            .map_err(|_| AuthFlowError::Transport("Mock lock poisoned".to_string()))?
            .get(&customer_id)
            .map(|issued| issued.code.clone()))
    }
}

impl Default for MockEmailChannel {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl EmailChannel for MockEmailChannel {
    fn send_code(
        &self,
        customer_id: CustomerId,
        _email: &str,
    ) -> impl Future<Output = Result<ChallengeReceipt>> + Send {
        let channel = self.clone();

        async move {
            channel.send_calls.fetch_add(1, Ordering::SeqCst);

            if channel.fail_delivery.load(Ordering::SeqCst) {
                return Err(AuthFlowError::DeliveryFailed {
                    channel: Channel::Email,
                });
            }

            let expires_at = channel.clock.now() + channel.ttl;
            channel
                .codes
                .lock()
                .map_err(|_| AuthFlowError::Transport("Mock lock poisoned".to_string()))?
                .insert(
                    customer_id,
                    IssuedCode {
                        code: generate_code(),
                        expires_at,
                    },
                );

            Ok(ChallengeReceipt { expires_at })
        }
    }

    fn verify_code(
        &self,
        customer_id: CustomerId,
        _email: &str,
        code: &OneTimeCode,
    ) -> impl Future<Output = Result<()>> + Send {
        let channel = self.clone();
        let code = code.clone();

        async move {
            let mut codes = channel
                .codes
                .lock()
                .map_err(|_| AuthFlowError::Transport("Mock lock poisoned".to_string()))?;

            let Some(issued) = codes.get(&customer_id) else {
                return Err(AuthFlowError::InvalidCode);
            };

            if channel.clock.now() >= issued.expires_at {
                return Err(AuthFlowError::ExpiredCode);
            }

            if !constant_time_eq::constant_time_eq(
                issued.code.as_bytes(),
                code.as_str().as_bytes(),
            ) {
                return Err(AuthFlowError::InvalidCode);
            }

            codes.remove(&customer_id);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use wholesale_portal_testing::mock_clock;

    #[tokio::test]
    async fn test_email_code_expires_on_clock() {
        let clock = mock_clock();
        let channel = MockEmailChannel::new(Arc::new(clock.clone()));
        let customer_id = CustomerId::new();

        channel
            .send_code(customer_id, "jane@example.com")
            .await
            .unwrap();
        assert_eq!(channel.send_calls(), 1);

        let code = channel.issued_code(customer_id).unwrap().unwrap();
        let parsed = OneTimeCode::parse(&code).unwrap();

        clock.advance(chrono::Duration::seconds(600));
        assert_eq!(
            channel
                .verify_code(customer_id, "jane@example.com", &parsed)
                .await,
            Err(AuthFlowError::ExpiredCode)
        );
    }

    #[tokio::test]
    async fn test_email_verify_consumes_on_success() {
        let clock = mock_clock();
        let channel = MockEmailChannel::new(Arc::new(clock));
        let customer_id = CustomerId::new();

        channel
            .send_code(customer_id, "jane@example.com")
            .await
            .unwrap();
        let code = channel.issued_code(customer_id).unwrap().unwrap();
        let parsed = OneTimeCode::parse(&code).unwrap();

        assert!(channel
            .verify_code(customer_id, "jane@example.com", &parsed)
            .await
            .is_ok());
        assert!(channel.issued_code(customer_id).unwrap().is_none());
    }
}
