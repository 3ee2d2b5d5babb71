//! Mock SMS challenge channel for testing.

use crate::constants::challenge;
use crate::error::{AuthFlowError, Result};
use crate::input::{LastFour, OneTimeCode};
use crate::mocks::{generate_code, IssuedCode, MockCustomerDirectory};
use crate::providers::{ChallengeReceipt, SmsChannel};
use crate::state::{Channel, CustomerRecord, WholesalerId};
use chrono::Duration;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use wholesale_portal_core::environment::{Clock, SystemClock};

/// Mock SMS channel.
///
/// Issues real six-digit codes and verifies them with the same rules the
/// verifier applies: expiry comes from the injected clock, a wrong code
/// leaves the challenge standing, and a correct one consumes it.
#[derive(Clone)]
pub struct MockSmsChannel {
    directory: MockCustomerDirectory,
    codes: Arc<Mutex<HashMap<(WholesalerId, String), IssuedCode>>>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    issue_calls: Arc<AtomicUsize>,
    fail_delivery: Arc<AtomicBool>,
}

impl MockSmsChannel {
    /// Create a mock channel reading time from `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            directory: MockCustomerDirectory::new(),
            codes: Arc::new(Mutex::new(HashMap::new())),
            clock,
            ttl: Duration::seconds(challenge::SMS_CODE_TTL_SECS),
            issue_calls: Arc::new(AtomicUsize::new(0)),
            fail_delivery: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share a customer directory so verification returns the same
    /// records the phone match did.
    #[must_use]
    pub fn with_directory(mut self, directory: &MockCustomerDirectory) -> Self {
        self.directory = directory.clone();
        self
    }

    /// Override the code lifetime.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Number of issue calls made so far.
    #[must_use]
    pub fn issue_calls(&self) -> usize {
        self.issue_calls.load(Ordering::SeqCst)
    }

    /// Make subsequent issue calls fail with a delivery error.
    pub fn set_delivery_failure(&self, failing: bool) {
        self.fail_delivery.store(failing, Ordering::SeqCst);
    }

    /// Read the outstanding code for a fragment, the way a customer
    /// would read it off their phone.
    ///
    /// # Errors
    ///
    /// Returns error if the internal lock is poisoned.
    pub fn issued_code(
        &self,
        wholesaler_id: WholesalerId,
        last_four: &LastFour,
    ) -> Result<Option<String>> {
        Ok(self
            .codes
            .lock()
            .map_err(|_| AuthFlowError::Transport("Mock lock poisoned".to_string()))?
            .get(&(wholesaler_id, last_four.as_str().to_string()))
            .map(|issued| issued.code.clone()))
    }
}

impl Default for MockSmsChannel {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl SmsChannel for MockSmsChannel {
    fn request_code(
        &self,
        wholesaler_id: WholesalerId,
        last_four: &LastFour,
    ) -> impl Future<Output = Result<ChallengeReceipt>> + Send {
        let channel = self.clone();
        let last_four = last_four.clone();

        async move {
            channel.issue_calls.fetch_add(1, Ordering::SeqCst);

            if channel.fail_delivery.load(Ordering::SeqCst) {
                return Err(AuthFlowError::DeliveryFailed {
                    channel: Channel::Sms,
                });
            }

            // The verifier re-resolves the customer before sending.
            channel.directory.unique_match(wholesaler_id, &last_four)?;

            let expires_at = channel.clock.now() + channel.ttl;
            channel
                .codes
                .lock()
                .map_err(|_| AuthFlowError::Transport("Mock lock poisoned".to_string()))?
                .insert(
                    (wholesaler_id, last_four.as_str().to_string()),
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
        wholesaler_id: WholesalerId,
        last_four: &LastFour,
        code: &OneTimeCode,
    ) -> impl Future<Output = Result<CustomerRecord>> + Send {
        let channel = self.clone();
        let last_four = last_four.clone();
        let code = code.clone();

        async move {
            let key = (wholesaler_id, last_four.as_str().to_string());
            let mut codes = channel
                .codes
                .lock()
                .map_err(|_| AuthFlowError::Transport("Mock lock poisoned".to_string()))?;

            let Some(issued) = codes.get(&key) else {
                return Err(AuthFlowError::InvalidCode);
            };

            if channel.clock.now() >= issued.expires_at {
                return Err(AuthFlowError::ExpiredCode);
            }

            if !constant_time_eq::constant_time_eq(
                issued.code.as_bytes(),
                code.as_str().as_bytes(),
            ) {
                // A wrong code leaves the challenge standing.
                return Err(AuthFlowError::InvalidCode);
            }

            codes.remove(&key);
            drop(codes);

            channel.directory.unique_match(wholesaler_id, &last_four)
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::state::CustomerId;
    use wholesale_portal_testing::mock_clock;

    fn seeded() -> (MockSmsChannel, WholesalerId, LastFour) {
        let clock = mock_clock();
        let wholesaler_id = WholesalerId::new();
        let directory = MockCustomerDirectory::new();
        directory
            .add_customer(CustomerRecord {
                id: CustomerId::new(),
                name: "Jane".to_string(),
                phone: "0501234821".to_string(),
                email: None,
                wholesaler_id,
            })
            .unwrap();

        let channel = MockSmsChannel::new(Arc::new(clock)).with_directory(&directory);
        (channel, wholesaler_id, LastFour::parse("4821").unwrap())
    }

    #[tokio::test]
    async fn test_issue_and_verify_roundtrip() {
        let (channel, wholesaler_id, fragment) = seeded();

        let receipt = channel.request_code(wholesaler_id, &fragment).await.unwrap();
        assert_eq!(channel.issue_calls(), 1);

        let code = channel.issued_code(wholesaler_id, &fragment).unwrap().unwrap();
        assert_eq!(code.len(), 6);

        let parsed = OneTimeCode::parse(&code).unwrap();
        let customer = channel
            .verify_code(wholesaler_id, &fragment, &parsed)
            .await
            .unwrap();
        assert_eq!(customer.name, "Jane");

        // Success consumed the challenge.
        assert!(channel.issued_code(wholesaler_id, &fragment).unwrap().is_none());
        let _ = receipt;
    }

    #[tokio::test]
    async fn test_wrong_code_does_not_consume() {
        let (channel, wholesaler_id, fragment) = seeded();
        channel.request_code(wholesaler_id, &fragment).await.unwrap();

        let wrong = OneTimeCode::parse("000000").unwrap();
        assert_eq!(
            channel.verify_code(wholesaler_id, &fragment, &wrong).await,
            Err(AuthFlowError::InvalidCode)
        );

        // The real code still works afterwards.
        let code = channel.issued_code(wholesaler_id, &fragment).unwrap().unwrap();
        let parsed = OneTimeCode::parse(&code).unwrap();
        assert!(channel
            .verify_code(wholesaler_id, &fragment, &parsed)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_delivery_failure_toggle() {
        let (channel, wholesaler_id, fragment) = seeded();
        channel.set_delivery_failure(true);

        assert_eq!(
            channel.request_code(wholesaler_id, &fragment).await,
            Err(AuthFlowError::DeliveryFailed {
                channel: Channel::Sms
            })
        );
    }
}
