//! Mock customer directory for testing.

use crate::error::{AuthFlowError, Result};
use crate::input::LastFour;
use crate::providers::CustomerDirectory;
use crate::state::{CustomerRecord, WholesalerId};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Mock customer directory.
///
/// Matches phone fragments the same way the verifier does: scoped to the
/// wholesaler, against the last four digits of the stored phone number,
/// and succeeding only on a unique hit.
#[derive(Debug, Clone)]
pub struct MockCustomerDirectory {
    customers: Arc<Mutex<Vec<CustomerRecord>>>,
    match_calls: Arc<AtomicUsize>,
    fail_transport: Arc<AtomicBool>,
}

impl MockCustomerDirectory {
    /// Create an empty mock directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            customers: Arc::new(Mutex::new(Vec::new())),
            match_calls: Arc::new(AtomicUsize::new(0)),
            fail_transport: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Seed a customer record.
    ///
    /// # Errors
    ///
    /// Returns error if the internal lock is poisoned.
    pub fn add_customer(&self, customer: CustomerRecord) -> Result<()> {
        self.customers
            .lock()
            .map_err(|_| AuthFlowError::Transport("Mock lock poisoned".to_string()))?
            .push(customer);
        Ok(())
    }

    /// Number of match calls made so far.
    #[must_use]
    pub fn match_calls(&self) -> usize {
        self.match_calls.load(Ordering::SeqCst)
    }

    /// Make subsequent match calls fail with a transport error.
    pub fn set_transport_failure(&self, failing: bool) {
        self.fail_transport.store(failing, Ordering::SeqCst);
    }

    /// Find the unique customer for a fragment, the way the verifier
    /// would. Shared with the SMS channel mock so both sides agree on
    /// who matched.
    pub(crate) fn unique_match(
        &self,
        wholesaler_id: WholesalerId,
        last_four: &LastFour,
    ) -> Result<CustomerRecord> {
        let customers = self
            .customers
            .lock()
            .map_err(|_| AuthFlowError::Transport("Mock lock poisoned".to_string()))?;

        let mut hits = customers
            .iter()
            .filter(|c| c.wholesaler_id == wholesaler_id && c.phone.ends_with(last_four.as_str()));

        match (hits.next(), hits.next()) {
            (Some(customer), None) => Ok(customer.clone()),
            (Some(_), Some(_)) => Err(AuthFlowError::AmbiguousMatch),
            (None, _) => Err(AuthFlowError::CustomerNotFound),
        }
    }
}

impl Default for MockCustomerDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomerDirectory for MockCustomerDirectory {
    fn match_last_four(
        &self,
        wholesaler_id: WholesalerId,
        last_four: &LastFour,
    ) -> impl Future<Output = Result<CustomerRecord>> + Send {
        let directory = self.clone();
        let last_four = last_four.clone();

        async move {
            directory.match_calls.fetch_add(1, Ordering::SeqCst);

            if directory.fail_transport.load(Ordering::SeqCst) {
                return Err(AuthFlowError::Transport(
                    "Mock transport failure".to_string(),
                ));
            }

            directory.unique_match(wholesaler_id, &last_four)
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::state::CustomerId;

    fn customer(wholesaler_id: WholesalerId, phone: &str) -> CustomerRecord {
        CustomerRecord {
            id: CustomerId::new(),
            name: "Test".to_string(),
            phone: phone.to_string(),
            email: None,
            wholesaler_id,
        }
    }

    #[tokio::test]
    async fn test_unique_match() {
        let directory = MockCustomerDirectory::new();
        let wholesaler_id = WholesalerId::new();
        directory
            .add_customer(customer(wholesaler_id, "0501234821"))
            .unwrap();

        let fragment = LastFour::parse("4821").unwrap();
        let matched = directory
            .match_last_four(wholesaler_id, &fragment)
            .await
            .unwrap();
        assert_eq!(matched.phone, "0501234821");
        assert_eq!(directory.match_calls(), 1);
    }

    #[tokio::test]
    async fn test_no_match_and_ambiguous_match() {
        let directory = MockCustomerDirectory::new();
        let wholesaler_id = WholesalerId::new();
        directory
            .add_customer(customer(wholesaler_id, "0501234821"))
            .unwrap();
        directory
            .add_customer(customer(wholesaler_id, "0529994821"))
            .unwrap();

        let unknown = LastFour::parse("0000").unwrap();
        assert_eq!(
            directory.match_last_four(wholesaler_id, &unknown).await,
            Err(AuthFlowError::CustomerNotFound)
        );

        let shared = LastFour::parse("4821").unwrap();
        assert_eq!(
            directory.match_last_four(wholesaler_id, &shared).await,
            Err(AuthFlowError::AmbiguousMatch)
        );
    }

    #[tokio::test]
    async fn test_match_scoped_to_wholesaler() {
        let directory = MockCustomerDirectory::new();
        let ours = WholesalerId::new();
        let theirs = WholesalerId::new();
        directory.add_customer(customer(theirs, "0501234821")).unwrap();

        let fragment = LastFour::parse("4821").unwrap();
        assert_eq!(
            directory.match_last_four(ours, &fragment).await,
            Err(AuthFlowError::CustomerNotFound)
        );
    }
}
