//! Mock registration service for testing.

use crate::error::{AuthFlowError, Result};
use crate::providers::{RegistrationReceipt, RegistrationService};
use crate::state::RegistrationRequest;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Mock registration service.
///
/// Records every submitted request so tests can assert on what reached
/// the wholesaler.
#[derive(Debug, Clone)]
pub struct MockRegistrationService {
    submissions: Arc<Mutex<Vec<RegistrationRequest>>>,
    fail_transport: Arc<AtomicBool>,
}

impl MockRegistrationService {
    /// Create a new mock registration service.
    #[must_use]
    pub fn new() -> Self {
        Self {
            submissions: Arc::new(Mutex::new(Vec::new())),
            fail_transport: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The requests submitted so far.
    ///
    /// # Errors
    ///
    /// Returns error if the internal lock is poisoned.
    pub fn submissions(&self) -> Result<Vec<RegistrationRequest>> {
        Ok(self
            .submissions
            .lock()
            .map_err(|_| AuthFlowError::Transport("Mock lock poisoned".to_string()))?
            .clone())
    }

    /// Make subsequent submissions fail with a transport error.
    pub fn set_transport_failure(&self, failing: bool) {
        self.fail_transport.store(failing, Ordering::SeqCst);
    }
}

impl Default for MockRegistrationService {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistrationService for MockRegistrationService {
    fn submit(
        &self,
        request: &RegistrationRequest,
    ) -> impl Future<Output = Result<RegistrationReceipt>> + Send {
        let submissions = Arc::clone(&self.submissions);
        let fail_transport = Arc::clone(&self.fail_transport);
        let request = request.clone();

        async move {
            if fail_transport.load(Ordering::SeqCst) {
                return Err(AuthFlowError::Transport(
                    "Mock transport failure".to_string(),
                ));
            }

            submissions
                .lock()
                .map_err(|_| AuthFlowError::Transport("Mock lock poisoned".to_string()))?
                .push(request);

            Ok(RegistrationReceipt {
                message: "Request received. The wholesaler will be in touch.".to_string(),
            })
        }
    }
}
