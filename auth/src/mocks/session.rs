//! Mock session store for testing.

use crate::error::{AuthFlowError, Result};
use crate::providers::SessionStore;
use crate::state::{AuthSession, WholesalerId};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Mock session store.
///
/// Uses in-memory storage for testing. A seeded session stands in for a
/// live cookie from an earlier visit.
#[derive(Debug, Clone)]
pub struct MockSessionStore {
    sessions: Arc<Mutex<HashMap<WholesalerId, AuthSession>>>,
    check_calls: Arc<AtomicUsize>,
    fail_transport: Arc<AtomicBool>,
}

impl MockSessionStore {
    /// Create a new mock session store with no live sessions.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            check_calls: Arc::new(AtomicUsize::new(0)),
            fail_transport: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Seed a live session for a wholesaler's portal.
    ///
    /// # Errors
    ///
    /// Returns error if the internal lock is poisoned.
    pub fn seed_session(&self, session: AuthSession) -> Result<()> {
        self.sessions
            .lock()
            .map_err(|_| AuthFlowError::Transport("Mock lock poisoned".to_string()))?
            .insert(session.wholesaler_id, session);
        Ok(())
    }

    /// Number of session checks made so far.
    #[must_use]
    pub fn check_calls(&self) -> usize {
        self.check_calls.load(Ordering::SeqCst)
    }

    /// Make subsequent checks fail with a transport error.
    pub fn set_transport_failure(&self, failing: bool) {
        self.fail_transport.store(failing, Ordering::SeqCst);
    }
}

impl Default for MockSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for MockSessionStore {
    fn check_session(
        &self,
        wholesaler_id: WholesalerId,
    ) -> impl Future<Output = Result<Option<AuthSession>>> + Send {
        let sessions = Arc::clone(&self.sessions);
        let check_calls = Arc::clone(&self.check_calls);
        let fail_transport = Arc::clone(&self.fail_transport);

        async move {
            check_calls.fetch_add(1, Ordering::SeqCst);

            if fail_transport.load(Ordering::SeqCst) {
                return Err(AuthFlowError::Transport(
                    "Mock transport failure".to_string(),
                ));
            }

            Ok(sessions
                .lock()
                .map_err(|_| AuthFlowError::Transport("Mock lock poisoned".to_string()))?
                .get(&wholesaler_id)
                .cloned())
        }
    }
}
