//! Mock wholesaler directory for testing.

use crate::error::{AuthFlowError, Result};
use crate::providers::WholesalerDirectory;
use crate::state::{WholesalerId, WholesalerProfile};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Mock wholesaler directory.
///
/// Uses in-memory storage. Clones share the same profiles and counters.
#[derive(Debug, Clone)]
pub struct MockWholesalerDirectory {
    profiles: Arc<Mutex<HashMap<WholesalerId, WholesalerProfile>>>,
    resolve_calls: Arc<AtomicUsize>,
    fail_transport: Arc<AtomicBool>,
}

impl MockWholesalerDirectory {
    /// Create an empty mock directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            profiles: Arc::new(Mutex::new(HashMap::new())),
            resolve_calls: Arc::new(AtomicUsize::new(0)),
            fail_transport: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Seed a wholesaler profile.
    ///
    /// # Errors
    ///
    /// Returns error if the internal lock is poisoned.
    pub fn add_profile(&self, profile: WholesalerProfile) -> Result<()> {
        self.profiles
            .lock()
            .map_err(|_| AuthFlowError::Transport("Mock lock poisoned".to_string()))?
            .insert(profile.id, profile);
        Ok(())
    }

    /// Number of resolve calls made so far.
    #[must_use]
    pub fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }

    /// Make subsequent resolve calls fail with a transport error.
    pub fn set_transport_failure(&self, failing: bool) {
        self.fail_transport.store(failing, Ordering::SeqCst);
    }
}

impl Default for MockWholesalerDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl WholesalerDirectory for MockWholesalerDirectory {
    fn resolve(
        &self,
        wholesaler_id: WholesalerId,
    ) -> impl Future<Output = Result<Option<WholesalerProfile>>> + Send {
        let profiles = Arc::clone(&self.profiles);
        let resolve_calls = Arc::clone(&self.resolve_calls);
        let fail_transport = Arc::clone(&self.fail_transport);

        async move {
            resolve_calls.fetch_add(1, Ordering::SeqCst);

            if fail_transport.load(Ordering::SeqCst) {
                return Err(AuthFlowError::Transport(
                    "Mock transport failure".to_string(),
                ));
            }

            Ok(profiles
                .lock()
                .map_err(|_| AuthFlowError::Transport("Mock lock poisoned".to_string()))?
                .get(&wholesaler_id)
                .cloned())
        }
    }
}
