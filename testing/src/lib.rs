//! # Wholesale Portal Testing
//!
//! Testing utilities and helpers for the wholesale portal architecture.
//!
//! This crate provides:
//! - Deterministic clocks for time-dependent reducer tests
//! - A fluent Given-When-Then harness for reducers
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use wholesale_portal_testing::test_clock;
//! use wholesale_portal_runtime::Store;
//!
//! #[tokio::test]
//! async fn test_login_flow() {
//!     let env = test_environment();
//!     let store = Store::new(
//!         PortalAuthState::new(wholesaler_id),
//!         PortalAuthReducer,
//!         env,
//!     );
//!
//!     store.send(PortalAction::PhoneSubmitted {
//!         raw_digits: "4821".to_string(),
//!     }).await?;
//!
//!     let step = store.state(|s| s.step.clone()).await;
//!     assert!(matches!(step, AuthStep::Verifying { .. }));
//! }
//! ```

use chrono::{DateTime, Duration, Utc};
use wholesale_portal_core::environment::Clock;

pub mod reducer_test;

/// Mock implementations of Environment traits
///
/// Mock implementations for testing.
pub mod mocks {
    #![allow(clippy::missing_panics_doc)] // Test utilities document panics where critical

    use super::{Clock, DateTime, Duration, Utc};
    use std::sync::{Arc, Mutex};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use wholesale_portal_testing::mocks::FixedClock;
    /// use wholesale_portal_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Adjustable clock for testing cooldowns and expiry windows
    ///
    /// Starts at a given time and can be advanced manually, so tests can
    /// step past resend cooldowns or code expiry without sleeping. Clones
    /// share the same underlying time, letting one handle live inside an
    /// environment while the test keeps another to drive it.
    ///
    /// # Example
    ///
    /// ```
    /// use wholesale_portal_testing::mocks::MockClock;
    /// use wholesale_portal_core::environment::Clock;
    /// use chrono::{Duration, Utc};
    ///
    /// let clock = MockClock::new(Utc::now());
    /// let start = clock.now();
    ///
    /// clock.advance(Duration::seconds(61));
    /// assert_eq!(clock.now() - start, Duration::seconds(61));
    /// ```
    #[derive(Debug, Clone)]
    pub struct MockClock {
        now: Arc<Mutex<DateTime<Utc>>>,
    }

    #[allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
    impl MockClock {
        /// Create a new adjustable clock starting at the given time
        #[must_use]
        pub fn new(start: DateTime<Utc>) -> Self {
            Self {
                now: Arc::new(Mutex::new(start)),
            }
        }

        /// Advance the clock by the given duration
        pub fn advance(&self, delta: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += delta;
        }

        /// Set the clock to an absolute time
        pub fn set(&self, time: DateTime<Utc>) {
            let mut now = self.now.lock().unwrap();
            *now = time;
        }
    }

    impl Clock for MockClock {
        #[allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Create a default adjustable clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn mock_clock() -> MockClock {
        MockClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

// Re-export commonly used items
pub use mocks::{mock_clock, test_clock, FixedClock, MockClock};
pub use reducer_test::ReducerTest;
