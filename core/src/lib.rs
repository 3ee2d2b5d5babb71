//! # Wholesale Portal Core
//!
//! Core traits and types for the wholesale portal architecture.
//!
//! This crate provides the fundamental abstractions for building the portal's
//! customer-facing flows (authentication, session handling) as event-driven,
//! functional state machines using the Reducer pattern.
//!
//! ## Core Concepts
//!
//! - **State**: Domain state for a feature
//! - **Action**: All possible inputs to a reducer (user input, effect completions)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies via traits
//!
//! ## Architecture Principles
//!
//! - Functional Core, Imperative Shell
//! - Unidirectional Data Flow
//! - Explicit Effects (no hidden I/O)
//! - Dependency Injection via Environment
//!
//! ## Example
//!
//! ```ignore
//! use wholesale_portal_core::*;
//!
//! // Define your state
//! #[derive(Clone, Debug)]
//! struct LoginState {
//!     step: LoginStep,
//! }
//!
//! // Define your actions
//! #[derive(Clone, Debug)]
//! enum LoginAction {
//!     PhoneSubmitted { digits: String },
//!     MatchSucceeded { customer: CustomerRecord },
//! }
//!
//! // Implement the reducer
//! impl Reducer for LoginReducer {
//!     type State = LoginState;
//!     type Action = LoginAction;
//!     type Environment = LoginEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut LoginState,
//!         action: LoginAction,
//!         env: &LoginEnvironment,
//!     ) -> SmallVec<[Effect<LoginAction>; 4]> {
//!         // Business logic goes here
//!         smallvec![Effect::None]
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{smallvec, SmallVec};

pub use effect::Effect;
pub use reducer::Reducer;

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all business logic and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for LoginReducer {
    ///     type State = LoginState;
    ///     type Action = LoginAction;
    ///     type Environment = LoginEnvironment;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut LoginState,
    ///         action: LoginAction,
    ///         env: &LoginEnvironment,
    ///     ) -> SmallVec<[Effect<LoginAction>; 4]> {
    ///         match action {
    ///             LoginAction::PhoneSubmitted { digits } => {
    ///                 // Business logic here
    ///                 smallvec![Effect::None]
    ///             }
    ///             _ => smallvec![Effect::None],
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        ///
        /// # Arguments
        ///
        /// - `state`: Mutable reference to current state
        /// - `action`: The action to process
        /// - `env`: Reference to injected dependencies
        ///
        /// # Returns
        ///
        /// Effects to be executed by the runtime. Most actions produce zero or
        /// one effect, so the buffer is inline-allocated for small counts.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution) and are composable.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action>>),

        /// Run effects sequentially
        Sequential(Vec<Effect<Action>>),

        /// Delayed action (for countdowns, timeouts)
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter. Domain crates define their own provider
/// traits; only the time source is universal enough to live here.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// Production code injects [`SystemClock`]; tests inject a fixed or
    /// manually-advanced clock so expiry and cooldown rules can be verified
    /// deterministically.
    ///
    /// # Examples
    ///
    /// ```
    /// use wholesale_portal_core::environment::{Clock, SystemClock};
    /// use wholesale_portal_core::{DateTime, Utc};
    ///
    /// // Test - fixed time for deterministic tests
    /// struct FixedClock {
    ///     time: DateTime<Utc>,
    /// }
    ///
    /// impl Clock for FixedClock {
    ///     fn now(&self) -> DateTime<Utc> {
    ///         self.time
    ///     }
    /// }
    ///
    /// let clock = SystemClock;
    /// let before = clock.now();
    /// assert!(clock.now() >= before);
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the operating system.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effect::Effect;
    use super::environment::{Clock, SystemClock};
    use super::reducer::Reducer;
    use smallvec::{smallvec, SmallVec};
    use std::time::Duration;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct ToggleState {
        enabled: bool,
        flips: u32,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum ToggleAction {
        Flip,
        Confirmed,
    }

    struct ToggleReducer;

    impl Reducer for ToggleReducer {
        type State = ToggleState;
        type Action = ToggleAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                ToggleAction::Flip => {
                    state.enabled = !state.enabled;
                    state.flips += 1;
                    smallvec![Effect::Future(Box::pin(async {
                        Some(ToggleAction::Confirmed)
                    }))]
                },
                ToggleAction::Confirmed => smallvec![Effect::None],
            }
        }
    }

    #[test]
    fn reducer_mutates_state_and_returns_effects() {
        let reducer = ToggleReducer;
        let mut state = ToggleState::default();

        let effects = reducer.reduce(&mut state, ToggleAction::Flip, &());
        assert!(state.enabled);
        assert_eq!(state.flips, 1);
        assert_eq!(effects.len(), 1);
        assert!(matches!(effects[0], Effect::Future(_)));
    }

    #[test]
    fn future_effect_resolves_to_feedback_action() {
        let reducer = ToggleReducer;
        let mut state = ToggleState::default();

        let mut effects = reducer.reduce(&mut state, ToggleAction::Flip, &());
        let Some(Effect::Future(future)) = effects.pop() else {
            unreachable!("flip produces a future effect");
        };
        let produced = tokio_test::block_on(future);
        assert_eq!(produced, Some(ToggleAction::Confirmed));
    }

    #[test]
    fn merge_builds_parallel_effect() {
        let effect: Effect<ToggleAction> = Effect::merge(vec![Effect::None, Effect::None]);
        assert!(matches!(effect, Effect::Parallel(ref effects) if effects.len() == 2));
    }

    #[test]
    fn chain_builds_sequential_effect() {
        let effect: Effect<ToggleAction> = Effect::chain(vec![Effect::None, Effect::None]);
        assert!(matches!(effect, Effect::Sequential(ref effects) if effects.len() == 2));
    }

    #[test]
    fn delay_effect_debug_includes_duration_and_action() {
        let effect: Effect<ToggleAction> = Effect::Delay {
            duration: Duration::from_secs(1),
            action: Box::new(ToggleAction::Flip),
        };
        let rendered = format!("{effect:?}");
        assert!(rendered.contains("Effect::Delay"));
        assert!(rendered.contains("Flip"));
    }

    #[test]
    fn system_clock_is_nondecreasing() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
