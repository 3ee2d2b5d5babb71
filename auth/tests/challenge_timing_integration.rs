//! Timing tests for challenge expiry, cooldowns, and duplicate
//! suppression.
//!
//! The adjustable clock is shared between the environment and the mock
//! channels, so tests can step past expiry and cooldown boundaries
//! without sleeping.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use std::sync::Arc;
use wholesale_portal_auth::{
    actions::PortalAction,
    environment::PortalAuthEnvironment,
    error::AuthFlowError,
    input::{LastFour, OneTimeCode},
    mocks::{
        MockCustomerDirectory, MockEmailChannel, MockRegistrationService, MockSessionStore,
        MockSmsChannel, MockWholesalerDirectory,
    },
    providers::{CustomerDirectory, EmailChannel, SmsChannel},
    reducers::PortalAuthReducer,
    state::{AuthStep, CustomerId, CustomerRecord, PortalAuthState, WholesalerId},
};
use wholesale_portal_core::environment::Clock;
use wholesale_portal_core::reducer::Reducer;
use wholesale_portal_testing::reducer_test::assertions::{
    assert_has_future_effect, assert_no_effects,
};
use wholesale_portal_testing::{mock_clock, MockClock};

use chrono::Duration;

type TestEnv = PortalAuthEnvironment<
    MockWholesalerDirectory,
    MockCustomerDirectory,
    MockSessionStore,
    MockSmsChannel,
    MockEmailChannel,
    MockRegistrationService,
>;

type TestReducer = PortalAuthReducer<
    MockWholesalerDirectory,
    MockCustomerDirectory,
    MockSessionStore,
    MockSmsChannel,
    MockEmailChannel,
    MockRegistrationService,
>;

fn create_test_env(clock: &MockClock) -> TestEnv {
    let customers = MockCustomerDirectory::new();
    let sms = MockSmsChannel::new(Arc::new(clock.clone())).with_directory(&customers);
    let email = MockEmailChannel::new(Arc::new(clock.clone()));

    PortalAuthEnvironment::new(
        MockWholesalerDirectory::new(),
        customers,
        MockSessionStore::new(),
        sms,
        email,
        MockRegistrationService::new(),
        Arc::new(clock.clone()),
    )
}

fn seed_customer(env: &TestEnv, wholesaler_id: WholesalerId, email: Option<&str>) -> CustomerRecord {
    let customer = CustomerRecord {
        id: CustomerId::new(),
        name: "Jane Smith".to_string(),
        phone: "+15550104821".to_string(),
        email: email.map(str::to_string),
        wholesaler_id,
    };
    env.customers.add_customer(customer.clone()).unwrap();
    customer
}

/// Drive the reducer from phone entry into code entry with the SMS
/// receipt applied.
async fn reach_code_entry(
    reducer: &TestReducer,
    env: &TestEnv,
    state: &mut PortalAuthState,
    last_four: &LastFour,
) {
    let _effects = reducer.reduce(
        state,
        PortalAction::PhoneSubmitted {
            raw_digits: last_four.as_str().to_string(),
        },
        env,
    );
    let matched = env
        .customers
        .match_last_four(state.wholesaler_id, last_four)
        .await
        .unwrap();
    let _effects = reducer.reduce(
        state,
        PortalAction::PhoneMatchSucceeded { customer: matched },
        env,
    );
    let receipt = env
        .sms
        .request_code(state.wholesaler_id, last_four)
        .await
        .unwrap();
    let _effects = reducer.reduce(state, PortalAction::SmsIssued { receipt }, env);
}

#[tokio::test]
async fn test_sms_code_accepted_just_before_expiry() {
    let clock = mock_clock();
    let env = create_test_env(&clock);
    let wholesaler_id = WholesalerId::new();
    seed_customer(&env, wholesaler_id, None);
    let last_four = LastFour::parse("4821").unwrap();

    env.sms.request_code(wholesaler_id, &last_four).await.unwrap();
    let code = env
        .sms
        .issued_code(wholesaler_id, &last_four)
        .unwrap()
        .unwrap();

    clock.advance(Duration::seconds(299));
    let verified = env
        .sms
        .verify_code(wholesaler_id, &last_four, &OneTimeCode::parse(&code).unwrap())
        .await
        .unwrap();
    assert_eq!(verified.phone, "+15550104821");
}

#[tokio::test]
async fn test_sms_code_rejected_at_expiry_boundary() {
    let clock = mock_clock();
    let env = create_test_env(&clock);
    let wholesaler_id = WholesalerId::new();
    seed_customer(&env, wholesaler_id, None);
    let last_four = LastFour::parse("4821").unwrap();

    env.sms.request_code(wholesaler_id, &last_four).await.unwrap();
    let code = env
        .sms
        .issued_code(wholesaler_id, &last_four)
        .unwrap()
        .unwrap();

    // Exactly at the expiry instant the code is already dead
    clock.advance(Duration::seconds(300));
    let error = env
        .sms
        .verify_code(wholesaler_id, &last_four, &OneTimeCode::parse(&code).unwrap())
        .await
        .unwrap_err();
    assert_eq!(error, AuthFlowError::ExpiredCode);
}

#[tokio::test]
async fn test_email_code_lives_longer_than_sms() {
    let clock = mock_clock();
    let env = create_test_env(&clock);
    let customer_id = CustomerId::new();

    env.email
        .send_code(customer_id, "jane@acme.example")
        .await
        .unwrap();
    let code = env.email.issued_code(customer_id).unwrap().unwrap();

    // 10 minutes minus a second: still valid
    clock.advance(Duration::seconds(599));
    env.email
        .verify_code(
            customer_id,
            "jane@acme.example",
            &OneTimeCode::parse(&code).unwrap(),
        )
        .await
        .unwrap();

    // A fresh code dies exactly at the 10 minute mark
    env.email
        .send_code(customer_id, "jane@acme.example")
        .await
        .unwrap();
    let code = env.email.issued_code(customer_id).unwrap().unwrap();
    clock.advance(Duration::seconds(600));
    let error = env
        .email
        .verify_code(
            customer_id,
            "jane@acme.example",
            &OneTimeCode::parse(&code).unwrap(),
        )
        .await
        .unwrap_err();
    assert_eq!(error, AuthFlowError::ExpiredCode);
}

#[tokio::test]
async fn test_in_flight_issuance_blocks_the_email_fallback() {
    let clock = mock_clock();
    let env = create_test_env(&clock);
    let reducer = TestReducer::new();
    let wholesaler_id = WholesalerId::new();
    seed_customer(&env, wholesaler_id, Some("jane@acme.example"));
    let mut state = PortalAuthState::new(wholesaler_id);
    state.step = AuthStep::PhoneEntry;
    let last_four = LastFour::parse("4821").unwrap();

    // Match puts the SMS request in flight
    let _effects = reducer.reduce(
        &mut state,
        PortalAction::PhoneSubmitted {
            raw_digits: "4821".to_string(),
        },
        &env,
    );
    let matched = env
        .customers
        .match_last_four(wholesaler_id, &last_four)
        .await
        .unwrap();
    let _effects = reducer.reduce(
        &mut state,
        PortalAction::PhoneMatchSucceeded { customer: matched },
        &env,
    );
    assert!(state.issuance_in_flight);

    // Fallback while the SMS request is still in flight: suppressed
    let effects = reducer.reduce(&mut state, PortalAction::EmailFallbackRequested, &env);
    assert_no_effects(&effects);
    assert!(state.last_email_issued_at.is_none());

    // Once the receipt lands the fallback goes through
    let receipt = env
        .sms
        .request_code(wholesaler_id, &last_four)
        .await
        .unwrap();
    let _effects = reducer.reduce(&mut state, PortalAction::SmsIssued { receipt }, &env);
    assert!(!state.issuance_in_flight);

    let effects = reducer.reduce(&mut state, PortalAction::EmailFallbackRequested, &env);
    assert_has_future_effect(&effects);
    assert_eq!(state.last_email_issued_at, Some(env.clock.now()));
}

#[tokio::test]
async fn test_duplicate_window_suppresses_repeat_email_issuance() {
    let clock = mock_clock();
    let env = create_test_env(&clock);
    let reducer = TestReducer::new();
    let wholesaler_id = WholesalerId::new();
    let jane = seed_customer(&env, wholesaler_id, Some("jane@acme.example"));
    let mut state = PortalAuthState::new(wholesaler_id);
    state.step = AuthStep::PhoneEntry;
    let last_four = LastFour::parse("4821").unwrap();

    reach_code_entry(&reducer, &env, &mut state, &last_four).await;

    // First fallback issues
    let effects = reducer.reduce(&mut state, PortalAction::EmailFallbackRequested, &env);
    assert_has_future_effect(&effects);
    let receipt = env
        .email
        .send_code(jane.id, "jane@acme.example")
        .await
        .unwrap();
    let _effects = reducer.reduce(&mut state, PortalAction::EmailCodeIssued { receipt }, &env);

    // Ten seconds later the same request is swallowed by the
    // duplicate window
    clock.advance(Duration::seconds(10));
    let effects = reducer.reduce(&mut state, PortalAction::EmailFallbackRequested, &env);
    assert_no_effects(&effects);
    assert_eq!(env.email.send_calls(), 1);

    // Past the window it issues again
    clock.advance(Duration::seconds(21));
    let effects = reducer.reduce(&mut state, PortalAction::EmailFallbackRequested, &env);
    assert_has_future_effect(&effects);
    assert_eq!(state.last_email_issued_at, Some(env.clock.now()));
}

#[tokio::test]
async fn test_resend_cooldown_counts_from_the_most_recent_issuance() {
    let clock = mock_clock();
    let env = create_test_env(&clock);
    let reducer = TestReducer::new();
    let wholesaler_id = WholesalerId::new();
    let jane = seed_customer(&env, wholesaler_id, Some("jane@acme.example"));
    let mut state = PortalAuthState::new(wholesaler_id);
    state.step = AuthStep::PhoneEntry;
    let last_four = LastFour::parse("4821").unwrap();

    // SMS issued at t0
    reach_code_entry(&reducer, &env, &mut state, &last_four).await;

    // Email fallback at t0+5 restarts the shared cooldown
    clock.advance(Duration::seconds(5));
    let _effects = reducer.reduce(&mut state, PortalAction::EmailFallbackRequested, &env);
    let receipt = env
        .email
        .send_code(jane.id, "jane@acme.example")
        .await
        .unwrap();
    let _effects = reducer.reduce(&mut state, PortalAction::EmailCodeIssued { receipt }, &env);

    // t0+64: only 59 seconds since the email went out, resend refused
    clock.advance(Duration::seconds(59));
    let effects = reducer.reduce(&mut state, PortalAction::ResendRequested, &env);
    assert_no_effects(&effects);

    // t0+66: cooldown cleared, resend goes out on the active channel
    clock.advance(Duration::seconds(2));
    let effects = reducer.reduce(&mut state, PortalAction::ResendRequested, &env);
    assert_has_future_effect(&effects);
    assert_eq!(state.last_email_issued_at, Some(env.clock.now()));
}

#[tokio::test]
async fn test_expired_code_then_resend_then_success() {
    let clock = mock_clock();
    let env = create_test_env(&clock);
    let reducer = TestReducer::new();
    let wholesaler_id = WholesalerId::new();
    let jane = seed_customer(&env, wholesaler_id, None);
    let mut state = PortalAuthState::new(wholesaler_id);
    state.step = AuthStep::PhoneEntry;
    let last_four = LastFour::parse("4821").unwrap();

    reach_code_entry(&reducer, &env, &mut state, &last_four).await;
    let stale = env
        .sms
        .issued_code(wholesaler_id, &last_four)
        .unwrap()
        .unwrap();

    // The customer comes back after the code died
    clock.advance(Duration::seconds(301));
    let error = env
        .sms
        .verify_code(
            wholesaler_id,
            &last_four,
            &OneTimeCode::parse(&stale).unwrap(),
        )
        .await
        .unwrap_err();
    assert_eq!(error, AuthFlowError::ExpiredCode);
    let _effects = reducer.reduce(&mut state, PortalAction::CodeRejected { error }, &env);
    assert!(matches!(state.banner, Some(AuthFlowError::ExpiredCode)));

    // Resend is well past the cooldown, so a fresh code goes out
    let effects = reducer.reduce(&mut state, PortalAction::ResendRequested, &env);
    assert_has_future_effect(&effects);
    let receipt = env
        .sms
        .request_code(wholesaler_id, &last_four)
        .await
        .unwrap();
    let _effects = reducer.reduce(&mut state, PortalAction::SmsIssued { receipt }, &env);
    assert_eq!(env.sms.issue_calls(), 2);

    // The fresh code authenticates
    let fresh = env
        .sms
        .issued_code(wholesaler_id, &last_four)
        .unwrap()
        .unwrap();
    let verified = env
        .sms
        .verify_code(
            wholesaler_id,
            &last_four,
            &OneTimeCode::parse(&fresh).unwrap(),
        )
        .await
        .unwrap();
    let _effects = reducer.reduce(
        &mut state,
        PortalAction::CodeAccepted { customer: verified },
        &env,
    );

    let AuthStep::Authenticated { session } = &state.step else {
        panic!("expected authenticated, got {:?}", state.step);
    };
    assert_eq!(session.customer.id, jane.id);
}
