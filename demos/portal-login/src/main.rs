//! Portal login demo binary
//!
//! Walks the full customer login flow against in-memory providers:
//! portal bootstrap with wholesaler branding, phone fragment match, SMS
//! code delivery, and code verification.

use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wholesale_portal_auth::{
    actions::PortalAction,
    environment::PortalAuthEnvironment,
    input::LastFour,
    mocks::{
        MockCustomerDirectory, MockEmailChannel, MockRegistrationService, MockSessionStore,
        MockSmsChannel, MockWholesalerDirectory,
    },
    reducers::PortalAuthReducer,
    state::{
        AuthStep, CustomerId, CustomerRecord, PortalAuthState, WholesalerId, WholesalerProfile,
    },
};
use wholesale_portal_core::environment::SystemClock;
use wholesale_portal_runtime::Store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portal_login=info,wholesale_portal_runtime=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Wholesale Portal: Customer Login Demo ===\n");

    // In-memory providers standing in for the marketplace backend
    let wholesaler_id = WholesalerId::new();
    let wholesalers = MockWholesalerDirectory::new();
    wholesalers.add_profile(WholesalerProfile {
        id: wholesaler_id,
        business_name: "Acme Wholesale Foods".to_string(),
        logo_url: None,
    })?;

    let customers = MockCustomerDirectory::new();
    customers.add_customer(CustomerRecord {
        id: CustomerId::new(),
        name: "Jane Smith".to_string(),
        phone: "+15550104821".to_string(),
        email: Some("jane@janescorner.example".to_string()),
        wholesaler_id,
    })?;

    let sms = MockSmsChannel::new(Arc::new(SystemClock)).with_directory(&customers);
    let env = PortalAuthEnvironment::new(
        wholesalers,
        customers,
        MockSessionStore::new(),
        sms.clone(),
        MockEmailChannel::new(Arc::new(SystemClock)),
        MockRegistrationService::new(),
        Arc::new(SystemClock),
    );

    tracing::info!(%wholesaler_id, "Seeded in-memory providers for the walkthrough");

    let store = Store::new(
        PortalAuthState::new(wholesaler_id),
        PortalAuthReducer::new(),
        env,
    );

    // Step 1: open the portal
    println!(">>> Opening the portal");
    let mut handle = store.send(PortalAction::PortalOpened).await?;
    handle.wait().await;

    let banner_name = store.state(|s| s.display_name().to_string()).await;
    println!("Welcome to {banner_name}\n");

    // Step 2: the customer types the last four digits of their phone
    println!(">>> Submitting phone digits: 4821");
    store
        .send_and_wait_for(
            PortalAction::PhoneSubmitted {
                raw_digits: "4821".to_string(),
            },
            |action| {
                matches!(
                    action,
                    PortalAction::SmsIssued { .. }
                        | PortalAction::SmsIssueFailed { .. }
                        | PortalAction::PhoneMatchFailed { .. }
                )
            },
            Duration::from_secs(2),
        )
        .await?;

    let customer_name = store
        .state(|s| match &s.step {
            AuthStep::CodeEntry(entry) => Some(entry.customer.name.clone()),
            _ => None,
        })
        .await;
    match customer_name {
        Some(name) => println!("Matched {name}, SMS code on its way\n"),
        None => anyhow::bail!("expected to reach code entry"),
    }

    // An immediate resend is swallowed by the cooldown
    println!(">>> Asking for a resend right away (refused by the cooldown)");
    let mut handle = store.send(PortalAction::ResendRequested).await?;
    handle.wait().await;
    println!("Codes sent so far: {}\n", sms.issue_calls());

    // Step 3: read the code off the phone and submit it
    let last_four = LastFour::parse("4821")?;
    let code = sms
        .issued_code(wholesaler_id, &last_four)?
        .ok_or_else(|| anyhow::anyhow!("no code issued"))?;
    println!(">>> Submitting the SMS code: {code}");

    let outcome = store
        .send_and_wait_for(
            PortalAction::CodeSubmitted { raw_code: code },
            |action| {
                matches!(
                    action,
                    PortalAction::CodeAccepted { .. } | PortalAction::CodeRejected { .. }
                )
            },
            Duration::from_secs(2),
        )
        .await?;

    match outcome {
        PortalAction::CodeAccepted { customer } => {
            tracing::info!(customer_id = %customer.id, "Verifier established a session");
            println!("Authenticated as {} ({})\n", customer.name, customer.phone);
        }
        other => anyhow::bail!("verification failed: {other:?}"),
    }

    store.shutdown(Duration::from_secs(3)).await?;
    println!("=== Demo complete ===");
    Ok(())
}
