//! Demo dataset: three accounts, four categories, two tickets with their
//! conversations. Seeded through the public store API so it exercises the
//! same paths the handlers use; shared by the server's seed flag, the
//! `load_data` binary, and the tests.

use crate::auth::hash_password;
use crate::models::{NewTicket, Role, TicketPatch, TicketStatus};
use crate::storage::{Store, StoreError};

/// Password shared by all demo accounts.
pub const DEMO_PASSWORD: &str = "password";

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Populate `store` with the demo dataset. Insertion order matters for
/// the recently-modified ordering: the dark-mode ticket's conversation is
/// touched last, so it tops the default dashboard.
pub async fn seed_demo(store: &Store) -> Result<(), SeedError> {
    let password_hash = hash_password(DEMO_PASSWORD)?;

    let admin = store
        .add_user("admin@example.com", &password_hash, Role::Admin)
        .await?;
    let agent = store
        .add_user("agent@example.com", &password_hash, Role::Agent)
        .await?;
    let user = store
        .add_user("user@example.com", &password_hash, Role::User)
        .await?;

    let bug_report = store.add_category("Bug Report").await;
    let feature_request = store.add_category("Feature Request").await;
    store.add_category("Technical Support").await;
    store.add_category("Billing Inquiry").await;

    let safari = store
        .add_ticket(NewTicket {
            subject: "Login button not working on Safari".to_string(),
            description: "When I try to click the login button on the Safari browser, \
                          nothing happens. I have tried clearing my cache and cookies, \
                          but the issue persists. This is blocking our team from \
                          accessing the platform."
                .to_string(),
            category_id: bug_report.id,
            created_by: user.id,
        })
        .await;
    store
        .update_ticket(
            safari.id,
            TicketPatch {
                upvotes: Some(10),
                downvotes: Some(1),
                ..Default::default()
            },
        )
        .await;

    let dark_mode = store
        .add_ticket(NewTicket {
            subject: "Feature Request: Dark Mode".to_string(),
            description: "The application is great, but a dark mode would be easier on \
                          the eyes, especially for those of us working late nights. \
                          Please consider adding a theme switcher."
                .to_string(),
            category_id: feature_request.id,
            created_by: agent.id,
        })
        .await;
    store
        .update_ticket(
            dark_mode.id,
            TicketPatch {
                status: Some(TicketStatus::InProgress),
                upvotes: Some(25),
                ..Default::default()
            },
        )
        .await;

    store
        .add_comment(
            safari.id,
            agent.id,
            "We are looking into this issue. Can you please provide your Safari version?",
        )
        .await;
    store
        .add_comment(safari.id, user.id, "Sure, I am using Safari version 15.1.")
        .await;
    store
        .add_comment(
            dark_mode.id,
            admin.id,
            "Thanks for the suggestion! We have added this to our product roadmap.",
        )
        .await;

    Ok(())
}
