//! Seed script for QuickDesk.
//!
//! Populates an in-process store with the demo dataset and runs the
//! dashboard queries against it: default listing, free-text search,
//! most-replied sort, and the create-ticket scenario.
//! Run: cargo run --bin load_data

use std::time::Duration;

use quickdesk::models::{NewTicket, SortBy};
use quickdesk::query::{evaluate, DashboardQuery};
use quickdesk::seed;
use quickdesk::storage::Store;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    // Same simulated latency the server defaults to, so the script
    // exercises the async paths the handlers see.
    let store = Store::new(Duration::from_millis(300));
    seed::seed_demo(&store).await?;
    println!(
        "Seeded {} users, {} categories, {} tickets",
        store.list_users().await.len(),
        store.list_categories().await.len(),
        store.list_tickets().await.len()
    );

    // Default dashboard: recently modified first.
    let page = evaluate(store.ticket_views().await, &DashboardQuery::default(), None);
    println!("Dashboard ({} tickets):", page.total);
    for t in &page.tickets {
        println!(
            "  [{:?}] {} (score {}, {} replies)",
            t.status, t.subject, t.score, t.replies
        );
    }

    // Case-insensitive free-text search.
    let params = DashboardQuery {
        search: Some("safari".to_string()),
        ..Default::default()
    };
    let page = evaluate(store.ticket_views().await, &params, None);
    println!("Search 'safari': {} match(es)", page.total);

    // Most-replied sort.
    let params = DashboardQuery {
        sort_by: Some(SortBy::MostReplied),
        ..Default::default()
    };
    let page = evaluate(store.ticket_views().await, &params, None);
    println!("Most replied: {}", page.tickets[0].subject);

    // Create-ticket scenario: the new ticket tops the default dashboard.
    let user = store
        .find_user_by_email("user@example.com")
        .await
        .ok_or("seed user missing")?;
    let bug_report = store
        .list_categories()
        .await
        .into_iter()
        .find(|c| c.name == "Bug Report")
        .ok_or("seed category missing")?;
    store
        .add_ticket(NewTicket {
            subject: "Test".to_string(),
            description: "X".to_string(),
            category_id: bug_report.id,
            created_by: user.id,
        })
        .await;

    let page = evaluate(store.ticket_views().await, &DashboardQuery::default(), None);
    let top = &page.tickets[0];
    println!(
        "After create: '{}' on top with status {:?} and {} replies",
        top.subject, top.status, top.replies
    );

    Ok(())
}
