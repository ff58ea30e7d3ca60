use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account role. Gates handler actions: status changes need `Agent` or
/// `Admin`, user and category administration needs `Admin`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
    Admin,
}

/// Ticket lifecycle status. Wire labels match the dashboard vocabulary.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketStatus {
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
    Closed,
}

/// Dashboard sort key, always descending.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    RecentlyModified,
    MostReplied,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Ticket {
    pub id: Uuid,
    pub subject: String,
    pub description: String,
    pub category_id: Uuid,
    pub status: TicketStatus,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub upvotes: u32,
    pub downvotes: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Comment {
    pub id: Uuid,
    pub text: String,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new ticket; the store assigns id, timestamps, `Open`
/// status, and zeroed vote counters.
#[derive(Deserialize, Debug, Clone)]
pub struct NewTicket {
    pub subject: String,
    pub description: String,
    pub category_id: Uuid,
    pub created_by: Uuid,
}

/// Partial ticket update; `None` fields are left untouched. Any applied
/// patch refreshes `updated_at`, votes included.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct TicketPatch {
    pub subject: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub status: Option<TicketStatus>,
    pub upvotes: Option<u32>,
    pub downvotes: Option<u32>,
}

/// Partial user update.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub role: Option<Role>,
}

/// Read-time projection of a ticket: creator email, category name, reply
/// count, and score are resolved from the related collections on every
/// read, never cached on the record.
#[derive(Serialize, Debug, Clone)]
pub struct TicketView {
    pub id: Uuid,
    pub subject: String,
    pub description: String,
    pub category_id: Uuid,
    pub category: String,
    pub status: TicketStatus,
    pub created_by: Uuid,
    pub creator_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub upvotes: u32,
    pub downvotes: u32,
    pub score: i64,
    pub replies: usize,
}

/// Read-time projection of a comment with the author's email resolved.
#[derive(Serialize, Debug, Clone)]
pub struct CommentView {
    pub id: Uuid,
    pub text: String,
    pub author_id: Uuid,
    pub author_name: String,
    pub created_at: DateTime<Utc>,
}

/// JWT claims carried by every authenticated request.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthClaims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub exp: usize,
}
