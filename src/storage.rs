//! In-memory record store for the help desk.
//!
//! One `Store` handle owns the four collections (users, tickets,
//! categories, comments-by-ticket). Every operation is async and sleeps
//! the configured simulated latency before touching the data; with a zero
//! latency the operations are effectively synchronous. Records live for
//! the process lifetime; nothing is ever deleted.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    Category, Comment, CommentView, NewTicket, Role, Ticket, TicketPatch, TicketStatus,
    TicketView, User, UserPatch,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("a user with email {0} already exists")]
    DuplicateEmail(String),
}

#[derive(Default)]
struct Collections {
    users: Vec<User>,
    tickets: Vec<Ticket>,
    categories: Vec<Category>,
    comments: HashMap<Uuid, Vec<Comment>>,
}

impl Collections {
    /// Resolve a ticket into its read view. Creator email, category name,
    /// reply count, and score come from the related collections on every
    /// call; the ticket record itself carries only foreign keys and the
    /// raw vote counters.
    fn view_of(&self, ticket: &Ticket) -> TicketView {
        let creator_name = self
            .users
            .iter()
            .find(|u| u.id == ticket.created_by)
            .map(|u| u.email.clone())
            .unwrap_or_else(|| "unknown".to_string());
        let category = self
            .categories
            .iter()
            .find(|c| c.id == ticket.category_id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "Unknown".to_string());
        let replies = self.comments.get(&ticket.id).map_or(0, Vec::len);

        TicketView {
            id: ticket.id,
            subject: ticket.subject.clone(),
            description: ticket.description.clone(),
            category_id: ticket.category_id,
            category,
            status: ticket.status,
            created_by: ticket.created_by,
            creator_name,
            created_at: ticket.created_at,
            updated_at: ticket.updated_at,
            upvotes: ticket.upvotes,
            downvotes: ticket.downvotes,
            score: i64::from(ticket.upvotes) - i64::from(ticket.downvotes),
            replies,
        }
    }
}

/// Handle to the in-memory store. Cheap to clone; all clones share the
/// same collections. Pass it by handle to every consumer rather than
/// holding it in a global.
#[derive(Clone)]
pub struct Store {
    inner: Arc<RwLock<Collections>>,
    latency: Duration,
}

impl Store {
    /// Create an empty store. `latency` is slept before every operation
    /// to simulate a remote backend; pass `Duration::ZERO` to disable.
    pub fn new(latency: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Collections::default())),
            latency,
        }
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    // --- Users ---

    pub async fn list_users(&self) -> Vec<User> {
        self.delay().await;
        self.inner.read().await.users.clone()
    }

    pub async fn get_user(&self, id: Uuid) -> Option<User> {
        self.delay().await;
        self.inner.read().await.users.iter().find(|u| u.id == id).cloned()
    }

    pub async fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.delay().await;
        self.inner
            .read()
            .await
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
    }

    /// Rejects duplicate emails; otherwise assigns a fresh id and
    /// creation timestamp.
    pub async fn add_user(
        &self,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User, StoreError> {
        self.delay().await;
        let mut data = self.inner.write().await;
        if data.users.iter().any(|u| u.email == email) {
            return Err(StoreError::DuplicateEmail(email.to_string()));
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role,
            created_at: Utc::now(),
        };
        data.users.push(user.clone());
        Ok(user)
    }

    /// Merge a patch into an existing user. A missing id resolves to
    /// `None` without touching the store.
    pub async fn update_user(&self, id: Uuid, patch: UserPatch) -> Option<User> {
        self.delay().await;
        let mut data = self.inner.write().await;
        let user = data.users.iter_mut().find(|u| u.id == id)?;
        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(role) = patch.role {
            user.role = role;
        }
        Some(user.clone())
    }

    // --- Tickets ---

    pub async fn list_tickets(&self) -> Vec<Ticket> {
        self.delay().await;
        self.inner.read().await.tickets.clone()
    }

    pub async fn get_ticket(&self, id: Uuid) -> Option<Ticket> {
        self.delay().await;
        self.inner
            .read()
            .await
            .tickets
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }

    /// New tickets open with zeroed vote counters and matching
    /// created/updated timestamps.
    pub async fn add_ticket(&self, new: NewTicket) -> Ticket {
        self.delay().await;
        let now = Utc::now();
        let ticket = Ticket {
            id: Uuid::new_v4(),
            subject: new.subject,
            description: new.description,
            category_id: new.category_id,
            status: TicketStatus::Open,
            created_by: new.created_by,
            created_at: now,
            updated_at: now,
            upvotes: 0,
            downvotes: 0,
        };
        self.inner.write().await.tickets.push(ticket.clone());
        ticket
    }

    /// Merge a patch into an existing ticket and refresh `updated_at`.
    /// A missing id resolves to `None` without touching the store.
    /// Last-write-wins: there is no version check.
    pub async fn update_ticket(&self, id: Uuid, patch: TicketPatch) -> Option<Ticket> {
        self.delay().await;
        let mut data = self.inner.write().await;
        let ticket = data.tickets.iter_mut().find(|t| t.id == id)?;
        if let Some(subject) = patch.subject {
            ticket.subject = subject;
        }
        if let Some(description) = patch.description {
            ticket.description = description;
        }
        if let Some(category_id) = patch.category_id {
            ticket.category_id = category_id;
        }
        if let Some(status) = patch.status {
            ticket.status = status;
        }
        if let Some(upvotes) = patch.upvotes {
            ticket.upvotes = upvotes;
        }
        if let Some(downvotes) = patch.downvotes {
            ticket.downvotes = downvotes;
        }
        ticket.updated_at = Utc::now();
        Some(ticket.clone())
    }

    pub async fn ticket_views(&self) -> Vec<TicketView> {
        self.delay().await;
        let data = self.inner.read().await;
        data.tickets.iter().map(|t| data.view_of(t)).collect()
    }

    pub async fn ticket_view(&self, id: Uuid) -> Option<TicketView> {
        self.delay().await;
        let data = self.inner.read().await;
        data.tickets
            .iter()
            .find(|t| t.id == id)
            .map(|t| data.view_of(t))
    }

    // --- Categories ---

    pub async fn list_categories(&self) -> Vec<Category> {
        self.delay().await;
        self.inner.read().await.categories.clone()
    }

    pub async fn get_category(&self, id: Uuid) -> Option<Category> {
        self.delay().await;
        self.inner
            .read()
            .await
            .categories
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    /// Name uniqueness is not enforced; duplicate categories are allowed.
    pub async fn add_category(&self, name: &str) -> Category {
        self.delay().await;
        let category = Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        self.inner.write().await.categories.push(category.clone());
        category
    }

    // --- Comments ---

    pub async fn comments_for(&self, ticket_id: Uuid) -> Vec<Comment> {
        self.delay().await;
        self.inner
            .read()
            .await
            .comments
            .get(&ticket_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn comment_views(&self, ticket_id: Uuid) -> Vec<CommentView> {
        self.delay().await;
        let data = self.inner.read().await;
        data.comments
            .get(&ticket_id)
            .map(|thread| {
                thread
                    .iter()
                    .map(|c| CommentView {
                        id: c.id,
                        text: c.text.clone(),
                        author_id: c.author_id,
                        author_name: data
                            .users
                            .iter()
                            .find(|u| u.id == c.author_id)
                            .map(|u| u.email.clone())
                            .unwrap_or_else(|| "unknown".to_string()),
                        created_at: c.created_at,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Append a comment to the ticket's thread. The ticket is not
    /// required to exist; when it does, its `updated_at` is refreshed.
    /// The reply count is derived from the thread length at read time,
    /// so this raises exactly that ticket's count by one.
    pub async fn add_comment(&self, ticket_id: Uuid, author_id: Uuid, text: &str) -> Comment {
        self.delay().await;
        let mut data = self.inner.write().await;
        let comment = Comment {
            id: Uuid::new_v4(),
            text: text.to_string(),
            author_id,
            created_at: Utc::now(),
        };
        data.comments.entry(ticket_id).or_default().push(comment.clone());
        if let Some(ticket) = data.tickets.iter_mut().find(|t| t.id == ticket_id) {
            ticket.updated_at = Utc::now();
        }
        comment
    }
}
