//! REST API layer for QuickDesk using Axum.
//!
//! Public endpoints: /register, /login, /health. Everything else sits
//! behind a bearer-token middleware that validates the JWT and injects
//! the claims as an Extension. Role gates: ticket status changes need
//! agent or admin; user and category administration need admin.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::auth::{create_jwt, hash_password, validate_jwt, verify_password};
use crate::models::{
    AuthClaims, Category, Comment, CommentView, NewTicket, Role, Ticket, TicketPatch,
    TicketStatus, TicketView, User, UserPatch,
};
use crate::query::{self, DashboardPage, DashboardQuery};
use crate::storage::{Store, StoreError};

/// Shared app state for the handlers (Arc-wrapped for concurrency).
#[derive(Clone)]
pub struct AppState {
    store: Store,
    jwt_secret: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("missing or invalid bearer token")]
    Unauthorized,
    #[error("insufficient role for this action")]
    Forbidden,
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Store(StoreError::DuplicateEmail(_)) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: User,
}

#[derive(Deserialize)]
pub struct CreateTicketRequest {
    pub subject: String,
    pub description: String,
    pub category_id: Uuid,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: TicketStatus,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

#[derive(Deserialize)]
pub struct VoteRequest {
    pub direction: VoteDirection,
}

#[derive(Deserialize)]
pub struct AddCommentRequest {
    pub text: String,
}

#[derive(Deserialize)]
pub struct AddCategoryRequest {
    pub name: String,
}

#[derive(Deserialize)]
pub struct SetRoleRequest {
    pub role: Role,
}

/// Ticket detail: the view plus its conversation.
#[derive(Serialize)]
pub struct TicketDetailResponse {
    pub ticket: TicketView,
    pub comments: Vec<CommentView>,
}

async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthorized)?;
    let claims =
        validate_jwt(token, state.jwt_secret.as_bytes()).map_err(|_| ApiError::Unauthorized)?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Create the Axum router over a store handle.
pub fn create_router(store: Store, jwt_secret: String) -> Router {
    let state = Arc::new(AppState { store, jwt_secret });

    let protected = Router::new()
        .route("/tickets", get(list_tickets_handler).post(create_ticket_handler))
        .route(
            "/tickets/:ticket_id",
            get(get_ticket_handler).patch(update_status_handler),
        )
        .route("/tickets/:ticket_id/vote", post(vote_handler))
        .route(
            "/tickets/:ticket_id/comments",
            get(list_comments_handler).post(add_comment_handler),
        )
        .route("/categories", get(list_categories_handler).post(add_category_handler))
        .route("/users", get(list_users_handler))
        .route("/users/:user_id/role", patch(set_role_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/health", get(health_handler))
        .merge(protected)
        .with_state(state)
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "service": "quickdesk" }))
}

/// Registration creates a `user`-role account and logs it straight in.
async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Credentials>,
) -> Result<Json<SessionResponse>, ApiError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation("email and password are required".to_string()));
    }

    let password_hash =
        hash_password(&payload.password).map_err(|e| ApiError::Internal(e.to_string()))?;
    let user = state
        .store
        .add_user(payload.email.trim(), &password_hash, Role::User)
        .await?;
    let token = create_jwt(&user, state.jwt_secret.as_bytes())
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    tracing::info!(email = %user.email, "registered user");
    Ok(Json(SessionResponse { token, user }))
}

async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Credentials>,
) -> Result<Json<SessionResponse>, ApiError> {
    let user = state
        .store
        .find_user_by_email(payload.email.trim())
        .await
        .ok_or(ApiError::InvalidCredentials)?;
    if !verify_password(&payload.password, &user.password_hash).unwrap_or(false) {
        return Err(ApiError::InvalidCredentials);
    }

    let token = create_jwt(&user, state.jwt_secret.as_bytes())
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    tracing::info!(email = %user.email, "logged in");
    Ok(Json(SessionResponse { token, user }))
}

/// Dashboard listing: evaluates the filter/sort/page parameters over the
/// full ticket view list. The "mine" filter is scoped to the caller.
async fn list_tickets_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthClaims>,
    Query(params): Query<DashboardQuery>,
) -> Json<DashboardPage> {
    let views = state.store.ticket_views().await;
    Json(query::evaluate(views, &params, Some(claims.sub)))
}

async fn create_ticket_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthClaims>,
    Json(payload): Json<CreateTicketRequest>,
) -> Result<Json<TicketView>, ApiError> {
    if payload.subject.trim().is_empty() || payload.description.trim().is_empty() {
        return Err(ApiError::Validation("subject and description are required".to_string()));
    }
    state
        .store
        .get_category(payload.category_id)
        .await
        .ok_or(ApiError::NotFound("category"))?;

    let ticket = state
        .store
        .add_ticket(NewTicket {
            subject: payload.subject.trim().to_string(),
            description: payload.description.trim().to_string(),
            category_id: payload.category_id,
            created_by: claims.sub,
        })
        .await;
    tracing::info!(ticket_id = %ticket.id, "created ticket");

    state
        .store
        .ticket_view(ticket.id)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound("ticket"))
}

/// Detail fetch: ticket view and conversation, requested concurrently the
/// way the dashboard detail page loads them.
async fn get_ticket_handler(
    State(state): State<Arc<AppState>>,
    Path(ticket_id): Path<Uuid>,
) -> Result<Json<TicketDetailResponse>, ApiError> {
    let (ticket, comments) = tokio::join!(
        state.store.ticket_view(ticket_id),
        state.store.comment_views(ticket_id)
    );
    let ticket = ticket.ok_or(ApiError::NotFound("ticket"))?;
    Ok(Json(TicketDetailResponse { ticket, comments }))
}

async fn update_status_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthClaims>,
    Path(ticket_id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Ticket>, ApiError> {
    if claims.role == Role::User {
        return Err(ApiError::Forbidden);
    }
    let patch = TicketPatch {
        status: Some(payload.status),
        ..Default::default()
    };
    state
        .store
        .update_ticket(ticket_id, patch)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound("ticket"))
}

/// Votes are read-modify-write with no per-user tracking: the same caller
/// may vote any number of times, and last-write-wins under concurrency.
async fn vote_handler(
    State(state): State<Arc<AppState>>,
    Path(ticket_id): Path<Uuid>,
    Json(payload): Json<VoteRequest>,
) -> Result<Json<Ticket>, ApiError> {
    let current = state
        .store
        .get_ticket(ticket_id)
        .await
        .ok_or(ApiError::NotFound("ticket"))?;
    let patch = match payload.direction {
        VoteDirection::Up => TicketPatch {
            upvotes: Some(current.upvotes + 1),
            ..Default::default()
        },
        VoteDirection::Down => TicketPatch {
            downvotes: Some(current.downvotes + 1),
            ..Default::default()
        },
    };
    state
        .store
        .update_ticket(ticket_id, patch)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound("ticket"))
}

async fn list_comments_handler(
    State(state): State<Arc<AppState>>,
    Path(ticket_id): Path<Uuid>,
) -> Json<Vec<CommentView>> {
    Json(state.store.comment_views(ticket_id).await)
}

async fn add_comment_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthClaims>,
    Path(ticket_id): Path<Uuid>,
    Json(payload): Json<AddCommentRequest>,
) -> Result<Json<Comment>, ApiError> {
    if payload.text.trim().is_empty() {
        return Err(ApiError::Validation("comment text is required".to_string()));
    }
    let comment = state
        .store
        .add_comment(ticket_id, claims.sub, payload.text.trim())
        .await;
    Ok(Json(comment))
}

async fn list_categories_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Category>> {
    Json(state.store.list_categories().await)
}

async fn add_category_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthClaims>,
    Json(payload): Json<AddCategoryRequest>,
) -> Result<Json<Category>, ApiError> {
    if claims.role != Role::Admin {
        return Err(ApiError::Forbidden);
    }
    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("category name is required".to_string()));
    }
    Ok(Json(state.store.add_category(payload.name.trim()).await))
}

async fn list_users_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthClaims>,
) -> Result<Json<Vec<User>>, ApiError> {
    if claims.role != Role::Admin {
        return Err(ApiError::Forbidden);
    }
    Ok(Json(state.store.list_users().await))
}

async fn set_role_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthClaims>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<SetRoleRequest>,
) -> Result<Json<User>, ApiError> {
    if claims.role != Role::Admin {
        return Err(ApiError::Forbidden);
    }
    let patch = UserPatch {
        role: Some(payload.role),
        ..Default::default()
    };
    state
        .store
        .update_user(user_id, patch)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound("user"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use std::time::Duration;
    use tower::ServiceExt; // For .oneshot() testing

    const SECRET: &str = "test-secret";

    fn app(store: Store) -> Router {
        create_router(store, SECRET.to_string())
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
        let mut builder = Request::builder()
            .uri(uri)
            .method(method)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn register(app: &Router, email: &str) -> (String, Uuid) {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/register",
                None,
                json!({ "email": email, "password": "password" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        (
            body["token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_str().unwrap().parse().unwrap(),
        )
    }

    #[tokio::test]
    async fn health_is_public() {
        let response = app(Store::new(Duration::ZERO))
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn tickets_require_a_bearer_token() {
        let response = app(Store::new(Duration::ZERO))
            .oneshot(Request::builder().uri("/tickets").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn register_create_and_list_round_trip() {
        let store = Store::new(Duration::ZERO);
        let category = store.add_category("Bug Report").await;
        let app = app(store);

        let (token, _) = register(&app, "user@example.com").await;

        // Duplicate registration conflicts.
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/register",
                None,
                json!({ "email": "user@example.com", "password": "password" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        // Create a ticket and find it on top of the dashboard.
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/tickets",
                Some(&token),
                json!({ "subject": "Test", "description": "X", "category_id": category.id }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let created = body_json(response).await;
        assert_eq!(created["status"], "Open");
        assert_eq!(created["replies"], 0);
        assert_eq!(created["category"], "Bug Report");

        let response = app
            .clone()
            .oneshot(json_request("GET", "/tickets", Some(&token), json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let page = body_json(response).await;
        assert_eq!(page["total"], 1);
        assert_eq!(page["tickets"][0]["subject"], "Test");
        assert_eq!(page["tickets"][0]["creator_name"], "user@example.com");
    }

    #[tokio::test]
    async fn login_rejects_bad_password() {
        let store = Store::new(Duration::ZERO);
        let app = app(store);
        register(&app, "user@example.com").await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/login",
                None,
                json!({ "email": "user@example.com", "password": "nope" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(json_request(
                "POST",
                "/login",
                None,
                json!({ "email": "user@example.com", "password": "password" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn create_ticket_validates_fields_and_category() {
        let store = Store::new(Duration::ZERO);
        let category = store.add_category("Bug Report").await;
        let app = app(store);
        let (token, _) = register(&app, "user@example.com").await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/tickets",
                Some(&token),
                json!({ "subject": " ", "description": "X", "category_id": category.id }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(json_request(
                "POST",
                "/tickets",
                Some(&token),
                json!({ "subject": "S", "description": "X", "category_id": Uuid::new_v4() }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn status_change_is_gated_by_role() {
        let store = Store::new(Duration::ZERO);
        let category = store.add_category("Bug Report").await;
        // An agent account created out of band; registration only mints
        // user-role accounts.
        let hash = crate::auth::hash_password("password").unwrap();
        store.add_user("agent@example.com", &hash, Role::Agent).await.unwrap();
        let app = app(store);

        let (user_token, _) = register(&app, "user@example.com").await;
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/tickets",
                Some(&user_token),
                json!({ "subject": "Test", "description": "X", "category_id": category.id }),
            ))
            .await
            .unwrap();
        let ticket_id = body_json(response).await["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(json_request(
                "PATCH",
                &format!("/tickets/{ticket_id}"),
                Some(&user_token),
                json!({ "status": "Resolved" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/login",
                None,
                json!({ "email": "agent@example.com", "password": "password" }),
            ))
            .await
            .unwrap();
        let agent_token = body_json(response).await["token"].as_str().unwrap().to_string();

        let response = app
            .oneshot(json_request(
                "PATCH",
                &format!("/tickets/{ticket_id}"),
                Some(&agent_token),
                json!({ "status": "Resolved" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "Resolved");
    }

    #[tokio::test]
    async fn voting_and_commenting_update_the_view() {
        let store = Store::new(Duration::ZERO);
        let category = store.add_category("Bug Report").await;
        let app = app(store);
        let (token, _) = register(&app, "user@example.com").await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/tickets",
                Some(&token),
                json!({ "subject": "Test", "description": "X", "category_id": category.id }),
            ))
            .await
            .unwrap();
        let ticket_id = body_json(response).await["id"].as_str().unwrap().to_string();

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(json_request(
                    "POST",
                    &format!("/tickets/{ticket_id}/vote"),
                    Some(&token),
                    json!({ "direction": "up" }),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/tickets/{ticket_id}/vote"),
                Some(&token),
                json!({ "direction": "down" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/tickets/{ticket_id}/comments"),
                Some(&token),
                json!({ "text": "Me too." }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(json_request(
                "GET",
                &format!("/tickets/{ticket_id}"),
                Some(&token),
                json!({}),
            ))
            .await
            .unwrap();
        let detail = body_json(response).await;
        assert_eq!(detail["ticket"]["score"], 1);
        assert_eq!(detail["ticket"]["replies"], 1);
        assert_eq!(detail["comments"][0]["author_name"], "user@example.com");
    }

    #[tokio::test]
    async fn admin_routes_are_forbidden_for_users() {
        let store = Store::new(Duration::ZERO);
        let app = app(store);
        let (token, user_id) = register(&app, "user@example.com").await;

        let response = app
            .clone()
            .oneshot(json_request("GET", "/users", Some(&token), json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .oneshot(json_request(
                "PATCH",
                &format!("/users/{user_id}/role"),
                Some(&token),
                json!({ "role": "admin" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_manages_roles_and_categories() {
        let store = Store::new(Duration::ZERO);
        let hash = crate::auth::hash_password("password").unwrap();
        store.add_user("admin@example.com", &hash, Role::Admin).await.unwrap();
        let app = app(store);
        let (_, user_id) = register(&app, "user@example.com").await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/login",
                None,
                json!({ "email": "admin@example.com", "password": "password" }),
            ))
            .await
            .unwrap();
        let admin_token = body_json(response).await["token"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(json_request(
                "PATCH",
                &format!("/users/{user_id}/role"),
                Some(&admin_token),
                json!({ "role": "agent" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["role"], "agent");

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/categories",
                Some(&admin_token),
                json!({ "name": "Billing Inquiry" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(json_request("GET", "/users", Some(&admin_token), json!({})))
            .await
            .unwrap();
        let users = body_json(response).await;
        assert_eq!(users.as_array().unwrap().len(), 2);
        // Password hashes never leave the store.
        assert!(users[0].get("password_hash").is_none());
    }
}
