//! Integration test support for Unishop.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p unishop-integration-tests
//! ```
//!
//! No external services are needed: [`StubBackend`] serves the backend REST
//! contract from an in-process `axum` server on an ephemeral port, and
//! [`TempDataDir`] gives each test its own file-store directory.
//!
//! # Test Categories
//!
//! - `backend_api` - API client and account service against the stub
//! - `persistence` - file-backed cart, session and checkout across restarts

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path as UrlPath, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use url::Url;

/// Token the stub issues on login and expects on protected routes.
pub const STUB_TOKEN: &str = "stub-access-token";

/// Password of the seeded account `andy@unishop.com`.
pub const ANDY_PASSWORD: &str = "s3cure-pass";

#[derive(Debug, Clone)]
struct Account {
    id: i32,
    username: String,
    password: String,
}

/// What the stub has seen, for assertions.
#[derive(Clone, Default)]
pub struct StubState {
    accounts: Arc<Mutex<HashMap<String, Account>>>,
    product_requests: Arc<AtomicUsize>,
    uploads: Arc<Mutex<Vec<(String, usize)>>>,
    deleted: Arc<Mutex<Vec<i32>>>,
    updates: Arc<Mutex<Vec<Value>>>,
}

impl StubState {
    /// Number of `GET /api/products` requests served.
    #[must_use]
    pub fn product_requests(&self) -> usize {
        self.product_requests.load(Ordering::SeqCst)
    }

    /// `(file name, size)` of every upload received.
    #[must_use]
    pub fn uploads(&self) -> Vec<(String, usize)> {
        self.uploads.lock().map(|u| u.clone()).unwrap_or_default()
    }

    /// IDs of deleted users.
    #[must_use]
    pub fn deleted(&self) -> Vec<i32> {
        self.deleted.lock().map(|d| d.clone()).unwrap_or_default()
    }

    /// JSON bodies received by `PUT /users/{id}`.
    #[must_use]
    pub fn updates(&self) -> Vec<Value> {
        self.updates.lock().map(|u| u.clone()).unwrap_or_default()
    }

    fn seeded() -> Self {
        let state = Self::default();
        if let Ok(mut accounts) = state.accounts.lock() {
            accounts.insert(
                "andy@unishop.com".to_string(),
                Account {
                    id: 1,
                    username: "andy".to_string(),
                    password: ANDY_PASSWORD.to_string(),
                },
            );
        }
        state
    }
}

/// In-process stand-in for the backend REST API.
pub struct StubBackend {
    base_url: Url,
    state: StubState,
    handle: JoinHandle<()>,
}

impl StubBackend {
    /// Start the stub on an ephemeral localhost port.
    ///
    /// # Errors
    ///
    /// Returns an error if no port can be bound.
    pub async fn start() -> std::io::Result<Self> {
        let state = StubState::seeded();

        let app = Router::new()
            .route("/auth/login", post(login))
            .route("/auth/register", post(register))
            .route("/auth/upload", post(upload))
            .route("/auth/forgot-password", post(forgot_password))
            .route("/users/{id}", put(update_user).delete(delete_user))
            .route("/api/products", get(products))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let base_url = Url::parse(&format!("http://{addr}"))
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        Ok(Self {
            base_url,
            state,
            handle,
        })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub const fn state(&self) -> &StubState {
        &self.state
    }
}

impl Drop for StubBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn error(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message })))
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        == Some(STUB_TOKEN)
}

fn field<'a>(body: &'a Value, name: &str) -> &'a str {
    body.get(name).and_then(Value::as_str).unwrap_or_default()
}

async fn login(State(state): State<StubState>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let email = field(&body, "email");
    let password = field(&body, "password");
    if email.is_empty() || password.is_empty() {
        return error(StatusCode::BAD_REQUEST, "Email and password are required");
    }

    let account = state
        .accounts
        .lock()
        .ok()
        .and_then(|accounts| accounts.get(email).cloned());
    match account {
        Some(account) if account.password == password => (
            StatusCode::OK,
            Json(json!({
                "message": "Login successful",
                "access_token": STUB_TOKEN,
                "refresh_token": "stub-refresh-token",
                "user": {
                    "id": account.id,
                    "username": account.username,
                    "email": email,
                    "role": "customer",
                },
            })),
        ),
        _ => error(StatusCode::UNAUTHORIZED, "Invalid email or password"),
    }
}

async fn register(
    State(state): State<StubState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let username = field(&body, "username");
    let email = field(&body, "email");
    let password = field(&body, "password");
    if username.is_empty() || email.is_empty() || password.is_empty() {
        return error(
            StatusCode::BAD_REQUEST,
            "Username, email, and password are required",
        );
    }

    let Ok(mut accounts) = state.accounts.lock() else {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "lock poisoned");
    };
    if accounts.contains_key(email) {
        return error(StatusCode::BAD_REQUEST, "User with this email already exists");
    }
    let id = i32::try_from(accounts.len()).unwrap_or(i32::MAX - 1) + 1;
    accounts.insert(
        email.to_string(),
        Account {
            id,
            username: username.to_string(),
            password: password.to_string(),
        },
    );
    drop(accounts);

    (
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully", "user_id": id })),
    )
}

async fn update_user(
    State(state): State<StubState>,
    UrlPath(id): UrlPath<i32>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "msg": "Missing Authorization Header" })),
        );
    }
    if id != 1 {
        return error(StatusCode::FORBIDDEN, "Unauthorized action");
    }
    if let Ok(mut updates) = state.updates.lock() {
        updates.push(body);
    }
    (
        StatusCode::OK,
        Json(json!({ "message": "User updated successfully" })),
    )
}

async fn delete_user(
    State(state): State<StubState>,
    UrlPath(id): UrlPath<i32>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Missing Authorization Header");
    }
    if let Ok(mut deleted) = state.deleted.lock() {
        deleted.push(id);
    }
    (
        StatusCode::OK,
        Json(json!({ "message": "User deleted successfully" })),
    )
}

async fn upload(
    State(state): State<StubState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Missing Authorization Header");
    }

    while let Ok(Some(part)) = multipart.next_field().await {
        if part.name() != Some("file") {
            continue;
        }
        let file_name = part.file_name().unwrap_or("upload").to_string();
        let Ok(bytes) = part.bytes().await else {
            return error(StatusCode::BAD_REQUEST, "Unreadable file");
        };
        if let Ok(mut uploads) = state.uploads.lock() {
            uploads.push((file_name.clone(), bytes.len()));
        }
        return (
            StatusCode::OK,
            Json(json!({ "url": format!("https://cdn.unishop.test/uploads/{file_name}") })),
        );
    }

    error(StatusCode::BAD_REQUEST, "No file part")
}

async fn forgot_password(
    State(state): State<StubState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let email = field(&body, "email");
    let known = state
        .accounts
        .lock()
        .map(|accounts| accounts.contains_key(email))
        .unwrap_or(false);
    if known {
        (
            StatusCode::OK,
            Json(json!({ "message": "Password reset email sent" })),
        )
    } else {
        error(StatusCode::NOT_FOUND, "User not found")
    }
}

async fn products(State(state): State<StubState>) -> Json<Value> {
    state.product_requests.fetch_add(1, Ordering::SeqCst);
    Json(json!([
        {
            "id": 1,
            "name": "15 Car Power Inverter",
            "description": "12V to 220V",
            "price": 1999.0,
            "stock": 12,
            "category": "Electronics",
            "image_url": "https://cdn.unishop.test/inverter.jpg",
            "created_at": "Sat, 01 Mar 2025 10:00:00 GMT"
        },
        {
            "id": 10,
            "name": "P47 Bluetooth Headphone",
            "description": "Wireless",
            "price": 499,
            "stock": 40,
            "category": "Audio",
            "image_url": null,
            "created_at": "Sat, 01 Mar 2025 10:00:00 GMT"
        }
    ]))
}

/// Unique scratch directory, removed on drop.
pub struct TempDataDir {
    path: PathBuf,
}

impl TempDataDir {
    #[must_use]
    pub fn new() -> Self {
        Self {
            path: std::env::temp_dir().join(format!("unishop-it-{}", uuid::Uuid::new_v4())),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for TempDataDir {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TempDataDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}
