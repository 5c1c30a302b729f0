//! Shared harness for the HTTP integration tests: an app wired to the in-memory
//! store, a scriptable media store, and request helpers.

#![allow(dead_code)]

use api_lib::adapters::jwt::{Claims, JwtTokenService};
use api_lib::config::{Config, MediaConfig};
use api_lib::web::{router, state::AppState};
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use neural_impulse_core::domain::{Avatar, ImageUpload, NewUser, StoredImage, User};
use neural_impulse_core::ports::{DatabaseService, MediaError, MediaResult, MediaStore, TokenService};
use neural_impulse_core::MemoryStore;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use tracing::Level;
use uuid::Uuid;

pub const TEST_SECRET: &str = "test-secret";

//=========================================================================================
// Media store double
//=========================================================================================

#[derive(Default)]
pub struct StubMedia {
    fail_uploads: AtomicBool,
    fail_deletes: AtomicBool,
    uploaded: Mutex<Vec<StoredImage>>,
    deleted: Mutex<Vec<String>>,
}

impl StubMedia {
    pub fn fail_uploads(&self) {
        self.fail_uploads.store(true, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub fn uploaded(&self) -> Vec<StoredImage> {
        self.uploaded.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaStore for StubMedia {
    async fn upload(&self, image: ImageUpload) -> MediaResult<StoredImage> {
        image.validate().map_err(MediaError::Rejected)?;
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(MediaError::Upstream("media store unavailable".into()));
        }
        let storage_id = format!("test/{}", Uuid::new_v4());
        let stored = StoredImage {
            url: format!("https://media.test/{storage_id}"),
            storage_id,
        };
        self.uploaded.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn delete(&self, storage_id: &str) -> MediaResult<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(MediaError::Upstream("media store unavailable".into()));
        }
        self.deleted.lock().unwrap().push(storage_id.to_string());
        Ok(())
    }
}

//=========================================================================================
// Test application
//=========================================================================================

pub struct TestApp {
    pub router: Router,
    pub db: Arc<MemoryStore>,
    pub media: Arc<StubMedia>,
    pub tokens: Arc<JwtTokenService>,
}

pub fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: "memory://".into(),
        log_level: Level::DEBUG,
        media: MediaConfig {
            base_url: "http://127.0.0.1:9".into(),
            cloud_name: "test".into(),
            api_key: "key".into(),
            api_secret: "secret".into(),
        },
        jwt_secret: TEST_SECRET.into(),
        public_base_url: "http://localhost:3000".into(),
    }
}

pub fn setup_test_app() -> TestApp {
    let db = Arc::new(MemoryStore::default());
    let media = Arc::new(StubMedia::default());
    let tokens = Arc::new(JwtTokenService::new(TEST_SECRET));
    let state = Arc::new(AppState::new(
        db.clone(),
        media.clone(),
        tokens.clone(),
        Arc::new(test_config()),
    ));
    TestApp {
        router: router(state).unwrap(),
        db,
        media,
        tokens,
    }
}

impl TestApp {
    /// Inserts a user directly into the store. The password hash is not a real one.
    pub async fn seed_user(&self, name: &str) -> User {
        self.db
            .create_user(NewUser {
                name: name.to_string(),
                email: format!("{}-{}@example.com", name.to_lowercase(), Uuid::new_v4()),
                password_hash: "not-a-real-hash".into(),
            })
            .await
            .unwrap()
    }

    pub async fn seed_user_with_avatar(&self, name: &str) -> User {
        let mut user = self.seed_user(name).await;
        user.avatar = Some(Avatar {
            url: "https://media.test/avatars/old".into(),
            storage_id: "avatars/old".into(),
        });
        self.db.save_user(&user).await.unwrap()
    }

    pub fn token_for(&self, user: &User) -> String {
        self.tokens.issue(user).unwrap()
    }

    /// A correctly signed token whose `_id` claim is not a user id.
    pub fn token_with_subject(&self, user: &User, subject: &str) -> String {
        let mut claims = Claims::for_user(user, Duration::hours(1));
        claims.id = subject.to_string();
        self.tokens.sign(&claims).unwrap()
    }

    pub fn expired_token_for(&self, user: &User) -> String {
        self.tokens
            .sign(&Claims::for_user(user, Duration::hours(-2)))
            .unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }
}

//=========================================================================================
// Request builders
//=========================================================================================

pub fn empty_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Builds `multipart/form-data` bodies.
pub struct MultipartBody {
    boundary: String,
    buffer: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self {
            boundary: format!("boundary-{}", Uuid::new_v4().simple()),
            buffer: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.buffer.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.buffer.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, name, file_name, content_type
            )
            .as_bytes(),
        );
        self.buffer.extend_from_slice(data);
        self.buffer.extend_from_slice(b"\r\n");
        self
    }

    pub fn into_request(mut self, method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
        self.buffer
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        let mut builder = Request::builder().method(method).uri(uri).header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", self.boundary),
        );
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(self.buffer)).unwrap()
    }
}

/// A tiny valid-looking PNG payload.
pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake-image-bytes";

pub fn blog_form() -> MultipartBody {
    MultipartBody::new()
        .text("title", "Thinking machines")
        .text("description", "A long look at minds")
        .text("excerpt", "Minds, briefly")
        .text("quote", "Can machines think?")
        .text("category", "AI and the brain")
}

/// Publishes a blog through the API and returns its JSON.
pub async fn create_blog(app: &TestApp, token: &str, with_photo: bool) -> Value {
    let mut form = blog_form();
    if with_photo {
        form = form.file("photo", "cover.png", "image/png", PNG);
    }
    let (status, body) = app
        .send(form.into_request(Method::POST, "/blog", Some(token)))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}
