//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.
//!
//! Blogs are stored document-style: the liker set is a `UUID[]` column and the
//! comments are an embedded `JSONB` array that is rewritten as a whole.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use neural_impulse_core::domain::{
    Avatar, Blog, Category, Comment, Image, NewBlog, NewComment, NewUser, User, UserSummary,
};
use neural_impulse_core::ports::{DatabaseService, PortError, PortResult};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

//=========================================================================================
// The Shared Connection
//=========================================================================================

/// A lazily opened, process-wide connection pool.
///
/// The first `connect` opens the pool; every later call gets a clone of the cached
/// handle. Callers that arrive while the first connect is in flight wait for it
/// instead of opening their own. A failed connect is returned and not cached.
pub struct DocumentStore {
    url: String,
    max_connections: u32,
    pool: Mutex<Option<PgPool>>,
}

impl DocumentStore {
    pub fn new(url: impl Into<String>, max_connections: u32) -> Self {
        Self {
            url: url.into(),
            max_connections,
            pool: Mutex::new(None),
        }
    }

    pub async fn connect(&self) -> Result<PgPool, sqlx::Error> {
        let mut slot = self.pool.lock().await;
        if let Some(pool) = slot.as_ref() {
            return Ok(pool.clone());
        }

        info!("Connecting to database...");
        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .connect(&self.url)
            .await?;
        *slot = Some(pool.clone());
        Ok(pool)
    }

    pub async fn is_connected(&self) -> bool {
        self.pool.lock().await.is_some()
    }

    /// Closes the cached pool. The next `connect` opens a fresh one.
    pub async fn shutdown(&self) {
        let pool = self.pool.lock().await.take();
        if let Some(pool) = pool {
            pool.close().await;
            info!("Database connection closed.");
        }
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    store: Arc<DocumentStore>,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), crate::error::ApiError> {
        let pool = self.store.connect().await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(())
    }

    async fn pool(&self) -> PortResult<PgPool> {
        self.store.connect().await.map_err(unexpected)
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn conflict_or_unexpected(e: sqlx::Error) -> PortError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            PortError::Conflict("Email already registered".to_string())
        }
        _ => unexpected(e),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

const USER_COLUMNS: &str = "id, name, email, password_hash, designation, avatar_url, \
    avatar_storage_id, age, location, about, last_signup_at, created_at, updated_at";

const BLOG_COLUMNS: &str = "id, title, description, excerpt, quote, category, \
    image_storage_id, image_url, author_id, likes, comments, created_at, updated_at";

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    designation: String,
    avatar_url: Option<String>,
    avatar_storage_id: Option<String>,
    age: String,
    location: String,
    about: String,
    last_signup_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        let avatar = match (self.avatar_url, self.avatar_storage_id) {
            (Some(url), Some(storage_id)) => Some(Avatar { url, storage_id }),
            _ => None,
        };
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            designation: self.designation,
            avatar,
            age: self.age,
            location: self.location,
            about: self.about,
            last_signup_at: self.last_signup_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct UserSummaryRecord {
    id: Uuid,
    name: String,
    designation: String,
    avatar_url: Option<String>,
    avatar_storage_id: Option<String>,
}
impl UserSummaryRecord {
    fn to_domain(self) -> UserSummary {
        let avatar = match (self.avatar_url, self.avatar_storage_id) {
            (Some(url), Some(storage_id)) => Some(Avatar { url, storage_id }),
            _ => None,
        };
        UserSummary {
            id: self.id,
            name: self.name,
            avatar,
            designation: self.designation,
        }
    }
}

/// A comment as embedded in the `blogs.comments` JSONB array.
#[derive(Serialize, Deserialize)]
struct CommentDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    user: Uuid,
    text: String,
    date: DateTime<Utc>,
}
impl CommentDocument {
    fn from_domain(comment: &Comment) -> Self {
        Self {
            id: comment.id,
            user: comment.user_id,
            text: comment.text.clone(),
            date: comment.date,
        }
    }

    fn to_domain(self) -> Comment {
        Comment {
            id: self.id,
            user_id: self.user,
            text: self.text,
            date: self.date,
        }
    }
}

#[derive(FromRow)]
struct BlogRecord {
    id: Uuid,
    title: String,
    description: String,
    excerpt: String,
    quote: String,
    category: String,
    image_storage_id: Option<String>,
    image_url: Option<String>,
    author_id: Uuid,
    likes: Vec<Uuid>,
    comments: Json<Vec<CommentDocument>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl BlogRecord {
    fn to_domain(self) -> PortResult<Blog> {
        let category = self
            .category
            .parse::<Category>()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let image = match (self.image_storage_id, self.image_url) {
            (Some(storage_id), Some(url)) => Some(Image { storage_id, url }),
            _ => None,
        };
        Ok(Blog {
            id: self.id,
            title: self.title,
            description: self.description,
            excerpt: self.excerpt,
            quote: self.quote,
            category,
            image,
            author_id: self.author_id,
            likes: self.likes,
            comments: self
                .comments
                .0
                .into_iter()
                .map(CommentDocument::to_domain)
                .collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn blog_not_found(blog_id: Uuid) -> PortError {
    PortError::NotFound(format!("Blog {} not found", blog_id))
}

fn user_not_found(user_id: impl std::fmt::Display) -> PortError {
    PortError::NotFound(format!("User {} not found", user_id))
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user(&self, new_user: NewUser) -> PortResult<User> {
        let pool = self.pool().await?;
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "INSERT INTO users (id, name, email, password_hash) VALUES ($1, $2, $3, $4) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .fetch_one(&pool)
        .await
        .map_err(conflict_or_unexpected)?;
        Ok(record.to_domain())
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        let pool = self.pool().await?;
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| user_not_found(user_id))?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<User> {
        let pool = self.pool().await?;
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| user_not_found(email))?;
        Ok(record.to_domain())
    }

    async fn get_user_summaries(&self, user_ids: &[Uuid]) -> PortResult<Vec<UserSummary>> {
        let pool = self.pool().await?;
        let records = sqlx::query_as::<_, UserSummaryRecord>(
            "SELECT id, name, designation, avatar_url, avatar_storage_id \
             FROM users WHERE id = ANY($1)",
        )
        .bind(user_ids.to_vec())
        .fetch_all(&pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn save_user(&self, user: &User) -> PortResult<User> {
        let pool = self.pool().await?;
        let (avatar_url, avatar_storage_id) = match &user.avatar {
            Some(avatar) => (Some(avatar.url.clone()), Some(avatar.storage_id.clone())),
            None => (None, None),
        };
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "UPDATE users SET name = $2, email = $3, password_hash = $4, designation = $5, \
             avatar_url = $6, avatar_storage_id = $7, age = $8, location = $9, about = $10, \
             last_signup_at = $11, updated_at = now() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.designation)
        .bind(avatar_url)
        .bind(avatar_storage_id)
        .bind(&user.age)
        .bind(&user.location)
        .bind(&user.about)
        .bind(user.last_signup_at)
        .fetch_optional(&pool)
        .await
        .map_err(conflict_or_unexpected)?
        .ok_or_else(|| user_not_found(user.id))?;
        Ok(record.to_domain())
    }

    async fn delete_user(&self, user_id: Uuid) -> PortResult<()> {
        let pool = self.pool().await?;
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(user_not_found(user_id));
        }
        Ok(())
    }

    async fn list_blogs(&self) -> PortResult<Vec<Blog>> {
        let pool = self.pool().await?;
        let records = sqlx::query_as::<_, BlogRecord>(&format!(
            "SELECT {BLOG_COLUMNS} FROM blogs ORDER BY created_at ASC"
        ))
        .fetch_all(&pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn get_blog_by_id(&self, blog_id: Uuid) -> PortResult<Blog> {
        let pool = self.pool().await?;
        sqlx::query_as::<_, BlogRecord>(&format!(
            "SELECT {BLOG_COLUMNS} FROM blogs WHERE id = $1"
        ))
        .bind(blog_id)
        .fetch_optional(&pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| blog_not_found(blog_id))?
        .to_domain()
    }

    async fn create_blog(&self, new_blog: NewBlog) -> PortResult<Blog> {
        let pool = self.pool().await?;
        let (image_storage_id, image_url) = match new_blog.image {
            Some(image) => (Some(image.storage_id), Some(image.url)),
            None => (None, None),
        };
        sqlx::query_as::<_, BlogRecord>(&format!(
            "INSERT INTO blogs (id, title, description, excerpt, quote, category, \
             image_storage_id, image_url, author_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {BLOG_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(new_blog.title)
        .bind(new_blog.description)
        .bind(new_blog.excerpt)
        .bind(new_blog.quote)
        .bind(new_blog.category.as_str())
        .bind(image_storage_id)
        .bind(image_url)
        .bind(new_blog.author_id)
        .fetch_one(&pool)
        .await
        .map_err(unexpected)?
        .to_domain()
    }

    async fn replace_likes(&self, blog_id: Uuid, likes: &[Uuid]) -> PortResult<Blog> {
        let pool = self.pool().await?;
        sqlx::query_as::<_, BlogRecord>(&format!(
            "UPDATE blogs SET likes = $2, updated_at = now() WHERE id = $1 RETURNING {BLOG_COLUMNS}"
        ))
        .bind(blog_id)
        .bind(likes.to_vec())
        .fetch_optional(&pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| blog_not_found(blog_id))?
        .to_domain()
    }

    async fn append_comment(&self, blog_id: Uuid, comment: NewComment) -> PortResult<Blog> {
        let pool = self.pool().await?;
        let document = CommentDocument {
            id: Uuid::new_v4(),
            user: comment.user_id,
            text: comment.text,
            date: comment.date,
        };
        sqlx::query_as::<_, BlogRecord>(&format!(
            "UPDATE blogs SET comments = comments || $2, updated_at = now() \
             WHERE id = $1 RETURNING {BLOG_COLUMNS}"
        ))
        .bind(blog_id)
        .bind(Json(vec![document]))
        .fetch_optional(&pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| blog_not_found(blog_id))?
        .to_domain()
    }

    async fn replace_comments(&self, blog_id: Uuid, comments: &[Comment]) -> PortResult<Blog> {
        let pool = self.pool().await?;
        let documents: Vec<CommentDocument> =
            comments.iter().map(CommentDocument::from_domain).collect();
        sqlx::query_as::<_, BlogRecord>(&format!(
            "UPDATE blogs SET comments = $2, updated_at = now() WHERE id = $1 RETURNING {BLOG_COLUMNS}"
        ))
        .bind(blog_id)
        .bind(Json(documents))
        .fetch_optional(&pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| blog_not_found(blog_id))?
        .to_domain()
    }

    async fn delete_blog(&self, blog_id: Uuid) -> PortResult<()> {
        let pool = self.pool().await?;
        let result = sqlx::query("DELETE FROM blogs WHERE id = $1")
            .bind(blog_id)
            .execute(&pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(blog_not_found(blog_id));
        }
        Ok(())
    }
}
