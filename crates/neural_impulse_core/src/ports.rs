//! crates/neural_impulse_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use futures::future::join_all;
use uuid::Uuid;

use crate::domain::{
    Blog, Caller, Comment, ImageUpload, NewBlog, NewComment, NewUser, StoredImage, User,
    UserSummary,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all store operations.
/// This abstracts away the specific errors from the underlying database.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// Failures reported by the external media store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediaError {
    /// The file was refused before any network call was made.
    #[error("{0}")]
    Rejected(String),
    /// The media store itself failed or answered with an error.
    #[error("{0}")]
    Upstream(String),
}

pub type MediaResult<T> = Result<T, MediaError>;

/// The result of one deletion inside a `delete_many` batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub storage_id: String,
    pub result: MediaResult<()>,
}

/// Reasons a bearer credential is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("Unauthorized: Missing token")]
    Missing,
    #[error("Unauthorized: Invalid token format")]
    Malformed,
    #[error("Unauthorized: Invalid or expired token")]
    Invalid(String),
    #[error("Unauthorized: Invalid user ID")]
    InvalidSubject,
    #[error("Failed to sign token: {0}")]
    Signing(String),
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Users ---
    /// Inserts a user. Fails with `Conflict` when the email is taken.
    async fn create_user(&self, new_user: NewUser) -> PortResult<User>;

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<User>;

    /// Resolves public identities. Unknown ids are silently skipped.
    async fn get_user_summaries(&self, user_ids: &[Uuid]) -> PortResult<Vec<UserSummary>>;

    /// Replaces every mutable field of the stored user with `user`'s.
    async fn save_user(&self, user: &User) -> PortResult<User>;

    async fn delete_user(&self, user_id: Uuid) -> PortResult<()>;

    // --- Blogs ---
    /// All blogs in insertion order.
    async fn list_blogs(&self) -> PortResult<Vec<Blog>>;

    async fn get_blog_by_id(&self, blog_id: Uuid) -> PortResult<Blog>;

    async fn create_blog(&self, new_blog: NewBlog) -> PortResult<Blog>;

    /// Overwrites the liker set of a blog.
    async fn replace_likes(&self, blog_id: Uuid, likes: &[Uuid]) -> PortResult<Blog>;

    /// Appends a comment; the store assigns its identifier.
    async fn append_comment(&self, blog_id: Uuid, comment: NewComment) -> PortResult<Blog>;

    /// Overwrites the whole comment sequence of a blog.
    async fn replace_comments(&self, blog_id: Uuid, comments: &[Comment]) -> PortResult<Blog>;

    async fn delete_blog(&self, blog_id: Uuid) -> PortResult<()>;
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Stores an image and returns its public url and storage id.
    async fn upload(&self, image: ImageUpload) -> MediaResult<StoredImage>;

    /// Removes a stored image.
    async fn delete(&self, storage_id: &str) -> MediaResult<()>;

    /// Removes several images concurrently. One outcome per input, in input order;
    /// a failure never stops the other deletions.
    async fn delete_many(&self, storage_ids: &[String]) -> Vec<DeleteOutcome> {
        join_all(storage_ids.iter().map(|storage_id| async move {
            DeleteOutcome {
                storage_id: storage_id.clone(),
                result: self.delete(storage_id).await,
            }
        }))
        .await
    }
}

/// Issues and verifies the signed bearer credentials every mutation relies on.
pub trait TokenService: Send + Sync {
    fn issue(&self, user: &User) -> Result<String, CredentialError>;

    fn verify(&self, token: &str) -> Result<Caller, CredentialError>;
}
