//! crates/neural_impulse_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Largest image accepted by the media store, in bytes.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

//=========================================================================================
// Users
//=========================================================================================

/// A profile picture held in the external media store.
///
/// Both halves are always present together; a user without an avatar holds `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Avatar {
    pub url: String,
    pub storage_id: String,
}

// Represents a user - contains the password hash, never leave the service with it
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub designation: String,
    pub avatar: Option<Avatar>,
    pub age: String,
    pub location: String,
    pub about: String,
    pub last_signup_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The fields needed to insert a brand new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// The public identity of a user, as embedded in blog and comment responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub avatar: Option<Avatar>,
    pub designation: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            avatar: user.avatar.clone(),
            designation: user.designation.clone(),
        }
    }
}

/// The verified identity behind a bearer credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Uuid,
}

//=========================================================================================
// Blogs
//=========================================================================================

/// The closed set of blog categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    AiAndLife,
    AiAndTheFuture,
    AiInAction,
    AiAndTheBrain,
    AiAndAlgorithms,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::AiAndLife,
        Category::AiAndTheFuture,
        Category::AiInAction,
        Category::AiAndTheBrain,
        Category::AiAndAlgorithms,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::AiAndLife => "AI and life",
            Category::AiAndTheFuture => "AI and the future",
            Category::AiInAction => "AI in action",
            Category::AiAndTheBrain => "AI and the brain",
            Category::AiAndAlgorithms => "AI and algorithms",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// A blog illustration held in the external media store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub storage_id: String,
    pub url: String,
}

/// A single comment embedded in a blog. Not addressable on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub date: DateTime<Utc>,
}

/// A comment before the store has assigned it an identifier.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub user_id: Uuid,
    pub text: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Blog {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub excerpt: String,
    pub quote: String,
    pub category: Category,
    pub image: Option<Image>,
    pub author_id: Uuid,
    pub likes: Vec<Uuid>,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The fields needed to insert a brand new blog.
#[derive(Debug, Clone)]
pub struct NewBlog {
    pub title: String,
    pub description: String,
    pub excerpt: String,
    pub quote: String,
    pub category: Category,
    pub image: Option<Image>,
    pub author_id: Uuid,
}

impl Blog {
    pub fn is_liked_by(&self, user_id: Uuid) -> bool {
        self.likes.contains(&user_id)
    }

    /// Flips the caller's like and returns whether the blog is now liked by them.
    pub fn toggle_like(&mut self, user_id: Uuid) -> bool {
        if self.is_liked_by(user_id) {
            self.likes.retain(|id| *id != user_id);
            false
        } else {
            self.likes.push(user_id);
            true
        }
    }

    pub fn find_comment(&self, comment_id: &str) -> Option<&Comment> {
        self.comments
            .iter()
            .find(|c| c.id.to_string() == comment_id)
    }

    /// Drops every comment whose id matches, keeping the order of the rest.
    /// Returns the number of comments removed.
    pub fn remove_comment(&mut self, comment_id: &str) -> usize {
        let before = self.comments.len();
        self.comments.retain(|c| c.id.to_string() != comment_id);
        before - self.comments.len()
    }

    /// Every user id this blog refers to: the author first, then commenters.
    pub fn referenced_users(&self) -> Vec<Uuid> {
        let mut ids = vec![self.author_id];
        for comment in &self.comments {
            if !ids.contains(&comment.user_id) {
                ids.push(comment.user_id);
            }
        }
        ids
    }
}

//=========================================================================================
// Media
//=========================================================================================

/// An image file received from a client, not yet stored anywhere.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Where the media store put an uploaded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub url: String,
    pub storage_id: String,
}

impl ImageUpload {
    /// Checks the upload is an image no larger than [`MAX_IMAGE_BYTES`].
    pub fn validate(&self) -> Result<(), String> {
        if !self.content_type.starts_with("image/") {
            return Err("File must be an image".to_string());
        }
        if self.data.len() > MAX_IMAGE_BYTES {
            return Err("File size exceeds 5MB".to_string());
        }
        Ok(())
    }
}

impl From<StoredImage> for Avatar {
    fn from(stored: StoredImage) -> Self {
        Self {
            url: stored.url,
            storage_id: stored.storage_id,
        }
    }
}

impl From<StoredImage> for Image {
    fn from(stored: StoredImage) -> Self {
        Self {
            storage_id: stored.storage_id,
            url: stored.url,
        }
    }
}
