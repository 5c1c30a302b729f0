//! services/api/src/web/views.rs
//!
//! JSON shapes returned to clients. Field names follow the document layout the
//! frontend already consumes (`_id`, `authorId`, `createdAt`, ...).

use chrono::{DateTime, Utc};
use neural_impulse_core::domain::{Avatar, Image, User, UserSummary};
use neural_impulse_core::services::{ResolvedBlog, ResolvedComment};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AvatarView {
    pub url: String,
    pub public_id: String,
}

impl From<&Avatar> for AvatarView {
    fn from(avatar: &Avatar) -> Self {
        Self {
            url: avatar.url.clone(),
            public_id: avatar.storage_id.clone(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImageView {
    pub id: String,
    pub url: String,
}

impl From<&Image> for ImageView {
    fn from(image: &Image) -> Self {
        Self {
            id: image.storage_id.clone(),
            url: image.url.clone(),
        }
    }
}

//=========================================================================================
// Users
//=========================================================================================

/// A user's public profile. The password hash is never part of it.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub designation: String,
    pub avatar: Option<AvatarView>,
    pub age: String,
    pub location: String,
    pub about: String,
    pub last_signup_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            designation: user.designation.clone(),
            avatar: user.avatar.as_ref().map(AvatarView::from),
            age: user.age.clone(),
            location: user.location.clone(),
            about: user.about.clone(),
            last_signup_date: user.last_signup_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthorView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub avatar: Option<AvatarView>,
    pub designation: String,
}

impl From<&UserSummary> for AuthorView {
    fn from(user: &UserSummary) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            avatar: user.avatar.as_ref().map(AvatarView::from),
            designation: user.designation.clone(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommenterView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub avatar: Option<AvatarView>,
}

//=========================================================================================
// Blogs
//=========================================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct CommentView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// `null` when the commenter's account no longer exists.
    pub user: Option<CommenterView>,
    pub text: String,
    pub date: DateTime<Utc>,
}

impl From<&ResolvedComment> for CommentView {
    fn from(resolved: &ResolvedComment) -> Self {
        Self {
            id: resolved.comment.id,
            user: resolved.user.as_ref().map(|user| CommenterView {
                id: user.id,
                name: user.name.clone(),
                avatar: user.avatar.as_ref().map(AvatarView::from),
            }),
            text: resolved.comment.text.clone(),
            date: resolved.comment.date,
        }
    }
}

/// A blog with its author and commenters expanded.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlogView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub excerpt: String,
    pub quote: String,
    pub category: String,
    pub image: Option<ImageView>,
    /// `null` when the author's account no longer exists.
    pub author_id: Option<AuthorView>,
    pub likes: Vec<Uuid>,
    pub comments: Vec<CommentView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&ResolvedBlog> for BlogView {
    fn from(resolved: &ResolvedBlog) -> Self {
        let blog = &resolved.blog;
        Self {
            id: blog.id,
            title: blog.title.clone(),
            description: blog.description.clone(),
            excerpt: blog.excerpt.clone(),
            quote: blog.quote.clone(),
            category: blog.category.to_string(),
            image: blog.image.as_ref().map(ImageView::from),
            author_id: resolved.author.as_ref().map(AuthorView::from),
            likes: blog.likes.clone(),
            comments: resolved.comments.iter().map(CommentView::from).collect(),
            created_at: blog.created_at,
            updated_at: blog.updated_at,
        }
    }
}

impl From<ResolvedBlog> for BlogView {
    fn from(resolved: ResolvedBlog) -> Self {
        BlogView::from(&resolved)
    }
}
