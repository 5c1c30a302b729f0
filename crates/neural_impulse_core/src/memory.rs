//! crates/neural_impulse_core/src/memory.rs
//!
//! An in-process implementation of the `DatabaseService` port. Used for local
//! development without Postgres and as the store behind the test suites.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{Blog, Comment, NewBlog, NewComment, NewUser, User, UserSummary};
use crate::ports::{DatabaseService, PortError, PortResult};

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    // Kept in insertion order.
    blogs: RwLock<Vec<Blog>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn update_blog<F>(&self, blog_id: Uuid, apply: F) -> PortResult<Blog>
    where
        F: FnOnce(&mut Blog) + Send,
    {
        let mut blogs = self.blogs.write().await;
        let blog = blogs
            .iter_mut()
            .find(|b| b.id == blog_id)
            .ok_or_else(|| PortError::NotFound(format!("Blog {} not found", blog_id)))?;
        apply(blog);
        blog.updated_at = Utc::now();
        Ok(blog.clone())
    }
}

#[async_trait]
impl DatabaseService for MemoryStore {
    async fn create_user(&self, new_user: NewUser) -> PortResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == new_user.email) {
            return Err(PortError::Conflict(format!(
                "Email {} already registered",
                new_user.email
            )));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            designation: String::new(),
            avatar: None,
            age: String::new(),
            location: String::new(),
            about: String::new(),
            last_signup_at: now,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        self.users
            .read()
            .await
            .get(&user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<User> {
        self.users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", email)))
    }

    async fn get_user_summaries(&self, user_ids: &[Uuid]) -> PortResult<Vec<UserSummary>> {
        let users = self.users.read().await;
        Ok(user_ids
            .iter()
            .filter_map(|id| users.get(id))
            .map(UserSummary::from)
            .collect())
    }

    async fn save_user(&self, user: &User) -> PortResult<User> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(PortError::Conflict(format!(
                "Email {} already registered",
                user.email
            )));
        }
        let stored = users
            .get_mut(&user.id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user.id)))?;
        let created_at = stored.created_at;
        *stored = User {
            created_at,
            updated_at: Utc::now(),
            ..user.clone()
        };
        Ok(stored.clone())
    }

    async fn delete_user(&self, user_id: Uuid) -> PortResult<()> {
        self.users
            .write()
            .await
            .remove(&user_id)
            .map(|_| ())
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
    }

    async fn list_blogs(&self) -> PortResult<Vec<Blog>> {
        Ok(self.blogs.read().await.clone())
    }

    async fn get_blog_by_id(&self, blog_id: Uuid) -> PortResult<Blog> {
        self.blogs
            .read()
            .await
            .iter()
            .find(|b| b.id == blog_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Blog {} not found", blog_id)))
    }

    async fn create_blog(&self, new_blog: NewBlog) -> PortResult<Blog> {
        let now = Utc::now();
        let blog = Blog {
            id: Uuid::new_v4(),
            title: new_blog.title,
            description: new_blog.description,
            excerpt: new_blog.excerpt,
            quote: new_blog.quote,
            category: new_blog.category,
            image: new_blog.image,
            author_id: new_blog.author_id,
            likes: Vec::new(),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.blogs.write().await.push(blog.clone());
        Ok(blog)
    }

    async fn replace_likes(&self, blog_id: Uuid, likes: &[Uuid]) -> PortResult<Blog> {
        let likes = likes.to_vec();
        self.update_blog(blog_id, move |blog| blog.likes = likes).await
    }

    async fn append_comment(&self, blog_id: Uuid, comment: NewComment) -> PortResult<Blog> {
        self.update_blog(blog_id, move |blog| {
            blog.comments.push(Comment {
                id: Uuid::new_v4(),
                user_id: comment.user_id,
                text: comment.text,
                date: comment.date,
            })
        })
        .await
    }

    async fn replace_comments(&self, blog_id: Uuid, comments: &[Comment]) -> PortResult<Blog> {
        let comments = comments.to_vec();
        self.update_blog(blog_id, move |blog| blog.comments = comments)
            .await
    }

    async fn delete_blog(&self, blog_id: Uuid) -> PortResult<()> {
        let mut blogs = self.blogs.write().await;
        let before = blogs.len();
        blogs.retain(|b| b.id != blog_id);
        if blogs.len() == before {
            return Err(PortError::NotFound(format!("Blog {} not found", blog_id)));
        }
        Ok(())
    }
}
