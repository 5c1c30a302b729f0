//! crates/neural_impulse_core/src/services/blog.rs
//!
//! Creation, lookup and deletion of blogs, plus the like toggle and comment
//! mutations. Every read-modify-write here is last-write-wins.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::{or_not_found, release_media, MediaFailurePolicy, ServiceError, ServiceResult};
use crate::domain::{
    Blog, Caller, Category, Comment, ImageUpload, NewBlog, NewComment, UserSummary,
};
use crate::ports::{DatabaseService, MediaStore, PortError};

const BLOG_NOT_FOUND: &str = "Blog not found";

/// The form fields of a new blog, as received from the client.
#[derive(Debug, Clone, Default)]
pub struct BlogDraft {
    pub title: String,
    pub description: String,
    pub excerpt: String,
    pub quote: String,
    pub category: String,
    pub photo: Option<ImageUpload>,
}

#[derive(Debug, Clone)]
pub struct ResolvedComment {
    pub comment: Comment,
    /// `None` once the commenter's account is gone.
    pub user: Option<UserSummary>,
}

/// A blog with its author and commenters resolved to public identities.
#[derive(Debug, Clone)]
pub struct ResolvedBlog {
    pub blog: Blog,
    pub author: Option<UserSummary>,
    pub comments: Vec<ResolvedComment>,
}

#[derive(Clone)]
pub struct BlogService {
    db: Arc<dyn DatabaseService>,
    media: Arc<dyn MediaStore>,
}

impl BlogService {
    pub fn new(db: Arc<dyn DatabaseService>, media: Arc<dyn MediaStore>) -> Self {
        Self { db, media }
    }

    pub async fn list(&self) -> ServiceResult<Vec<ResolvedBlog>> {
        let blogs = self.db.list_blogs().await?;
        let mut ids: Vec<Uuid> = Vec::new();
        for id in blogs.iter().flat_map(Blog::referenced_users) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        let directory = self.directory(&ids).await?;
        Ok(blogs
            .into_iter()
            .map(|blog| resolve(blog, &directory))
            .collect())
    }

    pub async fn get(&self, blog_id: Uuid) -> ServiceResult<ResolvedBlog> {
        let blog = self
            .db
            .get_blog_by_id(blog_id)
            .await
            .map_err(or_not_found(BLOG_NOT_FOUND))?;
        self.resolve_one(blog).await
    }

    /// Creates a blog authored by `caller`, uploading its photo first if one was sent.
    pub async fn create(&self, caller: &Caller, draft: BlogDraft) -> ServiceResult<ResolvedBlog> {
        let author = self
            .db
            .get_user_by_id(caller.user_id)
            .await
            .map_err(|e| match e {
                PortError::NotFound(_) => ServiceError::Unauthenticated(
                    "Unauthorized: Invalid token or user not found".to_string(),
                ),
                other => ServiceError::Port(other),
            })?;

        let title = required(draft.title, "Title")?;
        let description = required(draft.description, "Description")?;
        let excerpt = required(draft.excerpt, "Excerpt")?;
        let quote = required(draft.quote, "Quote")?;
        let category = required(draft.category, "Category")?
            .parse::<Category>()
            .map_err(|e| ServiceError::Validation(e.to_string()))?;

        let image = match draft.photo {
            Some(photo) => Some(
                self.media
                    .upload(photo)
                    .await
                    .map_err(|e| ServiceError::media("Failed to upload image", e))?
                    .into(),
            ),
            None => None,
        };

        let blog = self
            .db
            .create_blog(NewBlog {
                title,
                description,
                excerpt,
                quote,
                category,
                image,
                author_id: author.id,
            })
            .await?;

        info!(blog_id = %blog.id, author_id = %author.id, "Blog created");
        self.resolve_one(blog).await
    }

    /// Deletes a blog owned by `caller`. A failing image deletion is logged and ignored.
    pub async fn delete(&self, caller: &Caller, blog_id: Uuid) -> ServiceResult<()> {
        let blog = self
            .db
            .get_blog_by_id(blog_id)
            .await
            .map_err(or_not_found(BLOG_NOT_FOUND))?;

        if blog.author_id != caller.user_id {
            return Err(ServiceError::Forbidden(
                "Forbidden: Only the author can delete this blog".to_string(),
            ));
        }

        if let Some(image) = &blog.image {
            release_media(
                self.media.as_ref(),
                &image.storage_id,
                MediaFailurePolicy::Proceed,
                "Failed to delete blog image",
            )
            .await?;
        }

        self.db
            .delete_blog(blog_id)
            .await
            .map_err(or_not_found(BLOG_NOT_FOUND))?;
        info!(blog_id = %blog_id, "Blog deleted");
        Ok(())
    }

    /// Adds the caller to the liker set, or removes them if already present.
    pub async fn toggle_like(&self, caller: &Caller, blog_id: Uuid) -> ServiceResult<ResolvedBlog> {
        let mut blog = self
            .db
            .get_blog_by_id(blog_id)
            .await
            .map_err(or_not_found(BLOG_NOT_FOUND))?;

        let liked = blog.toggle_like(caller.user_id);
        let blog = self
            .db
            .replace_likes(blog_id, &blog.likes)
            .await
            .map_err(or_not_found(BLOG_NOT_FOUND))?;

        debug!(blog_id = %blog_id, user_id = %caller.user_id, liked, "Like toggled");
        self.resolve_one(blog).await
    }

    pub async fn add_comment(
        &self,
        caller: &Caller,
        blog_id: Uuid,
        text: &str,
    ) -> ServiceResult<ResolvedBlog> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ServiceError::Validation(
                "Comment text is required".to_string(),
            ));
        }

        self.db
            .get_blog_by_id(blog_id)
            .await
            .map_err(or_not_found(BLOG_NOT_FOUND))?;

        let blog = self
            .db
            .append_comment(
                blog_id,
                NewComment {
                    user_id: caller.user_id,
                    text: text.to_string(),
                    date: Utc::now(),
                },
            )
            .await
            .map_err(or_not_found(BLOG_NOT_FOUND))?;

        info!(blog_id = %blog_id, user_id = %caller.user_id, "Comment added");
        self.resolve_one(blog).await
    }

    /// Removes a comment. Only its author or the blog's author may do so; an id
    /// that matches nothing leaves the sequence as it was.
    pub async fn delete_comment(
        &self,
        caller: &Caller,
        blog_id: Uuid,
        comment_id: &str,
    ) -> ServiceResult<ResolvedBlog> {
        let mut blog = self
            .db
            .get_blog_by_id(blog_id)
            .await
            .map_err(or_not_found(BLOG_NOT_FOUND))?;

        if comment_id.trim().is_empty() {
            return Err(ServiceError::Validation(
                "Comment ID is required".to_string(),
            ));
        }

        if let Some(comment) = blog.find_comment(comment_id) {
            if comment.user_id != caller.user_id && blog.author_id != caller.user_id {
                return Err(ServiceError::Forbidden(
                    "Forbidden: Only the comment author or blog author can delete this comment"
                        .to_string(),
                ));
            }
        }

        let removed = blog.remove_comment(comment_id);
        let blog = self
            .db
            .replace_comments(blog_id, &blog.comments)
            .await
            .map_err(or_not_found(BLOG_NOT_FOUND))?;

        info!(blog_id = %blog_id, comment_id, removed, "Comment deletion applied");
        self.resolve_one(blog).await
    }

    async fn resolve_one(&self, blog: Blog) -> ServiceResult<ResolvedBlog> {
        let directory = self.directory(&blog.referenced_users()).await?;
        Ok(resolve(blog, &directory))
    }

    async fn directory(&self, ids: &[Uuid]) -> ServiceResult<HashMap<Uuid, UserSummary>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let summaries = self.db.get_user_summaries(ids).await?;
        Ok(summaries.into_iter().map(|s| (s.id, s)).collect())
    }
}

fn resolve(blog: Blog, directory: &HashMap<Uuid, UserSummary>) -> ResolvedBlog {
    let author = directory.get(&blog.author_id).cloned();
    let comments = blog
        .comments
        .iter()
        .map(|comment| ResolvedComment {
            comment: comment.clone(),
            user: directory.get(&comment.user_id).cloned(),
        })
        .collect();
    ResolvedBlog {
        blog,
        author,
        comments,
    }
}

fn required(value: String, field: &str) -> ServiceResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServiceError::Validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewUser;
    use crate::memory::MemoryStore;
    use crate::services::testing::RecordingMedia;
    use bytes::Bytes;

    async fn setup() -> (BlogService, Arc<MemoryStore>, Arc<RecordingMedia>, Caller) {
        let db = Arc::new(MemoryStore::new());
        let media = Arc::new(RecordingMedia::default());
        let user = db
            .create_user(NewUser {
                name: "Ada".into(),
                email: "ada@example.com".into(),
                password_hash: "hash".into(),
            })
            .await
            .unwrap();
        let service = BlogService::new(db.clone(), media.clone());
        (service, db, media, Caller { user_id: user.id })
    }

    fn draft() -> BlogDraft {
        BlogDraft {
            title: "Minds".into(),
            description: "First paragraph.\n\nSecond paragraph.".into(),
            excerpt: "About minds".into(),
            quote: "Think".into(),
            category: "AI and the brain".into(),
            photo: None,
        }
    }

    fn photo() -> ImageUpload {
        ImageUpload {
            file_name: "cover.png".into(),
            content_type: "image/png".into(),
            data: Bytes::from_static(b"\x89PNG"),
        }
    }

    #[tokio::test]
    async fn create_sets_author_and_starts_empty() {
        let (service, _db, _media, caller) = setup().await;

        let created = service.create(&caller, draft()).await.unwrap();

        assert_eq!(created.blog.author_id, caller.user_id);
        assert_eq!(created.author.unwrap().name, "Ada");
        assert!(created.blog.likes.is_empty());
        assert!(created.blog.comments.is_empty());
        assert!(created.blog.image.is_none());
        assert_eq!(created.blog.category, Category::AiAndTheBrain);
    }

    #[tokio::test]
    async fn create_uploads_photo_before_persisting() {
        let (service, _db, media, caller) = setup().await;
        let mut with_photo = draft();
        with_photo.photo = Some(photo());

        let created = service.create(&caller, with_photo).await.unwrap();

        let image = created.blog.image.unwrap();
        assert_eq!(media.uploaded().len(), 1);
        assert_eq!(image.storage_id, media.uploaded()[0].storage_id);
    }

    #[tokio::test]
    async fn create_with_failed_upload_persists_nothing() {
        let (service, db, media, caller) = setup().await;
        media.fail_uploads();
        let mut with_photo = draft();
        with_photo.photo = Some(photo());

        let err = service.create(&caller, with_photo).await.unwrap_err();

        assert!(matches!(err, ServiceError::Media { .. }));
        assert!(db.list_blogs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_unknown_author_and_bad_fields() {
        let (service, _db, _media, caller) = setup().await;

        let stranger = Caller {
            user_id: Uuid::new_v4(),
        };
        assert!(matches!(
            service.create(&stranger, draft()).await,
            Err(ServiceError::Unauthenticated(_))
        ));

        let mut untitled = draft();
        untitled.title = "   ".into();
        match service.create(&caller, untitled).await {
            Err(ServiceError::Validation(msg)) => assert_eq!(msg, "Title is required"),
            other => panic!("unexpected: {other:?}"),
        }

        let mut bad_category = draft();
        bad_category.category = "AI and cooking".into();
        assert!(matches!(
            service.create(&caller, bad_category).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn delete_proceeds_when_image_deletion_fails() {
        let (service, db, media, caller) = setup().await;
        let mut with_photo = draft();
        with_photo.photo = Some(photo());
        let created = service.create(&caller, with_photo).await.unwrap();
        media.fail_deletes();

        service.delete(&caller, created.blog.id).await.unwrap();

        assert!(matches!(
            db.get_blog_by_id(created.blog.id).await,
            Err(PortError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn only_the_author_may_delete() {
        let (service, db, _media, caller) = setup().await;
        let created = service.create(&caller, draft()).await.unwrap();
        let intruder = Caller {
            user_id: Uuid::new_v4(),
        };

        match service.delete(&intruder, created.blog.id).await {
            Err(ServiceError::Forbidden(msg)) => {
                assert!(msg.contains("Only the author can delete this blog"))
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(db.get_blog_by_id(created.blog.id).await.is_ok());
    }

    #[tokio::test]
    async fn like_toggle_pair_restores_likers() {
        let (service, _db, _media, caller) = setup().await;
        let created = service.create(&caller, draft()).await.unwrap();

        let liked = service.toggle_like(&caller, created.blog.id).await.unwrap();
        assert_eq!(liked.blog.likes, vec![caller.user_id]);

        let unliked = service.toggle_like(&caller, created.blog.id).await.unwrap();
        assert!(unliked.blog.likes.is_empty());
    }

    #[tokio::test]
    async fn comments_resolve_authors_and_keep_order() {
        let (service, db, _media, caller) = setup().await;
        let created = service.create(&caller, draft()).await.unwrap();
        let ghost = Caller {
            user_id: Uuid::new_v4(),
        };

        service
            .add_comment(&caller, created.blog.id, " first ")
            .await
            .unwrap();
        let blog = service
            .add_comment(&ghost, created.blog.id, "second")
            .await
            .unwrap();

        let texts: Vec<_> = blog.comments.iter().map(|c| c.comment.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
        assert_eq!(blog.comments[0].user.as_ref().unwrap().name, "Ada");
        assert!(blog.comments[1].user.is_none());
        assert_eq!(db.get_blog_by_id(created.blog.id).await.unwrap().comments.len(), 2);
    }

    #[tokio::test]
    async fn empty_comment_is_rejected() {
        let (service, _db, _media, caller) = setup().await;
        let created = service.create(&caller, draft()).await.unwrap();

        assert!(matches!(
            service.add_comment(&caller, created.blog.id, "  ").await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn comment_deletion_requires_comment_or_blog_author() {
        let (service, db, _media, caller) = setup().await;
        let created = service.create(&caller, draft()).await.unwrap();
        let commenter = db
            .create_user(NewUser {
                name: "Bo".into(),
                email: "bo@example.com".into(),
                password_hash: "hash".into(),
            })
            .await
            .unwrap();
        let commenter = Caller {
            user_id: commenter.id,
        };
        let bystander = Caller {
            user_id: Uuid::new_v4(),
        };

        let blog = service
            .add_comment(&commenter, created.blog.id, "hello")
            .await
            .unwrap();
        let comment_id = blog.comments[0].comment.id.to_string();

        assert!(matches!(
            service
                .delete_comment(&bystander, created.blog.id, &comment_id)
                .await,
            Err(ServiceError::Forbidden(_))
        ));

        // the blog author may moderate
        let blog = service
            .delete_comment(&caller, created.blog.id, &comment_id)
            .await
            .unwrap();
        assert!(blog.comments.is_empty());
    }

    #[tokio::test]
    async fn deleting_unknown_comment_is_a_no_op() {
        let (service, _db, _media, caller) = setup().await;
        let created = service.create(&caller, draft()).await.unwrap();
        service
            .add_comment(&caller, created.blog.id, "keep me")
            .await
            .unwrap();

        let blog = service
            .delete_comment(&caller, created.blog.id, &Uuid::new_v4().to_string())
            .await
            .unwrap();

        assert_eq!(blog.comments.len(), 1);
        assert!(matches!(
            service.delete_comment(&caller, created.blog.id, "").await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn missing_blog_is_not_found() {
        let (service, _db, _media, caller) = setup().await;
        let missing = Uuid::new_v4();

        assert!(matches!(service.get(missing).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(
            service.toggle_like(&caller, missing).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.delete(&caller, missing).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
