//! crates/neural_impulse_core/src/services/profile.rs
//!
//! Profile edits, avatar removal and account deletion. Every operation acts only
//! on the caller's own account.
//!
//! Media failure handling per operation:
//!
//! | operation                  | media call          | policy  |
//! |----------------------------|---------------------|---------|
//! | update, `delete_avatar`    | delete old avatar   | abort   |
//! | update, new avatar         | upload              | abort   |
//! | update, new avatar         | delete old avatar   | proceed |
//!
//! A new avatar is uploaded before the old one is deleted, and the old one is
//! only deleted after the profile is saved.
//! | delete account             | delete avatar       | abort   |
//! | delete avatar              | delete avatar       | abort   |

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::{or_not_found, release_media, MediaFailurePolicy, ServiceError, ServiceResult};
use crate::domain::{Caller, ImageUpload, User};
use crate::ports::{DatabaseService, MediaStore};

const USER_NOT_FOUND: &str = "User not found";

/// The profile form as received from the client.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: String,
    /// Replaced with an empty string when absent.
    pub designation: Option<String>,
    /// Left untouched when absent.
    pub age: Option<String>,
    pub location: Option<String>,
    pub about: Option<String>,
    pub delete_avatar: bool,
    pub avatar: Option<ImageUpload>,
}

#[derive(Clone)]
pub struct ProfileService {
    db: Arc<dyn DatabaseService>,
    media: Arc<dyn MediaStore>,
}

impl ProfileService {
    pub fn new(db: Arc<dyn DatabaseService>, media: Arc<dyn MediaStore>) -> Self {
        Self { db, media }
    }

    pub async fn get(&self, user_id: Uuid) -> ServiceResult<User> {
        self.db
            .get_user_by_id(user_id)
            .await
            .map_err(or_not_found(USER_NOT_FOUND))
    }

    /// Applies a profile edit. Nothing is persisted unless every media call the
    /// edit depends on succeeded.
    pub async fn update(
        &self,
        caller: &Caller,
        user_id: Uuid,
        update: ProfileUpdate,
    ) -> ServiceResult<User> {
        authorize(caller, user_id)?;
        let mut user = self.get(user_id).await?;

        let name = update.name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation("Name is required".to_string()));
        }

        if update.delete_avatar {
            if let Some(avatar) = user.avatar.take() {
                release_media(
                    self.media.as_ref(),
                    &avatar.storage_id,
                    MediaFailurePolicy::Abort,
                    "Failed to delete avatar",
                )
                .await?;
            }
        }

        // The old avatar is only released once its replacement is stored and saved.
        let mut replaced = None;
        if let Some(file) = update.avatar {
            let stored = self
                .media
                .upload(file)
                .await
                .map_err(|e| ServiceError::media("Failed to upload avatar", e))?;
            replaced = user.avatar.replace(stored.into());
        }

        user.name = name.to_string();
        user.designation = update.designation.unwrap_or_default();
        if let Some(age) = update.age {
            user.age = age;
        }
        if let Some(location) = update.location {
            user.location = location;
        }
        if let Some(about) = update.about {
            user.about = about;
        }

        let saved = self
            .db
            .save_user(&user)
            .await
            .map_err(or_not_found(USER_NOT_FOUND))?;
        if let Some(previous) = replaced {
            release_media(
                self.media.as_ref(),
                &previous.storage_id,
                MediaFailurePolicy::Proceed,
                "Failed to delete old avatar",
            )
            .await?;
        }
        info!(user_id = %user_id, "Profile updated");
        Ok(saved)
    }

    /// Deletes the account, removing its avatar from the media store first.
    pub async fn delete_account(&self, caller: &Caller, user_id: Uuid) -> ServiceResult<()> {
        authorize(caller, user_id)?;
        let user = self.get(user_id).await?;

        if let Some(avatar) = &user.avatar {
            release_media(
                self.media.as_ref(),
                &avatar.storage_id,
                MediaFailurePolicy::Abort,
                "Failed to delete avatar",
            )
            .await?;
        }

        self.db
            .delete_user(user_id)
            .await
            .map_err(or_not_found(USER_NOT_FOUND))?;
        info!(user_id = %user_id, "Account deleted");
        Ok(())
    }

    pub async fn delete_avatar(&self, caller: &Caller, user_id: Uuid) -> ServiceResult<User> {
        authorize(caller, user_id)?;
        let mut user = self.get(user_id).await?;

        let Some(avatar) = user.avatar.take() else {
            return Err(ServiceError::Validation("No avatar to delete".to_string()));
        };
        release_media(
            self.media.as_ref(),
            &avatar.storage_id,
            MediaFailurePolicy::Abort,
            "Failed to delete avatar",
        )
        .await?;

        let saved = self
            .db
            .save_user(&user)
            .await
            .map_err(or_not_found(USER_NOT_FOUND))?;
        info!(user_id = %user_id, "Avatar deleted");
        Ok(saved)
    }
}

fn authorize(caller: &Caller, user_id: Uuid) -> ServiceResult<()> {
    if caller.user_id != user_id {
        return Err(ServiceError::Forbidden(
            "Forbidden: Token does not match user ID".to_string(),
        ));
    }
    Ok(())
}
