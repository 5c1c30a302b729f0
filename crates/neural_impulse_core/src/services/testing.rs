//! In-crate media double for the service tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use crate::domain::{ImageUpload, StoredImage};
use crate::ports::{MediaError, MediaResult, MediaStore};

#[derive(Default)]
pub struct RecordingMedia {
    fail_uploads: AtomicBool,
    fail_deletes: AtomicBool,
    uploaded: Mutex<Vec<StoredImage>>,
    deleted: Mutex<Vec<String>>,
}

impl RecordingMedia {
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
impl MediaStore for RecordingMedia {
    async fn upload(&self, image: ImageUpload) -> MediaResult<StoredImage> {
        image.validate().map_err(MediaError::Rejected)?;
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(MediaError::Upstream("upload refused".into()));
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
            return Err(MediaError::Upstream("delete refused".into()));
        }
        self.deleted.lock().unwrap().push(storage_id.to_string());
        Ok(())
    }
}
