//! crates/neural_impulse_core/src/services/mod.rs
//!
//! The mutation services. They are written only against the ports, so any
//! store or media backend can sit behind them.

pub mod blog;
pub mod profile;

#[cfg(test)]
pub(crate) mod testing;

pub use blog::{BlogDraft, BlogService, ResolvedBlog, ResolvedComment};
pub use profile::{ProfileService, ProfileUpdate};

use tracing::{error, warn};

use crate::ports::{MediaError, MediaStore, PortError};

/// What a service does when the media store fails underneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFailurePolicy {
    /// Log the failure and carry on with the document mutation.
    Proceed,
    /// Abort the whole operation before anything is persisted.
    Abort,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthenticated(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{context}: {source}")]
    Media {
        context: String,
        #[source]
        source: MediaError,
    },
    #[error(transparent)]
    Port(#[from] PortError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub(crate) fn media(context: &str, source: MediaError) -> Self {
        ServiceError::Media {
            context: context.to_string(),
            source,
        }
    }
}

/// Maps a store `NotFound` onto a user-facing message, passing other failures through.
pub(crate) fn or_not_found(message: &'static str) -> impl FnOnce(PortError) -> ServiceError {
    move |e| match e {
        PortError::NotFound(_) => ServiceError::NotFound(message.to_string()),
        other => ServiceError::Port(other),
    }
}

/// Deletes a stored image, applying `policy` if the media store fails.
pub(crate) async fn release_media(
    media: &dyn MediaStore,
    storage_id: &str,
    policy: MediaFailurePolicy,
    context: &str,
) -> ServiceResult<()> {
    match media.delete(storage_id).await {
        Ok(()) => Ok(()),
        Err(e) => match policy {
            MediaFailurePolicy::Proceed => {
                warn!(storage_id, error = %e, "{context}; continuing");
                Ok(())
            }
            MediaFailurePolicy::Abort => {
                error!(storage_id, error = %e, "{context}; aborting");
                Err(ServiceError::media(context, e))
            }
        },
    }
}
