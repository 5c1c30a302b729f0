//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use neural_impulse_core::ports::{DatabaseService, MediaStore, TokenService};
use neural_impulse_core::services::{BlogService, ProfileService};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub media: Arc<dyn MediaStore>,
    pub tokens: Arc<dyn TokenService>,
    pub blogs: BlogService,
    pub profiles: ProfileService,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires the mutation services onto the given adapters.
    pub fn new(
        db: Arc<dyn DatabaseService>,
        media: Arc<dyn MediaStore>,
        tokens: Arc<dyn TokenService>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            blogs: BlogService::new(db.clone(), media.clone()),
            profiles: ProfileService::new(db.clone(), media.clone()),
            db,
            media,
            tokens,
            config,
        }
    }
}
