pub mod domain;
pub mod memory;
pub mod ports;
pub mod services;

pub use domain::{
    Avatar, Blog, Caller, Category, Comment, Image, ImageUpload, NewBlog, NewComment, NewUser,
    StoredImage, User, UserSummary,
};
pub use memory::MemoryStore;
pub use ports::{
    CredentialError, DatabaseService, DeleteOutcome, MediaError, MediaResult, MediaStore,
    PortError, PortResult, TokenService,
};
pub use services::{
    BlogDraft, BlogService, MediaFailurePolicy, ProfileService, ProfileUpdate, ResolvedBlog,
    ResolvedComment, ServiceError, ServiceResult,
};
