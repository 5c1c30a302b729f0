pub mod db;
pub mod jwt;
pub mod media;

pub use db::{DbAdapter, DocumentStore};
pub use jwt::JwtTokenService;
pub use media::CloudinaryAdapter;
