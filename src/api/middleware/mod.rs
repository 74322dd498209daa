pub mod auth;
pub mod cors;

pub use auth::ApiKeyAuth;
pub use cors::Cors;
