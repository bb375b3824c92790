pub mod cache;
pub mod error;
pub mod expiration;
