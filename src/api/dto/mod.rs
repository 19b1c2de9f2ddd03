//! Data Transfer Objects for REST request/response serialization.

pub mod auth_dto;
pub mod feed_dto;
pub mod school_dto;
pub mod user_dto;

pub use auth_dto::*;
pub use feed_dto::*;
pub use school_dto::*;
pub use user_dto::*;
