pub mod auth;
pub mod common;
pub mod profile;
pub mod profile_request;
