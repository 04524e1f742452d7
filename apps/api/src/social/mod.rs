//! Social platform publishing.

pub mod handlers;
pub mod oauth;
pub mod twitter;
