pub mod business;
pub mod post;
