//! Business profile CRUD.

pub mod handlers;
