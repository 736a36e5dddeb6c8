//! Core library for TaskDeck
//!
//! This crate contains the shared data model, including:
//! - Task model and request/response payloads
//! - Auth model (user identity, credentials, token payloads)
//! - The response envelope used by the backend API

pub mod auth;
pub mod error;
pub mod task;
pub mod wire;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
