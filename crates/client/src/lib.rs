//! Client library for the TaskDeck backend
//!
//! This crate contains the synchronization layer between the UI and the
//! remote API:
//! - A thin HTTP request helper over `reqwest`
//! - Typed API surfaces for the auth and task endpoints
//! - The session store (identity + token lifecycle)
//! - The task store (in-memory task list reconciled with server responses)
//! - Durable credential storage

pub mod auth;
pub mod error;
pub mod http;
pub mod storage;
pub mod tasks;

pub use error::ClientError;
pub type Result<T> = std::result::Result<T, ClientError>;
