//! Tasks: API surface and state store

mod api;
mod store;

pub use api::TaskApi;
pub use store::TaskStore;
