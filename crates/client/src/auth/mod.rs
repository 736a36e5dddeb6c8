//! Authentication: API surface and session store

mod api;
mod session;

pub use api::AuthApi;
pub use session::{SessionState, SessionStore};
