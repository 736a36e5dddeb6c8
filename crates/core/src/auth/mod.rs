//! Auth model module

mod model;

pub use model::{LoginData, LoginPayload, RefreshPayload, RegisterData, User};
