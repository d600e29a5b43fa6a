#![doc = "The `taskforge` library crate."]
#![doc = ""]
#![doc = "A multi-user task management backend: credential storage, access/refresh token"]
#![doc = "issuance, revocation, per-request token verification and task ownership checks,"]
#![doc = "served over actix-web on top of SQLite. The binary (`main.rs`) wires these together."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;

pub use crate::error::{AppError, AuthError};
pub use crate::state::AppState;
