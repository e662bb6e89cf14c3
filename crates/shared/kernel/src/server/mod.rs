//! HTTP surface: application state, identity extraction, and routes.

mod error;
mod flags;
mod health;
mod identity;
pub mod router;
mod state;

pub use error::ApiError;
pub use identity::Identity;
pub use state::{AppState, AppStateBuilder, AppStateError};
