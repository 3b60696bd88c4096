//! HTTP API exposing template loading and sending

pub mod handlers;
pub mod server;

pub use handlers::AppState;
pub use server::{router, ApiServer};
