//! # Quill Shared
//!
//! Wire types shared between the API server and Rust clients.
//! Kept free of server-side dependencies so it also builds for WASM front ends.

pub mod dto;
pub mod response;
pub mod session;

pub use response::{ErrorResponse, FieldDetail};
pub use session::{ClientSession, Session};
