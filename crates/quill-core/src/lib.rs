//! # Quill Core
//!
//! The domain layer of the Quill blog platform.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! entities and their field rules, the pagination engine, the ports that
//! infrastructure must implement, and the services that drive them.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::{DomainError, FieldError};
