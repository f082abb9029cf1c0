//! # arbor-core
//!
//! Core crate for Arbor. Contains configuration schemas, typed identifiers,
//! pagination/sorting types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Arbor crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
