//! # bibfetch common library
//!
//! Shared code for the bibfetch workspace:
//! - Error and result types
//! - Bootstrap configuration loading

pub mod config;
pub mod error;

pub use error::{Error, Result};
