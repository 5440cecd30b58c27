//! Core domain model for reposcope.
//!
//! This crate defines the repository record that flows through the
//! search → enrich → respond pipeline, the search query translated into the
//! hosting API's query syntax, and the stable error codes exposed to
//! clients.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod model;

pub use error::{ApiError, Error, ErrorCode, Result};
