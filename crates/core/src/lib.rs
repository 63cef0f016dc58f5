//! Reusify Core - Shared types library.
//!
//! This crate provides common types used across all Reusify components:
//! - `server` - Snippet and tag HTTP service
//! - `cli` - Command-line tools for migrations, users and demo data
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. Everything here validates on construction, so a value of
//! one of these types is always well-formed.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, tag names and display names

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
