//! Core types for Reusify.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod display_name;
pub mod email;
pub mod id;
pub mod tag_name;

pub use display_name::{DisplayName, DisplayNameError};
pub use email::{Email, EmailError};
pub use id::*;
pub use tag_name::{TagName, TagNameError};
