//! # Adpull Core
//!
//! Core types and error definitions shared by every adpull crate: the
//! unified error type with its retryability classification, the typed
//! account identifier, and the common result alias.

pub mod error;
pub mod id;
pub mod result;

pub use error::*;
pub use id::*;
pub use result::*;
