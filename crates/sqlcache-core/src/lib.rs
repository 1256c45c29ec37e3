//! # SqlCache Core
//!
//! Core types, the expiration policy, and error definitions shared by every
//! SqlCache crate. Nothing here performs I/O.

pub mod clock;
pub mod error;
pub mod expiration;
pub mod options;
pub mod record;
pub mod result;

pub use clock::*;
pub use error::*;
pub use expiration::{compute_read_refresh, compute_write_expiration, MIN_EXPIRATION_WINDOW};
pub use options::*;
pub use record::*;
pub use result::*;

// Re-export shaku for dependency injection
pub use shaku::Interface;
