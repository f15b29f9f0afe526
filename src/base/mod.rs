//! Base types and error handling.
//!
//! - [`NetError`]: Network error codes matching Chromium's `net_error_list.h`
//! - [`ErrorKind`]: The coarse classification callers branch on

pub mod neterror;

pub use neterror::{ErrorKind, NetError};
