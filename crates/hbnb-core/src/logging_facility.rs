//! Structured logging facility for hbnb
//!
//! - Single initialization point via `init(profile)`
//! - Structured operation macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - Test capture mode for deterministic assertions
//!
//! All output goes to stderr; stdout belongs to the console session.
//!
//! # Usage
//!
//! ```rust
//! use hbnb_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development, false);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
