//! # Kestrel Conf
//!
//! Reader for raw script blocks embedded in a host configuration file:
//!
//! ```text
//! js_run_block {
//!     var greeting = "hello";
//! };
//! ```
//!
//! Everything from the opening brace up to the `};` terminator is handed to a
//! directive handler verbatim. The handler decides what the text means.

#![warn(clippy::all)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod block;
pub mod error;
pub mod file;

pub use block::{BlockDirectives, BlockHandler, parse_block};
pub use error::{ConfError, Result};
pub use file::{ConfFile, DirectiveEnd};

/// Terminator of a raw block
pub const BLOCK_TERMINATOR: &str = "};";
