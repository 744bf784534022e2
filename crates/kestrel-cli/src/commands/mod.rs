//! CLI command implementations.

pub mod block;
pub mod disasm;
