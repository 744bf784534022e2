//! # Kestrel VM Bytecode
//!
//! Instruction catalog, decoder and disassembler for the Kestrel scripting VM.
//!
//! ## Design Principles
//!
//! - **Read-only**: Decoding borrows the compiler's buffer and never mutates it
//! - **Bounds-checked**: Every decode step proves the remaining length first
//! - **Data-driven**: Uniform 0/1/2/3-address instructions come from one table
//! - **Stable output**: The printed listing is a golden-test surface

#![warn(clippy::all)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod catalog;
pub mod decode;
pub mod disasm;
pub mod emit;
pub mod error;
pub mod format;
pub mod instruction;
pub mod module;
pub mod operand;

pub use catalog::{AddressingShape, CatalogEntry, lookup};
pub use decode::{Decoder, decode_one};
pub use disasm::{Disassembly, DisassemblyOptions, Line, Summary, disassemble, disassemble_to_string};
pub use emit::Emitter;
pub use error::BytecodeError;
pub use format::format;
pub use instruction::{Instruction, Opcode, Operands, SpecialInstruction};
pub use module::{CodeUnit, Module};
pub use operand::{JumpOffset, Slot};

/// Width of the opcode tag on the wire
pub const TAG_SIZE: usize = 1;
