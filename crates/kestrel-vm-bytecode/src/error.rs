//! Bytecode errors

use thiserror::Error;

use crate::catalog::AddressingShape;
use crate::instruction::Opcode;

/// Errors that can occur during bytecode operations
#[derive(Debug, Error)]
pub enum BytecodeError {
    /// Byte does not name an opcode
    #[error("Invalid opcode: 0x{0:02X}")]
    InvalidOpcode(u8),

    /// Operands do not match the catalog shape of the opcode
    #[error("{opcode:?} expects {expected:?} operands, got {actual:?}")]
    ShapeMismatch {
        /// Opcode being emitted
        opcode: Opcode,
        /// Shape recorded in the catalog
        expected: AddressingShape,
        /// Shape of the supplied operands
        actual: AddressingShape,
    },

    /// Instruction runs past the end of its code unit
    #[error("Truncated instruction at offset {offset}: need {needed} bytes, {available} left")]
    Truncated {
        /// Offset of the instruction tag
        offset: usize,
        /// Bytes the instruction occupies
        needed: usize,
        /// Bytes remaining before the unit end
        available: usize,
    },

    /// Code unit range does not fit the buffer
    #[error("Invalid code unit [{start}, {end}) for buffer of {len} bytes")]
    InvalidUnit {
        /// Unit start offset
        start: usize,
        /// Unit end offset (exclusive)
        end: usize,
        /// Buffer length
        len: usize,
    },

    /// IO error while writing a listing
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for bytecode operations
pub type Result<T> = std::result::Result<T, BytecodeError>;
