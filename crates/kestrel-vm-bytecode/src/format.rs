//! Instruction printer
//!
//! Line grammar:
//!
//! ```text
//! <MNEMONIC padded to 16><2 spaces><operands separated by one space>
//! ```
//!
//! Slots print as `{:04X}`, counts as decimal, offsets with an explicit sign,
//! frames append ` CTOR` for constructor calls. A line without operands is the
//! bare mnemonic. The listing is compared byte-for-byte by golden tests.

use std::fmt::{self, Write as _};

use crate::instruction::{Instruction, Operands, SpecialInstruction};

/// Width of the mnemonic column
pub const MNEMONIC_WIDTH: usize = 16;

/// Spaces between the mnemonic column and the operands
pub const GUTTER: &str = "  ";

/// Label printed for unrecognized tags
pub const UNKNOWN_LABEL: &str = "UNKNOWN";

/// Render one instruction as a listing line
pub fn format(instruction: &Instruction) -> String {
    instruction.to_string()
}

fn operands(instruction: &Instruction) -> String {
    use SpecialInstruction as S;

    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = match *instruction {
        Instruction::Simple { operands, .. } => match operands {
            Operands::Addr0 => Ok(()),
            Operands::Addr1 { index } => write!(out, "{index}"),
            Operands::Addr2 { dst, src } => write!(out, "{dst} {src}"),
            Operands::Addr3 { dst, src1, src2 } => write!(out, "{dst} {src1} {src2}"),
        },
        Instruction::Special { instruction } => match instruction {
            S::Array { retval, length } => write!(out, "{retval} {length}"),
            S::Jump { offset } | S::TryEnd { offset } => write!(out, "{offset}"),
            S::CondJumpTrue { cond, offset } | S::CondJumpFalse { cond, offset } => {
                write!(out, "{cond} {offset}")
            }
            S::EqualJump {
                value1,
                value2,
                offset,
            } => write!(out, "{value1} {value2} {offset}"),
            S::TestJumpTrue {
                retval,
                value,
                offset,
            }
            | S::TestJumpFalse {
                retval,
                value,
                offset,
            } => write!(out, "{retval} {value} {offset}"),
            S::FunctionFrame { name, nargs, ctor } => {
                write!(out, "{name} {nargs}{}", ctor_marker(ctor))
            }
            S::MethodFrame {
                object,
                method,
                nargs,
                ctor,
            } => write!(out, "{object} {method} {nargs}{}", ctor_marker(ctor)),
            S::PropertyForeach {
                next,
                object,
                offset,
            } => write!(out, "{next} {object} {offset}"),
            S::PropertyNext {
                retval,
                object,
                next,
                offset,
            } => write!(out, "{retval} {object} {next} {offset}"),
            S::TryStart { value, offset } => write!(out, "{value} {offset}"),
            S::Catch { exception, offset } => write!(out, "{exception} {offset}"),
            S::Unknown { raw_tag } => write!(out, "0x{raw_tag:02X}"),
        },
    };

    out
}

fn ctor_marker(ctor: bool) -> &'static str {
    if ctor { " CTOR" } else { "" }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mnemonic = if self.is_unknown() {
            UNKNOWN_LABEL
        } else {
            self.mnemonic()
        };

        let operands = operands(self);
        if operands.is_empty() {
            f.write_str(mnemonic)
        } else {
            write!(
                f,
                "{:<width$}{}{}",
                mnemonic,
                GUTTER,
                operands,
                width = MNEMONIC_WIDTH
            )
        }
    }
}
