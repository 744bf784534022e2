//! Shape decoder
//!
//! Turns the bytes of one code unit into [`Instruction`]s. Special forms are
//! matched first, then the catalog; anything else decodes as
//! [`SpecialInstruction::Unknown`] and consumes only its tag byte, so the
//! cursor always moves forward.
//!
//! Before reading an instruction the decoder checks that its full encoded
//! size fits before `end`. No byte at or past `end` is ever touched.

use crate::TAG_SIZE;
use crate::catalog::{self, AddressingShape};
use crate::error::{BytecodeError, Result};
use crate::instruction::{Instruction, Opcode, Operands, SpecialInstruction};
use crate::operand::{JumpOffset, Slot};

/// Little-endian field reader over the bytes of one instruction
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
    /// Buffer offset of `bytes[0]`, for error reporting
    base: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8], base: usize) -> Self {
        Self {
            bytes,
            pos: 0,
            base,
        }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        let field = self
            .bytes
            .get(self.pos..self.pos + N)
            .and_then(|s| <[u8; N]>::try_from(s).ok())
            .ok_or(BytecodeError::Truncated {
                offset: self.base,
                needed: self.pos + N,
                available: self.bytes.len(),
            })?;
        self.pos += N;
        Ok(field)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take::<1>()?[0])
    }

    fn u32(&mut self) -> Result<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn slot(&mut self) -> Result<Slot> {
        self.u32().map(Slot::new)
    }

    fn offset(&mut self) -> Result<JumpOffset> {
        self.take().map(i32::from_le_bytes).map(JumpOffset::new)
    }

    fn flag(&mut self) -> Result<bool> {
        self.u8().map(|b| b != 0)
    }
}

/// Decode one instruction at `cursor`
///
/// Returns the instruction and the cursor just past it. `end` is the
/// exclusive bound of the current code unit (clamped to the buffer length).
/// Fails only with [`BytecodeError::Truncated`], when the instruction about
/// to be read does not fit before `end`.
pub fn decode_one(code: &[u8], cursor: usize, end: usize) -> Result<(Instruction, usize)> {
    let end = end.min(code.len());
    let available = end.saturating_sub(cursor);

    if available < TAG_SIZE {
        return Err(BytecodeError::Truncated {
            offset: cursor,
            needed: TAG_SIZE,
            available,
        });
    }

    let tag = code[cursor];

    let (size, decoded) = match Opcode::from_byte(tag) {
        Some(op) => match (op.special_size(), catalog::lookup(op)) {
            (Some(size), _) => (size, Decoded::Special(op)),
            (None, Some(entry)) => (entry.size, Decoded::Simple(entry)),
            (None, None) => (TAG_SIZE, Decoded::Unknown),
        },
        None => (TAG_SIZE, Decoded::Unknown),
    };

    if size > available {
        return Err(BytecodeError::Truncated {
            offset: cursor,
            needed: size,
            available,
        });
    }

    let mut r = Reader::new(&code[cursor + TAG_SIZE..cursor + size], cursor);

    let instruction = match decoded {
        Decoded::Special(op) => Instruction::from(decode_special(op, &mut r)?),
        Decoded::Simple(entry) => Instruction::Simple {
            entry,
            operands: decode_operands(entry.shape, &mut r)?,
        },
        Decoded::Unknown => Instruction::from(SpecialInstruction::Unknown { raw_tag: tag }),
    };

    Ok((instruction, cursor + size))
}

enum Decoded {
    Special(Opcode),
    Simple(&'static catalog::CatalogEntry),
    Unknown,
}

fn decode_operands(shape: AddressingShape, r: &mut Reader<'_>) -> Result<Operands> {
    Ok(match shape {
        AddressingShape::Addr0 => Operands::Addr0,
        AddressingShape::Addr1 => Operands::Addr1 { index: r.slot()? },
        AddressingShape::Addr2 => Operands::Addr2 {
            dst: r.slot()?,
            src: r.slot()?,
        },
        AddressingShape::Addr3 => Operands::Addr3 {
            dst: r.slot()?,
            src1: r.slot()?,
            src2: r.slot()?,
        },
    })
}

fn decode_special(op: Opcode, r: &mut Reader<'_>) -> Result<SpecialInstruction> {
    use SpecialInstruction as S;

    Ok(match op {
        Opcode::Array => S::Array {
            retval: r.slot()?,
            length: r.u32()?,
        },
        Opcode::Jump => S::Jump {
            offset: r.offset()?,
        },
        Opcode::IfTrueJump => S::CondJumpTrue {
            cond: r.slot()?,
            offset: r.offset()?,
        },
        Opcode::IfFalseJump => S::CondJumpFalse {
            cond: r.slot()?,
            offset: r.offset()?,
        },
        Opcode::IfEqualJump => S::EqualJump {
            value1: r.slot()?,
            value2: r.slot()?,
            offset: r.offset()?,
        },
        Opcode::TestIfTrue => S::TestJumpTrue {
            retval: r.slot()?,
            value: r.slot()?,
            offset: r.offset()?,
        },
        Opcode::TestIfFalse => S::TestJumpFalse {
            retval: r.slot()?,
            value: r.slot()?,
            offset: r.offset()?,
        },
        Opcode::FunctionFrame => {
            let ctor = r.flag()?;
            S::FunctionFrame {
                name: r.slot()?,
                nargs: r.u32()?,
                ctor,
            }
        }
        Opcode::MethodFrame => {
            let ctor = r.flag()?;
            S::MethodFrame {
                object: r.slot()?,
                method: r.slot()?,
                nargs: r.u32()?,
                ctor,
            }
        }
        Opcode::PropertyForeach => S::PropertyForeach {
            next: r.slot()?,
            object: r.slot()?,
            offset: r.offset()?,
        },
        Opcode::PropertyNext => S::PropertyNext {
            retval: r.slot()?,
            object: r.slot()?,
            next: r.slot()?,
            offset: r.offset()?,
        },
        Opcode::TryStart => S::TryStart {
            value: r.slot()?,
            offset: r.offset()?,
        },
        Opcode::Catch => S::Catch {
            exception: r.slot()?,
            offset: r.offset()?,
        },
        Opcode::TryEnd => S::TryEnd {
            offset: r.offset()?,
        },
        other => unreachable!("{} has no special form", other.name()),
    })
}

/// Iterator over the instructions of one code unit
///
/// Yields `(offset, instruction)` pairs. After a truncation error it yields
/// the error once and then stops.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    code: &'a [u8],
    cursor: usize,
    end: usize,
    done: bool,
}

impl<'a> Decoder<'a> {
    /// Decode `code[start..end]`
    pub fn new(code: &'a [u8], start: usize, end: usize) -> Self {
        Self {
            code,
            cursor: start,
            end: end.min(code.len()),
            done: false,
        }
    }

    /// Offset of the next instruction
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Whether the cursor reached the unit end exactly
    pub fn is_complete(&self) -> bool {
        self.cursor == self.end
    }
}

impl Iterator for Decoder<'_> {
    type Item = Result<(usize, Instruction)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.cursor >= self.end {
            return None;
        }

        match decode_one(self.code, self.cursor, self.end) {
            Ok((instruction, next)) => {
                let at = self.cursor;
                self.cursor = next;
                Some(Ok((at, instruction)))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
