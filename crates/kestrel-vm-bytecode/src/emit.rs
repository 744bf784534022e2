//! In-memory instruction emitter
//!
//! Writes instructions in the wire layout the decoder reads. Used to build
//! buffers for tests and demos; it does not persist anything.

use crate::catalog;
use crate::error::{BytecodeError, Result};
use crate::instruction::{Instruction, Opcode, Operands, SpecialInstruction};
use crate::module::CodeUnit;
use crate::operand::{JumpOffset, Slot};

/// Bytecode buffer builder
#[derive(Debug, Default)]
pub struct Emitter {
    code: Vec<u8>,
    units: Vec<CodeUnit>,
    unit_start: Option<usize>,
}

impl Emitter {
    /// Create an empty emitter
    pub fn new() -> Self {
        Self::default()
    }

    /// Current length of the buffer
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Whether nothing has been emitted
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Start a code unit at the current position, closing any open one
    pub fn begin_unit(&mut self) -> &mut Self {
        self.end_unit();
        self.unit_start = Some(self.code.len());
        self
    }

    /// Close the open code unit, if any
    pub fn end_unit(&mut self) -> Option<CodeUnit> {
        let start = self.unit_start.take()?;
        let unit = CodeUnit::new(start, self.code.len());
        self.units.push(unit);
        Some(unit)
    }

    /// Emit a catalog instruction
    pub fn simple(&mut self, opcode: Opcode, operands: Operands) -> Result<&mut Self> {
        let entry = catalog::lookup(opcode).ok_or(BytecodeError::InvalidOpcode(opcode.to_byte()))?;

        if entry.shape != operands.shape() {
            return Err(BytecodeError::ShapeMismatch {
                opcode,
                expected: entry.shape,
                actual: operands.shape(),
            });
        }

        self.code.push(opcode.to_byte());
        for slot in operands.slots() {
            self.slot(slot);
        }
        Ok(self)
    }

    /// Emit a no-operand catalog instruction
    pub fn addr0(&mut self, opcode: Opcode) -> Result<&mut Self> {
        self.simple(opcode, Operands::Addr0)
    }

    /// Emit a one-slot catalog instruction
    pub fn addr1(&mut self, opcode: Opcode, index: u32) -> Result<&mut Self> {
        self.simple(opcode, Operands::Addr1 { index: Slot(index) })
    }

    /// Emit a two-slot catalog instruction
    pub fn addr2(&mut self, opcode: Opcode, dst: u32, src: u32) -> Result<&mut Self> {
        self.simple(
            opcode,
            Operands::Addr2 {
                dst: Slot(dst),
                src: Slot(src),
            },
        )
    }

    /// Emit a three-slot catalog instruction
    pub fn addr3(&mut self, opcode: Opcode, dst: u32, src1: u32, src2: u32) -> Result<&mut Self> {
        self.simple(
            opcode,
            Operands::Addr3 {
                dst: Slot(dst),
                src1: Slot(src1),
                src2: Slot(src2),
            },
        )
    }

    /// Emit a special instruction
    ///
    /// `Unknown` writes its raw tag byte alone.
    pub fn special(&mut self, instruction: SpecialInstruction) -> &mut Self {
        use SpecialInstruction as S;

        match instruction.opcode() {
            Some(op) => self.code.push(op.to_byte()),
            None => {
                if let S::Unknown { raw_tag } = instruction {
                    self.code.push(raw_tag);
                }
                return self;
            }
        }

        match instruction {
            S::Array { retval, length } => {
                self.slot(retval).u32(length);
            }
            S::Jump { offset } | S::TryEnd { offset } => {
                self.offset(offset);
            }
            S::CondJumpTrue { cond, offset } | S::CondJumpFalse { cond, offset } => {
                self.slot(cond).offset(offset);
            }
            S::EqualJump {
                value1,
                value2,
                offset,
            } => {
                self.slot(value1).slot(value2).offset(offset);
            }
            S::TestJumpTrue {
                retval,
                value,
                offset,
            }
            | S::TestJumpFalse {
                retval,
                value,
                offset,
            } => {
                self.slot(retval).slot(value).offset(offset);
            }
            S::FunctionFrame { name, nargs, ctor } => {
                self.flag(ctor).slot(name).u32(nargs);
            }
            S::MethodFrame {
                object,
                method,
                nargs,
                ctor,
            } => {
                self.flag(ctor).slot(object).slot(method).u32(nargs);
            }
            S::PropertyForeach {
                next,
                object,
                offset,
            } => {
                self.slot(next).slot(object).offset(offset);
            }
            S::PropertyNext {
                retval,
                object,
                next,
                offset,
            } => {
                self.slot(retval).slot(object).slot(next).offset(offset);
            }
            S::TryStart { value, offset } => {
                self.slot(value).offset(offset);
            }
            S::Catch { exception, offset } => {
                self.slot(exception).offset(offset);
            }
            S::Unknown { .. } => {}
        }

        self
    }

    /// Emit any decoded instruction
    pub fn instruction(&mut self, instruction: &Instruction) -> Result<&mut Self> {
        match *instruction {
            Instruction::Simple { entry, operands } => self.simple(entry.opcode, operands),
            Instruction::Special { instruction } => Ok(self.special(instruction)),
        }
    }

    /// Append raw bytes
    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.code.extend_from_slice(bytes);
        self
    }

    /// Take the buffer
    pub fn into_code(self) -> Vec<u8> {
        self.code
    }

    /// Take the buffer and the recorded units, closing any open unit
    pub fn finish(mut self) -> (Vec<u8>, Vec<CodeUnit>) {
        self.end_unit();
        (self.code, self.units)
    }

    fn slot(&mut self, slot: Slot) -> &mut Self {
        self.u32(slot.index())
    }

    fn offset(&mut self, offset: JumpOffset) -> &mut Self {
        self.code.extend_from_slice(&offset.offset().to_le_bytes());
        self
    }

    fn u32(&mut self, value: u32) -> &mut Self {
        self.code.extend_from_slice(&value.to_le_bytes());
        self
    }

    fn flag(&mut self, value: bool) -> &mut Self {
        self.code.push(u8::from(value));
        self
    }
}
