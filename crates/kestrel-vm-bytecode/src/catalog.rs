//! Instruction catalog
//!
//! Static table of the uniformly addressed instructions. Each entry records
//! the display name, encoded size and addressing shape of one opcode; the
//! decoder reads operands from the shape alone, so adding an instruction of an
//! existing shape is a one-line change here.

use std::sync::LazyLock;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::TAG_SIZE;
use crate::instruction::Opcode;
use crate::operand::Slot;

/// Operand layout class of a catalog instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressingShape {
    /// No operands
    Addr0,
    /// One slot index
    Addr1,
    /// dst, src
    Addr2,
    /// dst, src1, src2
    Addr3,
}

impl AddressingShape {
    /// Number of slot operands
    pub const fn operand_count(self) -> usize {
        match self {
            Self::Addr0 => 0,
            Self::Addr1 => 1,
            Self::Addr2 => 2,
            Self::Addr3 => 3,
        }
    }

    /// Encoded size in bytes, tag included
    pub const fn size(self) -> usize {
        TAG_SIZE + self.operand_count() * Slot::SIZE
    }
}

/// One row of the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    /// Opcode this entry describes
    pub opcode: Opcode,
    /// Display name, unpadded
    pub name: &'static str,
    /// Encoded size in bytes, tag included
    pub size: usize,
    /// Operand layout
    pub shape: AddressingShape,
}

impl CatalogEntry {
    const fn new(opcode: Opcode, shape: AddressingShape) -> Self {
        Self {
            opcode,
            name: opcode.name(),
            size: shape.size(),
            shape,
        }
    }
}

use AddressingShape::{Addr0, Addr1, Addr2, Addr3};

/// The catalog, in display order
pub static CATALOG: [CatalogEntry; 46] = [
    CatalogEntry::new(Opcode::Object, Addr1),
    CatalogEntry::new(Opcode::Function, Addr2),
    CatalogEntry::new(Opcode::Regexp, Addr2),
    CatalogEntry::new(Opcode::ObjectCopy, Addr2),
    CatalogEntry::new(Opcode::PropertyGet, Addr3),
    CatalogEntry::new(Opcode::PropertySet, Addr3),
    CatalogEntry::new(Opcode::PropertyIn, Addr3),
    CatalogEntry::new(Opcode::PropertyDelete, Addr3),
    CatalogEntry::new(Opcode::InstanceOf, Addr3),
    CatalogEntry::new(Opcode::FunctionCall, Addr1),
    CatalogEntry::new(Opcode::Return, Addr1),
    CatalogEntry::new(Opcode::Stop, Addr0),
    CatalogEntry::new(Opcode::Increment, Addr3),
    CatalogEntry::new(Opcode::Decrement, Addr3),
    CatalogEntry::new(Opcode::PostIncrement, Addr3),
    CatalogEntry::new(Opcode::PostDecrement, Addr3),
    CatalogEntry::new(Opcode::Delete, Addr2),
    CatalogEntry::new(Opcode::Void, Addr2),
    CatalogEntry::new(Opcode::TypeOf, Addr2),
    CatalogEntry::new(Opcode::UnaryPlus, Addr2),
    CatalogEntry::new(Opcode::UnaryNegation, Addr2),
    CatalogEntry::new(Opcode::Addition, Addr3),
    CatalogEntry::new(Opcode::Substraction, Addr3),
    CatalogEntry::new(Opcode::Multiplication, Addr3),
    CatalogEntry::new(Opcode::Division, Addr3),
    CatalogEntry::new(Opcode::Remainder, Addr3),
    CatalogEntry::new(Opcode::LeftShift, Addr3),
    CatalogEntry::new(Opcode::RightShift, Addr3),
    CatalogEntry::new(Opcode::UnsignedRightShift, Addr3),
    CatalogEntry::new(Opcode::LogicalNot, Addr2),
    CatalogEntry::new(Opcode::BitwiseNot, Addr2),
    CatalogEntry::new(Opcode::BitwiseAnd, Addr3),
    CatalogEntry::new(Opcode::BitwiseXor, Addr3),
    CatalogEntry::new(Opcode::BitwiseOr, Addr3),
    CatalogEntry::new(Opcode::Equal, Addr3),
    CatalogEntry::new(Opcode::NotEqual, Addr3),
    CatalogEntry::new(Opcode::Less, Addr3),
    CatalogEntry::new(Opcode::LessOrEqual, Addr3),
    CatalogEntry::new(Opcode::Greater, Addr3),
    CatalogEntry::new(Opcode::GreaterOrEqual, Addr3),
    CatalogEntry::new(Opcode::StrictEqual, Addr3),
    CatalogEntry::new(Opcode::StrictNotEqual, Addr3),
    CatalogEntry::new(Opcode::Move, Addr2),
    CatalogEntry::new(Opcode::Validate, Addr1),
    CatalogEntry::new(Opcode::Throw, Addr1),
    CatalogEntry::new(Opcode::Finally, Addr1),
];

static INDEX: LazyLock<FxHashMap<Opcode, usize>> = LazyLock::new(|| {
    CATALOG
        .iter()
        .enumerate()
        .map(|(i, entry)| (entry.opcode, i))
        .collect()
});

/// Look up the catalog entry for an opcode
///
/// Special instructions have no entry.
pub fn lookup(opcode: Opcode) -> Option<&'static CatalogEntry> {
    INDEX.get(&opcode).map(|&i| &CATALOG[i])
}
