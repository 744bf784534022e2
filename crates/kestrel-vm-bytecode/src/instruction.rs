//! Bytecode instructions (opcodes)

use serde::{Deserialize, Serialize};

use crate::TAG_SIZE;
use crate::catalog::{AddressingShape, CatalogEntry};
use crate::operand::{JumpOffset, Slot};

/// Bytecode opcodes
///
/// Every instruction starts with one tag byte. Most instructions use one of
/// the uniform addressing shapes recorded in the catalog; control flow, call
/// frames, property iteration and exception regions have their own layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Opcode {
    // ==================== Objects ====================
    /// Create empty object: retval = {}
    Object = 0x01,
    /// Create closure: retval = function(lambda)
    Function = 0x02,
    /// Create regular expression: retval = /pattern/
    Regexp = 0x03,
    /// Copy object: retval = copy(object)
    ObjectCopy = 0x04,
    /// Create array: retval = new Array(length)
    Array = 0x05,

    // ==================== Properties ====================
    /// Get property: value = object\[property\]
    PropertyGet = 0x10,
    /// Set property: object\[property\] = value
    PropertySet = 0x11,
    /// in operator: retval = property in object
    PropertyIn = 0x12,
    /// delete operator on a property
    PropertyDelete = 0x13,
    /// instanceof operator
    InstanceOf = 0x14,
    /// Start for-in enumeration
    PropertyForeach = 0x15,
    /// Advance for-in enumeration
    PropertyNext = 0x16,

    // ==================== Calls ====================
    /// Set up a function call frame
    FunctionFrame = 0x20,
    /// Set up a method call frame
    MethodFrame = 0x21,
    /// Call the prepared frame
    FunctionCall = 0x22,
    /// Return value from function
    Return = 0x23,
    /// Stop the global code
    Stop = 0x24,

    // ==================== Increment/Decrement ====================
    /// Prefix increment
    Increment = 0x30,
    /// Prefix decrement
    Decrement = 0x31,
    /// Postfix increment
    PostIncrement = 0x32,
    /// Postfix decrement
    PostDecrement = 0x33,

    // ==================== Unary ====================
    /// delete operator on a reference
    Delete = 0x38,
    /// void operator
    Void = 0x39,
    /// typeof operator
    TypeOf = 0x3A,
    /// Unary plus
    UnaryPlus = 0x3B,
    /// Unary negation
    UnaryNegation = 0x3C,

    // ==================== Arithmetic ====================
    /// dst = src1 + src2
    Addition = 0x40,
    /// dst = src1 - src2
    Substraction = 0x41,
    /// dst = src1 * src2
    Multiplication = 0x42,
    /// dst = src1 / src2
    Division = 0x43,
    /// dst = src1 % src2
    Remainder = 0x44,

    // ==================== Shifts ====================
    /// dst = src1 << src2
    LeftShift = 0x48,
    /// dst = src1 >> src2
    RightShift = 0x49,
    /// dst = src1 >>> src2
    UnsignedRightShift = 0x4A,

    // ==================== Logical/Bitwise ====================
    /// dst = !src
    LogicalNot = 0x50,
    /// dst = ~src
    BitwiseNot = 0x51,
    /// dst = src1 & src2
    BitwiseAnd = 0x52,
    /// dst = src1 ^ src2
    BitwiseXor = 0x53,
    /// dst = src1 | src2
    BitwiseOr = 0x54,

    // ==================== Comparison ====================
    /// dst = src1 == src2
    Equal = 0x60,
    /// dst = src1 != src2
    NotEqual = 0x61,
    /// dst = src1 < src2
    Less = 0x62,
    /// dst = src1 <= src2
    LessOrEqual = 0x63,
    /// dst = src1 > src2
    Greater = 0x64,
    /// dst = src1 >= src2
    GreaterOrEqual = 0x65,
    /// dst = src1 === src2
    StrictEqual = 0x66,
    /// dst = src1 !== src2
    StrictNotEqual = 0x67,

    // ==================== Misc ====================
    /// dst = src
    Move = 0x70,
    /// Validate that a slot holds a value
    Validate = 0x71,

    // ==================== Control Flow ====================
    /// Unconditional jump
    Jump = 0x80,
    /// Jump if true
    IfTrueJump = 0x81,
    /// Jump if false
    IfFalseJump = 0x82,
    /// Jump if two values are equal
    IfEqualJump = 0x83,
    /// Store value, jump if true
    TestIfTrue = 0x84,
    /// Store value, jump if false
    TestIfFalse = 0x85,

    // ==================== Exception Handling ====================
    /// Begin try block
    TryStart = 0xA0,
    /// Catch exception into slot
    Catch = 0xA1,
    /// End try block
    TryEnd = 0xA2,
    /// Throw exception
    Throw = 0xA3,
    /// Run finally continuation
    Finally = 0xA4,
}

impl Opcode {
    /// Every opcode, in tag order
    pub const ALL: [Opcode; 60] = [
        Self::Object,
        Self::Function,
        Self::Regexp,
        Self::ObjectCopy,
        Self::Array,
        Self::PropertyGet,
        Self::PropertySet,
        Self::PropertyIn,
        Self::PropertyDelete,
        Self::InstanceOf,
        Self::PropertyForeach,
        Self::PropertyNext,
        Self::FunctionFrame,
        Self::MethodFrame,
        Self::FunctionCall,
        Self::Return,
        Self::Stop,
        Self::Increment,
        Self::Decrement,
        Self::PostIncrement,
        Self::PostDecrement,
        Self::Delete,
        Self::Void,
        Self::TypeOf,
        Self::UnaryPlus,
        Self::UnaryNegation,
        Self::Addition,
        Self::Substraction,
        Self::Multiplication,
        Self::Division,
        Self::Remainder,
        Self::LeftShift,
        Self::RightShift,
        Self::UnsignedRightShift,
        Self::LogicalNot,
        Self::BitwiseNot,
        Self::BitwiseAnd,
        Self::BitwiseXor,
        Self::BitwiseOr,
        Self::Equal,
        Self::NotEqual,
        Self::Less,
        Self::LessOrEqual,
        Self::Greater,
        Self::GreaterOrEqual,
        Self::StrictEqual,
        Self::StrictNotEqual,
        Self::Move,
        Self::Validate,
        Self::Jump,
        Self::IfTrueJump,
        Self::IfFalseJump,
        Self::IfEqualJump,
        Self::TestIfTrue,
        Self::TestIfFalse,
        Self::TryStart,
        Self::Catch,
        Self::TryEnd,
        Self::Throw,
        Self::Finally,
    ];

    /// Decode a tag byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Self::Object),
            0x02 => Some(Self::Function),
            0x03 => Some(Self::Regexp),
            0x04 => Some(Self::ObjectCopy),
            0x05 => Some(Self::Array),

            0x10 => Some(Self::PropertyGet),
            0x11 => Some(Self::PropertySet),
            0x12 => Some(Self::PropertyIn),
            0x13 => Some(Self::PropertyDelete),
            0x14 => Some(Self::InstanceOf),
            0x15 => Some(Self::PropertyForeach),
            0x16 => Some(Self::PropertyNext),

            0x20 => Some(Self::FunctionFrame),
            0x21 => Some(Self::MethodFrame),
            0x22 => Some(Self::FunctionCall),
            0x23 => Some(Self::Return),
            0x24 => Some(Self::Stop),

            0x30 => Some(Self::Increment),
            0x31 => Some(Self::Decrement),
            0x32 => Some(Self::PostIncrement),
            0x33 => Some(Self::PostDecrement),

            0x38 => Some(Self::Delete),
            0x39 => Some(Self::Void),
            0x3A => Some(Self::TypeOf),
            0x3B => Some(Self::UnaryPlus),
            0x3C => Some(Self::UnaryNegation),

            0x40 => Some(Self::Addition),
            0x41 => Some(Self::Substraction),
            0x42 => Some(Self::Multiplication),
            0x43 => Some(Self::Division),
            0x44 => Some(Self::Remainder),

            0x48 => Some(Self::LeftShift),
            0x49 => Some(Self::RightShift),
            0x4A => Some(Self::UnsignedRightShift),

            0x50 => Some(Self::LogicalNot),
            0x51 => Some(Self::BitwiseNot),
            0x52 => Some(Self::BitwiseAnd),
            0x53 => Some(Self::BitwiseXor),
            0x54 => Some(Self::BitwiseOr),

            0x60 => Some(Self::Equal),
            0x61 => Some(Self::NotEqual),
            0x62 => Some(Self::Less),
            0x63 => Some(Self::LessOrEqual),
            0x64 => Some(Self::Greater),
            0x65 => Some(Self::GreaterOrEqual),
            0x66 => Some(Self::StrictEqual),
            0x67 => Some(Self::StrictNotEqual),

            0x70 => Some(Self::Move),
            0x71 => Some(Self::Validate),

            0x80 => Some(Self::Jump),
            0x81 => Some(Self::IfTrueJump),
            0x82 => Some(Self::IfFalseJump),
            0x83 => Some(Self::IfEqualJump),
            0x84 => Some(Self::TestIfTrue),
            0x85 => Some(Self::TestIfFalse),

            0xA0 => Some(Self::TryStart),
            0xA1 => Some(Self::Catch),
            0xA2 => Some(Self::TryEnd),
            0xA3 => Some(Self::Throw),
            0xA4 => Some(Self::Finally),

            _ => None,
        }
    }

    /// Encode as a tag byte
    #[inline]
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Display mnemonic, unpadded
    pub const fn name(self) -> &'static str {
        match self {
            // Objects
            Self::Object => "OBJECT",
            Self::Function => "FUNCTION",
            Self::Regexp => "REGEXP",
            Self::ObjectCopy => "OBJECT COPY",
            Self::Array => "ARRAY",
            // Properties
            Self::PropertyGet => "PROPERTY GET",
            Self::PropertySet => "PROPERTY SET",
            Self::PropertyIn => "PROPERTY IN",
            Self::PropertyDelete => "PROPERTY DELETE",
            Self::InstanceOf => "INSTANCE OF",
            Self::PropertyForeach => "PROPERTY FOREACH",
            Self::PropertyNext => "PROPERTY NEXT",
            // Calls
            Self::FunctionFrame => "FUNCTION FRAME",
            Self::MethodFrame => "METHOD FRAME",
            Self::FunctionCall => "FUNCTION CALL",
            Self::Return => "RETURN",
            Self::Stop => "STOP",
            // Increment/decrement
            Self::Increment => "INC",
            Self::Decrement => "DEC",
            Self::PostIncrement => "POST INC",
            Self::PostDecrement => "POST DEC",
            // Unary
            Self::Delete => "DELETE",
            Self::Void => "VOID",
            Self::TypeOf => "TYPEOF",
            Self::UnaryPlus => "PLUS",
            Self::UnaryNegation => "NEGATION",
            // Arithmetic
            Self::Addition => "ADD",
            Self::Substraction => "SUBSTRACT",
            Self::Multiplication => "MULTIPLY",
            Self::Division => "DIVIDE",
            Self::Remainder => "REMAINDER",
            // Shifts
            Self::LeftShift => "LEFT SHIFT",
            Self::RightShift => "RIGHT SHIFT",
            Self::UnsignedRightShift => "USGN RIGHT SHIFT",
            // Logical/bitwise
            Self::LogicalNot => "LOGICAL NOT",
            Self::BitwiseNot => "BINARY NOT",
            Self::BitwiseAnd => "BINARY AND",
            Self::BitwiseXor => "BINARY XOR",
            Self::BitwiseOr => "BINARY OR",
            // Comparison
            Self::Equal => "EQUAL",
            Self::NotEqual => "NOT EQUAL",
            Self::Less => "LESS",
            Self::LessOrEqual => "LESS OR EQUAL",
            Self::Greater => "GREATER",
            Self::GreaterOrEqual => "GREATER OR EQUAL",
            Self::StrictEqual => "STRICT EQUAL",
            Self::StrictNotEqual => "STRICT NOT EQUAL",
            // Misc
            Self::Move => "MOVE",
            Self::Validate => "VALIDATE",
            // Control flow
            Self::Jump => "JUMP",
            Self::IfTrueJump => "JUMP IF TRUE",
            Self::IfFalseJump => "JUMP IF FALSE",
            Self::IfEqualJump => "JUMP IF EQUAL",
            Self::TestIfTrue => "TEST IF TRUE",
            Self::TestIfFalse => "TEST IF FALSE",
            // Exception handling
            Self::TryStart => "TRY START",
            Self::Catch => "CATCH",
            Self::TryEnd => "TRY END",
            Self::Throw => "THROW",
            Self::Finally => "FINALLY",
        }
    }

    /// Whether this opcode has its own layout instead of a catalog shape
    pub const fn is_special(self) -> bool {
        matches!(
            self,
            Self::Array
                | Self::Jump
                | Self::IfTrueJump
                | Self::IfFalseJump
                | Self::IfEqualJump
                | Self::TestIfTrue
                | Self::TestIfFalse
                | Self::FunctionFrame
                | Self::MethodFrame
                | Self::PropertyForeach
                | Self::PropertyNext
                | Self::TryStart
                | Self::Catch
                | Self::TryEnd
        )
    }

    /// Encoded size of a special instruction, tag included
    pub const fn special_size(self) -> Option<usize> {
        const S: usize = Slot::SIZE;
        const O: usize = JumpOffset::SIZE;
        const N: usize = 4;

        let body = match self {
            Self::Array => S + N,
            Self::Jump => O,
            Self::IfTrueJump | Self::IfFalseJump => S + O,
            Self::IfEqualJump => 2 * S + O,
            Self::TestIfTrue | Self::TestIfFalse => 2 * S + O,
            Self::FunctionFrame => 1 + S + N,
            Self::MethodFrame => 1 + 2 * S + N,
            Self::PropertyForeach => 2 * S + O,
            Self::PropertyNext => 3 * S + O,
            Self::TryStart | Self::Catch => S + O,
            Self::TryEnd => O,
            _ => return None,
        };

        Some(TAG_SIZE + body)
    }
}

/// Operands of a catalog instruction, one variant per addressing shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape")]
pub enum Operands {
    /// No operands
    Addr0,
    /// One slot
    Addr1 {
        /// Slot index
        index: Slot,
    },
    /// Destination and source
    Addr2 {
        /// Destination slot
        dst: Slot,
        /// Source slot
        src: Slot,
    },
    /// Destination and two sources
    Addr3 {
        /// Destination slot
        dst: Slot,
        /// First source slot
        src1: Slot,
        /// Second source slot
        src2: Slot,
    },
}

impl Operands {
    /// Addressing shape of these operands
    pub const fn shape(&self) -> AddressingShape {
        match self {
            Self::Addr0 => AddressingShape::Addr0,
            Self::Addr1 { .. } => AddressingShape::Addr1,
            Self::Addr2 { .. } => AddressingShape::Addr2,
            Self::Addr3 { .. } => AddressingShape::Addr3,
        }
    }

    /// Slots in field order
    pub fn slots(&self) -> Vec<Slot> {
        match *self {
            Self::Addr0 => Vec::new(),
            Self::Addr1 { index } => vec![index],
            Self::Addr2 { dst, src } => vec![dst, src],
            Self::Addr3 { dst, src1, src2 } => vec![dst, src1, src2],
        }
    }
}

/// Instructions whose layout does not follow a catalog shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op")]
#[allow(missing_docs)]
pub enum SpecialInstruction {
    Array {
        retval: Slot,
        length: u32,
    },
    Jump {
        offset: JumpOffset,
    },
    CondJumpTrue {
        cond: Slot,
        offset: JumpOffset,
    },
    CondJumpFalse {
        cond: Slot,
        offset: JumpOffset,
    },
    EqualJump {
        value1: Slot,
        value2: Slot,
        offset: JumpOffset,
    },
    /// Store `value` into `retval`; branch when it tests true
    TestJumpTrue {
        retval: Slot,
        value: Slot,
        offset: JumpOffset,
    },
    /// Store `value` into `retval`; branch when it tests false
    TestJumpFalse {
        retval: Slot,
        value: Slot,
        offset: JumpOffset,
    },
    FunctionFrame {
        name: Slot,
        nargs: u32,
        ctor: bool,
    },
    MethodFrame {
        object: Slot,
        method: Slot,
        nargs: u32,
        ctor: bool,
    },
    /// Begin enumerating `object`; iterator state lives in `next`
    PropertyForeach {
        next: Slot,
        object: Slot,
        offset: JumpOffset,
    },
    PropertyNext {
        retval: Slot,
        object: Slot,
        next: Slot,
        offset: JumpOffset,
    },
    TryStart {
        value: Slot,
        offset: JumpOffset,
    },
    Catch {
        exception: Slot,
        offset: JumpOffset,
    },
    TryEnd {
        offset: JumpOffset,
    },
    /// Tag byte that names no known opcode
    Unknown {
        raw_tag: u8,
    },
}

impl SpecialInstruction {
    /// Opcode of this instruction, `None` for unrecognized tags
    pub const fn opcode(&self) -> Option<Opcode> {
        Some(match self {
            Self::Array { .. } => Opcode::Array,
            Self::Jump { .. } => Opcode::Jump,
            Self::CondJumpTrue { .. } => Opcode::IfTrueJump,
            Self::CondJumpFalse { .. } => Opcode::IfFalseJump,
            Self::EqualJump { .. } => Opcode::IfEqualJump,
            Self::TestJumpTrue { .. } => Opcode::TestIfTrue,
            Self::TestJumpFalse { .. } => Opcode::TestIfFalse,
            Self::FunctionFrame { .. } => Opcode::FunctionFrame,
            Self::MethodFrame { .. } => Opcode::MethodFrame,
            Self::PropertyForeach { .. } => Opcode::PropertyForeach,
            Self::PropertyNext { .. } => Opcode::PropertyNext,
            Self::TryStart { .. } => Opcode::TryStart,
            Self::Catch { .. } => Opcode::Catch,
            Self::TryEnd { .. } => Opcode::TryEnd,
            Self::Unknown { .. } => return None,
        })
    }

    /// Encoded size in bytes; an unknown tag only accounts for itself
    pub const fn size(&self) -> usize {
        match self.opcode() {
            Some(op) => match op.special_size() {
                Some(size) => size,
                None => TAG_SIZE,
            },
            None => TAG_SIZE,
        }
    }

    /// Branch offset carried by the instruction, if any
    pub const fn offset(&self) -> Option<JumpOffset> {
        match *self {
            Self::Jump { offset }
            | Self::CondJumpTrue { offset, .. }
            | Self::CondJumpFalse { offset, .. }
            | Self::EqualJump { offset, .. }
            | Self::TestJumpTrue { offset, .. }
            | Self::TestJumpFalse { offset, .. }
            | Self::PropertyForeach { offset, .. }
            | Self::PropertyNext { offset, .. }
            | Self::TryStart { offset, .. }
            | Self::Catch { offset, .. }
            | Self::TryEnd { offset } => Some(offset),
            Self::Array { .. }
            | Self::FunctionFrame { .. }
            | Self::MethodFrame { .. }
            | Self::Unknown { .. } => None,
        }
    }
}

/// A decoded instruction
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Instruction {
    /// Uniformly addressed instruction described by a catalog entry
    Simple {
        /// Catalog entry that matched the tag
        entry: &'static CatalogEntry,
        /// Operands read per the entry's shape
        operands: Operands,
    },
    /// Instruction with its own layout
    Special {
        /// Decoded fields
        instruction: SpecialInstruction,
    },
}

impl Instruction {
    /// Opcode of this instruction, `None` for unrecognized tags
    pub const fn opcode(&self) -> Option<Opcode> {
        match self {
            Self::Simple { entry, .. } => Some(entry.opcode),
            Self::Special { instruction } => instruction.opcode(),
        }
    }

    /// Display mnemonic, unpadded
    pub const fn mnemonic(&self) -> &'static str {
        match self.opcode() {
            Some(op) => op.name(),
            None => "UNKNOWN",
        }
    }

    /// Bytes consumed by this instruction
    pub const fn size(&self) -> usize {
        match self {
            Self::Simple { entry, .. } => entry.size,
            Self::Special { instruction } => instruction.size(),
        }
    }

    /// Whether the tag was not recognized
    pub const fn is_unknown(&self) -> bool {
        matches!(
            self,
            Self::Special {
                instruction: SpecialInstruction::Unknown { .. }
            }
        )
    }
}

impl From<SpecialInstruction> for Instruction {
    fn from(instruction: SpecialInstruction) -> Self {
        Self::Special { instruction }
    }
}
