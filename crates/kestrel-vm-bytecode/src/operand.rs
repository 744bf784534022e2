//! Bytecode operands

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque index into the interpreter's value storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Slot(pub u32);

impl Slot {
    /// Encoded width in bytes
    pub const SIZE: usize = 4;

    /// Create a new slot
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get slot index
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl From<u32> for Slot {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}

/// Jump offset (signed, relative to the instruction start)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct JumpOffset(pub i32);

impl JumpOffset {
    /// Encoded width in bytes
    pub const SIZE: usize = 4;

    /// Create a new jump offset
    #[inline]
    pub const fn new(offset: i32) -> Self {
        Self(offset)
    }

    /// Get offset value
    #[inline]
    pub const fn offset(self) -> i32 {
        self.0
    }
}

impl From<i32> for JumpOffset {
    fn from(offset: i32) -> Self {
        Self(offset)
    }
}

impl fmt::Display for JumpOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 >= 0 {
            write!(f, "+{}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot() {
        let s = Slot::new(5);
        assert_eq!(s.index(), 5);
        assert_eq!(s.to_string(), "0005");
        assert_eq!(Slot::new(0x1_2345).to_string(), "12345");
    }

    #[test]
    fn test_jump_offset_sign() {
        assert_eq!(JumpOffset::new(4).to_string(), "+4");
        assert_eq!(JumpOffset::new(0).to_string(), "+0");
        assert_eq!(JumpOffset::new(-3).to_string(), "-3");
        assert_eq!(JumpOffset::new(i32::MIN).to_string(), "-2147483648");
    }
}
