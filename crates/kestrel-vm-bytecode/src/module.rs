//! Code units and modules
//!
//! A module borrows the compiler's bytecode buffer and lists the byte range of
//! every compiled function body in display order.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{BytecodeError, Result};

/// Byte range `[start, end)` of one compiled function body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeUnit {
    /// First byte of the unit
    pub start: usize,
    /// One past the last byte of the unit
    pub end: usize,
}

impl CodeUnit {
    /// Create a new code unit
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length in bytes
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the unit holds no bytes
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The unit as a range
    pub const fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for CodeUnit {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

/// An ordered collection of code units over one shared buffer
#[derive(Debug, Clone)]
pub struct Module<'a> {
    code: &'a [u8],
    units: Vec<CodeUnit>,
}

impl<'a> Module<'a> {
    /// Create a module, checking that every unit lies inside `code`
    pub fn new(code: &'a [u8], units: impl IntoIterator<Item = CodeUnit>) -> Result<Self> {
        let units: Vec<CodeUnit> = units.into_iter().collect();

        for unit in &units {
            if unit.start > unit.end || unit.end > code.len() {
                return Err(BytecodeError::InvalidUnit {
                    start: unit.start,
                    end: unit.end,
                    len: code.len(),
                });
            }
        }

        Ok(Self { code, units })
    }

    /// A module with one unit spanning the whole buffer
    pub fn single(code: &'a [u8]) -> Self {
        Self {
            code,
            units: vec![CodeUnit::new(0, code.len())],
        }
    }

    /// The shared bytecode buffer
    pub fn code(&self) -> &'a [u8] {
        self.code
    }

    /// Code units in display order
    pub fn units(&self) -> &[CodeUnit] {
        &self.units
    }

    /// Get a unit by index
    pub fn unit(&self, index: usize) -> Option<&CodeUnit> {
        self.units.get(index)
    }

    /// Bytes of the unit at `index`
    pub fn unit_bytes(&self, index: usize) -> Option<&'a [u8]> {
        let unit = self.units.get(index)?;
        self.code.get(unit.range())
    }

    /// Number of units
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_validates_units() {
        let code = [0u8; 8];
        assert!(Module::new(&code, [CodeUnit::new(0, 4), CodeUnit::new(4, 8)]).is_ok());

        let err = Module::new(&code, [CodeUnit::new(2, 9)]).unwrap_err();
        assert!(matches!(
            err,
            BytecodeError::InvalidUnit {
                start: 2,
                end: 9,
                len: 8
            }
        ));

        assert!(Module::new(&code, [CodeUnit::new(5, 3)]).is_err());
    }

    #[test]
    fn test_single_unit() {
        let code = [1u8, 2, 3];
        let module = Module::single(&code);
        assert_eq!(module.unit_count(), 1);
        assert_eq!(module.unit_bytes(0), Some(&[1u8, 2, 3][..]));
    }

    #[test]
    fn test_unit_bytes_by_index() {
        let code = [1u8, 2, 3, 4, 5];
        let module = Module::new(&code, [CodeUnit::new(3, 5), CodeUnit::new(0, 0)]).unwrap();
        assert_eq!(module.unit_bytes(0), Some(&[4u8, 5][..]));
        assert_eq!(module.unit_bytes(1), Some(&[0u8; 0][..]));
        assert_eq!(module.unit_bytes(2), None);
    }

    #[test]
    fn test_code_unit_len() {
        let unit = CodeUnit::from(3..10);
        assert_eq!(unit.len(), 7);
        assert!(!unit.is_empty());
        assert!(CodeUnit::new(4, 4).is_empty());
    }
}
