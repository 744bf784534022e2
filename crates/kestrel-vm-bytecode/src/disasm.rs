//! Disassembler driver
//!
//! Walks the code units of a module in order and yields one [`Line`] per
//! decoded instruction. A truncated instruction ends its unit with a
//! [`Line::Truncated`] diagnostic; the remaining units are still processed.

use std::fmt;
use std::io::Write;

use serde::Serialize;

use crate::decode::Decoder;
use crate::error::{BytecodeError, Result};
use crate::format::{GUTTER, MNEMONIC_WIDTH};
use crate::instruction::Instruction;
use crate::module::Module;

/// Listing options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisassemblyOptions {
    /// Prefix each line with the byte offset of its instruction
    pub offsets: bool,
    /// Emit a header line before each code unit
    pub unit_headers: bool,
}

/// One line of a listing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "line", rename_all = "snake_case")]
pub enum Line {
    /// Start of a code unit (only with [`DisassemblyOptions::unit_headers`])
    UnitHeader {
        /// Unit index in module order
        unit: usize,
        /// First byte of the unit
        start: usize,
        /// One past the last byte
        end: usize,
    },
    /// A decoded instruction
    Instruction {
        /// Unit index in module order
        unit: usize,
        /// Buffer offset of the instruction tag
        offset: usize,
        /// The instruction
        instruction: Instruction,
    },
    /// The rest of the unit could not be decoded
    Truncated {
        /// Unit index in module order
        unit: usize,
        /// Buffer offset of the truncated instruction
        offset: usize,
        /// Bytes the instruction needs
        needed: usize,
        /// Bytes left before the unit end
        available: usize,
    },
}

impl Line {
    /// Render with the given options
    pub fn render(&self, options: &DisassemblyOptions) -> String {
        let body = self.to_string();
        match self {
            Self::Instruction { offset, .. } | Self::Truncated { offset, .. } if options.offsets => {
                format!("{offset:04X}  {body}")
            }
            _ => body,
        }
    }

    /// Unit this line belongs to
    pub fn unit(&self) -> usize {
        match *self {
            Self::UnitHeader { unit, .. }
            | Self::Instruction { unit, .. }
            | Self::Truncated { unit, .. } => unit,
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnitHeader { unit, start, end } => {
                write!(f, "; unit {unit} [{start:04X}, {end:04X})")
            }
            Self::Instruction { instruction, .. } => write!(f, "{instruction}"),
            Self::Truncated {
                offset,
                needed,
                available,
                ..
            } => write!(
                f,
                "{:<width$}{}{:04X} need {} have {}",
                "TRUNCATED",
                GUTTER,
                offset,
                needed,
                available,
                width = MNEMONIC_WIDTH
            ),
        }
    }
}

/// Counters collected while a listing is produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Units started
    pub units: usize,
    /// Instructions decoded, unknown ones included
    pub instructions: usize,
    /// Unrecognized tags
    pub unknown: usize,
    /// Units that ended in a truncated instruction
    pub truncated: usize,
}

/// Iterator over the listing of a module
#[derive(Debug)]
pub struct Disassembly<'m, 'a> {
    module: &'m Module<'a>,
    options: DisassemblyOptions,
    next_unit: usize,
    current: Option<(usize, Decoder<'a>)>,
    summary: Summary,
}

/// Disassemble every unit of `module`, in order
pub fn disassemble<'m, 'a>(module: &'m Module<'a>) -> Disassembly<'m, 'a> {
    Disassembly {
        module,
        options: DisassemblyOptions::default(),
        next_unit: 0,
        current: None,
        summary: Summary::default(),
    }
}

/// Render the whole listing, one line per instruction
pub fn disassemble_to_string(module: &Module<'_>) -> String {
    let mut out = String::new();
    for line in disassemble(module) {
        out.push_str(&line.to_string());
        out.push('\n');
    }
    out
}

impl<'m, 'a> Disassembly<'m, 'a> {
    /// Replace the listing options
    pub fn with_options(mut self, options: DisassemblyOptions) -> Self {
        self.options = options;
        self
    }

    /// Listing options in effect
    pub fn options(&self) -> &DisassemblyOptions {
        &self.options
    }

    /// Counters so far
    pub fn summary(&self) -> Summary {
        self.summary
    }

    /// Write the remaining lines to `w`; returns the summary
    pub fn write_to<W: Write>(mut self, w: &mut W) -> Result<Summary> {
        while let Some(line) = self.next() {
            writeln!(w, "{}", line.render(&self.options))?;
        }
        Ok(self.summary)
    }

    fn start_unit(&mut self) -> Option<Line> {
        loop {
            let index = self.next_unit;
            let unit = *self.module.unit(index)?;
            self.next_unit += 1;
            self.summary.units += 1;

            tracing::debug!(unit = index, start = unit.start, end = unit.end, "disassembling code unit");

            self.current = Some((index, Decoder::new(self.module.code(), unit.start, unit.end)));

            if self.options.unit_headers {
                return Some(Line::UnitHeader {
                    unit: index,
                    start: unit.start,
                    end: unit.end,
                });
            }

            if let Some(line) = self.step() {
                return Some(line);
            }
        }
    }

    fn step(&mut self) -> Option<Line> {
        let (unit, decoder) = self.current.as_mut()?;
        let unit = *unit;

        match decoder.next() {
            Some(Ok((offset, instruction))) => {
                self.summary.instructions += 1;
                if let Some(raw) = unknown_tag(&instruction) {
                    self.summary.unknown += 1;
                    tracing::debug!(unit, offset, tag = raw, "unrecognized opcode");
                }
                Some(Line::Instruction {
                    unit,
                    offset,
                    instruction,
                })
            }
            Some(Err(err)) => {
                let position = Decoder::position(decoder);
                self.current = None;
                self.summary.truncated += 1;
                tracing::warn!(unit, %err, "code unit disassembly aborted");

                let (offset, needed, available) = match err {
                    BytecodeError::Truncated {
                        offset,
                        needed,
                        available,
                    } => (offset, needed, available),
                    _ => (position, crate::TAG_SIZE, 0),
                };
                Some(Line::Truncated {
                    unit,
                    offset,
                    needed,
                    available,
                })
            }
            None => {
                self.current = None;
                None
            }
        }
    }
}

fn unknown_tag(instruction: &Instruction) -> Option<u8> {
    match instruction {
        Instruction::Special {
            instruction: crate::instruction::SpecialInstruction::Unknown { raw_tag },
        } => Some(*raw_tag),
        _ => None,
    }
}

impl Iterator for Disassembly<'_, '_> {
    type Item = Line;

    fn next(&mut self) -> Option<Line> {
        if let Some(line) = self.step() {
            return Some(line);
        }
        self.start_unit()
    }
}
