//! Disasm command - list the instructions of a raw bytecode file.

use anyhow::{Context, Result};
use clap::Args;
use kestrel_vm_bytecode::{CodeUnit, DisassemblyOptions, Line, Module, disassemble};
use std::io::Write;
use std::path::PathBuf;

use crate::config::{Config, OutputFormat};

#[derive(Args)]
pub struct DisasmCommand {
    /// Raw bytecode file
    pub input: PathBuf,

    /// Code unit byte range, repeatable (default: the whole file)
    #[arg(long = "unit", value_name = "START:END", value_parser = parse_unit)]
    pub units: Vec<CodeUnit>,

    /// Prefix each line with its byte offset
    #[arg(long)]
    pub offsets: bool,

    /// Print a header before each code unit
    #[arg(long)]
    pub unit_headers: bool,

    /// Output format (overrides kestrel.toml)
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

impl DisasmCommand {
    pub fn run(&self, config: &Config) -> Result<()> {
        let code = std::fs::read(&self.input)
            .with_context(|| format!("Failed to read {}", self.input.display()))?;

        let module = if self.units.is_empty() {
            Module::single(&code)
        } else {
            Module::new(&code, self.units.iter().copied())?
        };

        let options = DisassemblyOptions {
            offsets: self.offsets || config.disasm.offsets,
            unit_headers: self.unit_headers || config.disasm.unit_headers,
        };

        let stdout = std::io::stdout();
        let mut out = stdout.lock();

        match self.format.unwrap_or(config.disasm.format) {
            OutputFormat::Text => {
                let summary = disassemble(&module).with_options(options).write_to(&mut out)?;
                tracing::info!(
                    units = summary.units,
                    instructions = summary.instructions,
                    unknown = summary.unknown,
                    truncated = summary.truncated,
                    "disassembled {}",
                    self.input.display()
                );
            }
            OutputFormat::Json => {
                let lines: Vec<Line> = disassemble(&module).with_options(options).collect();
                serde_json::to_writer_pretty(&mut out, &lines)?;
                writeln!(out)?;
            }
        }

        Ok(())
    }
}

/// Parse `START:END`, each side decimal or `0x` hex.
fn parse_unit(s: &str) -> Result<CodeUnit, String> {
    let (start, end) = s
        .split_once(':')
        .ok_or_else(|| format!("expected START:END, got {s:?}"))?;
    Ok(CodeUnit::new(parse_offset(start)?, parse_offset(end)?))
}

fn parse_offset(s: &str) -> Result<usize, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid offset {s:?}: {e}"))
}
