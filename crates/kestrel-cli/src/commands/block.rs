//! Block command - extract raw script blocks from a host configuration file.

use anyhow::Result;
use clap::Args;
use kestrel_conf::{BlockDirectives, ConfFile};
use std::path::PathBuf;

#[derive(Args)]
pub struct BlockCommand {
    /// Host configuration file
    pub input: PathBuf,

    /// Block directive to extract
    #[arg(long, default_value = "js_run_block")]
    pub directive: String,
}

impl BlockCommand {
    pub fn run(&self) -> Result<()> {
        let mut cf = ConfFile::open(&self.input)?;

        let mut directives = BlockDirectives::new();
        directives.register(
            self.directive.as_str(),
            |cf: &ConfFile, args: &[String]| -> std::result::Result<(), String> {
                println!("# {} {}:{}", args[0], cf.name(), cf.line());
                println!("{}", args[1]);
                Ok(())
            },
        );

        let count = directives.parse(&mut cf)?;
        tracing::info!(
            directive = %self.directive,
            blocks = count,
            "scanned {}",
            cf.name()
        );

        Ok(())
    }
}
