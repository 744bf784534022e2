//! Block directives
//!
//! A block directive reads one raw block and hands it to its handler exactly
//! once. The handler receives the directive arguments with the block text as
//! the last argument.

use std::collections::HashMap;

use crate::error::{ConfError, Result};
use crate::file::{ConfFile, DirectiveEnd};

/// Consumer of a raw block
pub trait BlockHandler {
    /// Handle a block; `args` is `[directive, block]`
    ///
    /// An `Err` message aborts configuration parsing.
    fn handle(&mut self, cf: &ConfFile, args: &[String]) -> std::result::Result<(), String>;
}

impl<F> BlockHandler for F
where
    F: FnMut(&ConfFile, &[String]) -> std::result::Result<(), String>,
{
    fn handle(&mut self, cf: &ConfFile, args: &[String]) -> std::result::Result<(), String> {
        self(cf, args)
    }
}

/// Read one block for `directive` and run `handler` on it
///
/// The block starts at the next non-whitespace byte. A handler failure is
/// logged and returned as [`ConfError::Handler`].
pub fn parse_block<H>(cf: &mut ConfFile, directive: &str, handler: &mut H) -> Result<()>
where
    H: BlockHandler + ?Sized,
{
    cf.skip_whitespace();
    let block = cf.read_block()?;

    tracing::debug!(
        file = cf.name(),
        line = cf.line(),
        directive,
        len = block.len(),
        "read configuration block"
    );

    let args = [directive.to_owned(), block];
    handler.handle(cf, &args).map_err(|message| {
        tracing::error!(file = cf.name(), line = cf.line(), directive, "{message}");
        ConfError::Handler {
            directive: directive.to_owned(),
            file: cf.name().to_owned(),
            line: cf.line(),
            message,
        }
    })
}

/// Registry of block directives
///
/// Simple directives without a registered handler are skipped. Unregistered
/// directives with a `{` body are descended into, so block directives nested
/// in contexts like `http { ... }` are still found.
#[derive(Default)]
pub struct BlockDirectives<'h> {
    handlers: HashMap<String, Box<dyn BlockHandler + 'h>>,
}

impl<'h> BlockDirectives<'h> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `name`
    pub fn register(&mut self, name: impl Into<String>, handler: impl BlockHandler + 'h) -> &mut Self {
        self.handlers.insert(name.into(), Box::new(handler));
        self
    }

    /// Whether `name` has a handler
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Scan the whole file, dispatching every registered block directive
    ///
    /// Returns the number of blocks handled. Stops at the first error.
    pub fn parse(&mut self, cf: &mut ConfFile) -> Result<usize> {
        let mut handled = 0;

        while let Some(name) = cf.next_directive() {
            match self.handlers.get_mut(&name) {
                Some(handler) => {
                    parse_block(cf, &name, handler.as_mut())?;
                    handled += 1;
                }
                None => {
                    if cf.skip_directive()? == DirectiveEnd::Context {
                        tracing::trace!(
                            file = cf.name(),
                            line = cf.line(),
                            directive = %name,
                            "entering context"
                        );
                    }
                }
            }
        }

        Ok(handled)
    }
}

impl std::fmt::Debug for BlockDirectives<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockDirectives")
            .field("directives", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_block_calls_handler_once() {
        let mut cf = ConfFile::new("test.conf", " { run(); };");
        let mut seen = Vec::new();
        let mut handler = |_: &ConfFile, args: &[String]| -> std::result::Result<(), String> {
            seen.push(args.to_vec());
            Ok(())
        };

        parse_block(&mut cf, "js_run_block", &mut handler).unwrap();
        assert_eq!(
            seen,
            vec![vec!["js_run_block".to_string(), "{ run(); }".to_string()]]
        );
    }

    #[test]
    fn test_handler_failure_propagates() {
        let mut cf = ConfFile::new("test.conf", "{\nbad\n};");
        let mut handler =
            |_: &ConfFile, _: &[String]| -> std::result::Result<(), String> { Err("syntax error".into()) };

        let err = parse_block(&mut cf, "js_run_block", &mut handler).unwrap_err();
        match err {
            ConfError::Handler {
                directive,
                line,
                message,
                ..
            } => {
                assert_eq!(directive, "js_run_block");
                assert_eq!(line, 3);
                assert_eq!(message, "syntax error");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_unterminated_block_skips_handler() {
        let mut cf = ConfFile::new("test.conf", "{ a; b;");
        let mut calls = 0;
        let mut handler = |_: &ConfFile, _: &[String]| -> std::result::Result<(), String> {
            calls += 1;
            Ok(())
        };

        let err = parse_block(&mut cf, "js_run_block", &mut handler).unwrap_err();
        assert!(matches!(err, ConfError::UnterminatedBlock { .. }));
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_registry_descends_into_contexts() {
        let mut cf = ConfFile::new("nginx.conf", "http {\n  js_run_block { a(); };\n}\n");
        let mut calls = 0;
        let handled = {
            let mut directives = BlockDirectives::new();
            directives.register(
                "js_run_block",
                |_: &ConfFile, args: &[String]| -> std::result::Result<(), String> {
                    assert_eq!(args[1], "{ a(); }");
                    calls += 1;
                    Ok(())
                },
            );
            directives.parse(&mut cf).unwrap()
        };

        assert_eq!(handled, 1);
        assert_eq!(calls, 1);
    }
}
