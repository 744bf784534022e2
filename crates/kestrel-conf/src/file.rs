//! Line-numbered configuration input

use std::path::Path;

use crate::error::{ConfError, Result};

const LF: u8 = b'\n';

/// How an ordinary directive ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveEnd {
    /// Terminated by `;`
    Simple,
    /// Opened a `{` context
    Context,
}

/// A configuration file being scanned
///
/// Tracks the read position and the current line (starting at 1). Every LF
/// consumed by any scanning method advances the line counter.
#[derive(Debug, Clone)]
pub struct ConfFile {
    name: String,
    data: Vec<u8>,
    pos: usize,
    line: usize,
}

impl ConfFile {
    /// Wrap in-memory configuration text
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            pos: 0,
            line: 1,
        }
    }

    /// Load a configuration file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        Ok(Self::new(path.display().to_string(), data))
    }

    /// File name used in diagnostics
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current line
    pub fn line(&self) -> usize {
        self.line
    }

    /// Current byte position
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Whether all input was consumed
    pub fn is_eof(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn bump(&mut self) -> Option<u8> {
        let ch = *self.data.get(self.pos)?;
        self.pos += 1;
        if ch == LF {
            self.line += 1;
        }
        Some(ch)
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    /// Read a raw block up to the `};` terminator
    ///
    /// Scanning starts at the current position (normally the opening brace).
    /// The returned text keeps the closing brace and drops the `;`, so
    /// `"{ a; b; };"` yields `"{ a; b; }"`. The position is left just past
    /// the terminator.
    ///
    /// Running out of input first is an [`ConfError::UnterminatedBlock`]
    /// carrying the line reached; it is also logged.
    pub fn read_block(&mut self) -> Result<String> {
        let start = self.pos;
        let mut prev = 0u8;
        let mut len = 0usize;

        loop {
            let Some(ch) = self.bump() else {
                tracing::error!(
                    file = %self.name,
                    line = self.line,
                    "unexpected end of file, block is expecting to be closed with \"}};\""
                );
                return Err(ConfError::UnterminatedBlock {
                    file: self.name.clone(),
                    line: self.line,
                });
            };

            if prev == b'}' && ch == b';' {
                break;
            }
            prev = ch;
            len += 1;
        }

        String::from_utf8(self.data[start..start + len].to_vec()).map_err(|_| ConfError::Encoding {
            file: self.name.clone(),
            line: self.line,
        })
    }

    /// Read the next directive name
    ///
    /// Skips whitespace, `#` comments and stray delimiters. A `}` closes the
    /// context entered by [`ConfFile::skip_directive`] and is consumed here
    /// too. Returns `None` at end of input.
    pub fn next_directive(&mut self) -> Option<String> {
        loop {
            match self.peek()? {
                b'#' => {
                    while let Some(ch) = self.bump() {
                        if ch == LF {
                            break;
                        }
                    }
                }
                b';' | b'{' | b'}' => {
                    self.bump();
                }
                ch if ch.is_ascii_whitespace() => {
                    self.bump();
                }
                _ => break,
            }
        }

        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_whitespace() || matches!(ch, b';' | b'{' | b'}' | b'#') {
                break;
            }
            self.bump();
        }

        Some(String::from_utf8_lossy(&self.data[start..self.pos]).into_owned())
    }

    /// Skip the arguments of an ordinary directive
    ///
    /// Consumes through the terminating `;` of a simple directive, or through
    /// the `{` that opens a context such as `http { ... }`. Directives inside
    /// an opened context are read by the following calls to
    /// [`ConfFile::next_directive`].
    pub fn skip_directive(&mut self) -> Result<DirectiveEnd> {
        while let Some(ch) = self.bump() {
            match ch {
                b';' => return Ok(DirectiveEnd::Simple),
                b'{' => return Ok(DirectiveEnd::Context),
                _ => {}
            }
        }

        Err(ConfError::UnexpectedEof {
            file: self.name.clone(),
            line: self.line,
        })
    }

    /// Skip whitespace before a block body
    pub(crate) fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|ch| ch.is_ascii_whitespace()) {
            self.bump();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_block_strips_terminator() {
        let mut cf = ConfFile::new("test.conf", "{ a; b; };");
        assert_eq!(cf.read_block().unwrap(), "{ a; b; }");
        assert!(cf.is_eof());
        assert_eq!(cf.line(), 1);
    }

    #[test]
    fn test_read_block_leaves_rest() {
        let mut cf = ConfFile::new("test.conf", "{ x = 1; };\nnext;");
        assert_eq!(cf.read_block().unwrap(), "{ x = 1; }");
        assert_eq!(cf.next_directive().as_deref(), Some("next"));
        assert_eq!(cf.line(), 2);
    }

    #[test]
    fn test_read_block_counts_lines() {
        let mut cf = ConfFile::new("test.conf", "{\n  a;\n  b;\n};");
        assert_eq!(cf.read_block().unwrap(), "{\n  a;\n  b;\n}");
        assert_eq!(cf.line(), 4);
    }

    #[test]
    fn test_inner_semicolon_brace_pairs() {
        // `};` ends the block wherever it appears.
        let mut cf = ConfFile::new("test.conf", "{ if (x) { y(); }; z(); };");
        assert_eq!(cf.read_block().unwrap(), "{ if (x) { y(); }");
    }

    #[test]
    fn test_unterminated_block() {
        let mut cf = ConfFile::new("test.conf", "{ a; b;");
        let err = cf.read_block().unwrap_err();
        assert!(matches!(err, ConfError::UnterminatedBlock { line: 1, .. }));

        let mut cf = ConfFile::new("test.conf", "{\n a;\n b;\n");
        let err = cf.read_block().unwrap_err();
        assert_eq!(err.line(), Some(4));
    }

    #[test]
    fn test_brace_then_eof() {
        let mut cf = ConfFile::new("test.conf", "{ a; }");
        assert!(matches!(
            cf.read_block(),
            Err(ConfError::UnterminatedBlock { .. })
        ));
    }

    #[test]
    fn test_next_directive_skips_comments() {
        let mut cf = ConfFile::new("test.conf", "# comment\n\n  worker 4;\n");
        assert_eq!(cf.next_directive().as_deref(), Some("worker"));
        assert_eq!(cf.line(), 3);
        cf.skip_directive().unwrap();
        assert_eq!(cf.next_directive(), None);
    }

    #[test]
    fn test_skip_directive_enters_context() {
        let mut cf = ConfFile::new("test.conf", "http { server { listen 80; } }\nlast;");
        assert_eq!(cf.next_directive().as_deref(), Some("http"));
        assert_eq!(cf.skip_directive().unwrap(), DirectiveEnd::Context);
        assert_eq!(cf.next_directive().as_deref(), Some("server"));
        assert_eq!(cf.skip_directive().unwrap(), DirectiveEnd::Context);
        assert_eq!(cf.next_directive().as_deref(), Some("listen"));
        assert_eq!(cf.skip_directive().unwrap(), DirectiveEnd::Simple);
        assert_eq!(cf.next_directive().as_deref(), Some("last"));
        assert_eq!(cf.line(), 2);
    }

    #[test]
    fn test_long_delimiter_run() {
        let mut data = vec![b';'; 200_000];
        data.extend_from_slice(b"{}}{ name;");
        let mut cf = ConfFile::new("test.conf", data);
        assert_eq!(cf.next_directive().as_deref(), Some("name"));

        let mut cf = ConfFile::new("test.conf", vec![b'}'; 200_000]);
        assert_eq!(cf.next_directive(), None);
        assert!(cf.is_eof());
    }

    #[test]
    fn test_skip_directive_eof() {
        let mut cf = ConfFile::new("test.conf", "dangling value");
        cf.next_directive();
        assert!(matches!(
            cf.skip_directive(),
            Err(ConfError::UnexpectedEof { line: 1, .. })
        ));
    }
}
