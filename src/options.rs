//! Conversion options: delimiters, newline mode and inline editing.

use crate::error::{ConvertError, Result};
use crate::io::NewlineMode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub src_delimiter: u8,
    pub dst_delimiter: u8,
    pub newline: NewlineMode,
    /// Overwrite the source file with the result.
    pub inline: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            src_delimiter: b',',
            dst_delimiter: b',',
            newline: NewlineMode::Auto,
            inline: false,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiters(mut self, src: u8, dst: u8) -> Self {
        self.src_delimiter = src;
        self.dst_delimiter = dst;
        self
    }

    pub fn with_newline(mut self, newline: NewlineMode) -> Self {
        self.newline = newline;
        self
    }

    pub fn with_inline(mut self, inline: bool) -> Self {
        self.inline = inline;
        self
    }
}

/// Parse a delimiter spec: one character for both sides, or a pair
/// (`",;"` reads with `,` and writes with `;`).
pub fn parse_delimiters(spec: &str) -> Result<(u8, u8)> {
    let chars: Vec<char> = spec.chars().collect();
    let (src, dst) = match chars.as_slice() {
        [c] => (*c, *c),
        [src, dst] => (*src, *dst),
        _ => {
            return Err(ConvertError::InvalidOption(format!(
                "delimiter must be a single character or a pair of characters, got '{spec}'"
            )));
        }
    };
    Ok((delimiter_byte(src)?, delimiter_byte(dst)?))
}

fn delimiter_byte(c: char) -> Result<u8> {
    if !c.is_ascii() || matches!(c, '"' | '\r' | '\n') {
        return Err(ConvertError::InvalidOption(format!(
            "unusable delimiter '{}'",
            c.escape_default()
        )));
    }
    Ok(c as u8)
}
