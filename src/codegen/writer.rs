//! Indenting source-text writer
//!
//! Small layer over any [`io::Write`] sink that tracks the indent level,
//! dumps byte arrays as hex rows, and escapes strings for C literals.

use crate::error::Result;
use std::io::Write;

const INDENT: &str = "    ";

pub struct SourceWriter<W> {
    inner: W,
    indent_level: usize,
    at_line_start: bool,
}

impl<W: Write> SourceWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            indent_level: 0,
            at_line_start: true,
        }
    }

    fn emit_indent(&mut self) -> Result<()> {
        if self.at_line_start {
            for _ in 0..self.indent_level {
                self.inner.write_all(INDENT.as_bytes())?;
            }
            self.at_line_start = false;
        }
        Ok(())
    }

    /// Write a fragment, indenting if at the start of a line
    pub fn write(&mut self, s: &str) -> Result<()> {
        self.emit_indent()?;
        self.inner.write_all(s.as_bytes())?;
        if s.ends_with('\n') {
            self.at_line_start = true;
        }
        Ok(())
    }

    /// Write a full line
    pub fn line(&mut self, s: &str) -> Result<()> {
        self.write(s)?;
        self.newline()
    }

    /// Terminate the current line
    pub fn newline(&mut self) -> Result<()> {
        self.inner.write_all(b"\n")?;
        self.at_line_start = true;
        Ok(())
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    /// Write bytes as `0xNN` tokens, `per_line` per row
    pub fn hex_bytes(&mut self, data: &[u8], per_line: usize) -> Result<()> {
        for (i, byte) in data.iter().enumerate() {
            if i > 0 {
                self.inner.write_all(b",")?;
                if i % per_line == 0 {
                    self.inner.write_all(b"\n")?;
                    self.at_line_start = true;
                    self.emit_indent()?;
                } else {
                    self.inner.write_all(b" ")?;
                }
            } else {
                self.emit_indent()?;
            }
            write!(self.inner, "0x{:02x}", byte)?;
        }
        Ok(())
    }

    /// Write a quoted C string literal with control bytes escaped
    pub fn c_string(&mut self, s: &str) -> Result<()> {
        self.emit_indent()?;
        self.inner.write_all(b"\"")?;
        for c in s.chars() {
            match c {
                '\n' => self.inner.write_all(b"\\n")?,
                '\r' => self.inner.write_all(b"\\r")?,
                '\t' => self.inner.write_all(b"\\t")?,
                '\\' => self.inner.write_all(b"\\\\")?,
                '"' => self.inner.write_all(b"\\\"")?,
                c if (c as u32) < 0x20 => write!(self.inner, "\\x{:02x}", c as u32)?,
                c => write!(self.inner, "{}", c)?,
            }
        }
        self.inner.write_all(b"\"")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}
