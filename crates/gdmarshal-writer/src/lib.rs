//! Indented source writer for generated C# code.
//!
//! The writer owns a `String` buffer and tracks the current indentation
//! depth. Indentation is emitted lazily at the start of each non-empty line,
//! so blank lines never carry trailing whitespace.
//!
//! # Example
//!
//! ```
//! use gdmarshal_writer::IndentedWriter;
//!
//! let mut writer = IndentedWriter::new();
//! writer.write_line("try");
//! writer.open_block();
//! writer.write_line("Call();");
//! writer.close_block();
//! assert_eq!(writer.as_str(), "try\n{\n    Call();\n}\n");
//! ```

mod keywords;

pub use keywords::{escape_identifier, is_csharp_keyword};

/// Number of spaces per indentation level.
const INDENT_WIDTH: usize = 4;

/// Line-oriented text writer with block-aware indentation.
#[derive(Debug, Default, Clone)]
pub struct IndentedWriter {
    buffer: String,
    /// Current indentation level (number of indent units, not spaces).
    indent: usize,
    /// True when nothing has been written on the current line yet.
    line_start: bool,
}

impl IndentedWriter {
    /// Create an empty writer at indentation level zero.
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            indent: 0,
            line_start: true,
        }
    }

    /// Current indentation level.
    pub fn indent_level(&self) -> usize {
        self.indent
    }

    /// Increase the indentation level by one.
    pub fn indent(&mut self) {
        self.indent += 1;
    }

    /// Decrease the indentation level by one, saturating at zero.
    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Execute `f` one level deeper, then restore the previous level.
    pub fn indented<F, T>(&mut self, f: F) -> T
    where
        F: FnOnce(&mut Self) -> T,
    {
        self.indent();
        let result = f(self);
        self.dedent();
        result
    }

    /// Write text on the current line without terminating it.
    pub fn write(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.line_start {
            self.push_indent();
            self.line_start = false;
        }
        self.buffer.push_str(text);
    }

    /// Write text and terminate the line.
    pub fn write_line(&mut self, text: &str) {
        self.write(text);
        self.buffer.push('\n');
        self.line_start = true;
    }

    /// Write a line ignoring the current indentation.
    pub fn write_line_no_tabs(&mut self, text: &str) {
        if !self.line_start {
            self.buffer.push('\n');
        }
        self.buffer.push_str(text);
        self.buffer.push('\n');
        self.line_start = true;
    }

    /// Write an empty line.
    pub fn write_blank_line(&mut self) {
        self.write_line_no_tabs("");
    }

    /// Write `{` on its own line and indent.
    pub fn open_block(&mut self) {
        self.write_line("{");
        self.indent();
    }

    /// Dedent and write `}` on its own line.
    pub fn close_block(&mut self) {
        self.dedent();
        self.write_line("}");
    }

    /// Dedent and write `}` followed by `suffix` (e.g. `});`).
    pub fn close_block_with(&mut self, suffix: &str) {
        self.dedent();
        self.write_line(&format!("}}{suffix}"));
    }

    /// View the text written so far.
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Returns `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Consume the writer and return its buffer.
    pub fn into_string(self) -> String {
        self.buffer
    }

    fn push_indent(&mut self) {
        for _ in 0..self.indent * INDENT_WIDTH {
            self.buffer.push(' ');
        }
    }
}

impl std::fmt::Display for IndentedWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.buffer)
    }
}
