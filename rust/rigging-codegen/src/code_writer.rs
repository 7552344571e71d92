//! Indentation-aware text builder used by every renderer.
//!
//! Generated Rust is written line by line. Indentation is tracked by an RAII
//! guard so nested blocks read like the code they produce:
//!
//! ```
//! use rigging_codegen::code_writer::CodeWriter;
//! use rigging_codegen::cw_writeln;
//!
//! let mut w = CodeWriter::new();
//! w.block("impl Client", |w| {
//!     cw_writeln!(w, "const PATH: &str = {:?};", "/users/Get");
//! });
//! assert_eq!(w.finish(), "impl Client {\n    const PATH: &str = \"/users/Get\";\n}\n");
//! ```

use std::cell::Cell;
use std::fmt::{self, Write as _};
use std::rc::Rc;

const INDENT: &str = "    ";

/// Accumulates generated source into a `String`.
///
/// Writing to a `String` cannot fail, so none of the methods return `Result`.
#[derive(Debug)]
pub struct CodeWriter {
    out: String,
    indent_level: Rc<Cell<usize>>,
    at_line_start: bool,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self {
            out: String::new(),
            indent_level: Rc::new(Cell::new(0)),
            at_line_start: true,
        }
    }

    /// Write text without a newline. Adds indentation if at line start.
    pub fn write(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.at_line_start {
            for _ in 0..self.indent_level.get() {
                self.out.push_str(INDENT);
            }
            self.at_line_start = false;
        }
        self.out.push_str(text);
    }

    /// Write text followed by a newline.
    pub fn writeln(&mut self, text: &str) {
        self.write(text);
        self.out.push('\n');
        self.at_line_start = true;
    }

    /// Write an empty line. Consecutive blank lines collapse into one.
    pub fn blank_line(&mut self) {
        if self.out.is_empty() || self.out.ends_with("\n\n") {
            return;
        }
        if !self.at_line_start {
            self.out.push('\n');
        }
        self.out.push('\n');
        self.at_line_start = true;
    }

    /// Indentation increases while the guard is alive.
    pub fn indent(&self) -> IndentGuard {
        self.indent_level.set(self.indent_level.get() + 1);
        IndentGuard {
            indent_level: Rc::clone(&self.indent_level),
        }
    }

    /// Write `///` doc lines. Lines are written as given, so keep the
    /// leading space that `///` comments carry.
    pub fn doc<S: AsRef<str>>(&mut self, lines: &[S]) {
        for line in lines {
            let line = line.as_ref();
            if line.trim().is_empty() {
                self.writeln("///");
            } else {
                self.write("///");
                self.writeln(line.trim_end());
            }
        }
    }

    /// `header {`, the body one level deeper, then `}`.
    pub fn block<F: FnOnce(&mut Self)>(&mut self, header: &str, body: F) {
        self.block_closed_by(header, "}", body);
    }

    /// Like [`CodeWriter::block`] with a custom closing line, e.g. `};`.
    pub fn block_closed_by<F: FnOnce(&mut Self)>(&mut self, header: &str, close: &str, body: F) {
        if header.is_empty() {
            self.writeln("{");
        } else {
            self.write(header);
            self.writeln(" {");
        }
        {
            let _indent = self.indent();
            body(self);
        }
        self.writeln(close);
    }

    /// Write items separated by `separator`.
    pub fn write_separated<I, F>(&mut self, items: I, separator: &str, mut write_item: F)
    where
        I: IntoIterator,
        F: FnMut(&mut Self, I::Item),
    {
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 {
                self.write(separator);
            }
            write_item(self, item);
        }
    }

    pub fn indent_level(&self) -> usize {
        self.indent_level.get()
    }

    pub fn finish(self) -> String {
        self.out
    }

    #[doc(hidden)]
    pub fn write_fmt(&mut self, args: fmt::Arguments<'_>) {
        match args.as_str() {
            Some(text) => self.write(text),
            None => {
                let mut formatted = String::new();
                // Formatting into a String only fails if a Display impl does.
                let _ = formatted.write_fmt(args);
                self.write(&formatted);
            }
        }
    }

    #[doc(hidden)]
    pub fn writeln_fmt(&mut self, args: fmt::Arguments<'_>) {
        self.write_fmt(args);
        self.writeln("");
    }
}

impl Default for CodeWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard that maintains indentation level.
pub struct IndentGuard {
    indent_level: Rc<Cell<usize>>,
}

impl Drop for IndentGuard {
    fn drop(&mut self) {
        let current = self.indent_level.get();
        self.indent_level.set(current.saturating_sub(1));
    }
}

/// Write formatted text to a CodeWriter (like std::write!)
#[macro_export]
macro_rules! cw_write {
    ($writer:expr, $($arg:tt)*) => {
        $writer.write_fmt(format_args!($($arg)*))
    };
}

/// Write formatted text with newline to a CodeWriter (like std::writeln!)
#[macro_export]
macro_rules! cw_writeln {
    ($writer:expr, $($arg:tt)*) => {
        $writer.writeln_fmt(format_args!($($arg)*))
    };
}
