use core::fmt;
use std::io;

use crate::{parser, span::Span};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Parse(#[from] parser::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A parse error tied to the source it came from, printed with the offending line.
#[derive(Debug)]
pub struct Diagnostic<'a> {
    pub filename: &'a str,
    pub source: &'a str,
    pub error: &'a parser::Error,
}

impl<'a> Diagnostic<'a> {
    pub fn new(filename: &'a str, source: &'a str, error: &'a parser::Error) -> Self {
        Self {
            filename,
            source,
            error,
        }
    }
}

impl fmt::Display for Diagnostic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let span = self.error.span();
        write_message(f, self.filename, span, &self.error.to_string())?;
        if !self.error.at_end_of_input() {
            write_lines(f, self.source, span)?;
        }
        Ok(())
    }
}

fn write_message(f: &mut fmt::Formatter, filename: &str, span: Span, message: &str) -> fmt::Result {
    writeln!(
        f,
        "{}:{}:{}: {}",
        filename, span.start.line, span.start.column, message
    )
}

fn write_lines(f: &mut fmt::Formatter, source: &str, span: Span) -> fmt::Result {
    let Some(line) = source.lines().nth(span.start.line - 1) else {
        return Ok(());
    };
    let width = if span.end.line == span.start.line {
        span.end.column.saturating_sub(span.start.column).max(1)
    } else {
        line.chars().count().saturating_sub(span.start.column - 1).max(1)
    };

    writeln!(f, "     | ")?;
    writeln!(f, "{:4} | {}", span.start.line, line)?;
    writeln!(
        f,
        "     | {}{}",
        " ".repeat(span.start.column.saturating_sub(1)),
        "^".repeat(width)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn diagnostic_points_at_token() {
        let source = "let x = 1 in\n  x ) end";
        let error = parse(source).unwrap_err();
        let report = Diagnostic::new("main.ml", source, &error).to_string();
        assert_eq!(
            report,
            "main.ml:2:5: expected 'end' but got ')'\n     | \n   2 |   x ) end\n     |     ^\n"
        );
    }

    #[test]
    fn diagnostic_underlines_whole_symbol() {
        let source = "a == b";
        let error = parse(source).unwrap_err();
        let report = Diagnostic::new("-", source, &error).to_string();
        assert!(report.starts_with("-:1:3: unsupported symbol '=='\n"));
        assert!(report.ends_with("     |   ^^\n"));
    }

    #[test]
    fn diagnostic_at_end_of_input_has_no_source_line() {
        let source = "(1 + 2";
        let error = parse(source).unwrap_err();
        let report = Diagnostic::new("in", source, &error).to_string();
        assert_eq!(report, "in:1:7: expected ')' but got 'EOF'\n");
    }
}
