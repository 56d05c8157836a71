//! Compiler diagnostics.
//!
//! The overlay validator classifies findings as Info/Warn/Error. Info and
//! Warn never halt compilation; in strict mode a malformed or violated
//! constraint is reported as Error and the pipeline aborts.

use std::fmt;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warn => write!(f, "warn"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A single finding, tied to the source line of the operation it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub line: u32,
    pub message: String,
}

impl Diagnostic {
    pub fn info(line: u32, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            line,
            message: message.into(),
        }
    }

    pub fn warn(line: u32, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warn,
            line,
            message: message.into(),
        }
    }

    pub fn error(line: u32, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [line {}]: {}", self.severity, self.line, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering() {
        assert!(Severity::Info < Severity::Warn);
        assert!(Severity::Warn < Severity::Error);
    }

    #[test]
    fn display_carries_line_and_message() {
        let d = Diagnostic::warn(4, "path_len ≤ 0 violated (distance=2)");
        assert_eq!(
            d.to_string(),
            "warn [line 4]: path_len ≤ 0 violated (distance=2)"
        );
    }
}
