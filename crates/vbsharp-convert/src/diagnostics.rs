//! Errors and diagnostics raised while rewriting lines.

use serde::Serialize;
use std::fmt;

/// A rewriter could not make sense of a line it was routed to.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RewriteError {
    #[error("malformed {construct}: {reason}")]
    Malformed {
        construct: &'static str,
        reason: String,
    },
}

impl RewriteError {
    pub fn malformed(construct: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            construct,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Note,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Note => write!(f, "note"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The line was passed through because its rewriter rejected it.
    Malformed {
        construct: &'static str,
        reason: String,
    },
    /// A pass-through word is not in any table or symbol registry.
    UnregisteredWord { word: String },
    /// A `For` loop with non-literal bounds was generated as an `int` loop.
    AssumedIntegerBounds { variable: String },
    /// A closing keyword with no open block of its kind.
    UnmatchedClose { keyword: String },
    /// A clause after a signature (`Implements`, `Handles`) kept only as a
    /// comment.
    TrailingClause { clause: String },
}

impl DiagnosticKind {
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticKind::AssumedIntegerBounds { .. } => Severity::Note,
            _ => Severity::Warning,
        }
    }
}

impl From<RewriteError> for DiagnosticKind {
    fn from(error: RewriteError) -> Self {
        match error {
            RewriteError::Malformed { construct, reason } => {
                DiagnosticKind::Malformed { construct, reason }
            }
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::Malformed { construct, reason } => {
                write!(f, "malformed {construct}: {reason}; line passed through")
            }
            DiagnosticKind::UnregisteredWord { word } => {
                write!(f, "unregistered word `{word}` passed through")
            }
            DiagnosticKind::AssumedIntegerBounds { variable } => {
                write!(f, "bounds of loop over `{variable}` are not literals; assuming int")
            }
            DiagnosticKind::UnmatchedClose { keyword } => {
                write!(f, "`{keyword}` has no matching open block")
            }
            DiagnosticKind::TrailingClause { clause } => {
                write!(f, "`{clause}` has no equivalent; kept as a comment")
            }
        }
    }
}

/// Something worth telling the user about one source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// 1-based source line number.
    pub line: usize,
    pub severity: Severity,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn new(line: usize, kind: DiagnosticKind) -> Self {
        Self {
            line,
            severity: kind.severity(),
            kind,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}: {}", self.line, self.severity, self.kind)
    }
}
