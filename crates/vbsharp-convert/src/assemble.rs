//! Joining ops back into one output line.

use crate::lexer::{QUOTE, QuoteTracker, is_identifier_op, is_numeric_op};

/// How to join a list of ops into a line.
///
/// A space goes between two ops unless the left op is in `skip_pad_right`,
/// the right op is in `skip_pad_left`, or the pair lies inside a quoted
/// span. The joined text is trimmed, then `append` is added once.
#[derive(Debug, Clone)]
pub struct LineAssembly {
    ops: Vec<String>,
    skip_pad_left: Vec<String>,
    skip_pad_right: Vec<String>,
    prepend: String,
    append: String,
    tight_calls: bool,
}

impl LineAssembly {
    pub fn new<I, S>(ops: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ops: ops.into_iter().map(Into::into).collect(),
            skip_pad_left: Vec::new(),
            skip_pad_right: Vec::new(),
            prepend: String::new(),
            append: String::new(),
            tight_calls: false,
        }
    }

    /// Ops that take no pad before them.
    pub fn skip_pad_left(mut self, ops: &[&str]) -> Self {
        self.skip_pad_left.extend(ops.iter().map(|s| s.to_string()));
        self
    }

    /// Ops that take no pad after them.
    pub fn skip_pad_right(mut self, ops: &[&str]) -> Self {
        self.skip_pad_right.extend(ops.iter().map(|s| s.to_string()));
        self
    }

    /// Text placed before the first op, padded like an op.
    pub fn prepend(mut self, text: &str) -> Self {
        self.prepend = text.to_string();
        self
    }

    /// Text added after trimming.
    pub fn append(mut self, text: &str) -> Self {
        self.append = text.to_string();
        self
    }

    /// No pad between an identifier and the `(` of its argument list.
    pub fn tight_calls(mut self) -> Self {
        self.tight_calls = true;
        self
    }

    /// Signature spacing: no pad inside or before parentheses.
    pub fn with_default_padding(self) -> Self {
        self.skip_pad_right(&["("]).skip_pad_left(&["(", ")"])
    }

    /// Join the ops.
    pub fn combine(&self) -> String {
        let prepend = (!self.prepend.is_empty()).then_some(self.prepend.as_str());
        self.join(prepend.into_iter().chain(self.ops.iter().map(String::as_str)))
    }

    /// Join the ops with `prepend` standing in for the first op.
    pub fn combine_replacing_first(&self) -> String {
        let prepend = (!self.prepend.is_empty()).then_some(self.prepend.as_str());
        self.join(prepend.into_iter().chain(self.ops.iter().skip(1).map(String::as_str)))
    }

    fn join<'a>(&self, ops: impl Iterator<Item = &'a str>) -> String {
        let mut out = String::new();
        let mut quotes = QuoteTracker::default();
        let mut previous: Option<&str> = None;
        let mut before_previous: Option<&str> = None;

        for op in ops {
            if let Some(prev) = previous {
                let unary = matches!(prev, "-" | "+") && !before_previous.is_some_and(ends_value);
                if !unary && self.wants_pad(prev, op, quotes.inside()) {
                    out.push(' ');
                }
            }
            out.push_str(op);
            quotes.advance(op);
            before_previous = previous;
            previous = Some(op);
        }

        let mut line = out.trim().to_string();
        line.push_str(&self.append);
        line
    }

    fn wants_pad(&self, left: &str, right: &str, in_quotes: bool) -> bool {
        if in_quotes {
            return false;
        }
        if self.skip_pad_right.iter().any(|s| s == left)
            || self.skip_pad_left.iter().any(|s| s == right)
        {
            return false;
        }
        !(self.tight_calls && right == "(" && is_identifier_op(left))
    }
}

/// True when `op` can end an operand, so a following `-` is binary.
fn ends_value(op: &str) -> bool {
    is_identifier_op(op) || is_numeric_op(op) || matches!(op, ")" | "]" | QUOTE)
}

/// Generic formatting for lines no rewriter claims.
pub fn format_ops(ops: &[String]) -> String {
    LineAssembly::new(ops.iter().map(String::as_str))
        .skip_pad_left(&[".", ",", ")"])
        .skip_pad_right(&[".", "(", "!"])
        .tight_calls()
        .combine()
}
