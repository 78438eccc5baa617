//! Line tokenizer.
//!
//! Splits one trimmed, comment-stripped source line into ops: words,
//! numeric literals, operator runs and grouping symbols. Quoted text is
//! carried through untouched as a single op between two `"` ops, so
//! nothing downstream can mistake a comma or keyword inside a string
//! literal for syntax.

pub mod chars;

pub use chars::{
    is_alpha, is_grouping_op, is_grouping_symbol, is_identifier_char, is_identifier_op,
    is_numeric, is_numeric_op, is_operator, is_operator_op,
};

/// The quote op.
pub const QUOTE: &str = "\"";

/// Tokenize a line: split into raw ops, then normalize them.
pub fn tokenize(line: &str) -> Vec<String> {
    normalize_ops(split_ops(line))
}

/// Split a line into raw ops, including single-space ops.
///
/// Operator characters accumulate into one op (`<=`, `&=`), as do
/// identifier characters. A grouping symbol flushes both runs, the
/// identifier run first, and is then emitted on its own.
pub fn split_ops(line: &str) -> Vec<String> {
    let mut ops = Vec::new();
    let mut operator = String::new();
    let mut operand = String::new();
    let mut chars = line.trim().chars().peekable();

    while let Some(c) = chars.next() {
        let c = if c.is_whitespace() { ' ' } else { c };

        if c == '"' {
            flush(&mut ops, &mut operand);
            flush(&mut ops, &mut operator);
            ops.push(QUOTE.to_string());

            let mut literal = String::new();
            let mut closed = false;
            while let Some(inner) = chars.next() {
                if inner == '"' {
                    // VB escapes a quote by doubling it.
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        literal.push_str("\"\"");
                        continue;
                    }
                    closed = true;
                    break;
                }
                literal.push(inner);
            }
            if !literal.is_empty() {
                ops.push(literal);
            }
            if closed {
                ops.push(QUOTE.to_string());
            }
            continue;
        }

        if is_operator(c) {
            flush(&mut ops, &mut operand);
            operator.push(c);
        } else if is_identifier_char(c) {
            flush(&mut ops, &mut operator);
            operand.push(c);
        } else if is_grouping_symbol(c) {
            flush(&mut ops, &mut operand);
            flush(&mut ops, &mut operator);
            ops.push(c.to_string());
        }
    }

    flush(&mut ops, &mut operand);
    flush(&mut ops, &mut operator);
    ops
}

fn flush(ops: &mut Vec<String>, run: &mut String) {
    if !run.is_empty() {
        ops.push(std::mem::take(run));
    }
}

/// Drop whitespace outside quoted spans and remove the resulting empty ops.
///
/// Ops inside a quoted span are never altered.
pub fn normalize_ops(ops: Vec<String>) -> Vec<String> {
    let mut quotes = QuoteTracker::default();
    ops.into_iter()
        .filter_map(|op| {
            let inside = quotes.advance(&op);
            if inside || op == QUOTE {
                return Some(op);
            }
            let collapsed: String = op.split_whitespace().collect();
            (!collapsed.is_empty()).then_some(collapsed)
        })
        .collect()
}

/// Tracks whether a walk over ops is currently inside a quoted span.
///
/// Escapes are resolved by the tokenizer (a doubled quote stays inside the
/// span op), so every quote op toggles the state.
#[derive(Debug, Default, Clone, Copy)]
pub struct QuoteTracker {
    inside: bool,
}

impl QuoteTracker {
    /// Feed the next op and report whether the walk is inside quotes after it.
    ///
    /// An opening quote reports `true`, a closing quote `false`.
    pub fn advance(&mut self, op: &str) -> bool {
        if op == QUOTE {
            self.inside = !self.inside;
        }
        self.inside
    }

    pub fn inside(&self) -> bool {
        self.inside
    }
}

/// True if `word` occurs as an op outside any quoted span.
pub fn is_outside_quotes(ops: &[String], word: &str) -> bool {
    position_outside_quotes(ops, word).is_some()
}

/// Index of the first occurrence of `word` outside any quoted span.
pub fn position_outside_quotes(ops: &[String], word: &str) -> Option<usize> {
    let mut quotes = QuoteTracker::default();
    ops.iter()
        .position(|op| !quotes.advance(op) && op == word && op != QUOTE)
}

/// Rewrite VB's `&` string concatenation as `+`.
///
/// A lone `&` is left alone when it is followed by `&`, `=`, `(` or the
/// end of the line, or preceded by `+`. Quoted text is never touched.
pub fn concat_ampersands(ops: &mut [String]) {
    let mut previous = String::new();
    let mut quotes = QuoteTracker::default();
    for i in 0..ops.len() {
        let inside = quotes.advance(&ops[i]);
        let next = ops.get(i + 1).map(String::as_str).unwrap_or("");
        if !inside
            && ops[i] == "&"
            && next != "&"
            && previous != "+"
            && next != "="
            && next != "("
            && !next.is_empty()
        {
            ops[i] = "+".to_string();
        }
        previous = ops[i].clone();
    }
}

/// Strip a trailing `'` comment that lies outside any string literal.
///
/// A line that starts with `'` is a whole-line comment and is returned
/// unchanged.
pub fn strip_trailing_comment(line: &str) -> &str {
    let mut in_quotes = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '\'' if !in_quotes && i > 0 => return line[..i].trim_end(),
            _ => {}
        }
    }
    line
}
