//! Character and op classification.
//!
//! Every character of a source line falls into one of three classes:
//! operator characters (which accumulate into operator runs such as
//! `<=`), identifier characters (which accumulate into words and numeric
//! literals), and grouping symbols (which end the current run and are
//! emitted as ops of their own). Anything else is dropped.

/// Symbols that end the current run and become single-character ops.
pub const GROUPING_SYMBOLS: &[char] = &[' ', '(', ')', '[', ']', '{', '}', ','];

/// Characters that accumulate into operator runs.
///
/// The quote is listed for classification queries; the tokenizer gives it
/// special treatment so it always stands alone.
pub const OPERATORS: &[char] = &[
    ';', '\'', '"', '.', '&', '|', '@', '<', '>', '=', '*', '/', '+', '-', '!', '#', '$', '%',
    '^', '\\', ':', '?', '~',
];

pub fn is_grouping_symbol(c: char) -> bool {
    GROUPING_SYMBOLS.contains(&c)
}

pub fn is_operator(c: char) -> bool {
    OPERATORS.contains(&c)
}

pub fn is_numeric(c: char) -> bool {
    c.is_ascii_digit()
}

pub fn is_alpha(c: char) -> bool {
    c.is_alphabetic()
}

/// Letters, digits and underscore.
pub fn is_identifier_char(c: char) -> bool {
    is_alpha(c) || is_numeric(c) || c == '_'
}

/// True for a non-empty run of ASCII digits.
pub fn is_numeric_op(op: &str) -> bool {
    !op.is_empty() && op.chars().all(is_numeric)
}

/// True when `op` is exactly one operator character.
pub fn is_operator_op(op: &str) -> bool {
    single_char(op).is_some_and(is_operator)
}

/// True when `op` is exactly one grouping symbol.
pub fn is_grouping_op(op: &str) -> bool {
    single_char(op).is_some_and(is_grouping_symbol)
}

/// True when `op` could name something: starts with a letter or `_` and
/// contains only identifier characters.
pub fn is_identifier_op(op: &str) -> bool {
    let mut chars = op.chars();
    match chars.next() {
        Some(first) if is_alpha(first) || first == '_' => chars.all(is_identifier_char),
        _ => false,
    }
}

fn single_char(op: &str) -> Option<char> {
    let mut chars = op.chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(c)
}
