//! Line preparation before the main conversion loop.

use crate::lexer::{QuoteTracker, strip_trailing_comment, tokenize};

/// One prepared source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// 1-based line number in the original file.
    pub number: usize,
    /// Trimmed text with any trailing comment removed.
    pub text: String,
}

/// Trim every line, strip trailing comments and, when `split` is set, expand
/// multi-variable `Dim` statements into one declaration per line.
pub fn prepare(source: &str, split: bool) -> Vec<SourceLine> {
    let mut lines = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        let number = index + 1;
        let text = strip_trailing_comment(raw.trim());
        let declarations = if split && starts_with_dim(text) {
            split_declaration(text)
        } else {
            vec![text.to_string()]
        };
        lines.extend(
            declarations
                .into_iter()
                .map(|text| SourceLine { number, text }),
        );
    }
    lines
}

fn starts_with_dim(line: &str) -> bool {
    line.split_whitespace()
        .next()
        .is_some_and(|word| word.eq_ignore_ascii_case("dim"))
}

/// Split `Dim a, b As T` into `Dim a As T` and `Dim b As T`.
///
/// Commas inside string literals and brackets do not separate names. A name
/// with neither a type nor an initializer takes the type of the next name
/// that has one.
pub fn split_declaration(line: &str) -> Vec<String> {
    let Some((keyword, rest)) = line.split_once(char::is_whitespace) else {
        return vec![line.to_string()];
    };
    let segments = split_top_level(rest);
    if segments.len() < 2 {
        return vec![line.to_string()];
    }

    let clauses: Vec<Option<String>> = segments.iter().map(|s| type_clause(s)).collect();
    segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            let untyped = clauses[i].is_none() && !has_initializer(segment);
            let shared = untyped
                .then(|| clauses[i + 1..].iter().flatten().next())
                .flatten();
            match shared {
                Some(clause) => format!("{keyword} {segment} As {clause}"),
                None => format!("{keyword} {segment}"),
            }
        })
        .collect()
}

fn split_top_level(text: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_quotes = false;

    for c in text.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            '(' | '[' | '{' if !in_quotes => depth += 1,
            ')' | ']' | '}' if !in_quotes => depth = depth.saturating_sub(1),
            ',' if !in_quotes && depth == 0 => {
                segments.push(std::mem::take(&mut current).trim().to_string());
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    segments.push(current.trim().to_string());
    segments.retain(|s| !s.is_empty());
    segments
}

/// The type named by a segment's `As` clause, without `New` or initializer.
fn type_clause(segment: &str) -> Option<String> {
    let ops = tokenize(segment);
    let mut quotes = QuoteTracker::default();
    let start = ops
        .iter()
        .position(|op| !quotes.advance(op) && op.eq_ignore_ascii_case("as"))?;
    let clause: Vec<&str> = ops[start + 1..]
        .iter()
        .take_while(|op| *op != "=")
        .filter(|op| !op.eq_ignore_ascii_case("new"))
        .map(String::as_str)
        .collect();
    (!clause.is_empty()).then(|| clause.join(" "))
}

fn has_initializer(segment: &str) -> bool {
    crate::lexer::is_outside_quotes(&tokenize(segment), "=")
}
