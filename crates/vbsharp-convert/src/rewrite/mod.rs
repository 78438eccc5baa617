//! Construct rewriters.
//!
//! Each rewriter takes the ops of one line plus the [`Session`] and emits
//! zero or more output lines. A rewriter validates the whole line before
//! it touches the session, so a [`RewriteError`] leaves no partial output
//! behind and the dispatcher can fall back to pass-through.
//!
//! [`Session`]: crate::session::Session

pub mod container;
pub mod control;
pub mod declaration;
pub mod enums;
pub mod function;
pub mod passthrough;
pub mod property;

use crate::assemble::format_ops;
use crate::diagnostics::RewriteError;
use crate::language::{convert_access_modifier, convert_data_type, convert_expression_keyword};
use crate::lexer::{QuoteTracker, is_identifier_op};

/// The op at `index`, or `""` past the end.
pub(crate) fn op_at(ops: &[String], index: usize) -> &str {
    ops.get(index).map(String::as_str).unwrap_or("")
}

/// Case-insensitive keyword comparison.
pub(crate) fn is_keyword(op: &str, keyword: &str) -> bool {
    op.eq_ignore_ascii_case(keyword)
}

/// Position of `keyword` when every op before it is a plain word, as in
/// `Public Shared Function` or `Friend Class`.
pub(crate) fn declaration_keyword(ops: &[String], keyword: &str) -> Option<usize> {
    let index = ops.iter().position(|op| op == keyword)?;
    ops[..index]
        .iter()
        .all(|op| is_identifier_op(op))
        .then_some(index)
}

/// Translate the modifiers among `ops`, dropping words that are not
/// modifiers.
pub(crate) fn convert_modifiers(ops: &[String]) -> Vec<String> {
    ops.iter()
        .filter_map(|op| convert_access_modifier(op))
        .map(str::to_string)
        .collect()
}

/// Position of `keyword` outside quotes, ignoring case.
pub(crate) fn find_keyword(ops: &[String], keyword: &str) -> Option<usize> {
    let mut quotes = QuoteTracker::default();
    ops.iter()
        .position(|op| !quotes.advance(op) && is_keyword(op, keyword))
}

/// Position of the `)` matching the `(` at `open`.
pub(crate) fn matching_paren(ops: &[String], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quotes = QuoteTracker::default();
    for (i, op) in ops.iter().enumerate().skip(open) {
        if quotes.advance(op) || op == crate::lexer::QUOTE {
            continue;
        }
        match op.as_str() {
            "(" => depth += 1,
            ")" => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split ops on commas that are outside quotes and brackets.
pub(crate) fn split_top_level(ops: &[String]) -> Vec<&[String]> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut quotes = QuoteTracker::default();
    for (i, op) in ops.iter().enumerate() {
        if quotes.advance(op) || op == crate::lexer::QUOTE {
            continue;
        }
        match op.as_str() {
            "(" | "[" | "{" => depth += 1,
            ")" | "]" | "}" => depth = depth.saturating_sub(1),
            "," if depth == 0 => {
                parts.push(&ops[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < ops.len() || !parts.is_empty() {
        parts.push(&ops[start..]);
    }
    parts
}

/// Resolve one type name through the type table, keeping unknown names.
pub(crate) fn resolve_type_name(name: &str) -> String {
    convert_data_type(name)
        .map(str::to_string)
        .unwrap_or_else(|| name.to_string())
}

/// Parse a type reference at the start of `ops`.
///
/// Handles qualified names, `(Of A, B)` argument lists and trailing `()`
/// array markers. Returns the rendered type and the number of ops used.
pub(crate) fn parse_type(ops: &[String]) -> Result<(String, usize), RewriteError> {
    let first = op_at(ops, 0);
    if !is_identifier_op(first) {
        return Err(RewriteError::malformed(
            "type",
            format!("expected a type name, found `{first}`"),
        ));
    }

    let mut name = first.to_string();
    let mut i = 1;
    while op_at(ops, i) == "." && is_identifier_op(op_at(ops, i + 1)) {
        name.push('.');
        name.push_str(&ops[i + 1]);
        i += 2;
    }
    if i == 1 {
        name = resolve_type_name(&name);
    }

    if op_at(ops, i) == "(" && is_keyword(op_at(ops, i + 1), "of") {
        i += 2;
        let mut arguments = Vec::new();
        loop {
            let (argument, used) = parse_type(&ops[i.min(ops.len())..])?;
            arguments.push(argument);
            i += used;
            match op_at(ops, i) {
                "," => i += 1,
                ")" => {
                    i += 1;
                    break;
                }
                _ => {
                    return Err(RewriteError::malformed("type", "unclosed `(Of` list"));
                }
            }
        }
        name = format!("{name}<{}>", arguments.join(", "));
    }

    while op_at(ops, i) == "(" && op_at(ops, i + 1) == ")" {
        name.push_str("[]");
        i += 2;
    }
    Ok((name, i))
}

/// Translate expression vocabulary (`Nothing`, `AndAlso`, `<>`, `Me`, ...)
/// outside string literals.
pub fn translate_expression(ops: &[String]) -> Vec<String> {
    let mut quotes = QuoteTracker::default();
    ops.iter()
        .map(|op| {
            let inside = quotes.advance(op);
            if inside || op == crate::lexer::QUOTE {
                return op.clone();
            }
            convert_expression_keyword(op)
                .map(str::to_string)
                .unwrap_or_else(|| op.clone())
        })
        .collect()
}

/// Translate a condition: expression vocabulary plus `And`, `Or`, `=`
/// and `Is`.
pub fn translate_condition(ops: &[String]) -> Vec<String> {
    let mut quotes = QuoteTracker::default();
    ops.iter()
        .map(|op| {
            let inside = quotes.advance(op);
            if inside || op == crate::lexer::QUOTE {
                return op.clone();
            }
            let translated = match op.to_lowercase().as_str() {
                "=" | "is" => Some("=="),
                "isnot" => Some("!="),
                "and" => Some("&&"),
                "or" => Some("||"),
                _ => convert_expression_keyword(op),
            };
            translated.map(str::to_string).unwrap_or_else(|| op.clone())
        })
        .collect()
}

/// Render an expression as one string.
pub fn render_expression(ops: &[String]) -> String {
    format_ops(&translate_expression(ops))
}

/// Render a condition as one string.
pub fn render_condition(ops: &[String]) -> String {
    format_ops(&translate_condition(ops))
}

const RELATIONAL: &[&str] = &["<", ">", "<=", ">=", "=", "<>"];
const LOGICAL: &[&str] = &["and", "or", "andalso", "orelse", "not", "xor"];

/// Render the logical negation of a condition.
///
/// A condition with a single relational operator and no logical operator
/// has the operator inverted (`x = y` becomes `x != y`). Anything else is
/// wrapped as `!(...)`.
pub fn negate_condition(ops: &[String]) -> String {
    let merged = merge_relational(ops);

    let mut quotes = QuoteTracker::default();
    let mut relational = Vec::new();
    let mut has_logical = false;
    for (i, op) in merged.iter().enumerate() {
        if quotes.advance(op) || op == crate::lexer::QUOTE {
            continue;
        }
        if RELATIONAL.contains(&op.as_str()) {
            relational.push(i);
        } else if LOGICAL.contains(&op.to_lowercase().as_str()) {
            has_logical = true;
        }
    }

    if let ([index], false) = (relational.as_slice(), has_logical) {
        let inverted = match merged[*index].as_str() {
            "<" => ">=",
            ">" => "<=",
            "<=" => ">",
            ">=" => "<",
            "=" => "!=",
            _ => "==",
        };
        let mut negated = translate_expression(&merged);
        negated[*index] = inverted.to_string();
        return format_ops(&negated);
    }

    format!("!({})", render_condition(&merged))
}

/// Join relational operators the source wrote with a space between them
/// (`< =`).
fn merge_relational(ops: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(ops.len());
    let mut quotes = QuoteTracker::default();
    for op in ops {
        let inside = quotes.advance(op);
        if !inside && op != crate::lexer::QUOTE {
            if let Some(last) = merged.last_mut() {
                let joined = format!("{last}{op}");
                if matches!(joined.as_str(), "<=" | ">=" | "<>") && (last == "<" || last == ">") {
                    *last = joined;
                    continue;
                }
            }
        }
        merged.push(op.clone());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn negate(line: &str) -> String {
        negate_condition(&tokenize(line))
    }

    #[test]
    fn test_parse_generic_type() {
        let ops = tokenize("Dictionary(Of String, List(Of Integer)) = x");
        let (ty, used) = parse_type(&ops).unwrap();
        assert_eq!(ty, "Dictionary<string, List<int>>");
        assert_eq!(op_at(&ops, used), "=");
    }

    #[test]
    fn test_parse_array_and_unknown_types() {
        let (ty, used) = parse_type(&tokenize("String()")).unwrap();
        assert_eq!((ty.as_str(), used), ("string[]", 3));
        let (ty, _) = parse_type(&tokenize("Customer")).unwrap();
        assert_eq!(ty, "Customer");
        let (ty, _) = parse_type(&tokenize("System.Text.StringBuilder")).unwrap();
        assert_eq!(ty, "System.Text.StringBuilder");
        assert!(parse_type(&tokenize("List(Of String")).is_err());
        assert!(parse_type(&tokenize("= 5")).is_err());
    }

    #[test]
    fn test_negate_single_relation() {
        assert_eq!(negate("x = y"), "x != y");
        assert_eq!(negate("x < y"), "x >= y");
        assert_eq!(negate("x > 10"), "x <= 10");
        assert_eq!(negate("x <= y"), "x > y");
        assert_eq!(negate("x < = y"), "x > y");
        assert_eq!(negate("x <> Nothing"), "x == null");
    }

    #[test]
    fn test_negate_compound() {
        assert_eq!(negate("a = 1 And b = 2"), "!(a == 1 && b == 2)");
        assert_eq!(negate("done"), "!(done)");
    }

    #[test]
    fn test_condition_keeps_literals() {
        let ops = tokenize(r#"name = "a = b" Or flag"#);
        assert_eq!(render_condition(&ops), r#"name == "a = b" || flag"#);
    }

    #[test]
    fn test_split_top_level() {
        let ops = tokenize(r#"a As Integer, b(1, 2), "x, y""#);
        assert_eq!(split_top_level(&ops).len(), 3);
        assert!(split_top_level(&[]).is_empty());
    }

    #[test]
    fn test_declaration_keyword() {
        let ops = tokenize("Public Shared Function Add(a As Integer)");
        assert_eq!(declaration_keyword(&ops, "Function"), Some(2));
        let ops = tokenize("f = Function(x) x + 1");
        assert_eq!(declaration_keyword(&ops, "Function"), None);
        assert_eq!(
            convert_modifiers(&tokenize("Public Overloads Shared")),
            vec!["public", "static"]
        );
    }

    #[test]
    fn test_matching_paren() {
        let ops = tokenize("Foo(a, Bar(b), \")\") As Integer");
        assert_eq!(op_at(&ops, matching_paren(&ops, 1).unwrap() + 1), "As");
    }
}
