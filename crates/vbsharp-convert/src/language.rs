//! Keyword, modifier and type tables.
//!
//! Pure lookups from source vocabulary to target vocabulary. All lookups
//! are case-insensitive on the source side except the identifier type
//! characters, which are single symbols.

use crate::lexer::{is_grouping_op, is_numeric_op, is_operator, is_operator_op};

/// Modifiers that appear before declarations.
///
/// `const`, `readonly`, `static` and the inheritance modifiers are not
/// strictly access modifiers but live here so every declaration prefix
/// goes through one table.
const ACCESS_MODIFIERS: &[(&str, &str)] = &[
    ("const", "const"),
    ("readonly", "readonly"),
    ("static", "static"),
    ("shared", "static"),
    ("friend", "internal"),
    ("private", "private"),
    ("protected", "protected"),
    ("public", "public"),
    ("overrides", "override"),
    ("overridable", "virtual"),
    ("mustoverride", "abstract"),
    ("mustinherit", "abstract"),
    ("notinheritable", "sealed"),
    ("partial", "partial"),
];

/// Target modifiers that control visibility.
const VISIBILITY: &[&str] = &["public", "private", "protected", "internal"];

const DATA_TYPES: &[(&str, &str)] = &[
    ("boolean", "bool"),
    ("byte", "byte"),
    ("char", "char"),
    ("date", "DateTime"),
    ("decimal", "decimal"),
    ("dictionary", "Dictionary"),
    ("double", "double"),
    ("int", "int"),
    ("integer", "int"),
    ("list", "List"),
    ("long", "long"),
    ("object", "object"),
    ("short", "short"),
    ("single", "float"),
    ("string", "string"),
];

const TYPE_KEYWORDS: &[(&str, &str)] = &[("as", "as")];

/// Words dropped from the output entirely.
const EXCLUDED_KEYWORDS: &[(&str, &str)] = &[("byval", ""), ("dim", "")];

const FLOW_KEYWORDS: &[(&str, &str)] = &[
    ("and", "&&"),
    ("byref", "ref"),
    ("class", "class"),
    ("do", "do"),
    ("each", "foreach"),
    ("else", "else"),
    ("elseif", "else if"),
    ("end", "}"),
    ("end class", "}"),
    ("end enum", "}"),
    ("end function", "}"),
    ("end if", "}"),
    ("end sub", "}"),
    ("end while", "}"),
    ("enum", "enum"),
    ("exit", "return"),
    ("for", "for"),
    ("function", ""),
    ("get", "get"),
    ("if", "if"),
    ("in", "in"),
    ("inherits", ":"),
    ("implements", ":"),
    ("loop", "}"),
    ("loop until", "}"),
    ("loop while", "}"),
    ("module", "static class"),
    ("namespace", "namespace"),
    ("new", "new"),
    ("next", "}"),
    ("of", "of"),
    ("optional", ""),
    ("or", "||"),
    ("paramarray", "params"),
    ("property", ""),
    ("rem", "//"),
    ("return", "return"),
    ("set", "set"),
    ("step", "+="),
    ("sub", "void"),
    ("sub new", "sub new"),
    ("then", "then"),
    ("to", "to"),
    ("until", "while"),
    ("wend", "}"),
    ("while", "while"),
];

/// Operators and literals rewritten wherever an expression is emitted.
const EXPRESSION_KEYWORDS: &[(&str, &str)] = &[
    ("<>", "!="),
    ("andalso", "&&"),
    ("false", "false"),
    ("me", "this"),
    ("mod", "%"),
    ("new", "new"),
    ("not", "!"),
    ("nothing", "null"),
    ("orelse", "||"),
    ("true", "true"),
];

const IDENTIFIER_TYPE_CHARS: &[(&str, &str)] = &[
    ("%", "int"),
    ("&", "long"),
    ("@", "decimal"),
    ("!", "float"),
    ("#", "double"),
    ("$", "string"),
];

const PAIRED_KEYWORDS: &[(&str, &[&str])] = &[
    ("if", &["then"]),
    ("loop", &["until", "while"]),
    (
        "end",
        &["class", "enum", "function", "if", "module", "property", "sub", "while", "get", "set"],
    ),
    ("exit", &["do", "for", "function", "property", "sub", "while"]),
    ("sub", &["new", "main"]),
];

fn lookup<'a>(table: &'a [(&str, &'a str)], word: &str) -> Option<&'a str> {
    let word = word.to_lowercase();
    table
        .iter()
        .find(|(from, _)| *from == word)
        .map(|(_, to)| *to)
}

/// Translate a modifier keyword (`Public`, `Friend`, `Shared`, ...).
pub fn convert_access_modifier(word: &str) -> Option<&'static str> {
    lookup(ACCESS_MODIFIERS, word)
}

pub fn is_access_modifier(word: &str) -> bool {
    convert_access_modifier(word).is_some()
}

/// True for translated modifiers that control visibility.
pub fn is_visibility(modifier: &str) -> bool {
    VISIBILITY.contains(&modifier)
}

/// Translate a primitive or collection type name.
pub fn convert_data_type(word: &str) -> Option<&'static str> {
    lookup(DATA_TYPES, word)
}

pub fn is_data_type(word: &str) -> bool {
    convert_data_type(word).is_some()
}

/// Map a type suffix character (`x%`, `s$`) to its type.
pub fn convert_id_type_char(symbol: &str) -> Option<&'static str> {
    IDENTIFIER_TYPE_CHARS
        .iter()
        .find(|(from, _)| *from == symbol)
        .map(|(_, to)| *to)
}

pub fn is_excluded_keyword(word: &str) -> bool {
    lookup(EXCLUDED_KEYWORDS, word).is_some()
}

pub fn convert_flow_keyword(word: &str) -> Option<&'static str> {
    lookup(FLOW_KEYWORDS, word)
}

/// Translate an expression-level keyword or operator (`Nothing`, `<>`).
pub fn convert_expression_keyword(word: &str) -> Option<&'static str> {
    lookup(EXPRESSION_KEYWORDS, word)
}

/// Words that may follow `word` to form a compound keyword.
pub fn paired_keywords(word: &str) -> Option<&'static [&'static str]> {
    let word = word.to_lowercase();
    PAIRED_KEYWORDS
        .iter()
        .find(|(from, _)| *from == word)
        .map(|(_, pairs)| *pairs)
}

/// True when `word` is none of: a numeric literal, an operator, a grouping
/// symbol, or any keyword known to the tables above.
pub fn is_unregistered(word: &str) -> bool {
    !is_numeric_op(word)
        && !is_operator_op(word)
        && !is_grouping_op(word)
        && !word.chars().all(is_operator)
        && !is_access_modifier(word)
        && !is_data_type(word)
        && !is_excluded_keyword(word)
        && convert_flow_keyword(word).is_none()
        && convert_expression_keyword(word).is_none()
        && paired_keywords(word).is_none()
        && lookup(TYPE_KEYWORDS, word).is_none()
}
