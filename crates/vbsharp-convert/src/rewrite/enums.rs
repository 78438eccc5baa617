//! Enum headers and enumerator lines.

use super::{convert_modifiers, op_at, parse_type, render_expression};
use crate::assemble::LineAssembly;
use crate::diagnostics::RewriteError;
use crate::lexer::is_identifier_op;
use crate::session::Session;
use crate::symbols::EnumInfo;

/// `[modifiers] Enum Name [As T]`.
pub fn rewrite_header(
    session: &mut Session,
    ops: &[String],
    keyword: usize,
) -> Result<(), RewriteError> {
    let name = op_at(ops, keyword + 1);
    if !is_identifier_op(name) {
        return Err(RewriteError::malformed("enum header", "missing name"));
    }
    let underlying = match op_at(ops, keyword + 2) {
        "" => None,
        op if op.eq_ignore_ascii_case("as") => Some(parse_type(&ops[keyword + 3..])?.0),
        op => {
            return Err(RewriteError::malformed(
                "enum header",
                format!("unexpected `{op}`"),
            ));
        }
    };

    let mut info = EnumInfo::new();
    for modifier in convert_modifiers(&ops[..keyword]) {
        info.add_access_modifier(&modifier);
    }
    info.add_name(name);

    let mut header: Vec<String> = info.access_modifiers().to_vec();
    header.push("enum".to_string());
    header.push(name.to_string());
    if let Some(underlying) = underlying {
        header.push(":".to_string());
        header.push(underlying);
    }

    session.symbols.add_enum(info);
    session.context.enums.push(name.to_string());
    session.emit(LineAssembly::new(header).combine());
    session.emit("{");
    Ok(())
}

/// An enumerator line inside an open enum: `Name [= value]`.
///
/// The value is recorded against the innermost enum. A value naming an
/// earlier enumerator takes its value; other expressions are emitted but
/// not recorded.
pub fn rewrite_member(session: &mut Session, ops: &[String]) {
    let name = op_at(ops, 0);
    let value = (op_at(ops, 1) == "=").then(|| ops[2..].concat());

    if is_identifier_op(name)
        && let Some(current) = session.context.enums.last()
        && let Some(info) = session.symbols.enums.get_mut(current)
    {
        match value.as_deref().map(str::parse::<i64>) {
            None => info.add_implicit_value(name),
            Some(Ok(value)) => info.add_value(name, value),
            Some(Err(_)) => {
                let aliased = value.as_deref().and_then(|other| info.value(other));
                if let Some(aliased) = aliased {
                    info.add_value(name, aliased);
                }
            }
        }
    }

    let mut line = render_expression(ops);
    if !line.is_empty() && !line.ends_with(',') {
        line.push(',');
    }
    session.emit(line);
}
