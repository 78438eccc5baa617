//! Function, sub and constructor signatures.

use super::{
    convert_modifiers, is_keyword, matching_paren, op_at, parse_type, render_expression,
    split_top_level,
};
use crate::assemble::{LineAssembly, format_ops};
use crate::diagnostics::{DiagnosticKind, RewriteError};
use crate::language::is_visibility;
use crate::lexer::is_identifier_op;
use crate::session::Session;
use crate::symbols::{DEFAULT_TYPE, FunctionInfo, VariableInfo};

/// The parts of a `Function`, `Sub` or `Property` header after its keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Signature {
    pub name: String,
    /// Rendered type parameters, e.g. `<T, U>`; empty when there are none.
    pub generics: String,
    pub parameters: Vec<Vec<String>>,
    /// The `As` clause after the parameter list.
    pub return_type: Option<String>,
    /// Index of the first op after the signature.
    pub end: usize,
}

/// Parse `Name[(Of T)][(params)] [As Type]` following the op at `keyword`.
pub(crate) fn parse_signature(
    construct: &'static str,
    ops: &[String],
    keyword: usize,
) -> Result<Signature, RewriteError> {
    let name = op_at(ops, keyword + 1);
    if !is_identifier_op(name) {
        return Err(RewriteError::malformed(construct, "missing name"));
    }
    let mut i = keyword + 2;

    let mut generics = String::new();
    if op_at(ops, i) == "(" && is_keyword(op_at(ops, i + 1), "of") {
        let close = matching_paren(ops, i)
            .ok_or_else(|| RewriteError::malformed(construct, "unclosed `(Of` list"))?;
        let names: Vec<String> = split_top_level(&ops[i + 2..close])
            .into_iter()
            .map(|part| part.join(" "))
            .collect();
        generics = format!("<{}>", names.join(", "));
        i = close + 1;
    }

    let mut parameters = Vec::new();
    if op_at(ops, i) == "(" {
        let close = matching_paren(ops, i)
            .ok_or_else(|| RewriteError::malformed(construct, "unclosed parameter list"))?;
        parameters = parse_parameters(&ops[i + 1..close])?;
        i = close + 1;
    }

    let mut return_type = None;
    if is_keyword(op_at(ops, i), "as") {
        let (ty, used) = parse_type(&ops[i + 1..])?;
        return_type = Some(ty);
        i += 1 + used;
    }

    Ok(Signature {
        name: name.to_string(),
        generics,
        parameters,
        return_type,
        end: i,
    })
}

/// Parse a parameter list (the ops between the parentheses).
///
/// Each parameter becomes `[ref|params,] type, name [, "=", default]`.
pub(crate) fn parse_parameters(ops: &[String]) -> Result<Vec<Vec<String>>, RewriteError> {
    split_top_level(ops)
        .into_iter()
        .map(parse_parameter)
        .collect()
}

fn parse_parameter(ops: &[String]) -> Result<Vec<String>, RewriteError> {
    let mut parameter = Vec::new();
    let mut i = 0;
    loop {
        match op_at(ops, i).to_lowercase().as_str() {
            "byval" | "optional" => {}
            "byref" => parameter.push("ref".to_string()),
            "paramarray" => parameter.push("params".to_string()),
            _ => break,
        }
        i += 1;
    }

    let name = op_at(ops, i);
    if !is_identifier_op(name) {
        return Err(RewriteError::malformed("parameter", "missing name"));
    }
    i += 1;
    let mut array = false;
    if op_at(ops, i) == "(" && op_at(ops, i + 1) == ")" {
        array = true;
        i += 2;
    }

    let mut ty = DEFAULT_TYPE.to_string();
    if is_keyword(op_at(ops, i), "as") {
        let (parsed, used) = parse_type(&ops[i + 1..])?;
        ty = parsed;
        i += 1 + used;
    }
    if array {
        ty.push_str("[]");
    }
    parameter.push(ty);
    parameter.push(name.to_string());

    if op_at(ops, i) == "=" {
        let default = &ops[i + 1..];
        if default.is_empty() {
            return Err(RewriteError::malformed("parameter", "missing default value"));
        }
        parameter.push("=".to_string());
        parameter.push(render_expression(default));
    } else if i < ops.len() {
        return Err(RewriteError::malformed(
            "parameter",
            format!("unexpected `{}`", ops[i]),
        ));
    }
    Ok(parameter)
}

/// Type and name of a parsed parameter.
pub(crate) fn parameter_binding(parameter: &[String]) -> Option<(&str, &str)> {
    let start = parameter
        .iter()
        .position(|op| op != "ref" && op != "params")?;
    Some((parameter.get(start)?.as_str(), parameter.get(start + 1)?.as_str()))
}

/// Render a complete signature line.
pub(crate) fn render_signature(info: &FunctionInfo, generics: &str) -> String {
    let mut ops = info.access_modifiers.clone();
    ops.extend(info.return_type.clone());
    ops.push(format!("{}{generics}", info.name));
    ops.push("(".to_string());
    for (i, parameter) in info.parameters.iter().enumerate() {
        if i > 0 {
            ops.push(",".to_string());
        }
        ops.push(parameter.join(" "));
    }
    ops.push(")".to_string());
    LineAssembly::new(ops)
        .with_default_padding()
        .skip_pad_left(&[","])
        .combine()
}

/// Register a function, make it current and emit its opening lines.
///
/// `comment` is appended to the signature line as a `//` comment.
pub(crate) fn open_function(
    session: &mut Session,
    mut info: FunctionInfo,
    generics: &str,
    comment: Option<&str>,
) {
    for parameter in info.parameters.clone() {
        if let Some((ty, name)) = parameter_binding(&parameter) {
            info.add_variable(VariableInfo::new(name, ty));
        }
    }
    let mut signature = render_signature(&info, generics);
    if let Some(comment) = comment {
        signature.push_str(" // ");
        signature.push_str(comment);
    }

    if !matches!(session.output.last().map(String::as_str), None | Some("") | Some("{")) {
        session.emit("");
    }
    session.emit(signature);
    session.emit("{");
    session.symbols.add_function(info.clone());
    session.context.enter_function(info);
}

/// Module members are static.
pub(crate) fn add_module_static(session: &Session, modifiers: &mut Vec<String>) {
    let context = &session.context;
    if context.inside_module() && !context.inside_class() && !modifiers.iter().any(|m| m == "static")
    {
        modifiers.push("static".to_string());
    }
}

/// `[modifiers] Function Name(...) As T` or `[modifiers] Sub Name(...)`.
///
/// `keyword` is the index of the `Function`/`Sub` op.
pub fn rewrite_function(
    session: &mut Session,
    ops: &[String],
    keyword: usize,
    is_sub: bool,
) -> Result<(), RewriteError> {
    let construct = if is_sub { "Sub" } else { "Function" };
    let signature = parse_signature(construct, ops, keyword)?;
    let mut modifiers = convert_modifiers(&ops[..keyword]);

    let (name, return_type) = match (is_sub, signature.name.as_str()) {
        (true, "Main") => {
            modifiers = vec!["static".to_string()];
            ("Main".to_string(), Some("void".to_string()))
        }
        (true, "New") => {
            let context = &session.context;
            let Some(container) = context.current_container() else {
                return Err(RewriteError::malformed("constructor", "outside any class"));
            };
            if context.inside_module() && !context.inside_class() {
                modifiers = vec!["static".to_string()];
            } else if !modifiers.iter().any(|m| is_visibility(m)) {
                modifiers.insert(0, "public".to_string());
            }
            (container.name.clone(), None)
        }
        (true, name) => (name.to_string(), Some("void".to_string())),
        (false, name) => (
            name.to_string(),
            Some(
                signature
                    .return_type
                    .clone()
                    .unwrap_or_else(|| DEFAULT_TYPE.to_string()),
            ),
        ),
    };
    add_module_static(session, &mut modifiers);

    let info = FunctionInfo {
        access_modifiers: modifiers,
        return_type,
        name,
        parameters: signature.parameters,
        ..FunctionInfo::default()
    };

    // `Implements I.M` and `Handles x.Event` have no place in the signature.
    let trailing = &ops[signature.end.min(ops.len())..];
    let clause = (!trailing.is_empty()).then(|| format_ops(trailing));
    open_function(session, info, &signature.generics, clause.as_deref());
    if let Some(clause) = clause {
        session.report(DiagnosticKind::TrailingClause { clause });
    }
    Ok(())
}
