//! Variable, field and constant declarations.

use super::{
    is_keyword, matching_paren, op_at, parse_type, render_expression, split_top_level,
};
use crate::diagnostics::RewriteError;
use crate::language::{convert_access_modifier, convert_id_type_char};
use crate::lexer::is_identifier_op;
use crate::session::{ContainerKind, Session};
use crate::symbols::{DEFAULT_TYPE, VariableInfo};

/// A value built with `New`: the constructed type and rendered arguments.
struct Construction {
    ty: String,
    arguments: String,
}

/// Parse `T[(args)]` after a `New` keyword. Returns the construction and
/// the number of ops used.
fn parse_construction(ops: &[String]) -> Result<(Construction, usize), RewriteError> {
    let (ty, mut used) = parse_type(ops)?;
    let mut arguments = String::new();
    if op_at(ops, used) == "(" {
        let close = matching_paren(ops, used)
            .ok_or_else(|| RewriteError::malformed("declaration", "unclosed arguments"))?;
        arguments = render_expression(&ops[used + 1..close]);
        used = close + 1;
    }
    Ok((Construction { ty, arguments }, used))
}

/// `New T() {a, b}`: the array type and the brace-delimited elements.
fn array_literal(value: &[String]) -> Option<(String, &[String])> {
    if !is_keyword(op_at(value, 0), "new") {
        return None;
    }
    let (ty, used) = parse_type(&value[1..]).ok()?;
    let elements = &value[1 + used..];
    (ty.ends_with("[]") && op_at(elements, 0) == "{").then_some((ty, elements))
}

/// Upper bound of one array rank, as an element count.
fn array_length(bound: &[String]) -> String {
    if bound.is_empty() {
        return String::new();
    }
    match bound.concat().parse::<i64>() {
        Ok(last) => last.saturating_add(1).to_string(),
        Err(_) => format!("{} + 1", render_expression(bound)),
    }
}

/// `[Dim|modifiers] name[type char][(bounds)] [As [New] T[(args)]] [= value]`.
pub fn rewrite_declaration(session: &mut Session, ops: &[String]) -> Result<(), RewriteError> {
    let construct = "declaration";
    let mut modifiers: Vec<String> = Vec::new();
    let mut i = 0;
    while i < ops.len() {
        if is_keyword(&ops[i], "dim") {
            i += 1;
            continue;
        }
        let Some(modifier) = convert_access_modifier(&ops[i]) else {
            break;
        };
        if !modifiers.iter().any(|m| m == modifier) {
            modifiers.push(modifier.to_string());
        }
        i += 1;
    }

    let name = op_at(ops, i);
    if !is_identifier_op(name) {
        return Err(RewriteError::malformed(construct, "missing name"));
    }
    i += 1;

    let mut ty = convert_id_type_char(op_at(ops, i)).map(str::to_string);
    if ty.is_some() {
        i += 1;
    }

    let mut ranks: Option<Vec<String>> = None;
    if op_at(ops, i) == "(" {
        let close = matching_paren(ops, i)
            .ok_or_else(|| RewriteError::malformed(construct, "unclosed array bounds"))?;
        let bounds = split_top_level(&ops[i + 1..close]);
        ranks = Some(if bounds.is_empty() {
            vec![String::new()]
        } else {
            bounds.into_iter().map(array_length).collect()
        });
        i = close + 1;
    }

    let mut construction = None;
    if is_keyword(op_at(ops, i), "as") {
        i += 1;
        if is_keyword(op_at(ops, i), "new") {
            let (built, used) = parse_construction(&ops[i + 1..])?;
            ty = Some(built.ty.clone());
            construction = Some(built);
            i += 1 + used;
        } else {
            let (parsed, used) = parse_type(&ops[i..])?;
            ty = Some(parsed);
            i += used;
        }
    }

    let mut initializer = None;
    if op_at(ops, i) == "=" {
        let value = &ops[i + 1..];
        if value.is_empty() {
            return Err(RewriteError::malformed(construct, "missing initializer"));
        }
        let built = if is_keyword(op_at(value, 0), "new") && is_identifier_op(op_at(value, 1)) {
            match parse_construction(&value[1..])? {
                (built, used) if used + 1 == value.len() => Some(built),
                _ => None,
            }
        } else {
            None
        };
        match (built, array_literal(value)) {
            (Some(built), _) => {
                ty.get_or_insert_with(|| built.ty.clone());
                construction = Some(built);
            }
            (None, Some((literal, elements))) => {
                if ty.is_none() {
                    let element = literal.strip_suffix("[]").filter(|_| ranks.is_some());
                    ty = Some(element.unwrap_or(&literal).to_string());
                }
                initializer = Some(format!("new {literal} {}", render_expression(elements)));
            }
            (None, None) => {
                if ty.is_none()
                    && value.len() == 3
                    && value[1] == "."
                    && session.symbols.is_enum(&value[0])
                {
                    ty = Some(value[0].clone());
                }
                initializer = Some(render_expression(value));
            }
        }
        i = ops.len();
    }
    if i < ops.len() {
        return Err(RewriteError::malformed(
            construct,
            format!("unexpected `{}`", ops[i]),
        ));
    }

    let base = ty.unwrap_or_else(|| DEFAULT_TYPE.to_string());
    if ranks.is_none() && construction.is_none() && initializer.is_none() {
        let plain = base.split('<').next().unwrap_or(&base);
        if session.symbols.is_user_type(plain) {
            construction = Some(Construction {
                ty: base.clone(),
                arguments: String::new(),
            });
        }
    }

    let var_type = match &ranks {
        Some(ranks) => format!("{base}[{}]", ",".repeat(ranks.len() - 1)),
        None => base.clone(),
    };
    if let Some(ranks) = &ranks
        && initializer.is_none()
        && ranks.iter().all(|r| !r.is_empty())
    {
        initializer = Some(format!("new {base}[{}]", ranks.join(", ")));
    }
    let is_new = construction.is_some();
    if let Some(built) = construction {
        initializer = Some(format!("new {}({})", built.ty, built.arguments));
    }

    let context = &session.context;
    if context.at_module_level() && !modifiers.iter().any(|m| m == "const" || m == "static") {
        modifiers.push("static".to_string());
    }

    let mut line = modifiers.clone();
    line.push(var_type.clone());
    line.push(name.to_string());
    let mut line = line.join(" ");
    if let Some(value) = &initializer {
        line.push_str(" = ");
        line.push_str(value);
    }
    line.push(';');

    let variable = VariableInfo {
        access_modifiers: modifiers,
        var_type,
        is_array: ranks.is_some(),
        is_new,
        name: name.to_string(),
        assignment: initializer.unwrap_or_default(),
    };
    register(session, variable);
    session.emit(line);
    Ok(())
}

/// Locals go to the current function, fields to the innermost class, and
/// everything else to the session's variable table.
fn register(session: &mut Session, variable: VariableInfo) {
    if let Some(function) = session.context.function_mut() {
        function.add_variable(variable);
        return;
    }
    if let Some(container) = session.context.current_container()
        && container.kind == ContainerKind::Class
        && let Some(class) = session.symbols.classes.get_mut(&container.name)
    {
        class.add_variable(variable);
        return;
    }
    session
        .symbols
        .variables
        .entry(variable.name.clone())
        .or_insert(variable);
}
