//! Properties.
//!
//! A `Property` header produces no output by itself. Each `Get`/`Set`
//! accessor that follows becomes an independent method built from the
//! header line, so the session remembers where the header was.
//! A header with no accessors after it is an auto-property.

use super::function::{add_module_static, open_function, parse_parameters, parse_signature};
use super::{convert_modifiers, declaration_keyword, is_keyword, matching_paren, op_at};
use super::{parse_type, render_expression};
use crate::diagnostics::RewriteError;
use crate::lexer::{concat_ampersands, is_identifier_op, tokenize};
use crate::session::Session;
use crate::symbols::{DEFAULT_TYPE, FunctionInfo, VariableInfo};

/// Index of the `Get`/`Set` keyword when the line opens an accessor.
pub(crate) fn accessor_keyword(ops: &[String]) -> Option<usize> {
    ["Get", "Set"].into_iter().find_map(|keyword| {
        declaration_keyword(ops, keyword).filter(|at| matches!(op_at(ops, at + 1), "" | "("))
    })
}

/// Modifiers of a property header, without `ReadOnly`.
fn property_modifiers(ops: &[String], keyword: usize) -> Vec<String> {
    let mut modifiers = convert_modifiers(&ops[..keyword]);
    modifiers.retain(|m| m != "readonly");
    modifiers
}

/// `[modifiers] Property Name[(index params)] As T`.
///
/// `keyword` is the index of the `Property` op.
pub fn rewrite_header(
    session: &mut Session,
    ops: &[String],
    keyword: usize,
) -> Result<(), RewriteError> {
    if next_is_accessor(session) {
        parse_signature("property", ops, keyword)?;
        session.context.property_header = Some(session.cursor);
        return Ok(());
    }
    rewrite_auto_property(session, ops, keyword)
}

fn next_is_accessor(session: &Session) -> bool {
    session
        .input
        .iter()
        .skip(session.cursor + 1)
        .map(|line| line.text.as_str())
        .find(|text| !text.is_empty() && !text.starts_with('\''))
        .is_some_and(|text| accessor_keyword(&tokenize(text)).is_some())
}

/// `Property Name As T [= value]` with no accessor block.
fn rewrite_auto_property(
    session: &mut Session,
    ops: &[String],
    keyword: usize,
) -> Result<(), RewriteError> {
    let name = op_at(ops, keyword + 1);
    if !is_identifier_op(name) {
        return Err(RewriteError::malformed("property", "missing name"));
    }
    let mut i = keyword + 2;
    let mut ty = DEFAULT_TYPE.to_string();
    let mut initializer = None;
    if is_keyword(op_at(ops, i), "as") {
        i += 1;
        let constructed = is_keyword(op_at(ops, i), "new");
        if constructed {
            i += 1;
        }
        let (parsed, used) = parse_type(&ops[i..])?;
        i += used;
        if constructed {
            let arguments = if op_at(ops, i) == "(" {
                let close = matching_paren(ops, i)
                    .ok_or_else(|| RewriteError::malformed("property", "unclosed arguments"))?;
                let arguments = render_expression(&ops[i + 1..close]);
                i = close + 1;
                arguments
            } else {
                String::new()
            };
            initializer = Some(format!("new {parsed}({arguments})"));
        }
        ty = parsed;
    }
    if op_at(ops, i) == "=" {
        if ops.len() == i + 1 {
            return Err(RewriteError::malformed("property", "missing initializer"));
        }
        initializer = Some(render_expression(&ops[i + 1..]));
    } else if i < ops.len() {
        return Err(RewriteError::malformed(
            "property",
            format!("unexpected `{}`", ops[i]),
        ));
    }

    let read_only = ops[..keyword].iter().any(|op| is_keyword(op, "readonly"));
    let mut modifiers = property_modifiers(ops, keyword);
    add_module_static(session, &mut modifiers);

    let accessors = if read_only { "{ get; }" } else { "{ get; set; }" };
    let mut line: Vec<String> = modifiers;
    line.push(ty.clone());
    line.push(name.to_string());
    line.push(accessors.to_string());
    let mut line = line.join(" ");
    if let Some(initializer) = initializer {
        line.push_str(&format!(" = {initializer};"));
    }

    let field = VariableInfo::new(name, ty);
    if let Some(owner) = session.context.current_container()
        && let Some(class) = session.symbols.classes.get_mut(&owner.name)
    {
        class.add_variable(field);
    } else {
        session
            .symbols
            .variables
            .entry(name.to_string())
            .or_insert(field);
    }
    session.emit(line);
    Ok(())
}

/// `[modifiers] Get` or `[modifiers] Set[(params)]`.
///
/// `keyword` is the index of the `Get`/`Set` op.
pub fn rewrite_accessor(
    session: &mut Session,
    ops: &[String],
    keyword: usize,
) -> Result<(), RewriteError> {
    let construct = "property accessor";
    let header_index = session
        .context
        .property_header
        .ok_or_else(|| RewriteError::malformed(construct, "no property header"))?;
    let header = session
        .input
        .get(header_index)
        .ok_or_else(|| RewriteError::malformed(construct, "property header out of range"))?;
    let mut header_ops = tokenize(&header.text);
    concat_ampersands(&mut header_ops);
    let property_at = declaration_keyword(&header_ops, "Property")
        .ok_or_else(|| RewriteError::malformed(construct, "header has no `Property`"))?;
    let property = parse_signature("property", &header_ops, property_at)?;
    let property_type = property
        .return_type
        .clone()
        .unwrap_or_else(|| DEFAULT_TYPE.to_string());

    let is_set = ops[keyword] == "Set";
    let mut parameters = Vec::new();
    if op_at(ops, keyword + 1) == "(" {
        let close = matching_paren(ops, keyword + 1)
            .ok_or_else(|| RewriteError::malformed(construct, "unclosed parameter list"))?;
        parameters = parse_parameters(&ops[keyword + 2..close])?;
    }
    if is_set && parameters.is_empty() {
        parameters.push(vec![property_type.clone(), "value".to_string()]);
    }
    parameters.extend(property.parameters);

    let mut modifiers = convert_modifiers(&ops[..keyword]);
    if modifiers.is_empty() {
        modifiers = property_modifiers(&header_ops, property_at);
    }
    add_module_static(session, &mut modifiers);

    let prefix = if is_set { "Set" } else { "Get" };
    let mut name = format!("{prefix}{}", property.name);
    if session.symbols.is_function(&name) {
        name = format!("Prop_{name}");
    }
    let return_type = if is_set {
        "void".to_string()
    } else {
        property_type
    };

    let info = FunctionInfo {
        access_modifiers: modifiers,
        return_type: Some(return_type),
        name,
        parameters,
        ..FunctionInfo::default()
    };
    open_function(session, info, &property.generics, None);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prepass::prepare;
    use crate::session::{Container, ContainerKind};

    fn session_for(source: &str) -> Session {
        let mut session = Session::default();
        session.input = prepare(source, true);
        session
    }

    fn step(session: &mut Session, cursor: usize) -> Result<(), RewriteError> {
        session.cursor = cursor;
        let ops = tokenize(&session.input[cursor].text);
        if let Some(at) = declaration_keyword(&ops, "Property") {
            return rewrite_header(session, &ops, at);
        }
        let at = accessor_keyword(&ops).unwrap();
        rewrite_accessor(session, &ops, at)
    }

    #[test]
    fn test_get_and_set_accessors() {
        let mut session = session_for(
            "Public Property Name As String\nGet\nEnd Get\nPrivate Set(ByVal v As String)\nEnd Set\nEnd Property",
        );
        step(&mut session, 0).unwrap();
        assert!(session.output.is_empty());
        step(&mut session, 1).unwrap();
        assert_eq!(session.output, vec!["public string GetName()", "{"]);
        session.context.leave_function();
        session.emit("}");
        step(&mut session, 3).unwrap();
        assert_eq!(session.output[4], "private void SetName(string v)");
    }

    #[test]
    fn test_implicit_value_and_index_parameters() {
        let mut session = session_for("Property Item(index As Integer) As Double\nSet\n");
        step(&mut session, 0).unwrap();
        step(&mut session, 1).unwrap();
        assert_eq!(
            session.output[0],
            "void SetItem(double value, int index)"
        );
    }

    #[test]
    fn test_name_collision_gets_prefix() {
        let mut session = session_for("ReadOnly Property Total As Long\nGet\n");
        session.symbols.add_function(FunctionInfo::new("GetTotal"));
        step(&mut session, 0).unwrap();
        step(&mut session, 1).unwrap();
        assert_eq!(session.output[0], "long Prop_GetTotal()");
    }

    #[test]
    fn test_module_accessor_is_static() {
        let mut session = session_for("Public Property Count As Integer\nGet\n");
        session.context.containers.push(Container {
            name: "State".to_string(),
            kind: ContainerKind::Module,
            header_line: 0,
        });
        step(&mut session, 0).unwrap();
        step(&mut session, 1).unwrap();
        assert_eq!(session.output[0], "public static int GetCount()");
    }

    #[test]
    fn test_auto_property() {
        let mut session = session_for(
            "Public Property Title As String = \"none\"\nPublic ReadOnly Property Items As New List(Of Integer)\n",
        );
        step(&mut session, 0).unwrap();
        step(&mut session, 1).unwrap();
        assert_eq!(
            session.output,
            vec![
                "public string Title { get; set; } = \"none\";",
                "public List<int> Items { get; } = new List<int>();",
            ]
        );
    }

    #[test]
    fn test_accessor_without_header() {
        let mut session = session_for("Get\n");
        assert!(step(&mut session, 0).is_err());
        assert!(session.output.is_empty());
    }
}
