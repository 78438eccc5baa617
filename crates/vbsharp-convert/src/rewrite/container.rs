//! Class, module and namespace blocks, inheritance clauses and `End`.

use super::{convert_modifiers, op_at, parse_type, split_top_level};
use crate::assemble::LineAssembly;
use crate::diagnostics::{DiagnosticKind, RewriteError};
use crate::lexer::is_identifier_op;
use crate::session::{BlockKind, Container, ContainerKind, Session};

/// `[modifiers] Class Name` or `[modifiers] Module Name`.
///
/// `keyword` is the index of the `Class`/`Module` op.
pub fn rewrite_header(
    session: &mut Session,
    ops: &[String],
    keyword: usize,
    kind: ContainerKind,
) -> Result<(), RewriteError> {
    let construct = match kind {
        ContainerKind::Class => "class header",
        ContainerKind::Module => "module header",
    };
    let name = op_at(ops, keyword + 1);
    if !is_identifier_op(name) {
        return Err(RewriteError::malformed(construct, "missing name"));
    }
    let display = if op_at(ops, keyword + 2) == "(" {
        parse_type(&ops[keyword + 1..])?.0
    } else {
        name.to_string()
    };

    let mut header = convert_modifiers(&ops[..keyword]);
    if kind == ContainerKind::Module {
        header.push("static".to_string());
    }
    header.push("class".to_string());
    header.push(display);

    session.symbols.add_class(name);
    session.context.containers.push(Container {
        name: name.to_string(),
        kind,
        header_line: session.output.len(),
    });
    session.emit(header.join(" "));
    session.emit("{");
    Ok(())
}

/// `Namespace A.B`.
pub fn rewrite_namespace(session: &mut Session, ops: &[String]) -> Result<(), RewriteError> {
    if ops.len() < 2 {
        return Err(RewriteError::malformed("namespace", "missing name"));
    }
    let header = LineAssembly::new(ops.iter().map(String::as_str))
        .prepend("namespace")
        .skip_pad_left(&["."])
        .skip_pad_right(&["."])
        .combine_replacing_first();
    session.context.blocks.push(BlockKind::Namespace);
    session.emit(header);
    session.emit("{");
    Ok(())
}

/// `Inherits Base` / `Implements IFoo, IBar`: extend the open class header.
pub fn rewrite_inheritance(session: &mut Session, ops: &[String]) -> Result<(), RewriteError> {
    let construct = "inheritance clause";
    let Some(header_line) = session.context.current_container().map(|c| c.header_line) else {
        return Err(RewriteError::malformed(construct, "not inside a class"));
    };
    let mut bases = Vec::new();
    for part in split_top_level(&ops[1..]) {
        let (base, used) = parse_type(part)?;
        if used != part.len() {
            return Err(RewriteError::malformed(
                construct,
                format!("unexpected `{}`", op_at(part, used)),
            ));
        }
        bases.push(base);
    }
    if bases.is_empty() {
        return Err(RewriteError::malformed(construct, "missing base type"));
    }

    let Some(header) = session.output.get_mut(header_line) else {
        return Err(RewriteError::malformed(construct, "class header not found"));
    };
    for base in bases {
        let separator = if header.contains(" : ") { ", " } else { " : " };
        header.push_str(separator);
        header.push_str(&base);
    }
    Ok(())
}

/// `End`, `End Class`, `End Sub`, `End If` and the rest.
pub fn rewrite_end(session: &mut Session, ops: &[String]) -> Result<(), RewriteError> {
    let target = op_at(ops, 1);
    if target.is_empty() {
        session.emit("Environment.Exit(0);");
        return Ok(());
    }
    let context = &mut session.context;
    let matched = match target {
        "Class" => close_container(&mut context.containers, ContainerKind::Class),
        "Module" => close_container(&mut context.containers, ContainerKind::Module),
        "Enum" => context.enums.pop().is_some(),
        "Function" | "Sub" | "Get" | "Set" | "Operator" => context.leave_function().is_some(),
        "Property" => {
            // Accessors already closed their own braces.
            context.leave_function();
            context.property_header = None;
            return Ok(());
        }
        "If" => context.close_block(BlockKind::If),
        "While" => context.close_block(BlockKind::While),
        "Namespace" => context.close_block(BlockKind::Namespace),
        _ => true,
    };
    if !matched {
        session.report(DiagnosticKind::UnmatchedClose {
            keyword: format!("End {target}"),
        });
    }
    session.emit("}");
    Ok(())
}

fn close_container(containers: &mut Vec<Container>, kind: ContainerKind) -> bool {
    match containers.iter().rposition(|c| c.kind == kind) {
        Some(index) => {
            containers.remove(index);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn run(session: &mut Session, line: &str) -> Result<(), RewriteError> {
        let ops = tokenize(line);
        if ops[0] == "End" {
            return rewrite_end(session, &ops);
        }
        if ops[0] == "Namespace" {
            return rewrite_namespace(session, &ops);
        }
        if ops[0] == "Inherits" || ops[0] == "Implements" {
            return rewrite_inheritance(session, &ops);
        }
        let (keyword, kind) = match ops.iter().position(|op| op == "Class") {
            Some(i) => (i, ContainerKind::Class),
            None => (
                ops.iter().position(|op| op == "Module").unwrap(),
                ContainerKind::Module,
            ),
        };
        rewrite_header(session, &ops, keyword, kind)
    }

    #[test]
    fn test_class_with_bases() {
        let mut session = Session::default();
        run(&mut session, "Public MustInherit Class Shape").unwrap();
        run(&mut session, "Inherits Base").unwrap();
        run(&mut session, "Implements IDrawable, IComparable(Of Shape)").unwrap();
        run(&mut session, "End Class").unwrap();
        assert_eq!(
            session.output,
            vec![
                "public abstract class Shape : Base, IDrawable, IComparable<Shape>",
                "{",
                "}"
            ]
        );
        assert!(session.symbols.is_class("Shape"));
        assert!(!session.context.inside_class());
    }

    #[test]
    fn test_module_is_static_class() {
        let mut session = Session::default();
        run(&mut session, "Friend Module Program").unwrap();
        assert_eq!(session.output[0], "internal static class Program");
        assert!(session.context.inside_module());
    }

    #[test]
    fn test_generic_class_name() {
        let mut session = Session::default();
        run(&mut session, "Class Box(Of T)").unwrap();
        assert_eq!(session.output[0], "class Box<T>");
        assert!(session.symbols.is_class("Box"));
    }

    #[test]
    fn test_namespace() {
        let mut session = Session::default();
        run(&mut session, "Namespace App.Core").unwrap();
        run(&mut session, "End Namespace").unwrap();
        assert_eq!(session.output, vec!["namespace App.Core", "{", "}"]);
        assert!(session.diagnostics.is_empty());
    }

    #[test]
    fn test_unmatched_end_is_reported() {
        let mut session = Session::default();
        run(&mut session, "End Class").unwrap();
        assert_eq!(session.output, vec!["}"]);
        assert_eq!(
            session.diagnostics[0].kind,
            DiagnosticKind::UnmatchedClose {
                keyword: "End Class".to_string()
            }
        );
    }

    #[test]
    fn test_bare_end_exits() {
        let mut session = Session::default();
        run(&mut session, "End").unwrap();
        assert_eq!(session.output, vec!["Environment.Exit(0);"]);
    }

    #[test]
    fn test_inherits_outside_class_is_malformed() {
        let mut session = Session::default();
        assert!(run(&mut session, "Inherits Base").is_err());
        assert!(session.output.is_empty());
    }
}
