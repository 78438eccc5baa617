//! Statement classification and dispatch.
//!
//! [`classify`] decides which construct a line is, in a fixed priority
//! order; [`dispatch`] runs the matching rewriter. Keywords that open a
//! declaration (`Class`, `Sub`, `Property`, ...) only count when every op
//! before them is a plain word, which keeps string literals, lambdas and
//! member calls like `x.Set(1)` out of the rewriters.

use crate::diagnostics::RewriteError;
use crate::language::is_access_modifier;
use crate::lexer::{concat_ampersands, position_outside_quotes, tokenize};
use crate::prepass::SourceLine;
use crate::rewrite::property::accessor_keyword;
use crate::rewrite::{
    container, control, declaration, declaration_keyword, enums, function, is_keyword, op_at,
    passthrough, property,
};
use crate::session::{ContainerKind, Session};

/// What a line is. Positions are indices into the line's ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Blank,
    Comment,
    Container { keyword: usize, kind: ContainerKind },
    Declaration,
    Do,
    End,
    Exit,
    Enum { keyword: usize },
    For,
    Function { keyword: usize, is_sub: bool },
    Accessor { keyword: usize },
    If,
    ElseIf,
    Else,
    Loop,
    Namespace,
    Next,
    Property { keyword: usize },
    Return,
    While { keyword: usize },
    Inheritance,
    Passthrough,
}

/// A declaration keyword that is not the target of `End`.
fn opening_keyword(ops: &[String], keyword: &str) -> Option<usize> {
    if op_at(ops, 0) == "End" {
        return None;
    }
    declaration_keyword(ops, keyword)
}

fn is_comment(text: &str, ops: &[String]) -> bool {
    text.starts_with('\'') || is_keyword(op_at(ops, 0), "rem")
}

/// Classify one prepared line. `ops` must come from `text`.
pub fn classify(text: &str, ops: &[String]) -> StatementKind {
    if ops.is_empty() {
        return StatementKind::Blank;
    }
    if is_comment(text, ops) {
        return StatementKind::Comment;
    }
    if let Some(keyword) = opening_keyword(ops, "Class") {
        return StatementKind::Container {
            keyword,
            kind: ContainerKind::Class,
        };
    }

    let first = op_at(ops, 0);
    match first {
        "Dim" => return StatementKind::Declaration,
        "Do" => return StatementKind::Do,
        "End" => return StatementKind::End,
        "Exit" => return StatementKind::Exit,
        _ => {}
    }
    if let Some(keyword) = opening_keyword(ops, "Enum") {
        return StatementKind::Enum { keyword };
    }
    if first == "For" {
        return StatementKind::For;
    }
    if let Some(keyword) = opening_keyword(ops, "Function") {
        return StatementKind::Function {
            keyword,
            is_sub: false,
        };
    }
    if let Some(keyword) = accessor_keyword(ops) {
        return StatementKind::Accessor { keyword };
    }
    match first {
        "If" => return StatementKind::If,
        "ElseIf" => return StatementKind::ElseIf,
        "Else" => return StatementKind::Else,
        "Loop" => return StatementKind::Loop,
        _ => {}
    }
    if let Some(keyword) = opening_keyword(ops, "Module") {
        return StatementKind::Container {
            keyword,
            kind: ContainerKind::Module,
        };
    }
    match first {
        "Namespace" => return StatementKind::Namespace,
        "Next" | "Wend" => return StatementKind::Next,
        _ => {}
    }
    if let Some(keyword) = opening_keyword(ops, "Property") {
        return StatementKind::Property { keyword };
    }
    if first == "Return" {
        return StatementKind::Return;
    }
    if let Some(keyword) = opening_keyword(ops, "Sub") {
        return StatementKind::Function {
            keyword,
            is_sub: true,
        };
    }
    if let Some(keyword) = position_outside_quotes(ops, "While") {
        return StatementKind::While { keyword };
    }
    if matches!(first, "Inherits" | "Implements") {
        return StatementKind::Inheritance;
    }
    if is_access_modifier(first) {
        return StatementKind::Declaration;
    }
    StatementKind::Passthrough
}

/// `'` and `Rem` comments keep their text after the marker.
fn comment_text(text: &str) -> String {
    let body = match text.strip_prefix('\'') {
        Some(rest) => rest,
        None => text.get(3..).unwrap_or(""),
    };
    format!("//{body}")
}

/// Convert one prepared line into zero or more output lines.
///
/// A rewriter that rejects the line leaves a diagnostic behind and the
/// line is passed through instead.
pub fn dispatch(session: &mut Session, line: &SourceLine) {
    let mut ops = tokenize(&line.text);
    concat_ampersands(&mut ops);
    let kind = classify(&line.text, &ops);
    tracing::trace!(line = line.number, ?kind, "dispatch");

    if let Err(error) = rewrite(session, kind, &line.text, &ops) {
        session.report(error.into());
        passthrough::rewrite(session, &ops);
    }
}

fn rewrite(
    session: &mut Session,
    kind: StatementKind,
    text: &str,
    ops: &[String],
) -> Result<(), RewriteError> {
    match kind {
        StatementKind::Blank => {
            session.emit("");
            Ok(())
        }
        StatementKind::Comment => {
            session.emit(comment_text(text));
            Ok(())
        }
        StatementKind::Container { keyword, kind } => {
            container::rewrite_header(session, ops, keyword, kind)
        }
        StatementKind::Declaration => declaration::rewrite_declaration(session, ops),
        StatementKind::Do => control::rewrite_do(session, ops),
        StatementKind::End => container::rewrite_end(session, ops),
        StatementKind::Exit => control::rewrite_exit(session, ops),
        StatementKind::Enum { keyword } => enums::rewrite_header(session, ops, keyword),
        StatementKind::For => control::rewrite_for(session, ops),
        StatementKind::Function { keyword, is_sub } => {
            function::rewrite_function(session, ops, keyword, is_sub)
        }
        StatementKind::Accessor { keyword } => property::rewrite_accessor(session, ops, keyword),
        StatementKind::If => control::rewrite_if(session, ops),
        StatementKind::ElseIf => control::rewrite_else_if(session, ops),
        StatementKind::Else => control::rewrite_else(session, ops),
        StatementKind::Loop => control::rewrite_loop(session, ops),
        StatementKind::Namespace => container::rewrite_namespace(session, ops),
        StatementKind::Next => control::rewrite_next(session, ops),
        StatementKind::Property { keyword } => property::rewrite_header(session, ops, keyword),
        StatementKind::Return => control::rewrite_return(session, ops),
        StatementKind::While { keyword } => control::rewrite_while(session, ops, keyword),
        StatementKind::Inheritance => container::rewrite_inheritance(session, ops),
        StatementKind::Passthrough => {
            passthrough::rewrite(session, ops);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticKind;

    fn kind(line: &str) -> StatementKind {
        classify(line, &tokenize(line))
    }

    fn run(session: &mut Session, line: &str) {
        dispatch(
            session,
            &SourceLine {
                number: 1,
                text: line.to_string(),
            },
        );
    }

    #[test]
    fn test_classify_priority() {
        assert_eq!(kind(""), StatementKind::Blank);
        assert_eq!(kind("' Class notes"), StatementKind::Comment);
        assert_eq!(kind("REM old code"), StatementKind::Comment);
        assert_eq!(
            kind("Public Class Foo"),
            StatementKind::Container {
                keyword: 1,
                kind: ContainerKind::Class
            }
        );
        assert_eq!(kind("End Class"), StatementKind::End);
        assert_eq!(kind("Do While x < 3"), StatementKind::Do);
        assert_eq!(kind("Loop While x < 3"), StatementKind::Loop);
        assert_eq!(kind("Exit Sub"), StatementKind::Exit);
        assert_eq!(
            kind("Private Sub Run()"),
            StatementKind::Function {
                keyword: 1,
                is_sub: true
            }
        );
        assert_eq!(kind("Get"), StatementKind::Accessor { keyword: 0 });
        assert_eq!(kind("While running"), StatementKind::While { keyword: 0 });
        assert_eq!(kind("Private total As Integer"), StatementKind::Declaration);
        assert_eq!(kind("Inherits Base"), StatementKind::Inheritance);
    }

    #[test]
    fn test_keywords_in_literals_and_calls_do_not_match() {
        assert_eq!(kind("Console.WriteLine(\"Class\")"), StatementKind::Passthrough);
        assert_eq!(kind("cache.Set(key, value)"), StatementKind::Passthrough);
        assert_eq!(kind("f = Function(x) x * 2"), StatementKind::Passthrough);
    }

    #[test]
    fn test_comments() {
        let mut session = Session::default();
        run(&mut session, "' keep this");
        run(&mut session, "Rem and this");
        assert_eq!(session.output, vec!["// keep this", "// and this"]);
    }

    #[test]
    fn test_ampersands_become_plus() {
        let mut session = Session::default();
        session.symbols.add_function(crate::symbols::FunctionInfo::new("greeting"));
        run(&mut session, "greeting = \"Hi \" & name");
        assert_eq!(session.output, vec!["greeting = \"Hi \" + name;"]);
    }

    #[test]
    fn test_malformed_line_falls_back() {
        let mut session = Session::default();
        run(&mut session, "For i = 1");
        assert_eq!(session.output, vec!["For i = 1;"]);
        assert!(matches!(
            session.diagnostics[0].kind,
            DiagnosticKind::Malformed { construct: "For", .. }
        ));
    }
}
