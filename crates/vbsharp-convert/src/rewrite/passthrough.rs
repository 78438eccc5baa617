//! Lines no rewriter claims.
//!
//! Pass-through output is the line with its expression vocabulary
//! translated, reformatted and terminated. It is meant for review, so any
//! word that nothing knows about is reported.

use super::{enums, translate_expression};
use crate::assemble::format_ops;
use crate::diagnostics::DiagnosticKind;
use crate::language::is_unregistered;
use crate::lexer::{QUOTE, QuoteTracker, is_identifier_op};
use crate::session::Session;

/// Emit `ops` as a statement, or as an enumerator inside an enum body.
pub fn rewrite(session: &mut Session, ops: &[String]) {
    if session.context.inside_enum() {
        enums::rewrite_member(session, ops);
        return;
    }

    if session.options.report_unregistered {
        report_unregistered(session, ops);
    }

    let mut line = format_ops(&translate_expression(ops));
    if !line.is_empty() && !line.ends_with(['{', '}', ',', ';']) {
        line.push(';');
    }
    session.emit(line);
}

/// One warning per distinct word outside quotes that is neither vocabulary
/// nor a known symbol. Member names after `.` are skipped.
fn report_unregistered(session: &mut Session, ops: &[String]) {
    let mut quotes = QuoteTracker::default();
    let mut previous: &str = "";
    let mut reported: Vec<&str> = Vec::new();
    for op in ops {
        let inside = quotes.advance(op);
        let candidate = !inside
            && op != QUOTE
            && previous != "."
            && is_identifier_op(op)
            && is_unregistered(op)
            && !session.is_known_symbol(op)
            && !reported.contains(&op.as_str());
        if candidate {
            reported.push(op);
        }
        previous = op.as_str();
    }
    for word in reported {
        session.report(DiagnosticKind::UnregisteredWord {
            word: word.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::options::ConvertOptions;
    use crate::symbols::EnumInfo;

    fn pass(session: &mut Session, line: &str) -> String {
        rewrite(session, &tokenize(line));
        session.output.last().cloned().unwrap()
    }

    fn words(session: &Session) -> Vec<String> {
        session
            .diagnostics
            .iter()
            .filter_map(|d| match &d.kind {
                DiagnosticKind::UnregisteredWord { word } => Some(word.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_statement_gets_semicolon() {
        let mut session = Session::default();
        assert_eq!(
            pass(&mut session, "Console.WriteLine(\"hi\")"),
            "Console.WriteLine(\"hi\");"
        );
        assert_eq!(pass(&mut session, "x = Nothing"), "x = null;");
        assert_eq!(pass(&mut session, "flag = a AndAlso Not b"), "flag = a && !b;");
    }

    #[test]
    fn test_no_semicolon_after_brace_or_comma() {
        let mut session = Session::default();
        assert_eq!(pass(&mut session, "{"), "{");
        assert_eq!(pass(&mut session, "1, 2,"), "1, 2,");
    }

    #[test]
    fn test_unregistered_words_reported_once() {
        let mut session = Session::default();
        pass(&mut session, "total = total + Compute(total)");
        assert_eq!(words(&session), vec!["total", "Compute"]);
    }

    #[test]
    fn test_known_symbols_and_members_not_reported() {
        let mut session = Session::default();
        session.symbols.add_class("Console");
        session.symbols.add_function(crate::symbols::FunctionInfo::new("Run"));
        pass(&mut session, "Console.WriteLine(\"Class x\")");
        pass(&mut session, "Run()");
        assert!(words(&session).is_empty());
    }

    #[test]
    fn test_report_can_be_disabled() {
        let mut session = Session::new(ConvertOptions {
            report_unregistered: false,
            ..ConvertOptions::default()
        });
        pass(&mut session, "mystery()");
        assert!(session.diagnostics.is_empty());
    }

    #[test]
    fn test_enum_body_gets_commas() {
        let mut session = Session::default();
        let mut info = EnumInfo::new();
        info.add_name("Size");
        session.symbols.add_enum(info);
        session.context.enums.push("Size".to_string());
        assert_eq!(pass(&mut session, "Small"), "Small,");
        assert!(session.diagnostics.is_empty());
    }
}
