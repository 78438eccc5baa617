//! Conditionals, loops and jumps.

use super::{
    find_keyword, is_keyword, matching_paren, negate_condition, op_at, parse_type,
    render_condition, render_expression,
};
use crate::assemble::LineAssembly;
use crate::diagnostics::{DiagnosticKind, RewriteError};
use crate::lexer::is_identifier_op;
use crate::session::{BlockKind, DoKind, Session};

/// Drop one pair of parentheses that wraps the whole condition.
fn strip_outer_parens(ops: &[String]) -> &[String] {
    if op_at(ops, 0) == "(" && matching_paren(ops, 0) == Some(ops.len() - 1) {
        &ops[1..ops.len() - 1]
    } else {
        ops
    }
}

fn condition(construct: &'static str, ops: &[String]) -> Result<String, RewriteError> {
    let ops = strip_outer_parens(ops);
    if ops.is_empty() {
        return Err(RewriteError::malformed(construct, "missing condition"));
    }
    Ok(render_condition(ops))
}

/// `keyword (condition)`.
fn block_header(keyword: &str, condition: &str) -> LineAssembly {
    LineAssembly::new([keyword, "(", condition, ")"])
        .skip_pad_right(&["("])
        .skip_pad_left(&[")"])
}

/// `} while (condition);` closing a post-test loop.
fn loop_footer(condition: &str) -> String {
    block_header("while", condition)
        .prepend("}")
        .append(";")
        .combine()
}

fn negated_condition(construct: &'static str, ops: &[String]) -> Result<String, RewriteError> {
    let ops = strip_outer_parens(ops);
    if ops.is_empty() {
        return Err(RewriteError::malformed(construct, "missing condition"));
    }
    Ok(negate_condition(ops))
}

/// `If cond Then` opens a block; `If cond Then stmt [Else stmt]` stays on
/// one line.
pub fn rewrite_if(session: &mut Session, ops: &[String]) -> Result<(), RewriteError> {
    let then = find_keyword(ops, "Then");
    let condition = condition("If", &ops[1..then.unwrap_or(ops.len())])?;
    let rest = then.map(|t| &ops[t + 1..]).unwrap_or(&[]);

    if rest.is_empty() {
        session.context.blocks.push(BlockKind::If);
        session.emit(block_header("if", &condition).combine());
        session.emit("{");
        return Ok(());
    }

    let mut line = block_header("if", &condition).append(" ").combine();
    match find_keyword(rest, "Else") {
        Some(at) => {
            line.push_str(&inline_statement(&rest[..at])?);
            line.push_str(" else ");
            line.push_str(&inline_statement(&rest[at + 1..])?);
        }
        None => line.push_str(&inline_statement(rest)?),
    }
    session.emit(line);
    Ok(())
}

/// A statement embedded in a single-line `If`.
fn inline_statement(ops: &[String]) -> Result<String, RewriteError> {
    match op_at(ops, 0) {
        "" => Err(RewriteError::malformed("If", "empty branch")),
        "Return" => Ok(return_statement(ops)),
        "Exit" => exit_statement(ops),
        _ => Ok(format!("{};", render_expression(ops))),
    }
}

/// `ElseIf cond Then` (also written `Else If`).
pub fn rewrite_else_if(session: &mut Session, ops: &[String]) -> Result<(), RewriteError> {
    let skip = if ops[0] == "Else" { 2 } else { 1 };
    let then = find_keyword(ops, "Then").unwrap_or(ops.len());
    let condition = condition("ElseIf", &ops[skip.min(then)..then])?;
    session.emit("}");
    session.emit(block_header("else if", &condition).combine());
    session.emit("{");
    Ok(())
}

pub fn rewrite_else(session: &mut Session, ops: &[String]) -> Result<(), RewriteError> {
    if op_at(ops, 1) == "If" {
        return rewrite_else_if(session, ops);
    }
    session.emit("}");
    session.emit("else");
    session.emit("{");
    Ok(())
}

/// A numeric literal bound or step.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Literal {
    Int(i64),
    Decimal(f64),
}

impl Literal {
    fn parse(ops: &[String]) -> Option<Self> {
        let text = ops.concat();
        if let Ok(value) = text.parse::<i64>() {
            return Some(Literal::Int(value));
        }
        if text.contains('.') {
            return text.parse::<f64>().ok().map(Literal::Decimal);
        }
        None
    }

    fn value(self) -> f64 {
        match self {
            Literal::Int(v) => v as f64,
            Literal::Decimal(v) => v,
        }
    }
}

/// Literal text as written; decimal literals get the `m` suffix.
fn literal_text(text: &str, decimal: bool) -> String {
    if decimal {
        format!("{text}m")
    } else {
        text.to_string()
    }
}

/// Render a bound or step.
fn render_number(ops: &[String], decimal: bool) -> String {
    match Literal::parse(ops) {
        Some(_) => literal_text(&ops.concat(), decimal),
        None => render_expression(ops),
    }
}

/// `For i [As T] = a To b [Step s]` and `For Each x [As T] In xs`.
pub fn rewrite_for(session: &mut Session, ops: &[String]) -> Result<(), RewriteError> {
    if is_keyword(op_at(ops, 1), "each") {
        return rewrite_for_each(session, ops);
    }

    let counter = op_at(ops, 1);
    if !is_identifier_op(counter) {
        return Err(RewriteError::malformed("For", "missing counter"));
    }
    let mut i = 2;
    let mut declared = None;
    if is_keyword(op_at(ops, i), "as") {
        let (ty, used) = parse_type(&ops[i + 1..])?;
        declared = Some(ty);
        i += 1 + used;
    }
    if op_at(ops, i) != "=" {
        return Err(RewriteError::malformed("For", "missing `=`"));
    }
    let to = find_keyword(ops, "To")
        .filter(|to| *to > i)
        .ok_or_else(|| RewriteError::malformed("For", "missing `To`"))?;
    let step_at = find_keyword(ops, "Step").filter(|step| *step > to);

    let start = &ops[i + 1..to];
    let end = &ops[to + 1..step_at.unwrap_or(ops.len())];
    let step = step_at.map(|s| &ops[s + 1..]);
    if start.is_empty() || end.is_empty() || step.is_some_and(|s| s.is_empty()) {
        return Err(RewriteError::malformed("For", "missing bound"));
    }

    let start_literal = Literal::parse(start);
    let end_literal = Literal::parse(end);
    let known = session
        .context
        .function()
        .and_then(|f| f.variable(counter))
        .map(|v| v.var_type.clone());

    let mut assumed = false;
    let ty = match (&declared, &known, start_literal, end_literal) {
        (Some(ty), _, _, _) | (None, Some(ty), _, _) => ty.clone(),
        (None, None, Some(Literal::Int(_)), Some(Literal::Int(_))) => "int".to_string(),
        (None, None, Some(_), Some(_)) => "decimal".to_string(),
        _ => {
            assumed = true;
            "int".to_string()
        }
    };
    let decimal = ty == "decimal";

    let increment = match step {
        Some(step) => match Literal::parse(step) {
            Some(Literal::Int(1)) => "++".to_string(),
            Some(Literal::Int(-1)) => "--".to_string(),
            // `-.5` arrives as the ops `-.` and `5`, so strip the sign
            // from the joined text.
            Some(literal) if literal.value() < 0.0 => {
                let text = step.concat();
                format!(" -= {}", literal_text(text.trim_start_matches('-'), decimal))
            }
            Some(_) => format!(" += {}", literal_text(&step.concat(), decimal)),
            None => format!(" += {}", render_expression(step)),
        },
        None => match (start_literal, end_literal) {
            (Some(a), Some(b)) if a.value() < b.value() => "++".to_string(),
            (Some(_), Some(_)) => "--".to_string(),
            _ => format!(
                " += ({} < {}) ? 1 : -1",
                render_expression(start),
                render_expression(end)
            ),
        },
    };

    let declaration = if known.is_some() && declared.is_none() {
        String::new()
    } else {
        format!("{ty} ")
    };
    let start = render_number(start, decimal);
    let end = render_number(end, decimal);

    if assumed {
        session.report(DiagnosticKind::AssumedIntegerBounds {
            variable: counter.to_string(),
        });
    }
    session.context.loop_counters.push(counter.to_string());
    session.context.blocks.push(BlockKind::For);
    session.emit(format!(
        "for ({declaration}{counter} = {start}; {counter} != {end}; {counter}{increment})"
    ));
    session.emit("{");
    Ok(())
}

fn rewrite_for_each(session: &mut Session, ops: &[String]) -> Result<(), RewriteError> {
    let item = op_at(ops, 2);
    if !is_identifier_op(item) {
        return Err(RewriteError::malformed("For Each", "missing loop variable"));
    }
    let mut i = 3;
    let mut declared = None;
    if is_keyword(op_at(ops, i), "as") {
        let (ty, used) = parse_type(&ops[i + 1..])?;
        declared = Some(ty);
        i += 1 + used;
    }
    if !is_keyword(op_at(ops, i), "in") {
        return Err(RewriteError::malformed("For Each", "missing `In`"));
    }
    let collection = &ops[i + 1..];
    if collection.is_empty() {
        return Err(RewriteError::malformed("For Each", "missing collection"));
    }

    let collection = render_expression(collection);
    let ty = declared.as_deref().unwrap_or("var");
    session.context.loop_counters.push(item.to_string());
    session.context.blocks.push(BlockKind::For);
    let header = format!("{ty} {item} in {collection}");
    session.emit(block_header("foreach", &header).combine());
    session.emit("{");
    Ok(())
}

/// `Next [i]` closes a `For`; `Wend` closes a `While`.
pub fn rewrite_next(session: &mut Session, ops: &[String]) -> Result<(), RewriteError> {
    let kind = if ops[0] == "Wend" {
        BlockKind::While
    } else {
        BlockKind::For
    };
    if session.context.close_block(kind) {
        if kind == BlockKind::For {
            session.context.loop_counters.pop();
        }
    } else {
        session.report(DiagnosticKind::UnmatchedClose {
            keyword: ops[0].clone(),
        });
    }
    session.emit("}");
    Ok(())
}

/// `Do`, `Do While cond` or `Do Until cond`.
pub fn rewrite_do(session: &mut Session, ops: &[String]) -> Result<(), RewriteError> {
    let keyword = op_at(ops, 1);
    let (kind, header) = if keyword.is_empty() {
        (DoKind::PostTest, "do".to_string())
    } else if is_keyword(keyword, "while") {
        let condition = condition("Do While", &ops[2..])?;
        (DoKind::PreTest, block_header("while", &condition).combine())
    } else if is_keyword(keyword, "until") {
        let condition = negated_condition("Do Until", &ops[2..])?;
        (DoKind::PreTest, block_header("while", &condition).combine())
    } else {
        return Err(RewriteError::malformed(
            "Do",
            format!("unexpected `{keyword}`"),
        ));
    };
    session.context.do_loops.push(kind);
    session.emit(header);
    session.emit("{");
    Ok(())
}

/// `Loop`, `Loop While cond` or `Loop Until cond`.
pub fn rewrite_loop(session: &mut Session, ops: &[String]) -> Result<(), RewriteError> {
    let kind = session.context.do_loops.last().copied();
    let keyword = op_at(ops, 1);

    let footer = match kind {
        Some(DoKind::PreTest) => "}".to_string(),
        Some(DoKind::PostTest) | None => {
            if keyword.is_empty() {
                loop_footer("true")
            } else if is_keyword(keyword, "until") {
                loop_footer(&negated_condition("Loop Until", &ops[2..])?)
            } else if is_keyword(keyword, "while") {
                loop_footer(&condition("Loop While", &ops[2..])?)
            } else {
                return Err(RewriteError::malformed(
                    "Loop",
                    format!("unexpected `{keyword}`"),
                ));
            }
        }
    };

    if session.context.inside_do_loop() {
        session.context.do_loops.pop();
    } else {
        session.report(DiagnosticKind::UnmatchedClose {
            keyword: "Loop".to_string(),
        });
    }
    session.emit(footer);
    Ok(())
}

/// `While cond`. `keyword` is the index of the `While` op.
pub fn rewrite_while(
    session: &mut Session,
    ops: &[String],
    keyword: usize,
) -> Result<(), RewriteError> {
    let condition = condition("While", &ops[keyword + 1..])?;
    session.context.blocks.push(BlockKind::While);
    session.emit(block_header("while", &condition).combine());
    session.emit("{");
    Ok(())
}

fn return_statement(ops: &[String]) -> String {
    match &ops[1..] {
        [] => "return;".to_string(),
        value => format!("return {};", render_expression(value)),
    }
}

pub fn rewrite_return(session: &mut Session, ops: &[String]) -> Result<(), RewriteError> {
    session.emit(return_statement(ops));
    Ok(())
}

fn exit_statement(ops: &[String]) -> Result<String, RewriteError> {
    let target = op_at(ops, 1).to_lowercase();
    match target.as_str() {
        "sub" | "function" | "property" => Ok("return;".to_string()),
        "for" | "do" | "while" => Ok("break;".to_string()),
        _ => Err(RewriteError::malformed(
            "Exit",
            format!("cannot exit `{}`", op_at(ops, 1)),
        )),
    }
}

/// `Exit Sub|Function|Property` returns; `Exit For|Do|While` breaks.
pub fn rewrite_exit(session: &mut Session, ops: &[String]) -> Result<(), RewriteError> {
    let statement = exit_statement(ops)?;
    session.emit(statement);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::symbols::{FunctionInfo, VariableInfo};

    fn emit(f: fn(&mut Session, &[String]) -> Result<(), RewriteError>, line: &str) -> Vec<String> {
        let mut session = Session::default();
        f(&mut session, &tokenize(line)).unwrap();
        session.output
    }

    #[test]
    fn test_block_if() {
        assert_eq!(
            emit(rewrite_if, "If x = 1 And Not done Then"),
            vec!["if (x == 1 && !done)", "{"]
        );
        assert_eq!(emit(rewrite_if, "If (a <> b) Then"), vec!["if (a != b)", "{"]);
    }

    #[test]
    fn test_single_line_if() {
        assert_eq!(
            emit(rewrite_if, "If x > 0 Then Return x Else Return -x"),
            vec!["if (x > 0) return x; else return -x;"]
        );
        assert_eq!(
            emit(rewrite_if, "If count = 0 Then Exit Sub"),
            vec!["if (count == 0) return;"]
        );
    }

    #[test]
    fn test_else_if() {
        assert_eq!(
            emit(rewrite_else_if, "ElseIf x = 2 Then"),
            vec!["}", "else if (x == 2)", "{"]
        );
        assert_eq!(
            emit(rewrite_else, "Else If x = 3 Then"),
            vec!["}", "else if (x == 3)", "{"]
        );
        assert_eq!(emit(rewrite_else, "Else"), vec!["}", "else", "{"]);
    }

    #[test]
    fn test_for_directions() {
        assert_eq!(
            emit(rewrite_for, "For i = 1 To 5")[0],
            "for (int i = 1; i != 5; i++)"
        );
        assert_eq!(
            emit(rewrite_for, "For i = 5 To 1")[0],
            "for (int i = 5; i != 1; i--)"
        );
        assert_eq!(
            emit(rewrite_for, "For i = 0 To 10 Step 2")[0],
            "for (int i = 0; i != 10; i += 2)"
        );
        assert_eq!(
            emit(rewrite_for, "For i = 10 To 0 Step -2")[0],
            "for (int i = 10; i != 0; i -= 2)"
        );
    }

    #[test]
    fn test_for_decimal_bounds() {
        assert_eq!(
            emit(rewrite_for, "For x = 0.5 To 2.5")[0],
            "for (decimal x = 0.5m; x != 2.5m; x++)"
        );
    }

    #[test]
    fn test_for_non_literal_bounds_are_noted() {
        let mut session = Session::default();
        rewrite_for(&mut session, &tokenize("For i = first To last")).unwrap();
        assert_eq!(
            session.output[0],
            "for (int i = first; i != last; i += (first < last) ? 1 : -1)"
        );
        assert_eq!(
            session.diagnostics[0].kind,
            DiagnosticKind::AssumedIntegerBounds {
                variable: "i".to_string()
            }
        );
    }

    #[test]
    fn test_for_known_counter_is_not_redeclared() {
        let mut session = Session::default();
        let mut function = FunctionInfo::new("Run");
        function.add_variable(VariableInfo::new("n", "long"));
        session.context.enter_function(function);
        rewrite_for(&mut session, &tokenize("For n = 1 To count")).unwrap();
        assert_eq!(
            session.output[0],
            "for (n = 1; n != count; n += (1 < count) ? 1 : -1)"
        );
        assert!(session.diagnostics.is_empty());
    }

    #[test]
    fn test_for_fractional_negative_step() {
        assert_eq!(
            emit(rewrite_for, "For x = 2.0 To 0.0 Step -.5")[0],
            "for (decimal x = 2.0m; x != 0.0m; x -= .5m)"
        );
        assert_eq!(
            emit(rewrite_for, "For x = 0.0 To 1.0 Step .25")[0],
            "for (decimal x = 0.0m; x != 1.0m; x += .25m)"
        );
    }

    #[test]
    fn test_for_counter_scoped_to_loop() {
        let mut session = Session::default();
        session.context.enter_function(FunctionInfo::new("Run"));
        for line in ["For i = 1 To 3", "Next", "For i = 1 To 4", "Next i"] {
            let ops = tokenize(line);
            if ops[0] == "For" {
                rewrite_for(&mut session, &ops).unwrap();
                assert!(session.is_known_symbol("i"));
            } else {
                rewrite_next(&mut session, &ops).unwrap();
            }
        }
        assert_eq!(session.output[0], "for (int i = 1; i != 3; i++)");
        assert_eq!(session.output[3], "for (int i = 1; i != 4; i++)");
        assert!(session.context.loop_counters.is_empty());
        assert!(!session.is_known_symbol("i"));
    }

    #[test]
    fn test_for_inline_type() {
        assert_eq!(
            emit(rewrite_for, "For i As Long = 0 To 3")[0],
            "for (long i = 0; i != 3; i++)"
        );
    }

    #[test]
    fn test_for_each() {
        assert_eq!(
            emit(rewrite_for, "For Each name As String In names"),
            vec!["foreach (string name in names)", "{"]
        );
        assert_eq!(
            emit(rewrite_for, "For Each item In items")[0],
            "foreach (var item in items)"
        );
    }

    #[test]
    fn test_malformed_for() {
        let mut session = Session::default();
        assert!(rewrite_for(&mut session, &tokenize("For i = 1")).is_err());
        assert!(rewrite_for(&mut session, &tokenize("For i 1 To 2")).is_err());
        assert!(rewrite_for(&mut session, &tokenize("For Each x")).is_err());
        assert!(session.output.is_empty());
        assert!(session.context.blocks.is_empty());
    }

    #[test]
    fn test_do_loop_until_negates() {
        let mut session = Session::default();
        rewrite_do(&mut session, &tokenize("Do")).unwrap();
        rewrite_loop(&mut session, &tokenize("Loop Until x = y")).unwrap();
        rewrite_do(&mut session, &tokenize("Do")).unwrap();
        rewrite_loop(&mut session, &tokenize("Loop Until x < y")).unwrap();
        assert_eq!(
            session.output,
            vec!["do", "{", "} while (x != y);", "do", "{", "} while (x >= y);"]
        );
        assert!(!session.context.inside_do_loop());
    }

    #[test]
    fn test_do_loop_while_and_bare() {
        let mut session = Session::default();
        rewrite_do(&mut session, &tokenize("Do")).unwrap();
        rewrite_loop(&mut session, &tokenize("Loop While x <> 0")).unwrap();
        rewrite_do(&mut session, &tokenize("Do")).unwrap();
        rewrite_loop(&mut session, &tokenize("Loop")).unwrap();
        assert_eq!(session.output[2], "} while (x != 0);");
        assert_eq!(session.output[5], "} while (true);");
    }

    #[test]
    fn test_pre_test_do() {
        let mut session = Session::default();
        rewrite_do(&mut session, &tokenize("Do Until queue.Count = 0")).unwrap();
        rewrite_loop(&mut session, &tokenize("Loop")).unwrap();
        assert_eq!(session.output, vec!["while (queue.Count != 0)", "{", "}"]);
    }

    #[test]
    fn test_unmatched_loop_and_next() {
        let mut session = Session::default();
        rewrite_loop(&mut session, &tokenize("Loop")).unwrap();
        rewrite_next(&mut session, &tokenize("Next i")).unwrap();
        assert_eq!(session.diagnostics.len(), 2);
        assert_eq!(session.output, vec!["} while (true);", "}"]);
    }

    #[test]
    fn test_while_and_wend() {
        let mut session = Session::default();
        rewrite_while(&mut session, &tokenize("While i < 10"), 0).unwrap();
        rewrite_next(&mut session, &tokenize("Wend")).unwrap();
        assert_eq!(session.output, vec!["while (i < 10)", "{", "}"]);
        assert!(session.diagnostics.is_empty());
    }

    #[test]
    fn test_return_and_exit() {
        assert_eq!(emit(rewrite_return, "Return"), vec!["return;"]);
        assert_eq!(
            emit(rewrite_return, "Return a AndAlso b"),
            vec!["return a && b;"]
        );
        assert_eq!(emit(rewrite_exit, "Exit Function"), vec!["return;"]);
        assert_eq!(emit(rewrite_exit, "Exit Do"), vec!["break;"]);
        let mut session = Session::default();
        assert!(rewrite_exit(&mut session, &tokenize("Exit Try")).is_err());
    }
}
