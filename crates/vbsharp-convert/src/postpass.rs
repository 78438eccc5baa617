//! Output formatting after every line has been converted.

use crate::language::is_visibility;

/// Move a visibility modifier in front of a leading `static`.
///
/// `static public void Run()` becomes `public static void Run()`. Running
/// it again changes nothing.
pub fn reorder_static(lines: &mut [String]) {
    for line in lines.iter_mut() {
        let mut words = line.splitn(3, ' ');
        let (Some("static"), Some(second)) = (words.next(), words.next()) else {
            continue;
        };
        if !is_visibility(second) {
            continue;
        }
        *line = match words.next() {
            Some(rest) => format!("{second} static {rest}"),
            None => format!("{second} static"),
        };
    }
}

/// Indent by brace depth and tidy blank lines.
///
/// A line starting with `}` is dedented before it is written; a line
/// starting with `{` is written at the current depth and indents what
/// follows. Blank lines are never indented, runs of them collapse to one,
/// and blanks at either end are dropped.
pub fn indent(lines: &[String], unit: &str) -> Vec<String> {
    let mut depth = 0usize;
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    for line in lines {
        if line.is_empty() {
            if out.last().is_some_and(|last| !last.is_empty()) {
                out.push(String::new());
            }
            continue;
        }
        if line.starts_with('}') {
            depth = depth.saturating_sub(1);
        }
        out.push(format!("{}{line}", unit.repeat(depth)));
        if line.starts_with('{') {
            depth += 1;
        }
    }
    while out.last().is_some_and(String::is_empty) {
        out.pop();
    }
    out
}
