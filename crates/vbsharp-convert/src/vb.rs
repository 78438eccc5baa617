//! The VB to C# converter.

use crate::diagnostics::Diagnostic;
use crate::dispatch::dispatch;
use crate::options::ConvertOptions;
use crate::postpass::{indent, reorder_static};
use crate::prepass::prepare;
use crate::session::Session;
use crate::traits::{ConvertError, Converter};
use serde::Serialize;

/// Static instance of the VB converter for registry.
pub static VB_CONVERTER: VbConverter = VbConverter;

/// Converts VB-style source into C#-style source, one line at a time.
pub struct VbConverter;

impl Converter for VbConverter {
    fn source_language(&self) -> &'static str {
        "vb"
    }

    fn target_language(&self) -> &'static str {
        "csharp"
    }

    fn source_extensions(&self) -> &'static [&'static str] {
        &["vb", "bas", "cls"]
    }

    fn target_extension(&self) -> &'static str {
        "cs"
    }

    fn convert(&self, source: &str, options: &ConvertOptions) -> Result<Conversion, ConvertError> {
        convert_with(source, options)
    }
}

/// The converted lines of one file and what was noticed along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Conversion {
    pub lines: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Conversion {
    /// The output as file text, newline-terminated.
    pub fn text(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}

/// Convert with default options.
pub fn convert(source: &str) -> Result<Conversion, ConvertError> {
    convert_with(source, &ConvertOptions::default())
}

/// Convert one file's text.
///
/// Every file gets a fresh [`Session`], so nothing learned about one file
/// affects another.
pub fn convert_with(source: &str, options: &ConvertOptions) -> Result<Conversion, ConvertError> {
    let input = prepare(source, options.split_declarations);
    if input.iter().all(|line| line.text.is_empty()) {
        return Err(ConvertError::EmptyInput);
    }

    let mut session = Session::new(options.clone());
    session.input = input.clone();
    for (cursor, line) in input.iter().enumerate() {
        session.cursor = cursor;
        session.line = line.number;
        dispatch(&mut session, line);
    }

    if options.reorder_static {
        reorder_static(&mut session.output);
    }
    Ok(Conversion {
        lines: indent(&session.output, &options.indent),
        diagnostics: session.diagnostics,
    })
}
