//! Per-file conversion state.
//!
//! A [`Session`] owns everything that persists from one line to the next:
//! the block context, the symbol tables, the output buffer and the
//! diagnostics. Nothing is shared between sessions, so files can be
//! converted concurrently.

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::options::ConvertOptions;
use crate::prepass::SourceLine;
use crate::symbols::{FunctionInfo, SymbolTables};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Class,
    Module,
}

/// An open `Class` or `Module` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub name: String,
    pub kind: ContainerKind,
    /// Index into the output buffer of the header line.
    pub header_line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoKind {
    /// `Do` ... `Loop [While|Until c]`: the condition is tested after the body.
    PostTest,
    /// `Do While|Until c` ... `Loop`: the condition is on the header.
    PreTest,
}

/// Other brace-delimited blocks closed by their own keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Namespace,
    If,
    For,
    While,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CurrentFunction {
    #[default]
    None,
    InFunction(FunctionInfo),
}

/// Which blocks the converter is currently inside.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub containers: Vec<Container>,
    /// Names of open enum blocks.
    pub enums: Vec<String>,
    pub do_loops: Vec<DoKind>,
    pub blocks: Vec<BlockKind>,
    /// Counters of open `For` and `For Each` loops, innermost last. A
    /// counter is only in scope inside its loop.
    pub loop_counters: Vec<String>,
    pub function: CurrentFunction,
    /// Index into the session input of the last `Property` header.
    pub property_header: Option<usize>,
}

impl Context {
    pub fn inside_class(&self) -> bool {
        self.containers.iter().any(|c| c.kind == ContainerKind::Class)
    }

    pub fn inside_module(&self) -> bool {
        self.containers.iter().any(|c| c.kind == ContainerKind::Module)
    }

    pub fn inside_enum(&self) -> bool {
        !self.enums.is_empty()
    }

    pub fn inside_do_loop(&self) -> bool {
        !self.do_loops.is_empty()
    }

    pub fn inside_function(&self) -> bool {
        matches!(self.function, CurrentFunction::InFunction(_))
    }

    /// Module scope with no class or function in between: declarations
    /// here become static members.
    pub fn at_module_level(&self) -> bool {
        self.inside_module() && !self.inside_class() && !self.inside_function()
    }

    /// The innermost open class or module.
    pub fn current_container(&self) -> Option<&Container> {
        self.containers.last()
    }

    pub fn function(&self) -> Option<&FunctionInfo> {
        match &self.function {
            CurrentFunction::InFunction(info) => Some(info),
            CurrentFunction::None => None,
        }
    }

    pub fn function_mut(&mut self) -> Option<&mut FunctionInfo> {
        match &mut self.function {
            CurrentFunction::InFunction(info) => Some(info),
            CurrentFunction::None => None,
        }
    }

    /// Replace the current function record.
    pub fn enter_function(&mut self, info: FunctionInfo) {
        self.function = CurrentFunction::InFunction(info);
    }

    /// Close the innermost block of `kind`. Returns false if none is open.
    pub fn close_block(&mut self, kind: BlockKind) -> bool {
        match self.blocks.iter().rposition(|b| *b == kind) {
            Some(index) => {
                self.blocks.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn leave_function(&mut self) -> Option<FunctionInfo> {
        self.loop_counters.clear();
        match std::mem::take(&mut self.function) {
            CurrentFunction::InFunction(info) => Some(info),
            CurrentFunction::None => None,
        }
    }
}

/// State for converting one file.
#[derive(Debug, Default)]
pub struct Session {
    pub options: ConvertOptions,
    pub context: Context,
    pub symbols: SymbolTables,
    pub output: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    /// The pre-passed source lines, kept for property headers.
    pub input: Vec<SourceLine>,
    /// Index into `input` of the line being converted.
    pub cursor: usize,
    /// 1-based number of the line being converted.
    pub line: usize,
}

impl Session {
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn emit(&mut self, line: impl Into<String>) {
        self.output.push(line.into());
    }

    /// Record a diagnostic against the current line.
    pub fn report(&mut self, kind: DiagnosticKind) {
        let diagnostic = Diagnostic::new(self.line, kind);
        tracing::debug!(line = diagnostic.line, "{}", diagnostic.kind);
        self.diagnostics.push(diagnostic);
    }

    /// True when `name` is a class, enum, function, field or local the
    /// session already knows.
    pub fn is_known_symbol(&self, name: &str) -> bool {
        if self.symbols.is_user_type(name)
            || self.symbols.is_function(name)
            || self.symbols.variables.contains_key(name)
        {
            return true;
        }
        if self.context.loop_counters.iter().any(|c| c == name)
            || self
                .context
                .function()
                .is_some_and(|f| f.contains_variable(name) || f.name == name)
        {
            return true;
        }
        self.symbols
            .classes
            .values()
            .any(|class| class.variable(name).is_some())
    }
}
