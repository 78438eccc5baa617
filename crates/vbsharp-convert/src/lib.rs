//! Line-oriented translation of VB-style source into C#-style source.
//!
//! `vbsharp-convert` does not build a syntax tree. Each source line is
//! tokenized, classified and rewritten on its own, with a per-file
//! [`Session`] carrying the block context and symbol tables from one line
//! to the next. Lines that no rewriter understands are passed through with
//! light reformatting so a human can finish them.
//!
//! # Pipeline
//!
//! ```text
//! source ─> prepass ─> tokenize ─> classify ─> rewrite ─> postpass ─> lines
//!           (trim,      (ops)      (Statement  (Session)   (static
//!            split Dim)             Kind)                   reorder,
//!                                                           indent)
//! ```
//!
//! # Example
//!
//! ```
//! use vbsharp_convert::convert;
//!
//! let conversion = convert("Public Class Foo\nDim x As Integer = 5\nEnd Class").unwrap();
//! assert_eq!(conversion.lines, vec!["public class Foo", "{", "\tint x = 5;", "}"]);
//! ```

pub mod assemble;
pub mod diagnostics;
pub mod dispatch;
pub mod language;
pub mod lexer;
pub mod options;
pub mod postpass;
pub mod prepass;
pub mod registry;
pub mod rewrite;
pub mod session;
pub mod symbols;
pub mod traits;
pub mod vb;

// Re-exports: conversion entry points
pub use vb::{Conversion, VB_CONVERTER, VbConverter, convert, convert_with};

// Re-exports: traits and registry
pub use registry::{converter_for_extension, converter_for_language, converters, register_converter};
pub use traits::{ConvertError, Converter};

// Re-exports: diagnostics and options
pub use diagnostics::{Diagnostic, DiagnosticKind, RewriteError, Severity};
pub use options::ConvertOptions;
pub use session::Session;
