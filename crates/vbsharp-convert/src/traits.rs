//! The converter trait.

use crate::options::ConvertOptions;
use crate::vb::Conversion;

/// Error that stops a file from being converted at all.
///
/// Problems with individual lines never end up here; they are recorded as
/// diagnostics on the [`Conversion`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
    #[error("input has no non-blank lines")]
    EmptyInput,
}

/// A converter translates source text from one language to another.
pub trait Converter: Send + Sync {
    /// Source language identifier (e.g., "vb").
    fn source_language(&self) -> &'static str;

    /// Target language identifier (e.g., "csharp").
    fn target_language(&self) -> &'static str;

    /// File extensions this converter reads (e.g., &["vb", "bas"]).
    fn source_extensions(&self) -> &'static [&'static str];

    /// File extension for output (e.g., "cs").
    fn target_extension(&self) -> &'static str;

    /// Convert one file's text.
    fn convert(&self, source: &str, options: &ConvertOptions) -> Result<Conversion, ConvertError>;
}
