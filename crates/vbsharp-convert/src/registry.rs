//! Registry of converters.

use crate::traits::Converter;
use std::sync::{OnceLock, PoisonError, RwLock};

/// Global converter registry.
static CONVERTERS: RwLock<Vec<&'static dyn Converter>> = RwLock::new(Vec::new());
static CONVERTERS_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Register a custom converter.
pub fn register_converter(converter: &'static dyn Converter) {
    init_converters();
    push(converter);
}

fn push(converter: &'static dyn Converter) {
    CONVERTERS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .push(converter);
}

fn init_converters() {
    CONVERTERS_INITIALIZED.get_or_init(|| {
        push(&crate::vb::VB_CONVERTER);
    });
}

/// Get a converter by source language name.
pub fn converter_for_language(lang: &str) -> Option<&'static dyn Converter> {
    init_converters();
    CONVERTERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .find(|c| c.source_language() == lang)
        .copied()
}

/// Get a converter by source file extension.
pub fn converter_for_extension(ext: &str) -> Option<&'static dyn Converter> {
    init_converters();
    CONVERTERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .find(|c| c.source_extensions().contains(&ext))
        .copied()
}

/// Get all registered converters.
pub fn converters() -> Vec<&'static dyn Converter> {
    init_converters();
    CONVERTERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ConvertOptions;
    use crate::traits::ConvertError;
    use crate::vb::Conversion;

    struct Upper;

    impl Converter for Upper {
        fn source_language(&self) -> &'static str {
            "lower"
        }

        fn target_language(&self) -> &'static str {
            "upper"
        }

        fn source_extensions(&self) -> &'static [&'static str] {
            &["low"]
        }

        fn target_extension(&self) -> &'static str {
            "up"
        }

        fn convert(&self, source: &str, _: &ConvertOptions) -> Result<Conversion, ConvertError> {
            Ok(Conversion {
                lines: vec![source.to_uppercase()],
                diagnostics: Vec::new(),
            })
        }
    }

    static UPPER: Upper = Upper;

    #[test]
    fn test_builtin_lookup() {
        let converter = converter_for_language("vb").expect("vb converter");
        assert_eq!(converter.target_language(), "csharp");
        assert_eq!(converter.target_extension(), "cs");

        let converter = converter_for_extension("bas").expect("bas extension");
        assert_eq!(converter.source_language(), "vb");
        assert!(converter_for_language("cobol").is_none());
    }

    #[test]
    fn test_register_custom_converter() {
        register_converter(&UPPER);
        let converter = converter_for_extension("low").expect("registered converter");
        let output = converter.convert("abc", &ConvertOptions::default()).unwrap();
        assert_eq!(output.lines, vec!["ABC"]);
        assert!(converters().iter().any(|c| c.source_language() == "vb"));
    }
}
