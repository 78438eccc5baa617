//! Conversion options.

use serde::{Deserialize, Serialize};

/// Knobs for one conversion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// One level of indentation in the output.
    pub indent: String,
    /// Move `static` after a leading visibility modifier.
    pub reorder_static: bool,
    /// Split `Dim a, b As T` into one declaration per line before converting.
    pub split_declarations: bool,
    /// Report words in pass-through lines that no table or symbol knows.
    pub report_unregistered: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            indent: "\t".to_string(),
            reorder_static: true,
            split_declarations: true,
            report_unregistered: true,
        }
    }
}
