//! Configuration system for vbsharp.
//!
//! Loads config from:
//! 1. Global: ~/.config/vbsharp/config.toml
//! 2. Per-project: .vbsharp/config.toml (overrides global)
//! 3. A file named with `--config` (overrides both)
//!
//! Example config.toml:
//! ```toml
//! [paths]
//! input = "legacy"
//! output = "converted"
//!
//! [convert]
//! indent = "    "
//! report_unregistered = false
//!
//! [log]
//! level = "debug"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use vbsharp_convert::ConvertOptions;

/// Where files are read from and written to.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory of source files. Defaults to `input/` next to the executable.
    pub input: Option<PathBuf>,
    /// Directory for converted files. Defaults to `output/` next to the executable.
    pub output: Option<PathBuf>,
}

/// Conversion settings. Unset fields fall through to earlier layers and
/// finally to [`ConvertOptions::default`].
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ConvertConfig {
    pub indent: Option<String>,
    pub reorder_static: Option<bool>,
    pub split_declarations: Option<bool>,
    pub report_unregistered: Option<bool>,
}

impl ConvertConfig {
    fn merge(self, other: Self) -> Self {
        Self {
            indent: other.indent.or(self.indent),
            reorder_static: other.reorder_static.or(self.reorder_static),
            split_declarations: other.split_declarations.or(self.split_declarations),
            report_unregistered: other.report_unregistered.or(self.report_unregistered),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    /// A `tracing` filter directive such as `info` or `vbsharp=debug`.
    pub level: Option<String>,
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct VbsharpConfig {
    pub paths: PathsConfig,
    pub convert: ConvertConfig,
    pub log: LogConfig,
}

impl VbsharpConfig {
    /// Load configuration for a project.
    ///
    /// Returns the merged config and a message for every file that exists
    /// but could not be used. Logging is not set up yet when this runs, so
    /// the caller reports them.
    pub fn load(root: &Path, explicit: Option<&Path>) -> (Self, Vec<String>) {
        Self::load_from(Self::global_config_path().as_deref(), root, explicit)
    }

    fn load_from(global: Option<&Path>, root: &Path, explicit: Option<&Path>) -> (Self, Vec<String>) {
        let mut config = Self::default();
        let mut problems = Vec::new();

        let project = root.join(".vbsharp").join("config.toml");
        let layers = global
            .map(|p| (p, false))
            .into_iter()
            .chain([(project.as_path(), false)])
            .chain(explicit.map(|p| (p, true)));

        for (path, required) in layers {
            match Self::load_file(path) {
                Ok(Some(layer)) => config = config.merge(layer),
                Ok(None) if required => problems.push(format!("{}: file not found", path.display())),
                Ok(None) => {}
                Err(message) => problems.push(message),
            }
        }
        (config, problems)
    }

    /// Get the global config path.
    fn global_config_path() -> Option<PathBuf> {
        let config_home = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))?;
        Some(config_home.join("vbsharp").join("config.toml"))
    }

    /// Load config from a file path. A missing file is `Ok(None)`.
    pub fn load_file(path: &Path) -> Result<Option<Self>, String> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(format!("{}: {e}", path.display())),
        };
        toml::from_str(&content)
            .map(Some)
            .map_err(|e| format!("{}: {e}", path.display()))
    }

    /// Merge another config into this one.
    /// Values set in `other` override values in `self`.
    pub fn merge(mut self, other: Self) -> Self {
        self.paths.input = other.paths.input.or(self.paths.input);
        self.paths.output = other.paths.output.or(self.paths.output);
        self.convert = self.convert.merge(other.convert);
        self.log.level = other.log.level.or(self.log.level);
        self
    }

    /// The conversion options these settings describe.
    pub fn convert_options(&self) -> ConvertOptions {
        let defaults = ConvertOptions::default();
        let convert = self.convert.clone();
        ConvertOptions {
            indent: convert.indent.unwrap_or(defaults.indent),
            reorder_static: convert.reorder_static.unwrap_or(defaults.reorder_static),
            split_declarations: convert
                .split_declarations
                .unwrap_or(defaults.split_declarations),
            report_unregistered: convert
                .report_unregistered
                .unwrap_or(defaults.report_unregistered),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut file = std::fs::File::create(path).unwrap();
        writeln!(file, "{content}").unwrap();
    }

    #[test]
    fn test_default_config() {
        let config = VbsharpConfig::default();
        assert_eq!(config.convert_options(), ConvertOptions::default());
        assert!(config.paths.input.is_none());
    }

    #[test]
    fn test_load_project_config() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir.path().join(".vbsharp").join("config.toml"),
            r#"
[paths]
output = "converted"

[convert]
indent = "  "
"#,
        );

        let (config, problems) = VbsharpConfig::load_from(None, dir.path(), None);
        assert!(problems.is_empty());
        assert_eq!(config.paths.output, Some(PathBuf::from("converted")));
        let options = config.convert_options();
        assert_eq!(options.indent, "  ");
        assert!(options.split_declarations); // default
    }

    #[test]
    fn test_layers_override_in_order() {
        let dir = TempDir::new().unwrap();
        let global = dir.path().join("global.toml");
        write_config(
            &global,
            r#"
[paths]
input = "from-global"
output = "global-out"

[log]
level = "warn"
"#,
        );
        write_config(
            &dir.path().join(".vbsharp").join("config.toml"),
            "[paths]\ninput = \"from-project\"",
        );
        let explicit = dir.path().join("explicit.toml");
        write_config(&explicit, "[convert]\nreorder_static = false");

        let (config, problems) =
            VbsharpConfig::load_from(Some(&global), dir.path(), Some(&explicit));
        assert!(problems.is_empty());
        assert_eq!(config.paths.input, Some(PathBuf::from("from-project")));
        assert_eq!(config.paths.output, Some(PathBuf::from("global-out")));
        assert_eq!(config.log.level.as_deref(), Some("warn"));
        assert!(!config.convert_options().reorder_static);
    }

    #[test]
    fn test_later_layer_restores_default_value() {
        let dir = TempDir::new().unwrap();
        let global = dir.path().join("global.toml");
        write_config(&global, "[convert]\nreorder_static = false\nindent = \"  \"");
        let explicit = dir.path().join("explicit.toml");
        write_config(&explicit, "[convert]\nreorder_static = true\nindent = \"\\t\"");

        let (config, problems) =
            VbsharpConfig::load_from(Some(&global), dir.path(), Some(&explicit));
        assert!(problems.is_empty());
        let options = config.convert_options();
        assert!(options.reorder_static);
        assert_eq!(options.indent, "\t");
    }

    #[test]
    fn test_bad_files_are_reported_and_skipped() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir.path().join(".vbsharp").join("config.toml"),
            "[convert\nindent = ",
        );
        let missing = dir.path().join("missing.toml");

        let (config, problems) = VbsharpConfig::load_from(None, dir.path(), Some(&missing));
        assert_eq!(config, VbsharpConfig::default());
        assert_eq!(problems.len(), 2);
        assert!(problems[1].contains("file not found"));
    }
}
