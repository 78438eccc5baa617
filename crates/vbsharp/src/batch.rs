//! Directory batch conversion: read every file, convert, write results.

use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use vbsharp_convert::{ConvertError, ConvertOptions, Converter, Diagnostic, Severity};
use walkdir::WalkDir;

/// Error that stops a batch before any file is converted.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to list {}: {source}", path.display())]
    List {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Outcome of converting a single file.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FileOutcome {
    Converted {
        output: PathBuf,
        lines: usize,
        diagnostics: Vec<Diagnostic>,
    },
    Skipped {
        reason: String,
    },
    Failed {
        message: String,
    },
}

/// Result for a single file in a batch.
#[derive(Debug, Serialize)]
pub struct FileResult {
    pub name: String,
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: FileOutcome,
    /// `VB [n]: ...` and `CS [n]: ...` console lines.
    #[serde(skip)]
    pub echo: Vec<String>,
}

/// Aggregated report for one batch.
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub files: Vec<FileResult>,
}

impl BatchReport {
    pub fn converted(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Converted { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed { .. }))
    }

    fn count(&self, f: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|r| f(&r.outcome)).count()
    }

    pub fn format_text(&self) -> String {
        if self.files.is_empty() {
            return format!("No files found in {}", self.input.display());
        }

        let mut parts = Vec::new();
        for file in &self.files {
            match &file.outcome {
                FileOutcome::Converted {
                    output,
                    diagnostics,
                    ..
                } => {
                    parts.push(format!("{} -> {}", file.name, output.display()));
                    parts.extend(diagnostics.iter().map(|d| format!("  {d}")));
                }
                FileOutcome::Skipped { reason } => {
                    parts.push(format!("{}: skipped ({reason})", file.name));
                }
                FileOutcome::Failed { message } => {
                    parts.push(format!("{}: error: {message}", file.name));
                }
            }
        }
        parts.push(format!(
            "{} converted, {} skipped, {} failed",
            self.converted(),
            self.skipped(),
            self.failed()
        ));
        parts.join("\n")
    }
}

/// List the regular, non-hidden files directly inside `dir`, sorted.
fn list_files(dir: &Path) -> Result<Vec<PathBuf>, BatchError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| BatchError::List {
            path: dir.to_path_buf(),
            source,
        })?;
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if entry.file_type().is_file() && !hidden {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn create_dir(path: &Path) -> Result<(), BatchError> {
    std::fs::create_dir_all(path).map_err(|source| BatchError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

/// Convert every file directly inside `input` and write the results to
/// `output`, creating both directories if needed.
///
/// Files are converted in parallel; the report lists them in name order.
/// A file that cannot be read or written is recorded as failed and the
/// rest of the batch still runs.
pub fn convert_dir(
    input: &Path,
    output: &Path,
    converter: &dyn Converter,
    options: &ConvertOptions,
) -> Result<BatchReport, BatchError> {
    create_dir(input)?;
    create_dir(output)?;
    let files = list_files(input)?;
    tracing::info!(
        count = files.len(),
        input = %input.display(),
        "converting {} files",
        converter.source_language()
    );

    let results: Vec<FileResult> = files
        .par_iter()
        .map(|path| convert_file(path, output, converter, options))
        .collect();

    Ok(BatchReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        files: results,
    })
}

fn convert_file(
    path: &Path,
    output_dir: &Path,
    converter: &dyn Converter,
    options: &ConvertOptions,
) -> FileResult {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string();
    let mut echo = Vec::new();

    let outcome = match std::fs::read_to_string(path) {
        Err(e) => {
            tracing::error!(file = %name, "read failed: {e}");
            FileOutcome::Failed {
                message: format!("read failed: {e}"),
            }
        }
        Ok(source) => {
            for (i, line) in source.lines().enumerate() {
                echo.push(format!("VB [{}]: {line}", i + 1));
            }
            match converter.convert(&source, options) {
                Err(ConvertError::EmptyInput) => {
                    tracing::info!(file = %name, "empty input, nothing written");
                    FileOutcome::Skipped {
                        reason: ConvertError::EmptyInput.to_string(),
                    }
                }
                Ok(conversion) => {
                    for diagnostic in &conversion.diagnostics {
                        match diagnostic.severity {
                            Severity::Warning => tracing::warn!(file = %name, "{diagnostic}"),
                            Severity::Note => tracing::debug!(file = %name, "{diagnostic}"),
                        }
                    }
                    for (i, line) in conversion.lines.iter().enumerate() {
                        echo.push(format!("CS [{}]: {line}", i + 1));
                    }

                    // Append rather than `with_extension`, which would cut
                    // a dotted stem such as `a.x`.
                    let stem = path.file_stem().unwrap_or(path.as_os_str());
                    let target = output_dir.join(format!(
                        "{}.{}",
                        stem.to_string_lossy(),
                        converter.target_extension()
                    ));
                    match std::fs::write(&target, conversion.text()) {
                        Ok(()) => {
                            tracing::info!(
                                file = %name,
                                output = %target.display(),
                                diagnostics = conversion.diagnostics.len(),
                                "converted"
                            );
                            FileOutcome::Converted {
                                output: target,
                                lines: conversion.lines.len(),
                                diagnostics: conversion.diagnostics,
                            }
                        }
                        Err(e) => {
                            tracing::error!(file = %name, "write failed: {e}");
                            FileOutcome::Failed {
                                message: format!("write failed: {e}"),
                            }
                        }
                    }
                }
            }
        }
    };

    FileResult {
        name,
        path: path.to_path_buf(),
        outcome,
        echo,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use vbsharp_convert::VB_CONVERTER;

    fn run(dir: &TempDir) -> BatchReport {
        convert_dir(
            &dir.path().join("input"),
            &dir.path().join("output"),
            &VB_CONVERTER,
            &ConvertOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_creates_missing_directories() {
        let dir = TempDir::new().unwrap();
        let report = run(&dir);
        assert!(dir.path().join("input").is_dir());
        assert!(dir.path().join("output").is_dir());
        assert!(report.files.is_empty());
        assert!(report.format_text().starts_with("No files found"));
    }

    #[test]
    fn test_converts_and_skips() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input");
        std::fs::create_dir_all(&input).unwrap();
        std::fs::write(input.join("b.vb"), "Dim x As Integer = 5\n").unwrap();
        std::fs::write(input.join("a.vb"), "\n  \n").unwrap();
        std::fs::write(input.join(".hidden"), "Dim y\n").unwrap();

        let report = run(&dir);
        let names: Vec<&str> = report.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.vb", "b.vb"]);
        assert_eq!((report.converted(), report.skipped(), report.failed()), (1, 1, 0));

        let written = std::fs::read_to_string(dir.path().join("output").join("b.cs")).unwrap();
        assert_eq!(written, "int x = 5;\n");
        assert!(!dir.path().join("output").join("a.cs").exists());
        assert_eq!(
            report.files[1].echo,
            vec!["VB [1]: Dim x As Integer = 5", "CS [1]: int x = 5;"]
        );
    }

    #[test]
    fn test_dotted_stems_keep_distinct_outputs() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input");
        std::fs::create_dir_all(&input).unwrap();
        std::fs::write(input.join("a.x.vb"), "Dim x As Integer\n").unwrap();
        std::fs::write(input.join("a.y.vb"), "Dim y As String\n").unwrap();

        let report = run(&dir);
        assert_eq!(report.converted(), 2);
        let output = dir.path().join("output");
        assert_eq!(std::fs::read_to_string(output.join("a.x.cs")).unwrap(), "int x;\n");
        assert_eq!(std::fs::read_to_string(output.join("a.y.cs")).unwrap(), "string y;\n");
        assert!(!output.join("a.cs").exists());
    }

    #[test]
    fn test_unreadable_file_does_not_stop_batch() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input");
        std::fs::create_dir_all(&input).unwrap();
        std::fs::write(input.join("bad.vb"), [0xff, 0xfe, 0x00]).unwrap();
        std::fs::write(input.join("good.vb"), "Return\n").unwrap();

        let report = run(&dir);
        assert_eq!((report.converted(), report.failed()), (1, 1));
        assert!(matches!(report.files[0].outcome, FileOutcome::Failed { .. }));
        assert!(report.format_text().ends_with("1 converted, 0 skipped, 1 failed"));
    }

    #[test]
    fn test_report_serializes_with_status() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input");
        std::fs::create_dir_all(&input).unwrap();
        std::fs::write(input.join("m.vb"), "Next\n").unwrap();

        let report = run(&dir);
        let json = serde_json::to_value(&report).unwrap();
        let file = &json["files"][0];
        assert_eq!(file["status"], "converted");
        assert_eq!(file["diagnostics"][0]["kind"], "unmatched_close");
        assert_eq!(file["diagnostics"][0]["severity"], "warning");
        assert!(file.get("echo").is_none());
    }
}
