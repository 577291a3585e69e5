//! Extraction of voice-data payloads from downloaded bin files.
//!
//! A stateless, module-level operation: each bin container is parsed and
//! its payloads are written under the output directory. Failures of one
//! file are recorded and do not stop the rest.

use crate::container;
use crate::error::Result;
use crate::file::paths;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// What happened to one bin file during extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOutcome {
    pub bin_file: PathBuf,

    /// Files written from this container's entries.
    pub files_written: Vec<PathBuf>,

    /// Failure description, when this file could not be extracted.
    pub error: Option<String>,
}

impl FileOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-file outcomes of one extraction run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractReport {
    pub outcomes: Vec<FileOutcome>,
}

impl ExtractReport {
    pub fn extracted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.extracted()
    }

    /// Every file written across all containers.
    pub fn files_written(&self) -> Vec<&Path> {
        self.outcomes
            .iter()
            .flat_map(|o| o.files_written.iter().map(PathBuf::as_path))
            .collect()
    }
}

/// Extract the voice-data payloads of `bin_files` into `output_dir`.
///
/// An empty input performs no writes at all; the output directory is not
/// even created. Entry names are sanitized and never overwrite existing
/// files. Per-file parse or write failures land in the report; only an
/// unusable output directory aborts with `Err`.
pub fn extract_bin_files<P: AsRef<Path>>(
    bin_files: &[P],
    output_dir: impl AsRef<Path>,
) -> Result<ExtractReport> {
    let output_dir = output_dir.as_ref();

    if bin_files.is_empty() {
        log::debug!("no bin files to extract");
        return Ok(ExtractReport::default());
    }

    paths::prepare_output_dir(output_dir)?;

    let mut outcomes = Vec::with_capacity(bin_files.len());
    for bin_file in bin_files {
        let bin_file = bin_file.as_ref();
        match extract_one(bin_file, output_dir) {
            Ok(files_written) => {
                log::info!(
                    "extracted {} file(s) from {}",
                    files_written.len(),
                    bin_file.display()
                );
                outcomes.push(FileOutcome {
                    bin_file: bin_file.to_path_buf(),
                    files_written,
                    error: None,
                });
            }
            Err(err) => {
                log::warn!("failed to extract {}: {err}", bin_file.display());
                outcomes.push(FileOutcome {
                    bin_file: bin_file.to_path_buf(),
                    files_written: Vec::new(),
                    error: Some(err.to_string()),
                });
            }
        }
    }

    let report = ExtractReport { outcomes };
    log::info!(
        "extraction finished: {} of {} bin file(s) extracted",
        report.extracted(),
        report.outcomes.len()
    );
    Ok(report)
}

fn extract_one(bin_file: &Path, output_dir: &Path) -> Result<Vec<PathBuf>> {
    let data = fs::read(bin_file)?;
    let entries = container::parse_bin_file(&data)?;

    let mut files_written = Vec::with_capacity(entries.len());
    for entry in entries {
        let name = paths::sanitize_file_name(&entry.name);
        let target = paths::unique_path(output_dir, &name);
        fs::write(&target, &entry.payload)?;
        files_written.push(target);
    }
    Ok(files_written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::BinWriter;

    fn write_bin(dir: &Path, name: &str, entries: &[(&str, &[u8])]) -> PathBuf {
        let mut writer = BinWriter::new();
        for (entry_name, payload) in entries {
            writer.push(*entry_name, payload.to_vec());
        }
        let path = dir.join(name);
        writer.write_to(&path).unwrap();
        path
    }

    #[test]
    fn test_empty_input_performs_no_writes() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out");

        let report = extract_bin_files::<&Path>(&[], &output).unwrap();
        assert!(report.outcomes.is_empty());
        assert!(!output.exists());
    }

    #[test]
    fn test_extracts_payloads_under_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let bin = write_bin(
            dir.path(),
            "item.bin",
            &[("a_000.wav", b"AAAA"), ("a_001.wav", b"BBBB")],
        );
        let output = dir.path().join("out");

        let report = extract_bin_files(&[&bin], &output).unwrap();
        assert_eq!(report.extracted(), 1);
        assert_eq!(report.files_written().len(), 2);
        assert_eq!(fs::read(output.join("a_000.wav")).unwrap(), b"AAAA");
        assert_eq!(fs::read(output.join("a_001.wav")).unwrap(), b"BBBB");
    }

    #[test]
    fn test_bad_file_is_reported_and_rest_continue() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_bin(dir.path(), "good.bin", &[("x.wav", b"XX")]);
        let bad = dir.path().join("bad.bin");
        fs::write(&bad, b"not a container").unwrap();
        let output = dir.path().join("out");

        let report = extract_bin_files(&[&bad, &good], &output).unwrap();
        assert_eq!(report.extracted(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.outcomes[0].succeeded());
        assert!(report.outcomes[1].succeeded());
        assert!(output.join("x.wav").exists());
    }

    #[test]
    fn test_missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.bin");
        let output = dir.path().join("out");

        let report = extract_bin_files(&[&missing], &output).unwrap();
        assert_eq!(report.failed(), 1);
    }

    #[test]
    fn test_hostile_entry_names_stay_inside_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let bin = write_bin(dir.path(), "evil.bin", &[("../../escape.wav", b"EV")]);
        let output = dir.path().join("out");

        let report = extract_bin_files(&[&bin], &output).unwrap();
        assert_eq!(report.extracted(), 1);
        // The write landed inside the output directory, not above it.
        assert!(!dir.path().join("escape.wav").exists());
        let written = &report.outcomes[0].files_written[0];
        assert!(written.starts_with(&output));
    }

    #[test]
    fn test_duplicate_entry_names_do_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let bin = write_bin(
            dir.path(),
            "dup.bin",
            &[("same.wav", b"first"), ("same.wav", b"second")],
        );
        let output = dir.path().join("out");

        let report = extract_bin_files(&[&bin], &output).unwrap();
        assert_eq!(report.files_written().len(), 2);
        assert_eq!(fs::read(output.join("same.wav")).unwrap(), b"first");
        assert_eq!(fs::read(output.join("same_1.wav")).unwrap(), b"second");
    }
}
