//! Output-path helpers for download and extraction.

use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Make sure the output directory exists.
pub fn prepare_output_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    Ok(())
}

/// Reduce an arbitrary string to a safe relative file name.
///
/// Path separators and other characters that are unsafe on common
/// filesystems become underscores; leading/trailing dots and spaces are
/// stripped so a name can never escape the output directory or hide
/// itself. An empty result falls back to `voice_data`.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = cleaned.trim_matches(|c| c == '.' || c == ' ');
    if trimmed.is_empty() {
        "voice_data".to_string()
    } else {
        trimmed.to_string()
    }
}

/// A path under `dir` for `file_name` that does not collide with an
/// existing file, appending `_1`, `_2`, ... before the extension when
/// needed.
pub fn unique_path(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, extension) = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (file_name, None),
    };

    let mut counter = 1u32;
    loop {
        let numbered = match extension {
            Some(ext) => format!("{stem}_{counter}.{ext}"),
            None => format!("{stem}_{counter}"),
        };
        let candidate = dir.join(numbered);
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}
