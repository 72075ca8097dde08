use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

const SUPPORTED_VIDEO_FORMATS: [&str; 10] = [
    "mp4", "mov", "avi", "mkv", "mxf", "prores", "m4v", "wmv", "flv", "webm",
];

pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .map(|ext| SUPPORTED_VIDEO_FORMATS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Replace characters that are problematic in filenames, collapsing
/// repeated underscores.
pub fn safe_filename(filename: &str) -> String {
    let mut safe: String = filename
        .chars()
        .map(|c| {
            if matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') {
                '_'
            } else {
                c
            }
        })
        .collect();

    while safe.contains("__") {
        safe = safe.replace("__", "_");
    }

    safe.trim_matches(|c: char| c == '_' || c == ' ').to_string()
}

/// Append `_1`, `_2`, ... to the stem until the path names no existing
/// file.
pub fn unique_path(base: &Path) -> PathBuf {
    if !base.exists() {
        return base.to_path_buf();
    }

    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = base
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let dir = base.parent().unwrap_or(Path::new(""));

    let mut counter = 1;
    loop {
        let candidate = dir.join(format!("{}_{}{}", stem, counter, ext));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Where the single-source document lands: a sanitized custom name
/// next to the reference file, or `{reference stem}_timeline.fcpxml`.
pub fn single_output_path(reference_file: &Path, custom_filename: Option<&str>) -> PathBuf {
    match custom_filename.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => {
            let mut filename = safe_filename(name);
            if !filename.to_lowercase().ends_with(".fcpxml") {
                filename.push_str(".fcpxml");
            }
            reference_file
                .parent()
                .unwrap_or(Path::new(""))
                .join(filename)
        }
        None => reference_file.with_file_name(format!(
            "{}_timeline.fcpxml",
            stem_of(reference_file)
        )),
    }
}

/// Sibling path for a multi-camera document, named after its source
/// video.
pub fn multi_output_path(reference_file: &Path, source_filename: &str) -> PathBuf {
    let stem = Path::new(source_filename)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    reference_file
        .parent()
        .unwrap_or(Path::new(""))
        .join(format!("{}_timeline.fcpxml", stem))
}

pub fn debug_output_path(reference_file: &Path) -> PathBuf {
    reference_file.with_file_name(format!("{}_DEBUG.txt", stem_of(reference_file)))
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Write a single document next to the reference file. Whole-document
/// write; a crash mid-write can leave a partial file.
pub fn save_single_fcpxml(
    content: &str,
    reference_file: &Path,
    custom_filename: Option<&str>,
) -> Result<PathBuf> {
    let path = single_output_path(reference_file, custom_filename);
    std::fs::write(&path, content).with_context(|| format!("failed to write {:?}", path))?;
    Ok(path)
}

/// Write one document per (content, source filename) pair, each named
/// after its source video.
pub fn save_multiple_fcpxml(
    results: &[(String, String)],
    reference_file: &Path,
) -> Result<Vec<PathBuf>> {
    let mut saved = Vec::with_capacity(results.len());

    for (content, source_filename) in results {
        let path = multi_output_path(reference_file, source_filename);
        std::fs::write(&path, content).with_context(|| format!("failed to write {:?}", path))?;
        saved.push(path);
    }

    Ok(saved)
}

pub fn save_debug_file(content: &str, reference_file: &Path) -> Result<PathBuf> {
    let path = debug_output_path(reference_file);
    std::fs::write(&path, content).with_context(|| format!("failed to write {:?}", path))?;
    Ok(path)
}
