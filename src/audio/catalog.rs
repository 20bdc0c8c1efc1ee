//! Discovery of a clip library on disk.
//!
//! Clips live one directory below the root, grouped by category
//! (`<root>/kick/001.wav`, `<root>/snare/014.wav`, ...). Labels are the
//! path relative to the root, so they stay stable across machines.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::analysis::AudioSignal;

use super::wav::read_wav;

/// One clip found under a library root
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClipEntry {
    /// `<category>/<file name>`
    pub label: String,
    pub category: String,
    pub path: PathBuf,
}

/// List every `.wav` file one level below the category directories of `root`
///
/// Entries are sorted by label so bulk loads assign the same ids on every run.
/// A missing root yields an empty list.
pub fn discover_clips(root: &Path) -> Result<Vec<ClipEntry>> {
    let mut clips = Vec::new();
    if !root.exists() {
        return Ok(clips);
    }

    for category_entry in
        fs::read_dir(root).with_context(|| format!("listing {}", root.display()))?
    {
        let category_entry = category_entry?;
        if !category_entry.file_type()?.is_dir() {
            continue;
        }
        let category = category_entry.file_name().to_string_lossy().into_owned();
        let category_dir = category_entry.path();

        for entry in fs::read_dir(&category_dir)
            .with_context(|| format!("listing {}", category_dir.display()))?
        {
            let entry = entry?;
            let path = entry.path();
            let is_wav = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
            if entry.file_type()?.is_file() && is_wav {
                clips.push(ClipEntry {
                    label: format!("{}/{}", category, entry.file_name().to_string_lossy()),
                    category: category.clone(),
                    path,
                });
            }
        }
    }

    clips.sort_by(|a, b| a.label.cmp(&b.label));
    Ok(clips)
}

/// Discover and decode every clip under `root`, ready for a bulk load
///
/// Fails on the first clip that cannot be decoded.
pub fn load_catalog(root: &Path) -> Result<Vec<(AudioSignal, String)>> {
    discover_clips(root)?
        .into_iter()
        .map(|clip| {
            let signal = read_wav(&clip.path)?;
            Ok((signal, clip.label))
        })
        .collect()
}
