//! Source-file discovery.
//!
//! Walks the search root for files that match the profile's extension,
//! are not test files themselves, have no test file yet, and are not
//! excluded by configuration. Among the eligible files one is chosen at
//! random per call. The visited set is passed in explicitly so callers
//! own the cross-call state.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use tracing::{debug, info};
use walkdir::WalkDir;

use tf_core::LanguageProfile;

/// Find the next source file needing a test, or `None` when nothing is
/// eligible. The chosen path is added to `visited`.
pub fn find_next_file(
    root_dir: &Path,
    profile: &dyn LanguageProfile,
    excluded_dirs: &[PathBuf],
    excluded_files: &[String],
    visited: &mut HashSet<PathBuf>,
) -> Result<Option<PathBuf>, walkdir::Error> {
    debug!(root = %root_dir.display(), "starting file search");

    let mut eligible = Vec::new();
    let walker = WalkDir::new(root_dir).into_iter().filter_entry(|entry| {
        !(entry.file_type().is_dir() && excluded_dirs.iter().any(|dir| entry.path() == dir))
    });

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();

        if visited.contains(&path) {
            debug!(path = %path.display(), "skipping visited file");
            continue;
        }

        let name = match path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => continue,
        };
        if excluded_files.iter().any(|excluded| excluded == &name) {
            debug!(path = %path.display(), "skipping excluded file");
            continue;
        }
        if !name.ends_with(profile.file_extension()) {
            continue;
        }
        if name.ends_with(profile.test_file_suffix()) {
            continue;
        }

        // Skip sources whose test file already exists.
        let test_path = profile.test_path(root_dir, &path);
        if test_path.exists() {
            debug!(path = %path.display(), "skipping file with existing test");
            continue;
        }

        eligible.push(path);
    }

    if eligible.is_empty() {
        info!("no files found needing tests");
        return Ok(None);
    }

    let chosen = eligible
        .choose(&mut rand::thread_rng())
        .cloned()
        .unwrap_or_else(|| eligible[0].clone());
    visited.insert(chosen.clone());
    info!(path = %chosen.display(), "selected file for testing");

    Ok(Some(chosen))
}
