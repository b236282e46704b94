use std::{ffi::{OsStr, OsString}, fs, path::{Component, Path, PathBuf}};

use ahash::HashSet;
use walkdir::WalkDir;

use crate::{error::{Result, ScrubError}, metadata::MANIFEST_FILE_NAME};

/// Dependency caches that hold vendored manifests we must never touch.
pub const DEFAULT_SKIP_DIRS: [&str; 2] = ["node_modules", ".yarn"];

pub struct Discovery {
    root: PathBuf,
    skip_dirs: HashSet<OsString>,
}

impl Discovery {
    /// Fails if `root` can't be listed, before anything is walked.
    pub fn new<P: AsRef<Path>, S: AsRef<str>>(root: P, skip_dirs: &[S]) -> std::result::Result<Self, ScrubError> {
        let root = root.as_ref().to_path_buf();

        let metadata = fs::metadata(&root)
            .map_err(|source| ScrubError::Discovery { root: root.clone(), source })?;

        if !metadata.is_dir() {
            return Err(ScrubError::NotADirectory(root))
        }

        fs::read_dir(&root)
            .map_err(|source| ScrubError::Discovery { root: root.clone(), source })?;

        Ok(Self {
            root,
            skip_dirs: skip_dirs.iter().map(|s| OsString::from(s.as_ref())).collect(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every manifest under the root, in file-name order. Each call starts a fresh walk.
    pub fn manifests(&self) -> impl Iterator<Item = Result<PathBuf>> + '_ {
        WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_skipped(entry.path()))
            .filter_map(|entry| match entry {
                Ok(entry) => {
                    if entry.file_type().is_dir() || entry.file_name() != OsStr::new(MANIFEST_FILE_NAME) {
                        return None
                    }

                    Some(Ok(display_path(entry.path())))
                },
                Err(e) => Some(Err(e.into())),
            })
    }

    fn is_skipped(&self, path: &Path) -> bool {
        path.components().any(|c| match c {
            Component::Normal(name) => self.skip_dirs.contains(name),
            _ => false,
        })
    }
}

// `./pkgA/package.json` reads better as `pkgA/package.json`.
fn display_path(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
