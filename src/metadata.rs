use std::path::{Path, PathBuf};

pub mod manifest;

pub const MANIFEST_FILE_NAME: &str = "package.json";

pub const DEPENDENCY_SECTIONS: [&str; 4] = [
    "dependencies",
    "devDependencies",
    "peerDependencies",
    "optionalDependencies",
];

/// Sibling path a manifest is staged at before being renamed over the original.
pub fn staging_path(path: &Path) -> PathBuf {
    let mut staged = path.as_os_str().to_owned();
    staged.push(".scrub-tmp");

    PathBuf::from(staged)
}
