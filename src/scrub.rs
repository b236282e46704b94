use std::{fmt::Display, path::Path};

use ahash::HashSet;
use compact_str::CompactString;

use crate::{
    denylist::Denylist,
    discover::Discovery,
    error::{ErrorKind, Result, ScrubError},
    metadata::manifest::{Manifest, Removal},
    progress::Progress,
    CliOpts,
};

#[derive(Debug, Default)]
pub struct ScrubResult {
    pub scanned: u64,
    pub modified: u64,
    pub failed: u64,
    pub unreadable_entries: u64,
    pub removed: u64,
    pub packages: HashSet<CompactString>,
}

impl ScrubResult {
    fn record(&mut self, outcome: &FileOutcome) {
        if outcome.removed.is_empty() {
            return
        }

        self.modified += 1;
        self.removed += outcome.removed.len() as u64;
        self.packages.extend(outcome.removed.iter().map(|r| r.package.clone()));
    }
}

impl Display for ScrubResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "{} dependencies ({} distinct) in {} of {} manifests, {} failed",
            self.removed, self.packages.len(), self.modified, self.scanned, self.failed
        ))?;

        if self.unreadable_entries > 0 {
            f.write_fmt(format_args!(", {} entries unreadable", self.unreadable_entries))?;
        }

        Ok(())
    }
}

#[derive(Debug)]
pub struct FileOutcome {
    pub removed: Vec<Removal>,
    /// Entries left across the dependency sections.
    pub dependencies: usize,
    pub written: bool,
}

impl FileOutcome {
    pub fn modified(&self) -> bool {
        !self.removed.is_empty()
    }
}

pub fn run(opts: &CliOpts, denylist: &Denylist) -> std::result::Result<ScrubResult, ScrubError> {
    let discovery = Discovery::new(&opts.root, &opts.skip_dirs)?;

    // verbose output scrolls too fast for a spinner to be useful
    let progress = if opts.verbose { Progress::hidden() } else { Progress::with_step("Scrubbing") };
    let result = scrub_all(opts, &discovery, denylist, &progress);
    progress.finish();

    Ok(result)
}

pub fn scrub_all(opts: &CliOpts, discovery: &Discovery, denylist: &Denylist, progress: &Progress) -> ScrubResult {
    let mut result = ScrubResult::default();

    for entry in discovery.manifests() {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                let subject = match &e {
                    ErrorKind::Walkdir(we) => we.path().unwrap_or(discovery.root()).display().to_string(),
                    _ => discovery.root().display().to_string(),
                };
                progress.warn("scan", &subject, e);

                result.unreadable_entries += 1;

                continue
            }
        };

        result.scanned += 1;

        match process(&path, denylist, opts) {
            Ok(outcome) => {
                for removal in &outcome.removed {
                    progress.removed(removal, &path, opts.verbose);
                }

                if opts.verbose {
                    if !outcome.modified() {
                        progress.log(format!("Unchanged {} ({} dependencies)", path.display(), outcome.dependencies));
                    } else if !outcome.written {
                        progress.log(format!("Dry run, not rewriting {}", path.display()));
                    }
                }

                result.record(&outcome);
            },
            Err(e) => {
                progress.warn("process", &path.display().to_string(), e);

                result.failed += 1;
            }
        }

        progress.update(&result, &path);
    }

    result
}

/// Scrubs one manifest, rewriting it only when something was removed.
pub fn process(path: &Path, denylist: &Denylist, opts: &CliOpts) -> Result<FileOutcome> {
    let mut manifest = Manifest::read(path)?;

    let removed = manifest.scrub(denylist)?;

    let written = !removed.is_empty() && !opts.dry_run;
    if written {
        manifest.write(path)?;
    }

    Ok(FileOutcome { removed, dependencies: manifest.dependency_count(), written })
}
