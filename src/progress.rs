use std::{fmt::Display, path::Path};

use console::style;
use indicatif::{HumanCount, ProgressBar, ProgressStyle};

use crate::{log, metadata::manifest::Removal, scrub::ScrubResult};

/// Spinner on stderr. Drawing is skipped when stderr isn't a terminal.
pub struct Progress {
    bar: ProgressBar,
}

impl Progress {
    pub fn with_step(step: &str) -> Self {
        let bar = ProgressBar::new_spinner();

        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());

        bar.set_style(style);
        bar.set_prefix(step.to_string());

        Self { bar }
    }

    pub fn hidden() -> Self {
        Self { bar: ProgressBar::hidden() }
    }

    pub fn log<M: Display>(&self, msg: M) {
        self.bar.suspend(|| log(msg));
    }

    pub fn removed(&self, removal: &Removal, path: &Path, verbose: bool) {
        self.log(removal_line(removal, path, verbose));
    }

    pub fn warn<E: Display>(&self, action: &str, subject: &str, e: E) {
        self.log(warning_line(action, subject, e));
    }

    pub fn update(&self, result: &ScrubResult, current: &Path) {
        self.bar.set_message(format!(
            "{} manifests, {} removed | {}",
            HumanCount(result.scanned),
            HumanCount(result.removed),
            current.display()
        ));
        self.bar.tick();
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// `Removing <package> from <path>`, with the section appended when verbose.
pub fn removal_line(removal: &Removal, path: &Path, verbose: bool) -> String {
    let line = format!("{} {} from {}", style("Removing").red(), removal.package, path.display());

    if verbose {
        format!("{line} ({})", removal.section)
    } else {
        line
    }
}

pub fn warning_line<E: Display>(action: &str, subject: &str, e: E) -> String {
    format!("{} Could not {action} {subject}: {e}", style("Warning:").yellow().bold())
}
