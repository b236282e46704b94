use std::{fmt::Display, path::PathBuf, process::exit};

use clap::Parser;
use denylist::Denylist;
use scrub::run;

mod denylist;
mod discover;
mod error;
mod metadata;
mod progress;
mod scrub;

fn main() {
    dotenv::dotenv().ok();

    let opts = CliOpts::parse();
    let denylist = Denylist::new(&opts.deny);

    if denylist.is_empty() {
        log("Denylist is empty, nothing will be removed");
    }

    log(format!("Scanning {} for dependencies matching: {denylist}", opts.root.display()));
    match run(&opts, &denylist) {
        Ok(res) => {
            log(format!("Patched {res}"));
            exit(0)
        },
        Err(e) => {
            log(format!("Scrubbing failed: {e}"));
            exit(-1)
        }
    }
}

#[derive(Parser, Clone, Debug)]
#[command(author, version, about)]
struct CliOpts {
    #[arg(short, long, env = "SCRUB_ROOT", default_value = ".",
        help = "The directory tree to search for package.json files.")]
    root: PathBuf,

    #[arg(short, long, env = "SCRUB_DENY", value_delimiter = ',', default_values = denylist::DEFAULT_PATTERNS,
        help = "Remove dependencies whose name contains any of these substrings (case-insensitive).")]
    deny: Vec<String>,

    #[arg(short, long = "skip-dir", env = "SCRUB_SKIP_DIRS", value_delimiter = ',', default_values = discover::DEFAULT_SKIP_DIRS,
        help = "Directory names that are never descended into.")]
    skip_dirs: Vec<String>,

    #[arg(short = 'n', long, env = "SCRUB_DRY_RUN", default_value_t = false,
        help = "Report what would be removed without rewriting any manifest.")]
    dry_run: bool,

    #[arg(short, long, env = "SCRUB_VERBOSE", default_value_t = false,
        help = "Also log unchanged manifests and the section each removal came from.")]
    verbose: bool,
}

fn now() -> String {
    chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

fn log<M: Display>(msg: M) {
    println!("{} {msg}", now());
}
