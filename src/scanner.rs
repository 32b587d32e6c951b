use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::license::normalize_license;
use crate::manifest::{Manifest, MANIFEST_FILE};
use crate::matcher::ExcludeSet;

pub const DEPENDENCY_DIR: &str = "node_modules";

const BIN_DIR: &str = ".bin";
const SCOPE_MARKER: char = '@';

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub name: String,
    pub version: String,
    pub license: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    pub dir: PathBuf,
}

impl PackageRecord {
    pub fn id(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }

    /// Homepage if present, else repository
    pub fn link(&self) -> Option<&str> {
        self.homepage.as_deref().or(self.repository.as_deref())
    }
}

/// Why a directory entry did not produce a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    UnreadableDirectory,
    UnreadableManifest,
    MalformedManifest,
    MissingName,
    Excluded { pattern: String },
    Duplicate { id: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnreadableDirectory => write!(f, "directory could not be read"),
            SkipReason::UnreadableManifest => write!(f, "{} could not be read", MANIFEST_FILE),
            SkipReason::MalformedManifest => write!(f, "{} is not valid JSON", MANIFEST_FILE),
            SkipReason::MissingName => write!(f, "{} has no name", MANIFEST_FILE),
            SkipReason::Excluded { pattern } => write!(f, "excluded by pattern '{}'", pattern),
            SkipReason::Duplicate { id } => write!(f, "{} already recorded", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedEntry {
    pub path: PathBuf,
    pub reason: SkipReason,
}

#[derive(Debug, Default)]
pub struct ScanReport {
    /// Unique by (name, version), sorted by name then version
    pub packages: Vec<PackageRecord>,
    pub skipped: Vec<SkippedEntry>,
}

enum Work {
    Directory(PathBuf),
    Entry(PathBuf),
}

/// Walk a `node_modules` tree and collect one record per (name, version).
///
/// The walk is depth-first in file-name order, so the first copy of a
/// package met in that order is the one kept. Nothing here is fatal: every
/// entry that cannot be used ends up in [`ScanReport::skipped`].
pub fn scan_dependency_tree(root: &Path, exclude: &ExcludeSet) -> ScanReport {
    let mut scanner = Scanner {
        exclude,
        stack: vec![Work::Directory(root.to_path_buf())],
        walked: HashSet::new(),
        seen: HashSet::new(),
        report: ScanReport::default(),
    };

    while let Some(work) = scanner.stack.pop() {
        match work {
            Work::Directory(dir) => scanner.expand_directory(&dir),
            Work::Entry(path) => scanner.visit_entry(&path),
        }
    }

    let mut report = scanner.report;
    report
        .packages
        .sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.version.cmp(&b.version)));
    report
}

struct Scanner<'a> {
    exclude: &'a ExcludeSet,
    stack: Vec<Work>,
    /// Canonical paths of directories already listed
    walked: HashSet<PathBuf>,
    seen: HashSet<(String, String)>,
    report: ScanReport,
}

impl Scanner<'_> {
    fn expand_directory(&mut self, dir: &Path) {
        let key = fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
        if !self.walked.insert(key) {
            return;
        }

        let mut names = match read_entry_names(dir) {
            Ok(names) => names,
            Err(_) => {
                self.skip(dir, SkipReason::UnreadableDirectory);
                return;
            }
        };
        names.sort();

        // Reversed so entries pop off the stack in name order
        for name in names.into_iter().rev() {
            self.stack.push(Work::Entry(dir.join(name)));
        }
    }

    fn visit_entry(&mut self, path: &Path) {
        let name = match path.file_name() {
            Some(name) => name.to_string_lossy(),
            None => return,
        };

        if name == BIN_DIR {
            return;
        }

        if name.starts_with(SCOPE_MARKER) {
            if path.is_dir() {
                self.stack.push(Work::Directory(path.to_path_buf()));
            }
            return;
        }

        let manifest_path = path.join(MANIFEST_FILE);
        if manifest_path.exists() {
            self.visit_package(path, &manifest_path);
        } else if path.is_dir() {
            self.descend(path);
        }
    }

    fn visit_package(&mut self, package_dir: &Path, manifest_path: &Path) {
        let bytes = match fs::read(manifest_path) {
            Ok(bytes) => bytes,
            Err(_) => {
                self.skip(package_dir, SkipReason::UnreadableManifest);
                return;
            }
        };

        // Stray non-UTF-8 bytes (an old Latin-1 author field) become U+FFFD
        let content = String::from_utf8_lossy(&bytes);
        let manifest = match Manifest::from_json(&content) {
            Ok(manifest) => manifest,
            Err(_) => {
                self.skip(package_dir, SkipReason::MalformedManifest);
                return;
            }
        };

        let name = match manifest.package_name() {
            Some(name) => name.to_string(),
            None => {
                // Still a directory that may hold installed dependencies
                self.skip(package_dir, SkipReason::MissingName);
                self.descend(package_dir);
                return;
            }
        };

        if let Some(pattern) = self.exclude.find_match(&name) {
            let pattern = pattern.to_string();
            self.skip(package_dir, SkipReason::Excluded { pattern });
            return;
        }

        let version = manifest.package_version();
        if !self.seen.insert((name.clone(), version.clone())) {
            // The first copy's subtree has already been walked
            let id = format!("{}@{}", name, version);
            self.skip(package_dir, SkipReason::Duplicate { id });
            return;
        }

        self.report.packages.push(PackageRecord {
            license: normalize_license(manifest.license.as_ref(), manifest.licenses.as_ref()),
            homepage: manifest.homepage_url(),
            repository: manifest.repository_url(),
            dir: package_dir.to_path_buf(),
            name,
            version,
        });

        self.descend(package_dir);
    }

    fn descend(&mut self, package_dir: &Path) {
        let nested = package_dir.join(DEPENDENCY_DIR);
        if nested.is_dir() {
            self.stack.push(Work::Directory(nested));
        }
    }

    fn skip(&mut self, path: &Path, reason: SkipReason) {
        self.report.skipped.push(SkippedEntry {
            path: path.to_path_buf(),
            reason,
        });
    }
}

fn read_entry_names(dir: &Path) -> std::io::Result<Vec<OsString>> {
    let mut names = Vec::new();
    // An entry that vanished mid-listing is simply not there
    for entry in fs::read_dir(dir)?.flatten() {
        names.push(entry.file_name());
    }
    Ok(names)
}
