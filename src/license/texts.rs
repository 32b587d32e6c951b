use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use super::split_license_expression;
use crate::scanner::PackageRecord;

/// License bodies to embed in the report, keyed by identifier
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EmbeddedTexts {
    pub texts: BTreeMap<String, String>,
    /// Identifiers that were wanted but had no template; not an error
    pub missing: Vec<String>,
}

impl EmbeddedTexts {
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

pub fn template_path(project_root: &Path, identifier: &str) -> PathBuf {
    project_root
        .join("templates")
        .join("licenses")
        .join(format!("{}.txt", identifier))
}

/// Look up the full text for one identifier under `templates/licenses/`.
pub fn find_license_text(project_root: &Path, identifier: &str) -> Option<String> {
    if identifier.is_empty()
        || identifier.contains(|c: char| c == '/' || c == '\\')
        || identifier.starts_with('.')
    {
        return None;
    }
    fs::read_to_string(template_path(project_root, identifier)).ok()
}

/// Resolve texts for every allow-listed identifier some package actually uses.
///
/// `include_texts` is compared case-insensitively; the embedded map is keyed
/// by the identifier as spelled in `include_texts`. Each alternative of an
/// `A OR B` license counts as used.
pub fn resolve_license_texts(
    packages: &[PackageRecord],
    project_root: &Path,
    include_texts: &[String],
) -> EmbeddedTexts {
    let mut allowed: HashMap<String, &str> = HashMap::new();
    for id in include_texts {
        allowed.entry(id.to_uppercase()).or_insert(id.as_str());
    }

    let wanted: BTreeSet<&str> = packages
        .iter()
        .flat_map(|package| split_license_expression(&package.license))
        .filter_map(|alternative| allowed.get(&alternative.to_uppercase()).copied())
        .collect();

    let mut embedded = EmbeddedTexts::default();
    for id in wanted {
        match find_license_text(project_root, id) {
            Some(text) => {
                embedded.texts.insert(id.to_string(), text);
            }
            None => embedded.missing.push(id.to_string()),
        }
    }

    embedded
}
