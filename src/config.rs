use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::manifest::MANIFEST_FILE;

pub const CONFIG_FILE: &str = "attribution-notices.config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// License identifiers whose full text is embedded (case-insensitive)
    pub include_texts: Vec<String>,

    /// Package-name patterns left out of the scan
    pub exclude: Vec<String>,

    /// License group ordering in the report
    pub sort: SortOrder,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            include_texts: vec![
                "MIT".to_string(),
                "BSD-2-Clause".to_string(),
                "BSD-3-Clause".to_string(),
            ],
            exclude: vec!["@types/*".to_string()],
            sort: SortOrder::Name,
        }
    }
}

impl Config {
    /// Replace `include_texts` with a comma-separated list from the command line.
    pub fn with_include_texts(mut self, list: &str) -> Self {
        self.include_texts = parse_id_list(list);
        self
    }
}

/// Accepted values are `name` and `license`. Both currently order license
/// groups alphabetically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortOrder {
    #[default]
    Name,
    License,
}

impl From<String> for SortOrder {
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case("license") {
            SortOrder::License
        } else {
            SortOrder::Name
        }
    }
}

impl From<SortOrder> for String {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Name => "name".to_string(),
            SortOrder::License => "license".to_string(),
        }
    }
}

/// What happened to the project config file during load
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigFileOutcome {
    Absent,
    Applied,
    /// Present but unusable; defaults were kept
    Ignored { reason: String },
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub path: PathBuf,
    pub outcome: ConfigFileOutcome,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    include_texts: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
    sort: Option<SortOrder>,
}

/// Nearest ancestor of `start` holding a `package.json`, or `start` itself.
///
/// The filesystem root is never considered a project root.
pub fn find_project_root(start: &Path) -> PathBuf {
    start
        .ancestors()
        .take_while(|dir| dir.parent().is_some())
        .find(|dir| dir.join(MANIFEST_FILE).exists())
        .unwrap_or(start)
        .to_path_buf()
}

/// Load configuration from the project root.
///
/// Keys present in the file replace the defaults one by one. A file that
/// cannot be read or parsed leaves the defaults untouched.
pub fn load_config(project_root: &Path) -> LoadedConfig {
    let path = project_root.join(CONFIG_FILE);
    let mut config = Config::default();

    if !path.exists() {
        return LoadedConfig { config, path, outcome: ConfigFileOutcome::Absent };
    }

    let file = fs::read_to_string(&path)
        .map_err(|e| format!("failed to read: {}", e))
        .and_then(|content| {
            serde_json::from_str::<ConfigFile>(&content)
                .map_err(|e| format!("failed to parse: {}", e))
        });

    let outcome = match file {
        Ok(file) => {
            if let Some(include_texts) = file.include_texts {
                config.include_texts = include_texts;
            }
            if let Some(exclude) = file.exclude {
                config.exclude = exclude;
            }
            if let Some(sort) = file.sort {
                config.sort = sort;
            }
            ConfigFileOutcome::Applied
        }
        Err(reason) => ConfigFileOutcome::Ignored { reason },
    };

    LoadedConfig { config, path, outcome }
}

fn parse_id_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}
