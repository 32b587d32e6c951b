use anyhow::Result;
use serde::Deserialize;

pub const MANIFEST_FILE: &str = "package.json";

/// The subset of `package.json` this tool reads.
///
/// Fields that show up in several shapes in the wild are modelled as untagged
/// enums with a catch-all variant, so an odd `license` or `repository` value
/// degrades to "absent" instead of rejecting the whole manifest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    pub name: Option<serde_json::Value>,
    pub version: Option<serde_json::Value>,
    pub license: Option<RawLicense>,
    pub licenses: Option<LegacyLicenses>,
    pub homepage: Option<serde_json::Value>,
    pub repository: Option<RawRepository>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawLicense {
    Text(String),
    Typed {
        #[serde(rename = "type")]
        kind: String,
    },
    Other(serde_json::Value),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LegacyLicenses {
    List(Vec<RawLicense>),
    Other(serde_json::Value),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawRepository {
    Url(String),
    Object { url: String },
    Other(serde_json::Value),
}

impl Manifest {
    /// Parse a manifest. A key repeated in the object keeps its last value.
    pub fn from_json(content: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(content)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Package name, only when the manifest carries a non-empty string
    pub fn package_name(&self) -> Option<&str> {
        self.name
            .as_ref()
            .and_then(|v| v.as_str())
            .filter(|name| !name.is_empty())
    }

    pub fn package_version(&self) -> String {
        match &self.version {
            Some(serde_json::Value::String(v)) => v.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => String::new(),
        }
    }

    pub fn repository_url(&self) -> Option<String> {
        let raw = match self.repository.as_ref()? {
            RawRepository::Url(url) => url,
            RawRepository::Object { url } => url,
            RawRepository::Other(_) => return None,
        };
        if raw.is_empty() {
            return None;
        }
        Some(normalize_repository_url(raw))
    }

    /// Explicit homepage, falling back to the normalized repository URL
    pub fn homepage_url(&self) -> Option<String> {
        match self.homepage.as_ref().and_then(|v| v.as_str()) {
            Some(homepage) if !homepage.is_empty() => Some(homepage.to_string()),
            _ => self.repository_url(),
        }
    }
}

/// Strip a leading `git+` and a trailing `.git` from a repository URL.
pub fn normalize_repository_url(url: &str) -> String {
    let url = url.strip_prefix("git+").unwrap_or(url);
    let url = url.strip_suffix(".git").unwrap_or(url);
    url.to_string()
}
