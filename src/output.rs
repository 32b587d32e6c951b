use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::{Config, SortOrder};
use crate::license::EmbeddedTexts;
use crate::scanner::PackageRecord;

pub const DEFAULT_MARKDOWN_FILE: &str = "THIRD_PARTY_NOTICES.md";
pub const JSON_EXPORT_FILE: &str = "third_party_notices.json";

const PREAMBLE: &str = "This document lists third-party packages included in this project, \
along with their license information. For selected licenses, the full text is included below.";

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Partition packages by their whole license string, in display order.
///
/// `A OR B` is its own group; it is not split into its alternatives.
pub fn group_by_license(
    packages: &[PackageRecord],
    sort: SortOrder,
) -> IndexMap<&str, Vec<&PackageRecord>> {
    let mut groups: IndexMap<&str, Vec<&PackageRecord>> = IndexMap::new();
    for package in packages {
        groups.entry(package.license.as_str()).or_default().push(package);
    }

    match sort {
        // No distinct ordering has been defined for `license` yet
        SortOrder::Name | SortOrder::License => groups.sort_keys(),
    }

    for members in groups.values_mut() {
        members.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.version.cmp(&b.version)));
    }

    groups
}

pub fn render_markdown(
    packages: &[PackageRecord],
    texts: &EmbeddedTexts,
    config: &Config,
    generated_at: DateTime<Utc>,
) -> String {
    let mut output = String::new();

    output.push_str("# Third-Party Notices\n\n");
    output.push_str(&format!(
        "_Generated by attribution-notices on {}_\n\n",
        format_timestamp(generated_at)
    ));
    output.push_str(PREAMBLE);
    output.push_str("\n\n");

    for (license, members) in group_by_license(packages, config.sort) {
        output.push_str(&format!("## {}\n\n", license));
        for package in members {
            match package.link() {
                Some(link) => output.push_str(&format!("- {} — {}\n", package.id(), link)),
                None => output.push_str(&format!("- {}\n", package.id())),
            }
        }
        output.push('\n');
    }

    if !texts.is_empty() {
        output.push_str("---\n\n# License Texts\n\n");
        for (id, text) in &texts.texts {
            output.push_str(&format!("## {}\n\n```\n{}\n```\n\n", id, text.trim()));
        }
    }

    output
}

/// Machine-readable counterpart of the markdown report
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticesExport<'a> {
    pub generated_at: String,
    pub config: &'a Config,
    pub packages: &'a [PackageRecord],
    pub embedded_texts: &'a BTreeMap<String, String>,
}

impl<'a> NoticesExport<'a> {
    pub fn new(
        packages: &'a [PackageRecord],
        texts: &'a EmbeddedTexts,
        config: &'a Config,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            generated_at: format_timestamp(generated_at),
            config,
            packages,
            embedded_texts: &texts.texts,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize notices export")
    }
}
