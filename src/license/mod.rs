use crate::manifest::{LegacyLicenses, RawLicense};

pub mod texts;

pub use texts::{find_license_text, resolve_license_texts, EmbeddedTexts};

pub const UNKNOWN_LICENSE: &str = "UNKNOWN";

/// Canonical license string for a manifest's `license` / `licenses` fields.
///
/// Priority: a string `license`, then `license.type`, then the legacy
/// `licenses` array joined with ` OR `, otherwise [`UNKNOWN_LICENSE`].
/// Identifiers are accepted verbatim; nothing is checked against SPDX.
pub fn normalize_license(
    license: Option<&RawLicense>,
    licenses: Option<&LegacyLicenses>,
) -> String {
    if let Some(single) = license.and_then(license_entry) {
        return single;
    }

    if let Some(LegacyLicenses::List(entries)) = licenses {
        let parts: Vec<String> = entries.iter().filter_map(license_entry).collect();
        if !parts.is_empty() {
            return parts.join(" OR ");
        }
    }

    UNKNOWN_LICENSE.to_string()
}

fn license_entry(entry: &RawLicense) -> Option<String> {
    let value = match entry {
        RawLicense::Text(text) => text.trim(),
        RawLicense::Typed { kind } => kind.trim(),
        RawLicense::Other(_) => return None,
    };
    (!value.is_empty()).then(|| value.to_string())
}

/// Split an `A OR B` expression into its alternatives.
///
/// The separator is matched case-insensitively and must be surrounded by
/// whitespace. Runs of whitespace inside an alternative collapse to one space.
pub fn split_license_expression(expression: &str) -> Vec<String> {
    let mut alternatives = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for token in expression.split_whitespace() {
        if token.eq_ignore_ascii_case("OR") && !current.is_empty() {
            alternatives.push(current.join(" "));
            current.clear();
        } else {
            current.push(token);
        }
    }
    if !current.is_empty() {
        alternatives.push(current.join(" "));
    }

    alternatives
}
