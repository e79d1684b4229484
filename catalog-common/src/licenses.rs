//! Creative Commons license resolution
//!
//! Shared by every provider module: turns the license URL a provider hands us
//! (plus an optional version hint) into a structured [`LicenseInfo`].
//! Anything that is not a recognizable Creative Commons license or public
//! domain tool resolves to `None`, which voids the record.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

const CC_HOST: &str = "creativecommons.org";

/// License kinds published under `/licenses/`
const LICENSE_KINDS: &[&str] = &[
    "by",
    "by-sa",
    "by-nd",
    "by-nc",
    "by-nc-sa",
    "by-nc-nd",
    "sampling+",
    "nc-sampling+",
];

static VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(\.\d+)?$").expect("valid version regex"));

/// Structured license for a stored record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseInfo {
    /// License kind, e.g. "by-nc" or "cc0"
    pub license: String,
    /// License version, e.g. "2.0"
    pub version: String,
    /// Canonical https URL with trailing slash
    pub url: String,
    /// URL exactly as received from the provider
    pub raw_url: String,
}

/// Resolve a license URL (and optional version hint) into a [`LicenseInfo`]
///
/// A version present in the URL path wins over `version_hint`. The hint is
/// only used for URLs that omit the version segment.
pub fn get_license_info(url: Option<&str>, version_hint: Option<&str>) -> Option<LicenseInfo> {
    let raw_url = url.map(str::trim).filter(|u| !u.is_empty())?;
    let hint = version_hint
        .map(str::trim)
        .filter(|v| VERSION_RE.is_match(v));

    let resolved = resolve_path(raw_url).and_then(|segments| license_from_segments(&segments, hint));

    match resolved {
        Some((license, version, path)) => Some(LicenseInfo {
            license,
            version,
            url: format!("https://{}/{}/", CC_HOST, path),
            raw_url: raw_url.to_string(),
        }),
        None => {
            debug!(url = raw_url, "Could not resolve license URL");
            None
        }
    }
}

/// Split a CC URL into its lowercase path segments, rejecting foreign hosts
fn resolve_path(raw_url: &str) -> Option<Vec<String>> {
    let lower = raw_url.to_ascii_lowercase();
    let rest = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
        .or_else(|| lower.strip_prefix("//"))?;

    let rest = rest.split(['?', '#']).next().unwrap_or_default();
    let (host, path) = rest.split_once('/').unwrap_or((rest, ""));
    let host = host.strip_prefix("www.").unwrap_or(host);
    if host != CC_HOST {
        return None;
    }

    Some(
        path.split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

/// Returns (license, version, canonical path without slashes at the ends)
fn license_from_segments(segments: &[String], hint: Option<&str>) -> Option<(String, String, String)> {
    match segments {
        [root, kind, rest @ ..] if root == "licenses" => {
            if !LICENSE_KINDS.contains(&kind.as_str()) {
                return None;
            }
            let (version, jurisdiction) = match rest {
                [v, tail @ ..] if VERSION_RE.is_match(v) => (v.clone(), tail.first()),
                _ => (hint?.to_string(), None),
            };
            let mut path = format!("licenses/{}/{}", kind, version);
            // Ported licenses keep their jurisdiction, e.g. /licenses/by/2.5/it/
            if let Some(j) = jurisdiction.filter(|j| j.chars().all(|c| c.is_ascii_alphabetic())) {
                path.push('/');
                path.push_str(j);
            }
            Some((kind.clone(), version, path))
        }
        [root, tool, rest @ ..] if root == "publicdomain" => {
            let license = match tool.as_str() {
                "zero" => "cc0",
                "mark" => "pdm",
                _ => return None,
            };
            let version = match rest {
                [v, ..] if VERSION_RE.is_match(v) => v.clone(),
                _ => hint.unwrap_or("1.0").to_string(),
            };
            let path = format!("publicdomain/{}/{}", tool, version);
            Some((license.to_string(), version, path))
        }
        _ => None,
    }
}
