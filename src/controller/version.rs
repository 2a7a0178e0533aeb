//! Chart version resolution
//!
//! Version strings come from two untrusted places: the deployed target
//! revision and the chart registry. Anything that fails to parse is treated
//! as "no information" rather than an error.

use std::cmp::Ordering;

use semver::{Prerelease, Version};

use crate::gateway::{ChartCatalog, ChartEntry};

/// How the latest released version is picked from a chart's version list
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Trust the registry to list newest first and take the head
    #[default]
    RegistryOrder,
    /// Take the greatest version by semantic-version precedence
    HighestVersion,
}

impl std::str::FromStr for SelectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "registry-order" => Ok(SelectionPolicy::RegistryOrder),
            "highest-version" => Ok(SelectionPolicy::HighestVersion),
            other => Err(format!(
                "unknown selection policy '{other}', expected registry-order or highest-version"
            )),
        }
    }
}

/// Parse a version, tolerating a `v` prefix and `1` / `1.2` shorthand
pub fn parse_version(raw: &str) -> Option<Version> {
    let trimmed = raw.trim();
    let unprefixed = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);

    // Shorthand is only accepted without prerelease or build suffix
    if !unprefixed.contains(['-', '+']) {
        let parts = unprefixed.split('.').count();
        if parts == 1 || parts == 2 {
            let padded = format!("{}{}", unprefixed, ".0".repeat(3 - parts));
            return Version::parse(&padded).ok();
        }
    }

    Version::parse(unprefixed).ok()
}

/// Precedence ordering; build metadata does not participate
fn cmp_precedence(a: &Version, b: &Version) -> Ordering {
    (a.major, a.minor, a.patch, &a.pre).cmp(&(b.major, b.minor, b.patch, &b.pre))
}

/// True when the version string carries a prerelease component
pub fn is_prerelease(raw: &str) -> bool {
    parse_version(raw).is_some_and(|v| v.pre != Prerelease::EMPTY)
}

/// Released versions of a chart, in registry order
///
/// Only versions that parse with a prerelease component are removed.
/// Unparseable strings such as `2.0-rc1` are kept.
pub fn released_versions(entry: &ChartEntry) -> Vec<&str> {
    entry
        .versions
        .iter()
        .map(String::as_str)
        .filter(|v| !is_prerelease(v))
        .collect()
}

/// Latest released version of `chart` in `catalog`, if any
pub fn latest_released(
    catalog: &ChartCatalog,
    chart: &str,
    policy: SelectionPolicy,
) -> Option<String> {
    let entry = catalog.chart(chart)?;
    let released = released_versions(entry);

    let selected = match policy {
        SelectionPolicy::RegistryOrder => released.first().copied(),
        SelectionPolicy::HighestVersion => released
            .iter()
            .filter_map(|raw| parse_version(raw).map(|v| (v, *raw)))
            // max_by keeps the last maximum; reverse so the registry's first wins on ties
            .rev()
            .max_by(|(a, _), (b, _)| cmp_precedence(a, b))
            .map(|(_, raw)| raw)
            .or_else(|| released.first().copied()),
    };

    selected.map(str::to_string)
}

/// Whether `latest` is strictly newer than `deployed`
///
/// Returns `false` when `latest` is absent or either side is malformed.
pub fn is_update_available(deployed: &str, latest: Option<&str>) -> bool {
    let Some(latest) = latest else {
        return false;
    };
    match (parse_version(deployed), parse_version(latest)) {
        (Some(deployed), Some(latest)) => cmp_precedence(&latest, &deployed) == Ordering::Greater,
        _ => false,
    }
}
