//! Naming of version files and the well-known paths in the backing repo.

use chrono::{DateTime, Utc};

/// Where the latest pointer lives.
pub const LATEST_PATH: &str = "data/latest.json";

/// Directory holding one file per saved version.
pub const VERSIONS_PREFIX: &str = "data/versions/";

/// Bootstrap document expected to exist before the first save.
pub const INITIAL_VERSION_PATH: &str = "data/versions/state_initial.json";

const STEM_PREFIX: &str = "state_";
const EXTENSION: &str = ".json";

/// `data/versions/state_YYYYMMDD_HHMMSS.json` for the given instant.
///
/// Second granularity: two saves within the same second map to the same path.
pub fn for_timestamp(at: DateTime<Utc>) -> String {
    format!(
        "{VERSIONS_PREFIX}{STEM_PREFIX}{}{EXTENSION}",
        at.format("%Y%m%d_%H%M%S")
    )
}

/// Whether `path` names a version file (including the bootstrap document).
pub fn is_version_path(path: &str) -> bool {
    path.strip_prefix(VERSIONS_PREFIX)
        .and_then(|name| name.strip_suffix(EXTENSION))
        .and_then(|stem| stem.strip_prefix(STEM_PREFIX))
        .is_some_and(|stamp| !stamp.is_empty() && !stamp.contains('/'))
}

/// Sort version paths newest first.
///
/// Timestamped names sort chronologically, so plain descending order is
/// reverse-chronological.
pub fn sort_descending(paths: &mut [String]) {
    paths.sort_unstable_by(|a, b| b.cmp(a));
}
