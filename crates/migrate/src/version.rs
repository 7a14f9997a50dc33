//! Version extraction from migration source identifiers.

use std::path::Path;

use crate::error::{MigrateError, MigrateResult};

/// Extract the numeric version prefix from a migration source identifier.
///
/// Identifiers follow the convention `<path>/<version>_<name>.<ext>`. Only
/// the basename is considered; everything before the first `_` must parse as
/// a base-10 integer strictly greater than zero. The prefix becomes the
/// migration's position in execution order, so callers should pick prefixes
/// that encode creation order (a timestamp, typically).
pub fn extract_version(source: &str) -> MigrateResult<i64> {
    let base = Path::new(source)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(source);

    let (prefix, _) = base
        .split_once('_')
        .ok_or_else(|| MigrateError::MalformedSource {
            file: source.to_string(),
        })?;

    let version: i64 = prefix.parse().map_err(|_| MigrateError::InvalidVersion {
        file: source.to_string(),
    })?;

    if version <= 0 {
        return Err(MigrateError::InvalidVersion {
            file: source.to_string(),
        });
    }

    Ok(version)
}
