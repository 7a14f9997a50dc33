//! Scaffolding for new migration source files.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::{MigrateError, MigrateResult};

const VERSION_FORMAT: &str = "%Y%m%d%H%M%S";

/// Create a new migration source file in `dir`.
///
/// The version token is the current UTC time, so files scaffolded later
/// sort after earlier ones. The filename is `<version>_<snake_name>.rs` and
/// an existing file at that path is never overwritten. Returns the path of
/// the created file.
pub fn create_migration(name: &str, dir: impl AsRef<Path>) -> MigrateResult<PathBuf> {
    let version = Utc::now().format(VERSION_FORMAT).to_string();
    write_migration(dir.as_ref(), &version, name)
}

pub(crate) fn write_migration(dir: &Path, version: &str, name: &str) -> MigrateResult<PathBuf> {
    fs::create_dir_all(dir)?;

    let module = to_snake_case(name);
    let path = dir.join(format!("{version}_{module}.rs"));
    if path.exists() {
        return Err(MigrateError::FileAlreadyExists(path));
    }

    fs::write(&path, render_template(name, version, &module))?;
    Ok(path)
}

fn render_template(name: &str, version: &str, module: &str) -> String {
    format!(
        r#"//! Migration: {name}
//! Version: {version}

use sqlstep_migrate::{{ActionFuture, MigrateResult, MigrationRegistry}};
use sqlx::PgConnection;

pub fn register(registry: &mut MigrationRegistry) -> MigrateResult<()> {{
    registry.register("{version}_{module}.rs", up_{module}, down_{module})
}}

fn up_{module}(conn: &mut PgConnection) -> ActionFuture<'_> {{
    Box::pin(async move {{
        // Runs when the migration is applied.
        let _ = conn;
        Ok(())
    }})
}}

fn down_{module}(conn: &mut PgConnection) -> ActionFuture<'_> {{
    Box::pin(async move {{
        // Runs when the migration is rolled back.
        let _ = conn;
        Ok(())
    }})
}}
"#
    )
}

/// Case-fold a human-readable name into a module-safe snake_case token.
fn to_snake_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut prev_separator = true;
    for c in name.chars() {
        if c.is_whitespace() || c == '-' || c == '.' || c == '_' {
            if !prev_separator {
                result.push('_');
                prev_separator = true;
            }
            continue;
        }
        if c.is_uppercase() {
            if !prev_separator {
                result.push('_');
            }
            for lower in c.to_lowercase() {
                result.push(lower);
            }
        } else {
            result.push(c);
        }
        prev_separator = false;
    }
    result.trim_end_matches('_').to_string()
}
