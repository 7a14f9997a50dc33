//! Compiled-in migration set.
//!
//! Each migration lives in its own `<version>_<name>.rs` file (scaffolded
//! by `sqlstep create`) and exposes a `register` hook. New files are wired
//! in here: add a `#[path]` module declaration and a `register` call below.

use sqlstep_migrate::{MigrateResult, MigrationRegistry};

#[path = "20250301120000_create_examples.rs"]
mod create_examples;

/// Build the registry from the compiled-in migration set.
pub fn registry() -> MigrateResult<MigrationRegistry> {
    let mut registry = MigrationRegistry::new();
    create_examples::register(&mut registry)?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiled_in_set_registers_cleanly() {
        let registry = registry().unwrap();
        assert!(!registry.is_empty());

        let ordered = registry.ordered().unwrap();
        let versions: Vec<i64> = ordered.iter().map(|m| m.version()).collect();
        let mut sorted = versions.clone();
        sorted.sort_unstable();
        assert_eq!(versions, sorted);
    }
}
