//! Command implementations.

pub mod import;
pub mod mappings;
pub mod show;

pub use self::import::execute_import;
pub use self::mappings::execute_mappings;
pub use self::show::execute_show;

use crate::config::Config;
use crate::error::Result;
use lodestar_mapping::ConfigRegistry;
use std::fs;
use std::path::Path;
use tracing::info;

/// Built-in extraction configs with the configured overrides applied.
pub fn load_registry(config: &Config, overrides: Option<&Path>) -> Result<ConfigRegistry> {
    let mut registry = ConfigRegistry::builtin()?;
    if let Some(path) = overrides.or(config.mappings.as_deref()) {
        let text = fs::read_to_string(path)?;
        let count = registry.load_overrides(&text)?;
        info!("Applied {} mapping overrides from {}", count, path.display());
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lodestar_domain::EntityKind;
    use lodestar_graph::Source;

    #[test]
    fn test_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mappings.toml");
        fs::write(
            &path,
            r#"
            [[config]]
            target = "work"
            source = "gnd"
            filters = [["a gndo:Work"]]

            [[config.attribute]]
            field = "name"
            from = ["gndo:variantNameForTheWork"]
            "#,
        )
        .unwrap();

        let registry = load_registry(&Config::default(), Some(&path)).unwrap();
        let work = registry.entity(EntityKind::Work, Source::Gnd).unwrap();
        assert_eq!(work.attributes.len(), 1);
        assert_eq!(registry.len(), ConfigRegistry::builtin().unwrap().len());
    }

    #[test]
    fn test_missing_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_registry(&Config::default(), Some(&dir.path().join("absent.toml")));
        assert!(result.is_err());
    }
}
