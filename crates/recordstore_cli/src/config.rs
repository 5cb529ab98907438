//! Host configuration file.
//!
//! ```toml
//! database = "/var/lib/recordstore/records.db"
//!
//! [logging]
//! level = "info"
//! dir = "/var/log/recordstore"
//!
//! [procedures]
//! update = "usp_UpdateRecord"
//! ```

use anyhow::{Context, Result};
use recordstore_core::{LoggingConfig, ProcedureNames};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_DATABASE: &str = "recordstore.db";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub database: PathBuf,
    /// File logging is off when this section is absent.
    pub logging: Option<LoggingConfig>,
    pub procedures: ProcedureNames,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            logging: None,
            procedures: ProcedureNames::default(),
        }
    }
}

impl CliConfig {
    /// Reads `path`, or returns defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::CliConfig;
    use recordstore_core::ProcedureNames;
    use std::path::PathBuf;

    #[test]
    fn empty_file_yields_defaults() {
        assert_eq!(CliConfig::parse("").unwrap(), CliConfig::default());
    }

    #[test]
    fn sections_override_defaults() {
        let config = CliConfig::parse(
            r#"
database = "/srv/records.db"

[logging]
dir = "/var/log/recordstore"

[procedures]
update = "usp_UpdateRecord"
"#,
        )
        .unwrap();

        assert_eq!(config.database, PathBuf::from("/srv/records.db"));
        let logging = config.logging.unwrap();
        assert_eq!(logging.dir, PathBuf::from("/var/log/recordstore"));
        assert_eq!(logging.level, recordstore_core::default_log_level());
        assert_eq!(config.procedures.update, "usp_UpdateRecord");
        assert_eq!(config.procedures.create, ProcedureNames::default().create);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CliConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
