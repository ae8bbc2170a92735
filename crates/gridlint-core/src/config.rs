//! Analysis configuration, read from TOML.
//!
//! ```toml
//! merge_tolerance = 1
//! parallel = true
//! skip_string_literals = false
//! ```
//!
//! Every key is optional. Without `--config`, the file is looked up in the
//! user config directory (`gridlint/config.toml`) and defaults apply when it
//! is absent.

use directories::ProjectDirs;
use gridlint_engine::engine::{DEFAULT_TOLERANCE, ExtractOptions};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{GridlintError, Result};

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Adjacency tolerance used when coalescing rectangles.
    pub merge_tolerance: u32,
    /// Fingerprint formulas and coalesce clusters on the rayon pool.
    pub parallel: bool,
    /// Ignore references that only appear inside string literals.
    pub skip_string_literals: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            merge_tolerance: DEFAULT_TOLERANCE,
            parallel: true,
            skip_string_literals: false,
        }
    }
}

impl AnalysisConfig {
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            skip_string_literals: self.skip_string_literals,
        }
    }

    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|err| GridlintError::Config {
            path: origin.display().to_string(),
            message: err.to_string(),
        })
    }

    /// Load the configuration.
    ///
    /// An explicitly named file must exist. The default user file is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::read(path);
        }
        match user_config_path() {
            Some(path) if path.exists() => Self::read(&path),
            _ => Ok(Self::default()),
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let size = std::fs::metadata(path)?.len();
        if size > MAX_CONFIG_FILE_BYTES {
            return Err(GridlintError::TooLarge {
                path: path.display().to_string(),
                size,
                max: MAX_CONFIG_FILE_BYTES,
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content, path)?;
        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }
}

pub fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "gridlint")?;
    Some(proj.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = AnalysisConfig::from_toml_str("", Path::new("config.toml")).unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.merge_tolerance, 1);
    }

    #[test]
    fn test_partial_file_overrides_keys() {
        let config = AnalysisConfig::from_toml_str(
            "merge_tolerance = 2\nskip_string_literals = true\n",
            Path::new("config.toml"),
        )
        .unwrap();
        assert_eq!(
            config,
            AnalysisConfig {
                merge_tolerance: 2,
                parallel: true,
                skip_string_literals: true,
            }
        );
        assert!(config.extract_options().skip_string_literals);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = AnalysisConfig::from_toml_str("tolerance = 2", Path::new("config.toml"))
            .unwrap_err();
        assert!(matches!(err, GridlintError::Config { .. }));
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            AnalysisConfig::load(Some(missing.as_path())),
            Err(GridlintError::Io(_))
        ));

        let present = dir.path().join("gridlint.toml");
        std::fs::write(&present, "parallel = false\n").unwrap();
        let config = AnalysisConfig::load(Some(present.as_path())).unwrap();
        assert!(!config.parallel);
    }
}
