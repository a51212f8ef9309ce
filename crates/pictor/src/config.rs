//! Layered configuration for the gallery.
//!
//! Sources, lowest precedence first:
//! - Bundled defaults (include_str! from pictor.toml)
//! - `~/.config/pictor/pictor.toml`
//! - `./pictor.toml`
//! - `PICTOR__<SECTION>__<KEY>` environment variables

use crate::LoggingConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use pictor_cache::DerivativeCacheConfig;
use pictor_error::{ConfigError, PictorError, PictorResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../../../pictor.toml");
const ENV_PREFIX: &str = "PICTOR";
const ENV_SEPARATOR: &str = "__";

/// Where stored images and metadata records live.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory holding `{id}.webp` images
    pub image_dir: PathBuf,
    /// Directory holding `{id}.json` metadata records
    pub metadata_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from("images"),
            metadata_dir: PathBuf::from("metadata"),
        }
    }
}

/// Listing defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GalleryConfig {
    /// Records per page when the caller does not ask for a size
    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

fn default_per_page() -> usize {
    12
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
        }
    }
}

/// Top-level Pictor configuration.
///
/// # Example
///
/// ```no_run
/// use pictor::PictorConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = PictorConfig::load()?;
/// println!("images in {}", config.storage.image_dir.display());
/// println!("exports expire after {}s", config.derivatives.max_age_secs());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct PictorConfig {
    /// Content store locations
    #[serde(default)]
    pub storage: StorageConfig,

    /// Derivative cache settings
    #[serde(default)]
    pub derivatives: DerivativeCacheConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Listing defaults
    #[serde(default)]
    pub gallery: GalleryConfig,
}

impl PictorConfig {
    /// Load configuration from every layer.
    #[instrument]
    pub fn load() -> PictorResult<Self> {
        debug!("Loading configuration with precedence: env > current dir > home dir > bundled defaults");

        let home_config = dirs::home_dir().map(|home| home.join(".config/pictor/pictor.toml"));
        Self::load_layers(home_config.as_deref(), Path::new("pictor.toml"), None)
    }

    /// Load the bundled defaults overlaid with a single file.
    ///
    /// The file must exist. Keys it omits keep their bundled values.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> PictorResult<Self> {
        let builder = Self::defaults().add_source(File::from(path.as_ref()).required(true));
        Self::finish(builder)
    }

    /// Shared layering used by [`load`](Self::load).
    ///
    /// `env` replaces the process environment when given.
    pub(crate) fn load_layers(
        home_config: Option<&Path>,
        local_config: &Path,
        env: Option<HashMap<String, String>>,
    ) -> PictorResult<Self> {
        let mut builder = Self::defaults();

        if let Some(home_config) = home_config {
            builder = builder.add_source(File::from(home_config).required(false));
        }
        builder = builder.add_source(File::from(local_config).required(false));

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .try_parsing(true)
                .source(env),
        );

        Self::finish(builder)
    }

    fn defaults() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> PictorResult<Self> {
        builder
            .build()
            .map_err(|e| {
                PictorError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                PictorError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn no_files(dir: &TempDir) -> PictorResult<PictorConfig> {
        PictorConfig::load_layers(None, &dir.path().join("absent.toml"), Some(HashMap::new()))
    }

    #[test]
    fn bundled_defaults() {
        let dir = TempDir::new().unwrap();
        let config = no_files(&dir).unwrap();

        assert_eq!(config.storage.image_dir, PathBuf::from("images"));
        assert_eq!(config.storage.metadata_dir, PathBuf::from("metadata"));
        assert_eq!(*config.derivatives.max_age_secs(), 7200);
        assert_eq!(*config.derivatives.sweep_interval_secs(), 3600);
        assert_eq!(*config.derivatives.default_quality(), 90);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
        assert_eq!(config.gallery.per_page, 12);
    }

    #[test]
    fn local_file_overrides_home_file() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home.toml");
        let local = dir.path().join("local.toml");
        std::fs::write(&home, "[gallery]\nper_page = 20\n[logging]\njson = true\n").unwrap();
        std::fs::write(&local, "[gallery]\nper_page = 30\n").unwrap();

        let config =
            PictorConfig::load_layers(Some(&home), &local, Some(HashMap::new())).unwrap();

        assert_eq!(config.gallery.per_page, 30);
        assert!(config.logging.json);
        assert_eq!(*config.derivatives.max_age_secs(), 7200);
    }

    #[test]
    fn environment_overrides_files() {
        let dir = TempDir::new().unwrap();
        let local = dir.path().join("local.toml");
        std::fs::write(&local, "[derivatives]\nmax_age_secs = 60\n").unwrap();

        let env = HashMap::from([
            ("PICTOR__DERIVATIVES__MAX_AGE_SECS".to_string(), "5".to_string()),
            ("PICTOR__STORAGE__IMAGE_DIR".to_string(), "/srv/pictor/images".to_string()),
            ("UNRELATED".to_string(), "ignored".to_string()),
        ]);
        let config = PictorConfig::load_layers(None, &local, Some(env)).unwrap();

        assert_eq!(*config.derivatives.max_age_secs(), 5);
        assert_eq!(config.storage.image_dir, PathBuf::from("/srv/pictor/images"));
    }

    #[test]
    fn from_file_requires_the_file() {
        let dir = TempDir::new().unwrap();
        let err = PictorConfig::from_file(dir.path().join("missing.toml")).unwrap_err();
        assert!(err.to_string().contains("configuration"));
    }

    #[test]
    fn malformed_values_are_config_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[gallery]\nper_page = \"lots\"\n").unwrap();

        let err = PictorConfig::from_file(&path).unwrap_err();
        assert!(matches!(err.kind(), pictor_error::PictorErrorKind::Config(_)));
    }
}
