use crate::error::{ProcessingError, Result};
use crate::models::{Padding, Variable};
use crate::utils::constants::{CHUNKS_PER_TIMESTAMP, DEFAULT_DATA_DIR, ENV_PREFIX, METADATA_FILE};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use validator::Validate;

/// Everything one pipeline run needs
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PipelineConfig {
    /// Directory holding the chunk files
    pub data_dir: PathBuf,

    /// Destination JSON; defaults to `<data_dir>/metadata.json`
    #[serde(default)]
    pub metadata_path: Option<PathBuf>,

    /// Processed in the given order
    #[validate(length(min = 1))]
    pub variables: Vec<Variable>,

    #[validate(range(min = 1))]
    pub chunks_per_timestamp: usize,

    #[serde(default)]
    pub padding: Padding,

    #[serde(default)]
    pub use_mmap: bool,

    /// Suppress progress output
    #[serde(default)]
    pub silent: bool,
}

/// Command-line values that take precedence over file and environment settings
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub metadata_path: Option<PathBuf>,
    pub variables: Option<Vec<Variable>>,
    pub chunks_per_timestamp: Option<usize>,
    pub padding: Option<Padding>,
    pub use_mmap: Option<bool>,
    pub silent: Option<bool>,
}

impl PipelineConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            metadata_path: None,
            variables: Variable::ALL.to_vec(),
            chunks_per_timestamp: CHUNKS_PER_TIMESTAMP,
            padding: Padding::Unpadded,
            use_mmap: false,
            silent: false,
        }
    }

    pub fn with_metadata_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.metadata_path = Some(path.into());
        self
    }

    pub fn with_variables(mut self, variables: Vec<Variable>) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_chunks_per_timestamp(mut self, chunks: usize) -> Self {
        self.chunks_per_timestamp = chunks;
        self
    }

    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Defaults, then `config_file`, then `OCEAN_EXTREMA_*` variables, then `overrides`
    pub fn load(config_file: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let default_variables: Vec<&str> = Variable::ALL.iter().map(|v| v.file_token()).collect();

        let mut builder = Config::builder()
            .set_default("data_dir", DEFAULT_DATA_DIR)?
            .set_default("variables", default_variables)?
            .set_default("chunks_per_timestamp", CHUNKS_PER_TIMESTAMP as i64)?
            .set_default("padding", "unpadded")?
            .set_default("use_mmap", false)?
            .set_default("silent", false)?;

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("variables"),
        );

        let variables = overrides
            .variables
            .as_ref()
            .map(|vs| vs.iter().map(|v| v.file_token()).collect::<Vec<_>>());
        let padding = overrides.padding.map(padding_name);

        builder = builder
            .set_override_option("data_dir", overrides.data_dir.as_deref().map(path_string))?
            .set_override_option(
                "metadata_path",
                overrides.metadata_path.as_deref().map(path_string),
            )?
            .set_override_option("variables", variables)?
            .set_override_option(
                "chunks_per_timestamp",
                overrides.chunks_per_timestamp.map(|c| c as i64),
            )?
            .set_override_option("padding", padding)?
            .set_override_option("use_mmap", overrides.use_mmap)?
            .set_override_option("silent", overrides.silent)?;

        let config: PipelineConfig = builder.build()?.try_deserialize()?;
        config.check()?;
        Ok(config)
    }

    /// Field validation plus duplicate-variable rejection
    pub fn check(&self) -> Result<()> {
        self.validate()?;

        let mut seen = HashSet::new();
        if let Some(dup) = self.variables.iter().find(|v| !seen.insert(**v)) {
            return Err(ProcessingError::Config(format!(
                "variable '{}' is listed more than once",
                dup
            )));
        }

        Ok(())
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.metadata_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join(METADATA_FILE))
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn padding_name(padding: Padding) -> &'static str {
    match padding {
        Padding::Unpadded => "unpadded",
        Padding::ZeroPadded => "zero-padded",
        Padding::Detect => "detect",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::load(None, &ConfigOverrides::default()).unwrap();
        assert_eq!(config.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
        assert_eq!(config.variables, Variable::ALL.to_vec());
        assert_eq!(config.chunks_per_timestamp, 90);
        assert_eq!(config.padding, Padding::Unpadded);
        assert_eq!(
            config.metadata_path(),
            PathBuf::from(DEFAULT_DATA_DIR).join("metadata.json")
        );
    }

    #[test]
    fn test_file_then_overrides() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("extrema.toml");
        fs::write(
            &file,
            "data_dir = \"/srv/llc\"\nvariables = [\"theta\", \"salt\"]\npadding = \"zero-padded\"\nchunks_per_timestamp = 12\n",
        )
        .unwrap();

        let config = PipelineConfig::load(Some(&file), &ConfigOverrides::default()).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/llc"));
        assert_eq!(config.variables, vec![Variable::Theta, Variable::Salt]);
        assert_eq!(config.padding, Padding::ZeroPadded);
        assert_eq!(config.chunks_per_timestamp, 12);

        let overrides = ConfigOverrides {
            metadata_path: Some(PathBuf::from("/tmp/out.json")),
            variables: Some(vec![Variable::VorticityUvw]),
            padding: Some(Padding::Detect),
            ..Default::default()
        };
        let config = PipelineConfig::load(Some(&file), &overrides).unwrap();
        assert_eq!(config.variables, vec![Variable::VorticityUvw]);
        assert_eq!(config.padding, Padding::Detect);
        assert_eq!(config.metadata_path(), PathBuf::from("/tmp/out.json"));
        assert_eq!(config.data_dir, PathBuf::from("/srv/llc"));
    }

    #[test]
    fn test_validation() {
        let config = PipelineConfig::new("data").with_variables(vec![]);
        assert!(matches!(config.check(), Err(ProcessingError::Validation(_))));

        let config = PipelineConfig::new("data").with_chunks_per_timestamp(0);
        assert!(config.check().is_err());

        let config = PipelineConfig::new("data").with_variables(vec![Variable::Salt, Variable::Salt]);
        assert!(matches!(config.check(), Err(ProcessingError::Config(_))));

        assert!(PipelineConfig::new("data").check().is_ok());
    }
}
