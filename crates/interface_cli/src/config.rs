//! CLI configuration

use std::path::Path;

use domain_quoting::EngineConfig;
use serde::Deserialize;

/// CLI configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Log level
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Evaluation settings
    pub engine: EngineConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_json: false,
            engine: EngineConfig::default(),
        }
    }
}

impl CliConfig {
    /// Loads configuration from an optional file, then `UW_` environment variables
    ///
    /// Nested keys use a double underscore, e.g.
    /// `UW_ENGINE__LOOKUP_MODE=bilinear`.
    pub fn load(file: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder
            .add_source(
                config::Environment::with_prefix("UW")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_quoting::EngineConfig;
    use std::io::Write;

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"log_level": "debug", "engine": {{"default_variant": "simplified"}}}}"#).unwrap();

        let config = CliConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.log_level, "debug");
        assert!(!config.log_json);
        assert_eq!(config.engine.default_variant, "simplified");
        assert_eq!(config.engine.lookup_mode, EngineConfig::default().lookup_mode);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = CliConfig::load(Some(Path::new("/nonexistent/uw-quote.json")));
        assert!(result.is_err());
    }
}
