//! Loading an [`AnalysisConfig`] from a TOML file.

use std::path::Path;

use arclog_types::AnalysisConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Read and parse a TOML config. Missing keys fall back to the built-in
/// encounter defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AnalysisConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    let config = toml::from_str(&raw)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config("/nonexistent/arclog.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
