//! Configuration for flatstore
//!
//! Centralized configuration with sensible defaults. The engine consumes a
//! resolved [`Config`] value; loading one from a file is the front end's job.

use std::path::{Path, PathBuf};

use crate::error::{FlatError, Result};

/// Default line delimiter: ASCII record separator (U+001E).
///
/// serde_json escapes every control character inside strings, so this byte
/// can never occur in an encoded payload.
pub const DEFAULT_DELIMITER: &str = "\u{1E}";

/// Main configuration for a flatstore instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all partitions.
    /// Internal structure:
    ///   {db_path}/
    ///     ├── Widget/records.db
    ///     └── Order/records.db
    pub db_path: PathBuf,

    /// String written after every encoded record, before the newline.
    /// Must never occur inside an encoded payload; the codec enforces this.
    pub delimiter: String,

    // -------------------------------------------------------------------------
    // Behavior Flags
    // -------------------------------------------------------------------------
    /// Accept records carrying no fields beyond the engine-managed ones
    pub allow_blank: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./flatstore_data"),
            delimiter: DEFAULT_DELIMITER.to_string(),
            allow_blank: true,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject configurations the engine cannot operate with
    pub fn validate(&self) -> Result<()> {
        if self.delimiter.is_empty() {
            return Err(FlatError::Config("delimiter must not be empty".to_string()));
        }
        if self.delimiter.contains('\n') {
            return Err(FlatError::Config(
                "delimiter must not contain a newline".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the base directory holding one partition per type
    pub fn db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.db_path = path.into();
        self
    }

    /// Set the record delimiter
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.config.delimiter = delimiter.into();
        self
    }

    /// Allow or reject records with no caller fields
    pub fn allow_blank(mut self, allow: bool) -> Self {
        self.config.allow_blank = allow;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

/// Resolve a raw `db_path` value from a configuration source.
///
/// - absolute paths are used as-is
/// - paths starting with `.` resolve relative to `caller_dir`
/// - anything else resolves relative to the running executable's directory
/// - an empty value falls back to `{caller_dir}/db`
pub fn resolve_db_path(raw: &str, caller_dir: &Path) -> PathBuf {
    if raw.is_empty() {
        return caller_dir.join("db");
    }
    if Path::new(raw).is_absolute() {
        return PathBuf::from(raw);
    }
    if let Some(rest) = raw.strip_prefix("./") {
        return caller_dir.join(rest);
    }
    if raw.starts_with('.') {
        return caller_dir.join(raw);
    }
    match std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        Some(exe_dir) => exe_dir.join(raw),
        None => caller_dir.join(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_empty_delimiter_rejected() {
        let config = Config::builder().delimiter("").build();
        assert!(matches!(config.validate(), Err(FlatError::Config(_))));
    }

    #[test]
    fn test_newline_delimiter_rejected() {
        let config = Config::builder().delimiter("|\n").build();
        assert!(matches!(config.validate(), Err(FlatError::Config(_))));
    }

    #[test]
    fn test_resolve_absolute_path() {
        let resolved = resolve_db_path("/var/data/db", Path::new("/caller"));
        assert_eq!(resolved, PathBuf::from("/var/data/db"));
    }

    #[test]
    fn test_resolve_relative_to_caller() {
        let resolved = resolve_db_path("./db", Path::new("/caller"));
        assert_eq!(resolved, PathBuf::from("/caller/db"));
    }

    #[test]
    fn test_resolve_empty_falls_back() {
        let resolved = resolve_db_path("", Path::new("/caller"));
        assert_eq!(resolved, PathBuf::from("/caller/db"));
    }
}
