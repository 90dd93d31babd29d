use crate::config::{FieldAllowList, DEFAULT_BASE_URL, DEFAULT_FILE_ID};
use crate::utils::error::{FetchError, Result};
use crate::utils::validation::{validate_non_empty_list, validate_non_empty_string, validate_url, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

/// Deployment settings loaded from a TOML file. Every key is optional and
/// falls back to the built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub fields: FieldsConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    pub file_id: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldsConfig {
    pub allowed: Option<Vec<String>>,
}

impl TomlConfig {
    /// Load from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(FetchError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parse TOML text after substituting `${VAR}` references.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content)
            .map_err(|e| FetchError::config("toml_parsing", format!("TOML parsing error: {}", e)))
    }

    // Unset variables are left as written.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// File identifier, or the built-in default.
    pub fn file_id(&self) -> &str {
        self.source.file_id.as_deref().unwrap_or(DEFAULT_FILE_ID)
    }

    /// Download host, or the built-in default.
    pub fn base_url(&self) -> &str {
        self.source.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// Allowed field names from `[fields]`, or the default list.
    pub fn allow_list(&self) -> FieldAllowList {
        match &self.fields.allowed {
            Some(allowed) => FieldAllowList::new(allowed.clone()),
            None => FieldAllowList::default(),
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("source.file_id", self.file_id())?;
        validate_url("source.base_url", self.base_url())?;
        if let Some(allowed) = &self.fields.allowed {
            validate_non_empty_list("fields.allowed", allowed)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[source]
file_id = "abc123"
base_url = "https://mirror.example.com"

[fields]
allowed = ["date", "clicks"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.file_id(), "abc123");
        assert_eq!(config.base_url(), "https://mirror.example.com");
        assert!(config.allow_list().contains("clicks"));
        assert!(!config.allow_list().contains("campaign"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config.file_id(), DEFAULT_FILE_ID);
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.allow_list(), FieldAllowList::default());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CSV_FETCH_TEST_FILE_ID", "from-env");

        let toml_content = r#"
[source]
file_id = "${CSV_FETCH_TEST_FILE_ID}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.file_id(), "from-env");

        std::env::remove_var("CSV_FETCH_TEST_FILE_ID");
    }

    #[test]
    fn test_unset_env_var_is_left_alone() {
        let toml_content = r#"
[source]
file_id = "${CSV_FETCH_TEST_UNSET_VARIABLE}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.file_id(), "${CSV_FETCH_TEST_UNSET_VARIABLE}");
    }

    #[test]
    fn test_config_validation() {
        let config = TomlConfig::from_toml_str("[source]\nbase_url = \"invalid-url\"\n").unwrap();
        assert!(config.validate().is_err());

        let config = TomlConfig::from_toml_str("[fields]\nallowed = []\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[source\nfile_id = 1").unwrap_err();
        assert!(matches!(err, FetchError::ConfigError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[source]\nfile_id = \"file-test\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.file_id(), "file-test");
    }
}
