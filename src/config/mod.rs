#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::{FetchError, Result};
use crate::utils::validation::{
    validate_non_empty_list, validate_non_empty_string, validate_url, Validate,
};

pub const DEFAULT_FILE_ID: &str = "1zLdEcpzCp357s3Rse112Lch9EMUWzMLE";
pub const DEFAULT_BASE_URL: &str = "https://drive.google.com";
pub const DEFAULT_ALLOWED_FIELDS: &[&str] =
    &["date", "campaign", "clicks", "spend", "medium", "source"];

/// The set of column names a caller may ask for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAllowList {
    fields: Vec<String>,
}

impl FieldAllowList {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|allowed| allowed == field)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.fields
    }

    /// Splits a comma-separated `--fields` value. Tokens are trimmed and
    /// repeated names keep only their first occurrence.
    pub fn parse_fields(&self, raw: &str) -> Result<Vec<String>> {
        let mut fields: Vec<String> = Vec::new();
        for token in raw.split(',').map(str::trim) {
            if !self.contains(token) {
                return Err(FetchError::config(
                    "fields",
                    format!(
                        "'{}' is not a valid field. Allowed fields are: {}",
                        token,
                        self.as_slice().join(", ")
                    ),
                ));
            }
            if !fields.iter().any(|f| f == token) {
                fields.push(token.to_string());
            }
        }
        Ok(fields)
    }
}

impl Default for FieldAllowList {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_FIELDS.iter().map(|f| f.to_string()).collect())
    }
}

impl Validate for FieldAllowList {
    fn validate(&self) -> Result<()> {
        validate_non_empty_list("allowed_fields", &self.fields)
    }
}

/// Settings for one pipeline run. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    file_id: String,
    fields: Vec<String>,
    base_url: String,
}

impl ServiceConfig {
    pub fn new(file_id: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            file_id: file_id.into(),
            fields,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl ConfigProvider for ServiceConfig {
    fn file_id(&self) -> &str {
        &self.file_id
    }

    fn fields(&self) -> &[String] {
        &self.fields
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("file_id", &self.file_id)?;
        validate_url("base_url", &self.base_url)?;
        validate_non_empty_list("fields", &self.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fields_keeps_order() {
        let allow = FieldAllowList::default();
        assert_eq!(
            allow.parse_fields("clicks,date").unwrap(),
            vec!["clicks", "date"]
        );
    }

    #[test]
    fn test_parse_fields_trims_and_dedupes() {
        let allow = FieldAllowList::default();
        assert_eq!(
            allow.parse_fields("date, campaign,date").unwrap(),
            vec!["date", "campaign"]
        );
    }

    #[test]
    fn test_parse_fields_rejects_unknown_token() {
        let allow = FieldAllowList::new(vec![
            "date".to_string(),
            "campaign".to_string(),
            "clicks".to_string(),
        ]);
        let err = allow.parse_fields("date,dat").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error in 'fields': 'dat' is not a valid field. Allowed fields are: date, campaign, clicks"
        );
    }

    #[test]
    fn test_parse_fields_rejects_empty_token() {
        let allow = FieldAllowList::default();
        assert!(allow.parse_fields("date,,clicks").is_err());
        assert!(allow.parse_fields("").is_err());
    }

    #[test]
    fn test_service_config_validation() {
        let config = ServiceConfig::new("abc", vec!["date".to_string()]);
        assert!(config.validate().is_ok());
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);

        let bad_url = config.clone().with_base_url("not a url");
        assert!(bad_url.validate().is_err());

        let no_fields = ServiceConfig::new("abc", vec![]);
        assert!(no_fields.validate().is_err());

        let no_id = ServiceConfig::new(" ", vec!["date".to_string()]);
        assert!(no_id.validate().is_err());
    }
}
