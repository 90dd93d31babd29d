use crate::config::toml_config::TomlConfig;
use crate::config::{FieldAllowList, ServiceConfig};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "csv-fetch")]
#[command(about = "Get data from a CSV file hosted on Google Drive")]
pub struct CliConfig {
    /// Comma-separated fields to keep (e.g. date,campaign,clicks)
    #[arg(long)]
    pub fields: String,

    /// Identifier of the shared file
    #[arg(long)]
    pub file_id: Option<String>,

    /// Host serving the `/uc?id=` download endpoint
    #[arg(long)]
    pub base_url: Option<String>,

    /// Override the allow-list of field names
    #[arg(long, value_delimiter = ',')]
    pub allowed_fields: Option<Vec<String>>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

/// Everything except `--fields`, merged from file and flags.
#[derive(Debug, Clone)]
pub struct ResolvedSettings {
    pub file_id: String,
    pub base_url: String,
    pub allow_list: FieldAllowList,
}

impl ResolvedSettings {
    pub fn service_config(&self, fields: Vec<String>) -> ServiceConfig {
        ServiceConfig::new(self.file_id.clone(), fields).with_base_url(self.base_url.clone())
    }
}

impl CliConfig {
    /// Flags win over the config file, which wins over built-in defaults.
    pub fn resolve_settings(&self) -> Result<ResolvedSettings> {
        let file_config = match &self.config {
            Some(path) => {
                tracing::debug!("Loading configuration from: {}", path);
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };
        file_config.validate()?;

        let allow_list = match &self.allowed_fields {
            Some(allowed) => FieldAllowList::new(allowed.clone()),
            None => file_config.allow_list(),
        };
        allow_list.validate()?;

        Ok(ResolvedSettings {
            file_id: self
                .file_id
                .clone()
                .unwrap_or_else(|| file_config.file_id().to_string()),
            base_url: self
                .base_url
                .clone()
                .unwrap_or_else(|| file_config.base_url().to_string()),
            allow_list,
        })
    }

    /// Allow-list known without reading any file: `--allowed-fields`, or the
    /// defaults when no `--config` is given.
    pub fn flag_allow_list(&self) -> Option<FieldAllowList> {
        match (&self.allowed_fields, &self.config) {
            (Some(allowed), _) => Some(FieldAllowList::new(allowed.clone())),
            (None, None) => Some(FieldAllowList::default()),
            (None, Some(_)) => None,
        }
    }

    /// Rejects bad `--fields` tokens before the config file is loaded,
    /// whenever the allow-list does not depend on that file.
    pub fn precheck_fields(&self) -> Result<()> {
        match self.flag_allow_list() {
            Some(allow_list) => allow_list.parse_fields(&self.fields).map(|_| ()),
            None => Ok(()),
        }
    }

    pub fn parse_fields(&self, settings: &ResolvedSettings) -> Result<Vec<String>> {
        settings.allow_list.parse_fields(&self.fields)
    }
}
