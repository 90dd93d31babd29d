use crate::core::dataset::{parse_csv, project};
use crate::domain::model::{Dataset, Record, ResultEnvelope};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{FetchError, Result};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

/// Downloads a publicly shared CSV, checks it has the requested columns and
/// renders those columns as a JSON envelope.
pub struct FileProcessingService<C: ConfigProvider> {
    config: C,
    client: Client,
}

impl<C: ConfigProvider> FileProcessingService<C> {
    pub fn new(config: C) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// `<base_url>/uc?id=<file_id>`; the identifier is not checked here.
    pub fn fetch_url(&self) -> String {
        format!(
            "{}/uc?id={}",
            self.config.base_url().trim_end_matches('/'),
            self.config.file_id()
        )
    }

    /// Single GET of the fetch URL, returning the whole body as text.
    /// Every failure is logged once before it is returned.
    pub async fn download(&self) -> Result<String> {
        let url = self.fetch_url();
        tracing::debug!("Downloading CSV from: {}", url);

        match self.request(&url).await {
            Ok(text) => {
                tracing::debug!("Downloaded {} bytes", text.len());
                Ok(text)
            }
            Err(e) => {
                tracing::error!("{}", e);
                Err(e)
            }
        }
    }

    async fn request(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        tracing::debug!("Response status: {}", response.status());

        if response.status() == StatusCode::NOT_FOUND {
            return Err(FetchError::download(response.status().as_u16().to_string()));
        }

        let text = response.error_for_status()?.text().await?;
        Ok(text)
    }

    /// Fails with the requested fields the dataset lacks, in request order.
    pub fn validate(&self, dataset: &Dataset) -> Result<()> {
        let missing: Vec<String> = self
            .config
            .fields()
            .iter()
            .filter(|field| !dataset.has_column(field))
            .cloned()
            .collect();

        if !missing.is_empty() {
            return Err(FetchError::ValidationError { missing });
        }

        tracing::info!("The CSV contains all the specified fields.");
        Ok(())
    }

    /// Parse, validate and project an already downloaded document.
    pub fn parse_document(&self, text: &str) -> Result<Vec<Record>> {
        let dataset = parse_csv(text)?;
        self.validate(&dataset)?;
        Ok(project(&dataset, self.config.fields()))
    }

    /// Download, parse, validate and project.
    pub async fn fetch_data(&self) -> Result<Vec<Record>> {
        let text = self.download().await?;
        self.parse_document(&text)
    }

    /// Runs the whole pipeline. Download, read and validation failures become
    /// an `{"error": ...}` document; any other failure is returned as `Err`.
    pub async fn process(&self) -> Result<String> {
        let envelope = match self.fetch_data().await {
            Ok(records) => {
                tracing::info!("Projected {} records", records.len());
                ResultEnvelope::Data(records)
            }
            Err(e) if e.is_domain() => {
                tracing::warn!(kind = e.kind(), "Returning error envelope: {}", e);
                ResultEnvelope::Error(e.to_string())
            }
            Err(e) => return Err(e),
        };
        render(&envelope)
    }
}

pub fn render(envelope: &ResultEnvelope) -> Result<String> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    envelope.serialize(&mut serializer)?;
    String::from_utf8(buf)
        .map_err(|e| FetchError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}
