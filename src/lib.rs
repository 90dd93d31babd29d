pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use config::{FieldAllowList, ServiceConfig};
pub use core::service::FileProcessingService;
pub use domain::model::{CellValue, Dataset, Record, ResultEnvelope};
pub use utils::error::{FetchError, Result};
