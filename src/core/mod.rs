pub mod dataset;
pub mod service;

pub use crate::domain::model::{CellValue, Dataset, Record, ResultEnvelope};
pub use crate::domain::ports::ConfigProvider;
pub use crate::utils::error::Result;
