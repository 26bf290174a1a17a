pub mod etl;
pub mod pipeline;
pub mod transform;

pub use crate::domain::model::{Business, OutputRow, TransformResult, WriteMode};
pub use crate::domain::ports::{ConfigProvider, ParameterSource, Pipeline, Storage};
pub use crate::utils::error::Result;
