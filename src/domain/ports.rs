use crate::config::RunConfig;
use crate::domain::model::{Business, TransformResult, WriteMode};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    /// Returns `Ok(None)` when the file does not exist yet.
    fn read_file(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = Result<Option<Vec<u8>>>> + Send;
    /// Replaces the file contents in one step; a failed write leaves the old file intact.
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn location(&self) -> &str;
    fn extra_categories(&self) -> &[String];
    fn limit(&self) -> u32;
    fn output_path(&self) -> &str;
    fn write_mode(&self) -> WriteMode;
    fn api_endpoint(&self) -> &str;
    fn timeout(&self) -> Option<Duration>;
}

/// Where the run's parameters come from: a console, flags, or a file.
pub trait ParameterSource {
    fn collect(&mut self) -> Result<RunConfig>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Business>>;
    async fn transform(&self, data: Vec<Business>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
