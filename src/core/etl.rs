use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Extract, transform, load. Nothing is written unless the first two succeed.
    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting restaurant export");

        tracing::info!("Fetching restaurants...");
        let businesses = self.pipeline.extract().await?;
        tracing::info!("Fetched {} businesses", businesses.len());

        tracing::info!("Transforming data...");
        let result = self.pipeline.transform(businesses).await?;
        tracing::info!(
            "Kept {} of {} rows ({} duplicates dropped)",
            result.rows.len(),
            result.fetched,
            result.duplicates_removed
        );

        tracing::info!("Writing CSV...");
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("Output saved to: {}", output_path);

        Ok(output_path)
    }

    pub fn into_pipeline(self) -> P {
        self.pipeline
    }
}
