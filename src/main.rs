use clap::Parser;
use restaurant_etl::config::prompt::PromptSource;
use restaurant_etl::config::toml_config::TomlConfig;
use restaurant_etl::config::{api_key_from_env, RunConfig};
use restaurant_etl::core::ParameterSource;
use restaurant_etl::utils::error::ErrorSeverity;
use restaurant_etl::utils::{logger, validation::Validate};
use restaurant_etl::{CliConfig, EtlEngine, EtlError, LocalStorage, RestaurantPipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let mut cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);
    tracing::info!("Starting restaurant-etl");

    // The pipeline, and with it the HTTP session, is gone before any exit below.
    let outcome = run(&mut cli).await;

    match outcome {
        Ok(output_path) => {
            tracing::info!("✅ Export completed successfully!");
            println!("✅ Export completed successfully!");
            println!("📁 Output saved to: {}", output_path);
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "❌ Export failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low | ErrorSeverity::High => 1,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }
}

async fn run(cli: &mut CliConfig) -> Result<String, EtlError> {
    let (config, file_api_key) = collect_parameters(cli)?;
    config.validate()?;
    tracing::debug!("Run config: {:?}", config);

    let api_key = match file_api_key {
        Some(key) => key,
        None => api_key_from_env()?,
    };

    let storage = LocalStorage::current_dir();
    let pipeline = RestaurantPipeline::new(storage, config, &api_key)?;
    let engine = EtlEngine::new(pipeline);

    let result = engine.run().await;
    engine.into_pipeline().close();
    result
}

/// Config file, or flags and defaults, then the console unless told otherwise.
fn collect_parameters(cli: &mut CliConfig) -> Result<(RunConfig, Option<String>), EtlError> {
    match cli.config.clone() {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            let mut file = TomlConfig::from_file(&path)?;
            let mut config = file.collect()?;
            cli.apply_overrides(&mut config);
            Ok((config, file.api_key().map(str::to_string)))
        }
        None => {
            let defaults = cli.collect()?;
            if !cli.should_prompt() {
                return Ok((defaults, None));
            }
            let config = PromptSource::stdio(defaults).collect()?;
            Ok((config, None))
        }
    }
}
