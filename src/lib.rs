pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::yelp::{SearchParams, YelpClient};
pub use config::{cli::LocalStorage, RunConfig};
pub use core::{etl::EtlEngine, pipeline::RestaurantPipeline};
pub use utils::error::{EtlError, Result};
