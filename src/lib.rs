pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::pipelines::garden_pipeline::GardenPipeline;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use core::engine::MapEngine;
pub use domain::model::{Constraint, Filter, HistoryRecord, Plot, StyleResult};
pub use domain::services::{CropColorTable, PlotResolver};
pub use utils::error::{MapError, Result};
