pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub mod args;

#[cfg(feature = "cli")]
pub use args::CliConfig;

use crate::domain::model::SourceFiles;
use crate::utils::error::Result;
use crate::utils::validation;

/// 各種配置共用：圖層必須是 GeoJSON，種植紀錄必須是 CSV
pub(crate) fn validate_sources(sources: &SourceFiles) -> Result<()> {
    validation::validate_file_extensions("sources", &sources.layer_files(), &["geojson", "json"])?;
    validation::validate_file_extensions("sources.history", &[sources.history.as_str()], &["csv"])?;
    validation::validate_non_empty_string("sources.name_property", &sources.name_property)?;
    Ok(())
}
