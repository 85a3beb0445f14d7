use crate::config::validate_sources;
use crate::core::ConfigProvider;
use crate::domain::basemap::{Basemap, BasemapKind};
use crate::domain::model::{Constraint, Filter, OutputFormat, SourceFiles};
use crate::domain::services::{BuildingPalette, CropColorTable};
use crate::utils::error::{MapError, Result};
use crate::utils::validation::{self, Validate};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "garden-map")]
#[command(about = "Builds a styled planting map from GIS layers and a planting log")]
pub struct CliConfig {
    #[arg(long, default_value = ".", help = "Directory holding the layer files")]
    pub data_dir: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = "All", help = "Year to show, or All")]
    pub year: Constraint<i32>,

    #[arg(long, default_value = "All", help = "Season to show, or All")]
    pub season: Constraint<String>,

    #[arg(long, default_value = "All", help = "Rotation order to show, or All")]
    pub rotation: Constraint<u32>,

    #[arg(long, default_value = "OpenStreetMap")]
    pub basemap: BasemapKind,

    #[arg(long, value_delimiter = ',', default_value = "geojson,csv")]
    pub formats: Vec<OutputFormat>,

    #[arg(long, help = "Also pack every output into garden_map.zip")]
    pub bundle: bool,

    #[arg(long, default_value = "Garden Map")]
    pub title: String,

    #[arg(long, help = "Facility boundary layer file")]
    pub facility: Option<String>,

    #[arg(long, help = "Buildings layer file")]
    pub buildings: Option<String>,

    #[arg(long, help = "Planting plots layer file")]
    pub gardens: Option<String>,

    #[arg(long, help = "Planting records CSV file")]
    pub history: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[arg(skip)]
    pub sources: SourceFiles,
}

impl CliConfig {
    /// 解析命令列參數，並把檔案覆蓋設定併入 `sources`
    pub fn parse_args() -> Self {
        Self::parse().with_source_overrides()
    }

    pub fn with_source_overrides(mut self) -> Self {
        if let Some(facility) = self.facility.take() {
            self.sources.facility = facility;
        }
        if let Some(buildings) = self.buildings.take() {
            self.sources.buildings = buildings;
        }
        if let Some(gardens) = self.gardens.take() {
            self.sources.gardens = gardens;
        }
        if let Some(history) = self.history.take() {
            self.sources.history = history;
        }
        self
    }
}

impl ConfigProvider for CliConfig {
    fn map_title(&self) -> &str {
        &self.title
    }

    fn data_dir(&self) -> &str {
        &self.data_dir
    }

    fn sources(&self) -> &SourceFiles {
        &self.sources
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[OutputFormat] {
        &self.formats
    }

    fn bundle_outputs(&self) -> bool {
        self.bundle
    }

    fn filter(&self) -> Filter {
        Filter::new(
            self.year.clone(),
            self.season.clone(),
            self.rotation.clone(),
        )
    }

    fn crop_colors(&self) -> CropColorTable {
        CropColorTable::standard()
    }

    fn building_palette(&self) -> BuildingPalette {
        BuildingPalette::standard()
    }

    fn basemap(&self) -> Basemap {
        self.basemap.into()
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("data_dir", &self.data_dir)?;
        validation::validate_path("output_path", &self.output_path)?;
        validate_sources(&self.sources)?;
        validation::validate_non_empty_string("title", &self.title)?;

        if self.formats.is_empty() && !self.bundle {
            return Err(MapError::MissingConfigError {
                field: "formats".to_string(),
            });
        }
        Ok(())
    }
}
