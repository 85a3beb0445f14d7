use crate::core::ConfigProvider;
use crate::domain::basemap::{Basemap, BasemapKind};
use crate::domain::model::{Constraint, Filter, OutputFormat, SourceFiles};
use crate::domain::ports::{DEFAULT_BUNDLE_FILENAME, DEFAULT_ZOOM_START};
use crate::domain::services::resolver::DEFAULT_CROP_COLOR;
use crate::domain::services::{BuildingPalette, CropColorTable};
use crate::utils::error::{MapError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub map: MapConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub style: StyleConfig,
    #[serde(default)]
    pub basemap: BasemapConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    pub title: String,
    pub description: Option<String>,
    pub zoom_start: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(flatten)]
    pub files: SourceFiles,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            files: SourceFiles::default(),
        }
    }
}

fn default_data_dir() -> String {
    ".".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub year: Constraint<i32>,
    #[serde(default)]
    pub season: Constraint<String>,
    #[serde(default)]
    pub rotation_order: Constraint<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StyleConfig {
    pub default_color: Option<String>,
    pub crop_colors: Option<BTreeMap<String, String>>,
    pub default_building_color: Option<String>,
    pub building_colors: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BasemapConfig {
    /// 內建底圖名稱，或自訂底圖的顯示名稱
    pub name: Option<String>,
    /// 自訂圖磚 URL 模板，設定後取代內建底圖
    pub tiles: Option<String>,
    pub attribution: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    #[serde(default = "default_output_formats")]
    pub output_formats: Vec<OutputFormat>,
    pub compression: Option<CompressionConfig>,
}

fn default_output_formats() -> Vec<OutputFormat> {
    vec![OutputFormat::GeoJson, OutputFormat::Csv]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub json_logs: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(MapError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| MapError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GARDEN_DATA_DIR})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| MapError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("map.title", &self.map.title)?;
        if let Some(zoom) = self.map.zoom_start {
            validation::validate_range("map.zoom_start", zoom, 1, 22)?;
        }

        validation::validate_path("sources.data_dir", &self.sources.data_dir)?;
        crate::config::validate_sources(&self.sources.files)?;
        validation::validate_path("load.output_path", &self.load.output_path)?;

        if let Some(color) = &self.style.default_color {
            validation::validate_non_empty_string("style.default_color", color)?;
        }
        if let Some(color) = &self.style.default_building_color {
            validation::validate_non_empty_string("style.default_building_color", color)?;
        }
        for (crop, color) in self.style.crop_colors.iter().flatten() {
            validation::validate_non_empty_string(&format!("style.crop_colors.{}", crop), color)?;
        }

        match &self.basemap.tiles {
            Some(tiles) => validation::validate_tile_template("basemap.tiles", tiles)?,
            None => {
                if let Some(name) = &self.basemap.name {
                    name.parse::<BasemapKind>().map_err(|reason| {
                        MapError::InvalidConfigValueError {
                            field: "basemap.name".to_string(),
                            value: name.clone(),
                            reason,
                        }
                    })?;
                }
            }
        }

        if self.load.output_formats.is_empty() && !self.bundle_outputs() {
            return Err(MapError::MissingConfigError {
                field: "load.output_formats".to_string(),
            });
        }
        if let Some(filename) = self.load.compression.as_ref().and_then(|c| c.filename.as_deref()) {
            validation::validate_file_extensions("load.compression.filename", &[filename], &["zip"])?;
        }

        Ok(())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn map_title(&self) -> &str {
        &self.map.title
    }

    fn data_dir(&self) -> &str {
        &self.sources.data_dir
    }

    fn sources(&self) -> &SourceFiles {
        &self.sources.files
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_formats(&self) -> &[OutputFormat] {
        &self.load.output_formats
    }

    fn bundle_outputs(&self) -> bool {
        self.load
            .compression
            .as_ref()
            .map(|c| c.enabled)
            .unwrap_or(false)
    }

    fn filter(&self) -> Filter {
        Filter::new(
            self.filter.year.clone(),
            self.filter.season.clone(),
            self.filter.rotation_order.clone(),
        )
    }

    fn crop_colors(&self) -> CropColorTable {
        let default_color = self
            .style
            .default_color
            .as_deref()
            .unwrap_or(DEFAULT_CROP_COLOR);

        match &self.style.crop_colors {
            // 自訂色表會整個取代內建色表
            Some(colors) => colors
                .iter()
                .fold(CropColorTable::new(default_color), |table, (crop, color)| {
                    table.with_crop(crop.as_str(), color.as_str())
                }),
            None => CropColorTable::standard().with_default_color(default_color),
        }
    }

    fn building_palette(&self) -> BuildingPalette {
        let palette = match &self.style.building_colors {
            Some(colors) => colors
                .iter()
                .fold(BuildingPalette::new("red"), |palette, (name, color)| {
                    palette.with_building(name.as_str(), color.as_str())
                }),
            None => BuildingPalette::standard(),
        };

        match &self.style.default_building_color {
            Some(color) => palette.with_default_color(color.as_str()),
            None => palette,
        }
    }

    fn basemap(&self) -> Basemap {
        if let Some(tiles) = &self.basemap.tiles {
            return Basemap {
                name: self
                    .basemap
                    .name
                    .clone()
                    .unwrap_or_else(|| "Custom".to_string()),
                tiles: tiles.clone(),
                attribution: self.basemap.attribution.clone().unwrap_or_default(),
            };
        }

        self.basemap
            .name
            .as_deref()
            .and_then(|name| name.parse::<BasemapKind>().ok())
            .unwrap_or_default()
            .into()
    }

    fn zoom_start(&self) -> u8 {
        self.map.zoom_start.unwrap_or(DEFAULT_ZOOM_START)
    }

    fn bundle_filename(&self) -> &str {
        self.load
            .compression
            .as_ref()
            .and_then(|c| c.filename.as_deref())
            .unwrap_or(DEFAULT_BUNDLE_FILENAME)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
[map]
title = "Farm Plots"

[load]
output_path = "./map-output"
"#;

    #[test]
    fn test_parse_minimal_config_uses_defaults() {
        let config = TomlConfig::from_toml_str(MINIMAL).unwrap();

        assert_eq!(config.map_title(), "Farm Plots");
        assert_eq!(config.data_dir(), ".");
        assert_eq!(config.sources(), &SourceFiles::default());
        assert_eq!(config.filter(), Filter::all());
        assert_eq!(config.crop_colors(), CropColorTable::standard());
        assert_eq!(config.basemap(), Basemap::default());
        assert_eq!(config.zoom_start(), DEFAULT_ZOOM_START);
        assert_eq!(
            config.output_formats(),
            &[OutputFormat::GeoJson, OutputFormat::Csv]
        );
        assert!(!config.bundle_outputs());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r##"
[map]
title = "Farm Plots"
zoom_start = 18

[sources]
data_dir = "./data"
gardens = "plots.geojson"

[sources.history_columns]
Plot = "plot_name"
rotation = "rotation_order"

[filter]
year = 2023
season = "Spring"

[style]
default_color = "#999999"
default_building_color = "blue"

[style.crop_colors]
Maize = "#ffd700"

[basemap]
name = "Google Satellite"

[load]
output_path = "./map-output"
output_formats = ["geojson", "json"]

[load.compression]
enabled = true
filename = "season.zip"
"##;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());

        assert_eq!(config.data_dir(), "./data");
        assert_eq!(config.sources().gardens, "plots.geojson");
        assert_eq!(config.sources().buildings, "buildings.geojson");
        assert_eq!(config.sources().history_columns.get("Plot").unwrap(), "plot_name");
        assert_eq!(
            config.filter(),
            Filter::all().with_year(2023).with_season("spring")
        );

        let colors = config.crop_colors();
        assert_eq!(colors.get("Maize"), "#ffd700");
        assert_eq!(colors.get("Wheat"), "#999999");
        assert_eq!(config.building_palette().get("Assembly"), "lightblue");
        assert_eq!(config.building_palette().get("Garage"), "blue");

        assert_eq!(config.basemap().name, "Google Satellite");
        assert_eq!(config.zoom_start(), 18);
        assert!(config.bundle_outputs());
        assert_eq!(config.bundle_filename(), "season.zip");
    }

    #[test]
    fn test_custom_tile_layer() {
        let toml_content = format!(
            "{}\n[basemap]\nname = \"Esri\"\ntiles = \"https://server.arcgisonline.com/tiles/{{z}}/{{y}}/{{x}}\"\nattribution = \"Esri\"\n",
            MINIMAL
        );
        let config = TomlConfig::from_toml_str(&toml_content).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.basemap().name, "Esri");

        let broken = format!("{}\n[basemap]\ntiles = \"https://example.com/tiles\"\n", MINIMAL);
        let config = TomlConfig::from_toml_str(&broken).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_basemap_fails_validation() {
        let toml_content = format!("{}\n[basemap]\nname = \"Bing Aerial\"\n", MINIMAL);
        let config = TomlConfig::from_toml_str(&toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(MapError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_invalid_filter_value_is_parse_error() {
        let toml_content = format!("{}\n[filter]\nyear = \"last year\"\n", MINIMAL);
        assert!(matches!(
            TomlConfig::from_toml_str(&toml_content),
            Err(MapError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("GARDEN_MAP_TEST_DATA_DIR", "/srv/gis");

        let toml_content = r#"
[map]
title = "Env"

[sources]
data_dir = "${GARDEN_MAP_TEST_DATA_DIR}"

[load]
output_path = "${GARDEN_MAP_TEST_UNSET_OUTPUT}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.data_dir(), "/srv/gis");
        assert_eq!(config.output_path(), "${GARDEN_MAP_TEST_UNSET_OUTPUT}");

        std::env::remove_var("GARDEN_MAP_TEST_DATA_DIR");
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.map.title, "Farm Plots");
    }
}
