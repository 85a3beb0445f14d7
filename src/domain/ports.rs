use crate::domain::basemap::Basemap;
use crate::domain::model::{Dataset, Filter, OutputFormat, RenderResult, SourceFiles};
use crate::domain::services::{BuildingPalette, CropColorTable};
use crate::utils::error::Result;
use async_trait::async_trait;

pub const DEFAULT_ZOOM_START: u8 = 17;
pub const DEFAULT_BUNDLE_FILENAME: &str = "garden_map.zip";

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn map_title(&self) -> &str;
    fn data_dir(&self) -> &str;
    fn sources(&self) -> &SourceFiles;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[OutputFormat];
    fn bundle_outputs(&self) -> bool;
    fn filter(&self) -> Filter;
    fn crop_colors(&self) -> CropColorTable;
    fn building_palette(&self) -> BuildingPalette;
    fn basemap(&self) -> Basemap;

    fn zoom_start(&self) -> u8 {
        DEFAULT_ZOOM_START
    }

    fn bundle_filename(&self) -> &str {
        DEFAULT_BUNDLE_FILENAME
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Dataset>;
    async fn transform(&self, data: Dataset) -> Result<RenderResult>;
    async fn load(&self, result: RenderResult) -> Result<String>;
}
