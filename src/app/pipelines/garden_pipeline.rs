use crate::adapters::{geojson_layer, history_csv};
use crate::config::cli::LocalStorage;
use crate::core::{ConfigProvider, Dataset, Pipeline, RenderResult, Storage};
use crate::domain::model::{
    Constraint, Filter, FilterOptions, LayerEntry, MapManifest, OutputFormat, PlotStyleRow,
    RunSummary,
};
use crate::domain::services::styling::{self, LayerStyle};
use crate::domain::services::{Bounds, PlotResolver};
use crate::utils::error::{MapError, Result};
use geojson::FeatureCollection;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const FACILITY_LAYER_FILE: &str = "facility.geojson";
pub const BUILDINGS_LAYER_FILE: &str = "buildings.geojson";
pub const GARDENS_LAYER_FILE: &str = "gardens.geojson";
pub const MANIFEST_FILE: &str = "map.json";
pub const PLOT_STYLES_CSV: &str = "plot_styles.csv";
pub const PLOT_STYLES_JSON: &str = "plot_styles.json";

/// 從 `source` 讀取圖層，把上色後的地圖寫到 `sink`
pub struct GardenPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) source: S,
    pub(crate) sink: S,
    pub(crate) config: C,
}

impl<S: Storage, C: ConfigProvider> GardenPipeline<S, C> {
    pub fn new(source: S, sink: S, config: C) -> Self {
        Self {
            source,
            sink,
            config,
        }
    }

    async fn read_source(&self, file: &str) -> Result<Vec<u8>> {
        self.source.read_file(file).await.map_err(|e| {
            tracing::error!("❌ Cannot read {} from {}: {}", file, self.config.data_dir(), e);
            e
        })
    }
}

impl<C: ConfigProvider> GardenPipeline<LocalStorage, C> {
    /// 本機資料目錄讀入，本機輸出目錄寫出
    pub fn local(config: C) -> Self {
        let source = LocalStorage::new(config.data_dir());
        let sink = LocalStorage::new(config.output_path());
        Self::new(source, sink, config)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for GardenPipeline<S, C> {
    async fn extract(&self) -> Result<Dataset> {
        let sources = self.config.sources();

        let facility_bytes = self.read_source(&sources.facility).await?;
        let facility = geojson_layer::parse_features(&sources.facility, &facility_bytes)?;

        let building_bytes = self.read_source(&sources.buildings).await?;
        let buildings = geojson_layer::parse_features(&sources.buildings, &building_bytes)?;

        let garden_bytes = self.read_source(&sources.gardens).await?;
        let plots =
            geojson_layer::load_plots(&sources.gardens, &garden_bytes, &sources.garden_columns)?;

        let history_bytes = self.read_source(&sources.history).await?;
        let history =
            history_csv::parse_history(&sources.history, &history_bytes, &sources.history_columns)?;

        if history.skipped_rows > 0 {
            tracing::warn!(
                "⚠️ Skipped {} malformed row(s) in {}",
                history.skipped_rows,
                sources.history
            );
        }

        Ok(Dataset {
            facility,
            buildings,
            plots,
            history: history.records,
            skipped_history_rows: history.skipped_rows,
        })
    }

    async fn transform(&self, data: Dataset) -> Result<RenderResult> {
        let filter = self.config.filter();
        let options = FilterOptions::from_history(&data.history);
        warn_on_unknown_selection(&filter, &options);
        tracing::debug!("Active filter: {}", filter);

        let resolver = PlotResolver::new(self.config.crop_colors());
        let resolved = resolver.resolve_all(&data.plots, &data.history, &filter);

        let mut garden_features = Vec::with_capacity(resolved.len());
        let mut plot_styles = Vec::with_capacity(resolved.len());
        for (plot, result) in &resolved {
            let record = result.record.as_ref();
            tracing::debug!("{} -> {} ({})", plot.display_name(), result.color, result.label);

            plot_styles.push(PlotStyleRow {
                plot_name: plot.display_name().to_string(),
                color: result.color.clone(),
                fill_opacity: LayerStyle::garden(result).fill_opacity,
                crop_type: record.map(|r| r.crop_type.clone()),
                year: record.map(|r| r.year),
                season: record.map(|r| r.season.clone()),
                rotation_order: record.map(|r| r.rotation_order),
                label: result.label.clone(),
            });
            garden_features.push(styling::style_garden(plot, result));
        }

        let name_property = self.config.sources().name_property.as_str();
        let facility_features: Vec<_> = data
            .facility
            .iter()
            .map(|feature| styling::style_facility(feature, name_property))
            .collect();

        let palette = self.config.building_palette();
        let building_features: Vec<_> = data
            .buildings
            .iter()
            .map(|feature| styling::style_building(feature, name_property, &palette))
            .collect();

        // 以設施邊界定位地圖；沒有邊界時退回所有圖層的範圍
        let bounds = Bounds::of_features(&data.facility).or_else(|| {
            let others = [
                Bounds::of_features(&data.buildings),
                Bounds::of_geometries(data.plots.iter().filter_map(|p| p.geometry.as_ref())),
            ];
            others.into_iter().flatten().reduce(Bounds::union)
        });
        if bounds.is_none() {
            tracing::warn!("⚠️ No coordinates found in any layer; map center is unset");
        }

        let matched_plots = resolved.iter().filter(|(_, r)| r.is_matched()).count();
        let summary = RunSummary {
            plots: resolved.len(),
            matched_plots,
            unmatched_plots: resolved.len() - matched_plots,
            history_records: data.history.len(),
            filtered_records: data.history.iter().filter(|r| filter.matches(r)).count(),
            skipped_history_rows: data.skipped_history_rows,
        };

        let manifest = MapManifest {
            title: self.config.map_title().to_string(),
            generated_at: chrono::Utc::now(),
            basemap: self.config.basemap(),
            center: bounds.map(|b| b.center()),
            bounds: bounds.map(|b| b.corners()),
            zoom_start: self.config.zoom_start(),
            layers: vec![
                layer_entry("Facility Boundary", FACILITY_LAYER_FILE),
                layer_entry("Buildings", BUILDINGS_LAYER_FILE),
                layer_entry("Gardens", GARDENS_LAYER_FILE),
            ],
            filter,
            options,
            summary,
        };

        Ok(RenderResult {
            facility: collection(facility_features),
            buildings: collection(building_features),
            gardens: collection(garden_features),
            manifest,
            plot_styles,
        })
    }

    async fn load(&self, result: RenderResult) -> Result<String> {
        let files = render_files(&result, self.config.output_formats())?;

        for (name, data) in &files {
            tracing::debug!("Writing {} ({} bytes)", name, data.len());
            self.sink.write_file(name, data).await?;
        }

        if !self.config.bundle_outputs() {
            return Ok(self.config.output_path().to_string());
        }

        let bundle_name = self.config.bundle_filename();
        let bundle = build_bundle(&result, &files)?;
        tracing::debug!("Writing ZIP bundle {} ({} bytes)", bundle_name, bundle.len());
        self.sink.write_file(bundle_name, &bundle).await?;

        Ok(format!("{}/{}", self.config.output_path(), bundle_name))
    }
}

fn collection(features: Vec<geojson::Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn layer_entry(name: &str, file: &str) -> LayerEntry {
    LayerEntry {
        name: name.to_string(),
        file: file.to_string(),
        show: true,
    }
}

fn warn_on_unknown_selection(filter: &Filter, options: &FilterOptions) {
    if let Constraint::Only(year) = filter.year() {
        if !options.years.contains(year) {
            tracing::warn!("⚠️ No planting records for year {}", year);
        }
    }
    if let Constraint::Only(season) = filter.season() {
        if !options.seasons.contains(season) {
            tracing::warn!("⚠️ No planting records for season '{}'", season);
        }
    }
    if let Constraint::Only(rotation) = filter.rotation_order() {
        if !options.rotation_orders.contains(rotation) {
            tracing::warn!("⚠️ No planting records for rotation order {}", rotation);
        }
    }
}

/// 把每種輸出格式序列化成 `(檔名, 內容)`
fn render_files(result: &RenderResult, formats: &[OutputFormat]) -> Result<Vec<(String, Vec<u8>)>> {
    let mut files = Vec::new();

    if formats.contains(&OutputFormat::GeoJson) {
        files.push((FACILITY_LAYER_FILE.to_string(), serde_json::to_vec(&result.facility)?));
        files.push((BUILDINGS_LAYER_FILE.to_string(), serde_json::to_vec(&result.buildings)?));
        files.push((GARDENS_LAYER_FILE.to_string(), serde_json::to_vec(&result.gardens)?));
        files.push((MANIFEST_FILE.to_string(), serde_json::to_vec_pretty(&result.manifest)?));
    }

    if formats.contains(&OutputFormat::Csv) {
        files.push((PLOT_STYLES_CSV.to_string(), plot_styles_csv(&result.plot_styles)?));
    }

    if formats.contains(&OutputFormat::Json) {
        files.push((
            PLOT_STYLES_JSON.to_string(),
            serde_json::to_vec_pretty(&result.plot_styles)?,
        ));
    }

    Ok(files)
}

fn plot_styles_csv(rows: &[PlotStyleRow]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| MapError::IoError(e.into_error()))
}

fn build_bundle(result: &RenderResult, files: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    for (name, data) in files {
        zip.start_file::<_, ()>(name.as_str(), FileOptions::default())?;
        zip.write_all(data)?;
    }

    // 壓縮檔一定包含 manifest
    if !files.iter().any(|(name, _)| name == MANIFEST_FILE) {
        zip.start_file::<_, ()>(MANIFEST_FILE, FileOptions::default())?;
        zip.write_all(&serde_json::to_vec_pretty(&result.manifest)?)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
