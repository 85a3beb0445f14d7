use crate::domain::model::Plot;
use crate::domain::services::styling::property_text;
use crate::utils::error::{MapError, Result};
use geojson::{Feature, GeoJson};
use std::collections::BTreeMap;

pub const PLOT_NAME_COLUMN: &str = "plot_name";

/// 解析圖層檔案；單一 Feature 視為只有一筆的集合，單純的 Geometry 不接受
pub fn parse_features(source_name: &str, bytes: &[u8]) -> Result<Vec<Feature>> {
    // from_reader 回傳的是 serde_json::Error
    match GeoJson::from_reader(bytes).map_err(geojson::Error::MalformedJson)? {
        GeoJson::FeatureCollection(collection) => Ok(collection.features),
        GeoJson::Feature(feature) => Ok(vec![feature]),
        GeoJson::Geometry(_) => Err(MapError::ProcessingError {
            message: format!(
                "{} contains a bare geometry; expected a FeatureCollection",
                source_name
            ),
        }),
    }
}

/// 就地改名圖徵屬性（`舊名 -> 新名`）
pub fn rename_properties(features: &mut [Feature], mapping: &BTreeMap<String, String>) {
    if mapping.is_empty() {
        return;
    }
    for properties in features.iter_mut().filter_map(|f| f.properties.as_mut()) {
        for (from, to) in mapping {
            if let Some(value) = properties.remove(from) {
                properties.insert(to.clone(), value);
            }
        }
    }
}

pub fn load_plots(
    source_name: &str,
    bytes: &[u8],
    columns: &BTreeMap<String, String>,
) -> Result<Vec<Plot>> {
    let mut features = parse_features(source_name, bytes)?;
    rename_properties(&mut features, columns);

    let plots: Vec<Plot> = features
        .into_iter()
        .map(|feature| {
            let name = property_text(&feature, PLOT_NAME_COLUMN).unwrap_or_default();
            let mut plot = Plot::new(&name, feature.geometry);
            plot.properties = feature.properties;
            plot
        })
        .collect();

    let unnamed = plots.iter().filter(|p| p.name.is_none()).count();
    if unnamed > 0 {
        tracing::warn!(
            "⚠️ {}: {} plot(s) have no '{}' and will never match a record",
            source_name,
            unnamed,
            PLOT_NAME_COLUMN
        );
    }

    Ok(plots)
}
