use crate::domain::model::{Plot, StyleResult};
use geojson::{Feature, Geometry, JsonObject, JsonValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MATCHED_FILL_OPACITY: f64 = 0.7;
pub const UNMATCHED_FILL_OPACITY: f64 = 0.5;

/// 寫進每個圖徵的 Leaflet 樣式參數
#[derive(Debug, Clone, PartialEq)]
pub struct LayerStyle {
    pub fill_color: Option<String>,
    pub color: String,
    pub weight: f64,
    pub fill_opacity: f64,
}

impl LayerStyle {
    pub fn facility() -> Self {
        Self {
            fill_color: None,
            color: "black".to_string(),
            weight: 2.0,
            fill_opacity: 0.0,
        }
    }

    pub fn building(fill_color: &str) -> Self {
        Self {
            fill_color: Some(fill_color.to_string()),
            color: "black".to_string(),
            weight: 1.0,
            fill_opacity: 0.6,
        }
    }

    pub fn garden(result: &StyleResult) -> Self {
        Self {
            fill_color: Some(result.color.clone()),
            color: "darkgreen".to_string(),
            weight: 1.0,
            fill_opacity: if result.is_matched() {
                MATCHED_FILL_OPACITY
            } else {
                UNMATCHED_FILL_OPACITY
            },
        }
    }
}

/// 建築名稱對應填色，名稱需完全相符
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingPalette {
    colors: BTreeMap<String, String>,
    default_color: String,
}

impl BuildingPalette {
    pub fn new(default_color: impl Into<String>) -> Self {
        Self {
            colors: BTreeMap::new(),
            default_color: default_color.into(),
        }
    }

    pub fn standard() -> Self {
        Self::new("red")
            .with_building("Assembly", "lightblue")
            .with_building("Painting", "lightgreen")
    }

    pub fn with_building(mut self, name: impl Into<String>, color: impl Into<String>) -> Self {
        self.colors.insert(name.into(), color.into());
        self
    }

    pub fn with_default_color(mut self, color: impl Into<String>) -> Self {
        self.default_color = color.into();
        self
    }

    pub fn get(&self, name: &str) -> &str {
        self.colors
            .get(name)
            .map(String::as_str)
            .unwrap_or(&self.default_color)
    }
}

impl Default for BuildingPalette {
    fn default() -> Self {
        Self::standard()
    }
}

/// 讀取字串屬性；數字會轉成文字
pub fn property_text(feature: &Feature, key: &str) -> Option<String> {
    match feature.property(key)? {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn styled_feature(
    geometry: Option<Geometry>,
    name: &str,
    style: &LayerStyle,
    tooltip: String,
) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("name".to_string(), JsonValue::from(name));
    if let Some(fill) = &style.fill_color {
        properties.insert("fillColor".to_string(), JsonValue::from(fill.as_str()));
    }
    properties.insert("color".to_string(), JsonValue::from(style.color.as_str()));
    properties.insert("weight".to_string(), JsonValue::from(style.weight));
    properties.insert("fillOpacity".to_string(), JsonValue::from(style.fill_opacity));
    properties.insert("tooltip".to_string(), JsonValue::from(tooltip));

    Feature {
        bbox: None,
        geometry,
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

pub fn style_facility(feature: &Feature, name_property: &str) -> Feature {
    let name = property_text(feature, name_property);
    let tooltip = match &name {
        Some(name) => format!("<b>Facility:</b> {}", name),
        None => "<b>Facility Boundary</b>".to_string(),
    };
    styled_feature(
        feature.geometry.clone(),
        name.as_deref().unwrap_or("Facility Boundary"),
        &LayerStyle::facility(),
        tooltip,
    )
}

pub fn style_building(feature: &Feature, name_property: &str, palette: &BuildingPalette) -> Feature {
    let name = property_text(feature, name_property).unwrap_or_default();
    let style = LayerStyle::building(palette.get(&name));
    styled_feature(
        feature.geometry.clone(),
        &name,
        &style,
        format!("<b>{}</b>", name),
    )
}

pub fn style_garden(plot: &Plot, result: &StyleResult) -> Feature {
    let name = plot.display_name();
    let tooltip = match &result.record {
        Some(record) => format!(
            "<b>Plot:</b> {}<br><b>Crop:</b> {}<br><b>Year:</b> {}<br><b>Season:</b> {}<br><b>Rotation:</b> {}",
            name, record.crop_type, record.year, record.season, record.rotation_order
        ),
        None => format!("Plot: {}<br>No crop record for selection", name),
    };

    let mut feature = styled_feature(plot.geometry.clone(), name, &LayerStyle::garden(result), tooltip);
    if let (Some(styled), Some(record)) = (feature.properties.as_mut(), &result.record) {
        styled.insert("crop_type".to_string(), JsonValue::from(record.crop_type.as_str()));
        styled.insert("label".to_string(), JsonValue::from(result.label.as_str()));
    }
    // 保留地塊原有（已改名）的屬性，同名時以樣式欄位為準
    if let (Some(styled), Some(source)) = (feature.properties.as_mut(), &plot.properties) {
        for (key, value) in source {
            styled.entry(key.clone()).or_insert_with(|| value.clone());
        }
    }
    feature
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::HistoryRecord;
    use crate::domain::services::resolver::NO_RECORD_LABEL;

    fn named_feature(name: &str) -> Feature {
        let mut properties = JsonObject::new();
        properties.insert("Name".to_string(), JsonValue::from(name));
        Feature {
            bbox: None,
            geometry: None,
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }

    #[test]
    fn test_building_colors() {
        let palette = BuildingPalette::standard();
        let assembly = style_building(&named_feature("Assembly"), "Name", &palette);
        let store = style_building(&named_feature("Store"), "Name", &palette);

        assert_eq!(assembly.property("fillColor").unwrap(), "lightblue");
        assert_eq!(store.property("fillColor").unwrap(), "red");
        assert_eq!(store.property("tooltip").unwrap(), "<b>Store</b>");
        assert_eq!(store.property("fillOpacity").unwrap(), 0.6);
    }

    #[test]
    fn test_facility_has_no_fill() {
        let facility = style_facility(&named_feature("Main Site"), "Name");
        assert!(facility.property("fillColor").is_none());
        assert_eq!(facility.property("fillOpacity").unwrap(), 0.0);
        assert_eq!(facility.property("tooltip").unwrap(), "<b>Facility:</b> Main Site");
    }

    #[test]
    fn test_garden_keeps_renamed_properties() {
        let mut plot = Plot::new("Plot-A", None);
        let mut properties = JsonObject::new();
        properties.insert("plot_name".to_string(), JsonValue::from("Plot-A"));
        properties.insert("rotation_order".to_string(), JsonValue::from(2));
        properties.insert("fillColor".to_string(), JsonValue::from("purple"));
        plot.properties = Some(properties);

        let unmatched = StyleResult {
            color: "grey".to_string(),
            label: NO_RECORD_LABEL.to_string(),
            record: None,
        };
        let feature = style_garden(&plot, &unmatched);

        assert_eq!(feature.property("rotation_order").unwrap(), 2);
        assert_eq!(feature.property("plot_name").unwrap(), "Plot-A");
        assert_eq!(feature.property("fillColor").unwrap(), "grey");
        assert_eq!(feature.property("name").unwrap(), "plot-a");
    }

    #[test]
    fn test_garden_tooltips() {
        let plot = Plot::new("Plot-A", None);
        let record = HistoryRecord::new("plot-a", 2023, "spring", 1, "Maize");
        let matched = StyleResult {
            color: "yellow".to_string(),
            label: "Crop: Maize".to_string(),
            record: Some(record),
        };
        let feature = style_garden(&plot, &matched);
        let tooltip = feature.property("tooltip").unwrap().as_str().unwrap();
        assert!(tooltip.starts_with("<b>Plot:</b> plot-a"));
        assert!(tooltip.contains("<b>Crop:</b> Maize"));
        assert_eq!(feature.property("fillOpacity").unwrap(), MATCHED_FILL_OPACITY);

        let unmatched = StyleResult {
            color: "grey".to_string(),
            label: NO_RECORD_LABEL.to_string(),
            record: None,
        };
        let feature = style_garden(&plot, &unmatched);
        assert_eq!(
            feature.property("tooltip").unwrap(),
            "Plot: plot-a<br>No crop record for selection"
        );
        assert_eq!(feature.property("fillOpacity").unwrap(), UNMATCHED_FILL_OPACITY);
        assert!(feature.property("crop_type").is_none());
    }
}
