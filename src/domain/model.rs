use crate::domain::basemap::Basemap;
use chrono::{DateTime, Utc};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// 下拉選單中代表「不限」的選項
pub const ALL: &str = "All";

/// 去除前後空白並轉小寫，地塊名稱與季節都以此比對
pub fn normalize_text(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// 已正規化的地塊名稱，不會是空字串
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlotName(String);

impl PlotName {
    pub fn normalize(raw: &str) -> Option<Self> {
        let normalized = normalize_text(raw);
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 種植地塊，幾何資料原樣保留
#[derive(Debug, Clone)]
pub struct Plot {
    pub name: Option<PlotName>,
    pub geometry: Option<Geometry>,
    pub properties: Option<JsonObject>,
}

impl Plot {
    pub fn new(name: &str, geometry: Option<Geometry>) -> Self {
        Self {
            name: PlotName::normalize(name),
            geometry,
            properties: None,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_ref().map(PlotName::as_str).unwrap_or("unnamed")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub plot_name: Option<PlotName>,
    pub year: i32,
    pub season: String,
    pub rotation_order: u32,
    pub crop_type: String,
}

impl HistoryRecord {
    /// 建立紀錄並正規化地塊名稱與季節
    pub fn new(plot_name: &str, year: i32, season: &str, rotation_order: u32, crop_type: &str) -> Self {
        Self {
            plot_name: PlotName::normalize(plot_name),
            year,
            season: normalize_text(season),
            rotation_order,
            crop_type: crop_type.trim().to_string(),
        }
    }

    pub fn belongs_to(&self, plot: &Plot) -> bool {
        match (&self.plot_name, &plot.name) {
            (Some(record_name), Some(plot_name)) => record_name == plot_name,
            _ => false,
        }
    }
}

/// 單一篩選條件：`All` 或某個確定的值
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Constraint<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Constraint<T> {
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Constraint::All => true,
            Constraint::Only(expected) => expected == value,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Constraint<U> {
        match self {
            Constraint::All => Constraint::All,
            Constraint::Only(value) => Constraint::Only(f(value)),
        }
    }
}

impl<T> From<Option<T>> for Constraint<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Constraint::Only(v),
            None => Constraint::All,
        }
    }
}

impl<T: FromStr> FromStr for Constraint<T>
where
    T::Err: fmt::Display,
{
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case(ALL) {
            return Ok(Constraint::All);
        }
        trimmed
            .parse::<T>()
            .map(Constraint::Only)
            .map_err(|e| format!("'{}' is neither 'All' nor a valid value: {}", trimmed, e))
    }
}

impl<T: fmt::Display> fmt::Display for Constraint<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::All => f.write_str(ALL),
            Constraint::Only(value) => value.fmt(f),
        }
    }
}

impl<T: Serialize> Serialize for Constraint<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Constraint::All => serializer.serialize_str(ALL),
            Constraint::Only(value) => value.serialize(serializer),
        }
    }
}

impl<'de, T> Deserialize<'de> for Constraint<T>
where
    T: Deserialize<'de> + FromStr,
    T::Err: fmt::Display,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        // 字串先走 FromStr（處理 "All" 與 "2023"），其餘型別直接反序列化成 T
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw<T> {
            Text(String),
            Value(T),
        }

        match Raw::<T>::deserialize(deserializer)? {
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
            Raw::Value(value) => Ok(Constraint::Only(value)),
        }
    }
}

/// 目前的年份／季節／輪作篩選，所有條件必須同時成立
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Filter {
    year: Constraint<i32>,
    season: Constraint<String>,
    rotation_order: Constraint<u32>,
}

impl Filter {
    pub fn new(
        year: Constraint<i32>,
        season: Constraint<String>,
        rotation_order: Constraint<u32>,
    ) -> Self {
        Self {
            year,
            season: season.map(|s| normalize_text(&s)),
            rotation_order,
        }
    }

    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Constraint::Only(year);
        self
    }

    pub fn with_season(mut self, season: &str) -> Self {
        self.season = Constraint::Only(normalize_text(season));
        self
    }

    pub fn with_rotation_order(mut self, rotation_order: u32) -> Self {
        self.rotation_order = Constraint::Only(rotation_order);
        self
    }

    pub fn year(&self) -> &Constraint<i32> {
        &self.year
    }

    pub fn season(&self) -> &Constraint<String> {
        &self.season
    }

    pub fn rotation_order(&self) -> &Constraint<u32> {
        &self.rotation_order
    }

    pub fn matches(&self, record: &HistoryRecord) -> bool {
        self.year.admits(&record.year)
            && self.season.admits(&record.season)
            && self.rotation_order.admits(&record.rotation_order)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "year={}, season={}, rotation={}",
            self.year, self.season, self.rotation_order
        )
    }
}

/// 某地塊在某篩選下的顏色與提示標籤
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleResult {
    pub color: String,
    pub label: String,
    pub record: Option<HistoryRecord>,
}

impl StyleResult {
    pub fn is_matched(&self) -> bool {
        self.record.is_some()
    }
}

/// 年份／季節／輪作下拉選單的選項
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterOptions {
    pub years: Vec<i32>,
    pub seasons: Vec<String>,
    pub rotation_orders: Vec<u32>,
}

impl FilterOptions {
    pub fn from_history(history: &[HistoryRecord]) -> Self {
        let years: BTreeSet<i32> = history.iter().map(|r| r.year).collect();
        let seasons: BTreeSet<&str> = history.iter().map(|r| r.season.as_str()).collect();
        let rotation_orders: BTreeSet<u32> = history.iter().map(|r| r.rotation_order).collect();

        Self {
            years: years.into_iter().collect(),
            seasons: seasons.into_iter().map(str::to_string).collect(),
            rotation_orders: rotation_orders.into_iter().collect(),
        }
    }

    pub fn year_choices(&self) -> Vec<String> {
        with_all(self.years.iter())
    }

    pub fn season_choices(&self) -> Vec<String> {
        with_all(self.seasons.iter())
    }

    pub fn rotation_choices(&self) -> Vec<String> {
        with_all(self.rotation_orders.iter())
    }
}

fn with_all<T: fmt::Display>(values: impl Iterator<Item = T>) -> Vec<String> {
    std::iter::once(ALL.to_string())
        .chain(values.map(|v| v.to_string()))
        .collect()
}

/// Extract 階段的輸出
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub facility: Vec<Feature>,
    pub buildings: Vec<Feature>,
    pub plots: Vec<Plot>,
    pub history: Vec<HistoryRecord>,
    pub skipped_history_rows: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerEntry {
    pub name: String,
    pub file: String,
    pub show: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub plots: usize,
    pub matched_plots: usize,
    pub unmatched_plots: usize,
    pub history_records: usize,
    pub filtered_records: usize,
    pub skipped_history_rows: usize,
}

/// 描述前端應如何用輸出的圖層組出地圖
#[derive(Debug, Clone, Serialize)]
pub struct MapManifest {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub basemap: Basemap,
    /// `[lat, lon]`
    pub center: Option<[f64; 2]>,
    /// `[[南, 西], [北, 東]]`
    pub bounds: Option<[[f64; 2]; 2]>,
    pub zoom_start: u8,
    pub layers: Vec<LayerEntry>,
    pub filter: Filter,
    pub options: FilterOptions,
    pub summary: RunSummary,
}

/// 每個地塊一列的樣式摘要，輸出為 CSV/JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotStyleRow {
    pub plot_name: String,
    pub color: String,
    pub fill_opacity: f64,
    pub crop_type: Option<String>,
    pub year: Option<i32>,
    pub season: Option<String>,
    pub rotation_order: Option<u32>,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct RenderResult {
    pub facility: FeatureCollection,
    pub buildings: FeatureCollection,
    pub gardens: FeatureCollection,
    pub manifest: MapManifest,
    pub plot_styles: Vec<PlotStyleRow>,
}

/// 輸入檔案（相對於資料目錄）以及載入時的欄位改名
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceFiles {
    pub facility: String,
    pub buildings: String,
    pub gardens: String,
    pub history: String,
    /// 設施與建築名稱所在的屬性欄位
    pub name_property: String,
    pub garden_columns: BTreeMap<String, String>,
    pub history_columns: BTreeMap<String, String>,
}

impl Default for SourceFiles {
    fn default() -> Self {
        Self {
            facility: "Layout_facility_boundary.geojson".to_string(),
            buildings: "buildings.geojson".to_string(),
            gardens: "Planting_area.geojson".to_string(),
            history: "planting_records.csv".to_string(),
            name_property: "Name".to_string(),
            garden_columns: BTreeMap::from([
                ("Name".to_string(), "plot_name".to_string()),
                ("rotat orde".to_string(), "rotation_order".to_string()),
            ]),
            history_columns: BTreeMap::from([
                ("Name".to_string(), "plot_name".to_string()),
                ("rotation_o".to_string(), "rotation_order".to_string()),
            ]),
        }
    }
}

impl SourceFiles {
    pub fn layer_files(&self) -> [&str; 3] {
        [&self.facility, &self.buildings, &self.gardens]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    GeoJson,
    Csv,
    Json,
}

impl OutputFormat {
    pub const SUPPORTED: [&'static str; 3] = ["geojson", "csv", "json"];
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "geojson" => Ok(OutputFormat::GeoJson),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!(
                "unsupported output format '{}', expected one of: {}",
                other,
                Self::SUPPORTED.join(", ")
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::GeoJson => "geojson",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        };
        f.write_str(name)
    }
}
