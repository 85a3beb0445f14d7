//! 以正規化後的名稱把地塊對應到種植紀錄，並決定顯示的顏色與標籤。
//!
//! 多筆紀錄同時符合篩選條件時，取輸入順序中的第一筆。

use crate::domain::model::{Filter, HistoryRecord, Plot, StyleResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const NO_RECORD_LABEL: &str = "no crop record for selection";
pub const DEFAULT_CROP_COLOR: &str = "grey";

/// 作物名稱對應顏色，其餘一律使用預設色
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropColorTable {
    colors: BTreeMap<String, String>,
    default_color: String,
}

impl CropColorTable {
    pub fn new(default_color: impl Into<String>) -> Self {
        Self {
            colors: BTreeMap::new(),
            default_color: default_color.into(),
        }
    }

    /// 種植地圖一直以來使用的色表
    pub fn standard() -> Self {
        Self::new(DEFAULT_CROP_COLOR)
            .with_crop("Maize", "yellow")
            .with_crop("Soy Bean", "orange")
            .with_crop("Navy Bean", "lightblue")
            .with_crop("Alphapha", "green")
            .with_crop("Wheat", "brown")
            .with_crop("Groundnuts", "darkorange")
            .with_crop("Cow peas", "pink")
    }

    pub fn with_crop(mut self, crop: impl Into<String>, color: impl Into<String>) -> Self {
        self.colors.insert(crop.into(), color.into());
        self
    }

    pub fn with_default_color(mut self, color: impl Into<String>) -> Self {
        self.default_color = color.into();
        self
    }

    /// 作物名稱需與紀錄完全相符（區分大小寫）
    pub fn get(&self, crop: &str) -> &str {
        self.colors
            .get(crop)
            .map(String::as_str)
            .unwrap_or(&self.default_color)
    }

    pub fn default_color(&self) -> &str {
        &self.default_color
    }

}

impl Default for CropColorTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlotResolver {
    colors: CropColorTable,
}

impl PlotResolver {
    pub fn new(colors: CropColorTable) -> Self {
        Self { colors }
    }

    pub fn colors(&self) -> &CropColorTable {
        &self.colors
    }

    pub fn resolve(&self, plot: &Plot, history: &[HistoryRecord], filter: &Filter) -> StyleResult {
        let selected = history
            .iter()
            .find(|record| record.belongs_to(plot) && filter.matches(record));

        match selected {
            Some(record) => StyleResult {
                color: self.colors.get(&record.crop_type).to_string(),
                label: summarize(record),
                record: Some(record.clone()),
            },
            None => StyleResult {
                color: self.colors.default_color().to_string(),
                label: NO_RECORD_LABEL.to_string(),
                record: None,
            },
        }
    }

    /// 依地塊順序逐一解析
    pub fn resolve_all<'a>(
        &self,
        plots: &'a [Plot],
        history: &[HistoryRecord],
        filter: &Filter,
    ) -> Vec<(&'a Plot, StyleResult)> {
        plots
            .iter()
            .map(|plot| (plot, self.resolve(plot, history, filter)))
            .collect()
    }
}

fn summarize(record: &HistoryRecord) -> String {
    format!(
        "Crop: {} | Year: {} | Season: {} | Rotation: {}",
        record.crop_type, record.year, record.season, record.rotation_order
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Constraint;

    fn plot_a() -> Plot {
        Plot::new("plot-a", None)
    }

    fn maize_2023() -> HistoryRecord {
        HistoryRecord::new("plot-a", 2023, "spring", 1, "Maize")
    }

    #[test]
    fn test_single_matching_record() {
        let resolver = PlotResolver::default();
        let result = resolver.resolve(&plot_a(), &[maize_2023()], &Filter::all());

        assert_eq!(result.color, "yellow");
        for part in ["Maize", "2023", "spring", "1"] {
            assert!(result.label.contains(part), "label missing {}", part);
        }
        assert!(result.is_matched());
    }

    #[test]
    fn test_filter_without_matches_gives_default() {
        let resolver = PlotResolver::default();
        let result = resolver.resolve(&plot_a(), &[maize_2023()], &Filter::all().with_year(2022));

        assert_eq!(result.color, DEFAULT_CROP_COLOR);
        assert_eq!(result.label, NO_RECORD_LABEL);
        assert!(result.record.is_none());
    }

    #[test]
    fn test_unmapped_crop_uses_default_color() {
        let resolver = PlotResolver::default();
        let record = HistoryRecord::new("plot-a", 2023, "spring", 1, "Sunflower");
        let result = resolver.resolve(&plot_a(), &[record], &Filter::all());

        assert_eq!(result.color, DEFAULT_CROP_COLOR);
        assert!(result.label.contains("Sunflower"));
    }

    #[test]
    fn test_crop_lookup_is_exact() {
        let resolver = PlotResolver::default();
        let record = HistoryRecord::new("plot-a", 2023, "spring", 1, "maize");
        let result = resolver.resolve(&plot_a(), &[record], &Filter::all());
        assert_eq!(result.color, DEFAULT_CROP_COLOR);
    }

    #[test]
    fn test_first_record_wins() {
        let resolver = PlotResolver::default();
        let history = vec![
            HistoryRecord::new("plot-b", 2024, "spring", 1, "Wheat"),
            HistoryRecord::new("plot-a", 2022, "summer", 2, "Soy Bean"),
            HistoryRecord::new("plot-a", 2024, "spring", 3, "Wheat"),
        ];

        let result = resolver.resolve(&plot_a(), &history, &Filter::all());
        assert_eq!(result.color, "orange");
        assert_eq!(result.record.unwrap().year, 2022);
    }

    #[test]
    fn test_constraints_are_conjunctive() {
        let resolver = PlotResolver::default();
        let history = vec![
            HistoryRecord::new("plot-a", 2023, "summer", 1, "Wheat"),
            HistoryRecord::new("plot-a", 2024, "spring", 1, "Groundnuts"),
            HistoryRecord::new("plot-a", 2023, "spring", 2, "Cow peas"),
        ];

        let filter = Filter::all().with_year(2023).with_season("spring");
        let result = resolver.resolve(&plot_a(), &history, &filter);
        assert_eq!(result.color, "pink");

        let none = Filter::all()
            .with_year(2023)
            .with_season("spring")
            .with_rotation_order(1);
        assert_eq!(resolver.resolve(&plot_a(), &history, &none).label, NO_RECORD_LABEL);
    }

    #[test]
    fn test_all_is_same_as_no_constraint() {
        let resolver = PlotResolver::default();
        let history = vec![maize_2023()];
        let explicit = Filter::new(Constraint::All, Constraint::All, Constraint::All);

        assert_eq!(
            resolver.resolve(&plot_a(), &history, &explicit),
            resolver.resolve(&plot_a(), &history, &Filter::all())
        );
    }

    #[test]
    fn test_unnamed_plot_never_matches() {
        let resolver = PlotResolver::default();
        let unnamed = Plot::new("  ", None);
        let history = vec![HistoryRecord::new(" ", 2023, "spring", 1, "Maize")];

        let result = resolver.resolve(&unnamed, &history, &Filter::all());
        assert_eq!(result.label, NO_RECORD_LABEL);
    }

    #[test]
    fn test_custom_palette() {
        let colors = CropColorTable::new("#cccccc").with_crop("Maize", "#ffd700");
        let resolver = PlotResolver::new(colors);

        assert_eq!(
            resolver.resolve(&plot_a(), &[maize_2023()], &Filter::all()).color,
            "#ffd700"
        );
        assert_eq!(resolver.resolve(&plot_a(), &[], &Filter::all()).color, "#cccccc");
    }

    #[test]
    fn test_resolve_all_keeps_plot_order() {
        let resolver = PlotResolver::default();
        let plots = vec![Plot::new("plot-b", None), plot_a()];
        let resolved = resolver.resolve_all(&plots, &[maize_2023()], &Filter::all());

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].0.display_name(), "plot-b");
        assert!(!resolved[0].1.is_matched());
        assert_eq!(resolved[1].1.color, "yellow");
    }
}
