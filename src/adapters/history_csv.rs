use crate::domain::model::HistoryRecord;
use crate::utils::error::{MapError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;

pub const REQUIRED_COLUMNS: [&str; 5] = ["plot_name", "year", "season", "rotation_order", "crop_type"];

#[derive(Debug, Default)]
pub struct HistoryLoad {
    pub records: Vec<HistoryRecord>,
    pub skipped_rows: usize,
}

#[derive(Debug, Deserialize)]
struct RawRow {
    plot_name: Option<String>,
    year: Option<String>,
    season: Option<String>,
    rotation_order: Option<String>,
    crop_type: Option<String>,
}

/// 讀取種植紀錄。標題先依 `columns` 改名，再檢查必要欄位。
///
/// `year` 與 `rotation_order` 必須是整數，`rotation_order` 不可為負。
/// 輪作順序是文字標籤（例如 `A`）或負數的列不會載入，只記錄警告並計入
/// `skipped_rows`；試算表裡混用文字標籤的紀錄需先改成數字。
pub fn parse_history(
    source_name: &str,
    bytes: &[u8],
    columns: &BTreeMap<String, String>,
) -> Result<HistoryLoad> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(bytes);

    let renamed: csv::StringRecord = reader
        .headers()?
        .iter()
        .map(|header| columns.get(header).map(String::as_str).unwrap_or(header))
        .collect();

    for column in REQUIRED_COLUMNS {
        if !renamed.iter().any(|header| header == column) {
            return Err(MapError::MissingColumnError {
                source_name: source_name.to_string(),
                column: column.to_string(),
            });
        }
    }
    reader.set_headers(renamed);

    let mut load = HistoryLoad::default();
    for (index, row) in reader.deserialize::<RawRow>().enumerate() {
        // 第 1 行是標題，資料從第 2 行開始
        let line = index + 2;
        let row = row?;

        let year = row.year.as_deref().and_then(parse_whole_number::<i32>);
        let rotation_order = row
            .rotation_order
            .as_deref()
            .and_then(parse_whole_number::<u32>);

        match (year, rotation_order) {
            (Some(year), Some(rotation_order)) => load.records.push(HistoryRecord::new(
                row.plot_name.as_deref().unwrap_or_default(),
                year,
                row.season.as_deref().unwrap_or_default(),
                rotation_order,
                row.crop_type.as_deref().unwrap_or_default(),
            )),
            _ => {
                tracing::warn!(
                    "⚠️ {} line {}: skipping row with year={:?}, rotation_order={:?}",
                    source_name,
                    line,
                    row.year,
                    row.rotation_order
                );
                load.skipped_rows += 1;
            }
        }
    }

    tracing::debug!(
        "Loaded {} history records from {} ({} skipped)",
        load.records.len(),
        source_name,
        load.skipped_rows
    );
    Ok(load)
}

/// 接受 `2023`，也接受試算表匯出的 `2023.0`
fn parse_whole_number<T: TryFrom<i64>>(raw: &str) -> Option<T> {
    let raw = raw.trim();
    let whole = match raw.parse::<i64>() {
        Ok(n) => n,
        Err(_) => {
            let float = raw.parse::<f64>().ok()?;
            if !float.is_finite() || float.fract() != 0.0 {
                return None;
            }
            float as i64
        }
    };
    T::try_from(whole).ok()
}
