// Adapters 層：把讀入的原始資料轉成 domain 物件

pub mod geojson_layer;
pub mod history_csv;
