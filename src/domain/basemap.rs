use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BasemapKind {
    #[default]
    OpenStreetMap,
    CartoDbDark,
    GoogleSatellite,
    GoogleHybrid,
}

impl BasemapKind {
    pub const ALL: [BasemapKind; 4] = [
        BasemapKind::OpenStreetMap,
        BasemapKind::CartoDbDark,
        BasemapKind::GoogleSatellite,
        BasemapKind::GoogleHybrid,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            BasemapKind::OpenStreetMap => "OpenStreetMap",
            BasemapKind::CartoDbDark => "CartoDB Dark",
            BasemapKind::GoogleSatellite => "Google Satellite",
            BasemapKind::GoogleHybrid => "Google Hybrid",
        }
    }

    pub fn tiles(&self) -> &'static str {
        match self {
            BasemapKind::OpenStreetMap => "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
            BasemapKind::CartoDbDark => "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}.png",
            BasemapKind::GoogleSatellite => "https://mt1.google.com/vt/lyrs=s&x={x}&y={y}&z={z}",
            BasemapKind::GoogleHybrid => "https://mt1.google.com/vt/lyrs=y&x={x}&y={y}&z={z}",
        }
    }

    pub fn attribution(&self) -> &'static str {
        match self {
            BasemapKind::OpenStreetMap => "© OpenStreetMap contributors",
            BasemapKind::CartoDbDark => "© CartoDB",
            BasemapKind::GoogleSatellite | BasemapKind::GoogleHybrid => "© Google Maps",
        }
    }
}

impl fmt::Display for BasemapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for BasemapKind {
    type Err = String;

    /// 接受顯示名稱 ("CartoDB Dark") 與簡寫 ("cartodb-dark", "satellite")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match key.as_str() {
            "openstreetmap" | "osm" => Ok(BasemapKind::OpenStreetMap),
            "cartodbdark" | "cartodbdarkmatter" | "dark" => Ok(BasemapKind::CartoDbDark),
            "googlesatellite" | "satellite" => Ok(BasemapKind::GoogleSatellite),
            "googlehybrid" | "hybrid" => Ok(BasemapKind::GoogleHybrid),
            _ => Err(format!(
                "unknown basemap '{}', expected one of: {}",
                s,
                BasemapKind::ALL
                    .iter()
                    .map(|k| k.display_name())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}

/// 寫進 manifest 的底圖圖磚設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Basemap {
    pub name: String,
    pub tiles: String,
    pub attribution: String,
}

impl From<BasemapKind> for Basemap {
    fn from(kind: BasemapKind) -> Self {
        Self {
            name: kind.display_name().to_string(),
            tiles: kind.tiles().to_string(),
            attribution: kind.attribution().to_string(),
        }
    }
}

impl Default for Basemap {
    fn default() -> Self {
        BasemapKind::default().into()
    }
}
