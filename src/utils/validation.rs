use crate::utils::error::{MapError, Result};
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// 驗證圖磚 URL 模板，例如 `https://mt1.google.com/vt/lyrs=s&x={x}&y={y}&z={z}`
pub fn validate_tile_template(field_name: &str, template: &str) -> Result<()> {
    if template.is_empty() {
        return Err(MapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: template.to_string(),
            reason: "Tile URL cannot be empty".to_string(),
        });
    }

    for placeholder in ["{x}", "{y}", "{z}"] {
        if !template.contains(placeholder) {
            return Err(MapError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: template.to_string(),
                reason: format!("Tile URL must contain the {} placeholder", placeholder),
            });
        }
    }

    // 佔位符換成數字後再交給 url 解析
    let concrete = template
        .replace("{s}", "a")
        .replace("{x}", "0")
        .replace("{y}", "0")
        .replace("{z}", "0");

    match Url::parse(&concrete) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(MapError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: template.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(MapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: template.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(MapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(MapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_file_extensions(
    field_name: &str,
    files: &[&str],
    allowed_extensions: &[&str],
) -> Result<()> {
    let allowed_set: HashSet<String> = allowed_extensions
        .iter()
        .map(|ext| ext.to_ascii_lowercase())
        .collect();

    for file in files {
        match std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            Some(extension) if allowed_set.contains(&extension.to_ascii_lowercase()) => {}
            Some(extension) => {
                return Err(MapError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.to_string(),
                    reason: format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        extension,
                        allowed_extensions.join(", ")
                    ),
                });
            }
            None => {
                return Err(MapError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.to_string(),
                    reason: "File has no extension or invalid filename".to_string(),
                });
            }
        }
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(MapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_tile_template() {
        assert!(validate_tile_template(
            "basemap.tiles",
            "https://mt1.google.com/vt/lyrs=s&x={x}&y={y}&z={z}"
        )
        .is_ok());
        assert!(validate_tile_template(
            "basemap.tiles",
            "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png"
        )
        .is_ok());
        assert!(validate_tile_template("basemap.tiles", "").is_err());
        assert!(validate_tile_template("basemap.tiles", "https://example.com/tiles").is_err());
        assert!(validate_tile_template("basemap.tiles", "ftp://example.com/{z}/{x}/{y}").is_err());
    }

    #[test]
    fn test_validate_file_extensions() {
        let files = ["buildings.geojson", "Planting_area.GeoJSON"];
        assert!(validate_file_extensions("sources", &files, &["geojson", "json"]).is_ok());
        assert!(validate_file_extensions("sources", &["plots.shp"], &["geojson"]).is_err());
        assert!(validate_file_extensions("sources", &["plots"], &["geojson"]).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("style.fill_opacity", 0.7, 0.0, 1.0).is_ok());
        assert!(validate_range("style.fill_opacity", 1.5, 0.0, 1.0).is_err());
        assert!(validate_non_empty_string("style.default_color", "  ").is_err());
    }
}
