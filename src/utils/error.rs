use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("GeoJSON parsing error: {0}")]
    GeoJsonError(#[from] geojson::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration field '{field}' is invalid: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Column '{column}' not found in {source_name}")]
    MissingColumnError { source_name: String, column: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Data,
    Configuration,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl MapError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            MapError::IoError(_) => ErrorCategory::Io,
            MapError::ZipError(_) => ErrorCategory::Output,
            MapError::CsvError(_)
            | MapError::GeoJsonError(_)
            | MapError::SerializationError(_)
            | MapError::MissingColumnError { .. }
            | MapError::ProcessingError { .. } => ErrorCategory::Data,
            MapError::ConfigError { .. }
            | MapError::ConfigValidationError { .. }
            | MapError::InvalidConfigValueError { .. }
            | MapError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Io => match self {
                // 檔案不存在通常是路徑打錯，可以修正後重試
                MapError::IoError(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    ErrorSeverity::Medium
                }
                _ => ErrorSeverity::Critical,
            },
            ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            MapError::IoError(e) if e.kind() == std::io::ErrorKind::NotFound => {
                "Check --data-dir and the layer file names".to_string()
            }
            MapError::IoError(_) => "Check file permissions and free disk space".to_string(),
            MapError::CsvError(_) => {
                "Make sure the planting records file is valid CSV with a header row".to_string()
            }
            MapError::GeoJsonError(_) => {
                "Re-export the layer as GeoJSON (EPSG:4326) from your GIS tool".to_string()
            }
            MapError::MissingColumnError { column, .. } => format!(
                "Add a '{}' column or map an existing column to it in the column mapping",
                column
            ),
            MapError::SerializationError(_) | MapError::ZipError(_) => {
                "Retry the run; if it keeps failing, write to a different output path".to_string()
            }
            MapError::ProcessingError { .. } => {
                "Inspect the input layers; each must be a FeatureCollection".to_string()
            }
            MapError::ConfigError { .. }
            | MapError::ConfigValidationError { .. }
            | MapError::InvalidConfigValueError { .. }
            | MapError::MissingConfigError { .. } => {
                "Fix the configuration value and run again".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            MapError::IoError(e) if e.kind() == std::io::ErrorKind::NotFound => {
                format!("An input file could not be found ({})", e)
            }
            MapError::MissingColumnError { source_name, column } => {
                format!("{} has no '{}' column", source_name, column)
            }
            MapError::InvalidConfigValueError { field, value, .. } => {
                format!("'{}' is not a valid value for {}", value, field)
            }
            MapError::MissingConfigError { field } => {
                format!("Configuration is missing '{}'", field)
            }
            other => other.to_string(),
        }
    }

    /// 依嚴重程度決定結束代碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, MapError>;
