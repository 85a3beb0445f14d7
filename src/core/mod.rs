pub mod engine;

pub use crate::domain::model::{Dataset, RenderResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
