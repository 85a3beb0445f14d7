pub mod garden_pipeline;
