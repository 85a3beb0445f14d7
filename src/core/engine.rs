use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// 依序執行 extract → transform → load
pub struct MapEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> MapEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting map build");
        self.monitor.log_stats("Start");

        // 擷取
        tracing::info!("📥 Loading layers and planting records...");
        let dataset = self.pipeline.extract().await?;
        tracing::info!(
            "📥 Loaded {} facility feature(s), {} building(s), {} plot(s), {} history record(s)",
            dataset.facility.len(),
            dataset.buildings.len(),
            dataset.plots.len(),
            dataset.history.len()
        );
        self.monitor.log_stats("Extract");

        // 轉換
        tracing::info!("🎨 Resolving plot styles...");
        let result = self.pipeline.transform(dataset).await?;
        let summary = &result.manifest.summary;
        tracing::info!(
            "🎨 {} plot(s) styled: {} with a crop record, {} without",
            summary.plots,
            summary.matched_plots,
            summary.unmatched_plots
        );
        self.monitor.log_stats("Transform");

        // 輸出
        tracing::info!("💾 Writing map outputs...");
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("💾 Output saved to: {}", output_path);
        self.monitor.log_stats("Load");

        self.monitor.log_final_stats();
        Ok(output_path)
    }
}
