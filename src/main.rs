use garden_map::core::ConfigProvider;
use garden_map::utils::error::MapError;
use garden_map::utils::{logger, validation::Validate};
use garden_map::{CliConfig, GardenPipeline, MapEngine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse_args();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting garden-map CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }
    tracing::info!("🗺️ Filter: {}", config.filter());

    let pipeline = GardenPipeline::local(config);
    let engine = MapEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Map build completed successfully!");
            println!("✅ Map build completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => report_failure(&e),
    }

    Ok(())
}

fn report_failure(e: &MapError) {
    tracing::error!(
        "❌ Map build failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    let exit_code = e.exit_code();
    if exit_code > 0 {
        std::process::exit(exit_code);
    }
}
