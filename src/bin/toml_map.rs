use anyhow::Context;
use clap::Parser;
use garden_map::adapters::history_csv;
use garden_map::core::{ConfigProvider, Storage};
use garden_map::domain::model::{Constraint, FilterOptions};
use garden_map::utils::{logger, validation::Validate};
use garden_map::{GardenPipeline, LocalStorage, MapEngine, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-map")]
#[command(about = "Garden map builder driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "garden-map.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the year filter, e.g. 2023 or All
    #[arg(long)]
    year: Option<Constraint<i32>>,

    /// Override the season filter
    #[arg(long)]
    season: Option<Constraint<String>>,

    /// Override the rotation order filter
    #[arg(long)]
    rotation: Option<Constraint<u32>>,

    /// Dry run - show the filter choices and planned outputs without writing anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.json_logs() {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based garden map builder");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(year) = args.year.clone() {
        tracing::info!("🔧 Year filter overridden to: {}", year);
        config.filter.year = year;
    }
    if let Some(season) = args.season.clone() {
        tracing::info!("🔧 Season filter overridden to: {}", season);
        config.filter.season = season;
    }
    if let Some(rotation) = args.rotation.clone() {
        tracing::info!("🔧 Rotation filter overridden to: {}", rotation);
        config.filter.rotation_order = rotation;
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be written");
        return perform_dry_run(&config).await;
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let pipeline = GardenPipeline::local(config);
    let engine = MapEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Map build completed successfully!");
            println!("✅ Map build completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
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
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Map: {}", config.map_title());
    if let Some(description) = &config.map.description {
        println!("  Description: {}", description);
    }
    println!("  Data: {}", config.data_dir());
    println!("  Output: {}", config.output_path());
    println!("  Filter: {}", config.filter());
    println!("  Basemap: {}", config.basemap().name);

    let formats: Vec<String> = config
        .output_formats()
        .iter()
        .map(ToString::to_string)
        .collect();
    println!("  Formats: {}", formats.join(", "));

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

async fn perform_dry_run(config: &TomlConfig) -> anyhow::Result<()> {
    let sources = config.sources();
    let storage = LocalStorage::new(config.data_dir());

    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📂 Input Layers:");
    for file in sources.layer_files() {
        let exists = storage.base_path().join(file).exists();
        println!("  {} {}", if exists { "✅" } else { "❌" }, file);
    }

    // 讀取種植紀錄，列出下拉選單的選項
    let bytes = storage
        .read_file(&sources.history)
        .await
        .with_context(|| format!("reading planting records from {}", sources.history))?;
    let history = history_csv::parse_history(&sources.history, &bytes, &sources.history_columns)
        .with_context(|| format!("parsing {}", sources.history))?;
    let options = FilterOptions::from_history(&history.records);
    let filter = config.filter();

    println!();
    println!("🗓️ Planting Records: {}", sources.history);
    println!("  Records: {}", history.records.len());
    if history.skipped_rows > 0 {
        println!("  Skipped rows: {}", history.skipped_rows);
    }
    println!("  Matching filter: {}", history.records.iter().filter(|r| filter.matches(r)).count());
    println!("  Year choices: {}", options.year_choices().join(", "));
    println!("  Season choices: {}", options.season_choices().join(", "));
    println!("  Rotation choices: {}", options.rotation_choices().join(", "));

    println!();
    println!("💾 Output Configuration:");
    println!("  Path: {}", config.output_path());
    for format in config.output_formats() {
        println!("  Format: {}", format);
    }
    if config.bundle_outputs() {
        println!("  Compression: {} (ZIP)", config.bundle_filename());
    }

    if !sources.garden_columns.is_empty() || !sources.history_columns.is_empty() {
        println!();
        println!("🔄 Column Renames:");
        for (from, to) in &sources.garden_columns {
            println!("  {}: {} -> {}", sources.gardens, from, to);
        }
        for (from, to) in &sources.history_columns {
            println!("  {}: {} -> {}", sources.history, from, to);
        }
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");

    Ok(())
}
