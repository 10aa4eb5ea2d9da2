use clap::Parser;
use profile_switch::core::report;
use profile_switch::domain::ports::{ConfigProvider, TracingProgress, UnauthorizedPolicy};
use profile_switch::utils::error::ErrorSeverity;
use profile_switch::utils::{logger, validation::Validate};
use profile_switch::{LocalStorage, SwitchEngine, TomlConfig};
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "toml-switch")]
#[command(about = "Bulk profile switch driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "profile-switch.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Validate the input without calling the API
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置 (日誌設定也在裡面，所以先載入)
    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    let verbose = args.verbose || config.verbose();
    if config.json_logs() {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }

    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config, &args);

    let engine = SwitchEngine::new(LocalStorage::current_dir(), config);

    let outcome = if args.dry_run {
        engine
            .dry_run()
            .await
            .map(|summary| println!("{}", summary))
    } else {
        let cancel = CancellationToken::new();
        let signal_token = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                signal_token.cancel();
            }
        });

        engine.run(&TracingProgress, &cancel).await.map(|summary| {
            println!("✅ Processing Complete!");
            println!("{}", report::completion_text(&summary.report));
            println!("📁 Results saved to: {}", summary.output_path);
        })
    };

    if let Err(e) = outcome {
        tracing::error!(
            "❌ Profile switch failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    let api = config.api_settings();
    let batch = config.batch_options();

    println!("📋 Configuration Summary:");
    println!("  API: {}", api.base_url);
    println!("  Input: {}", config.input_path());
    println!("  Output: {}", config.output_path());
    println!(
        "  Retries: {} attempts, {:?} base delay, {:?} timeout",
        api.max_attempts, api.retry_delay, api.request_timeout
    );
    println!("  Row delay: {:?}", batch.row_delay);
    if batch.unauthorized_policy == UnauthorizedPolicy::FailFast {
        println!("  🔒 Stops calling the API after the first 401");
    }
    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }
    println!();
}
