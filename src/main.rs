use clap::Parser;
use profile_switch::core::report;
use profile_switch::domain::ports::TracingProgress;
use profile_switch::utils::error::ErrorSeverity;
use profile_switch::utils::{logger, validation::Validate};
use profile_switch::{CliConfig, LocalStorage, SwitchEngine, SwitchError};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting profile-switch");

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let dry_run = config.dry_run;
    let engine = SwitchEngine::new(LocalStorage::current_dir(), config);

    if dry_run {
        tracing::info!("🔍 DRY RUN MODE - the API will not be called");
        match engine.dry_run().await {
            Ok(summary) => println!("{}", summary),
            Err(e) => exit_with(&e),
        }
        return Ok(());
    }

    // Ctrl-C 只在列與列之間生效，當前這筆會處理完
    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("🛑 Interrupt received, finishing current row");
            signal_token.cancel();
        }
    });

    match engine.run(&TracingProgress, &cancel).await {
        Ok(summary) => {
            println!("✅ Processing Complete!");
            println!("{}", report::completion_text(&summary.report));
            println!("📁 Results saved to: {}", summary.output_path);
        }
        Err(e) => exit_with(&e),
    }

    Ok(())
}

fn exit_with(e: &SwitchError) -> ! {
    tracing::error!(
        "❌ Profile switch failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}
