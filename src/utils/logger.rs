use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// RUST_LOG 優先，否則只開本 crate 的日誌
fn default_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "profile_switch=debug,info"
        } else {
            "profile_switch=info"
        })
    })
}

pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// 每行一個 JSON 物件；處理中的資料列以 `span.row` 欄位附上
pub fn init_json_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_target(false)
                .with_current_span(true)
                .with_span_list(false),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_filter_enables_debug() {
        // 測試環境通常沒有設定 RUST_LOG
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        assert!(default_filter(true)
            .to_string()
            .contains("profile_switch=debug"));
        assert_eq!(default_filter(false).to_string(), "profile_switch=info");
    }
}
