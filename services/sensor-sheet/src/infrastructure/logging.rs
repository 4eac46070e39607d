/// ログ基盤モジュール
///
/// 常駐サーバー・Lambda共通の構造化ログ設定を提供する。
/// 1行1イベントのJSONで出力し、イベントのフィールドはトップレベルに展開する。
use std::sync::Once;

use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// ログサブスクライバー初期化用の同期プリミティブ
static INIT: Once = Once::new();

/// `RUST_LOG`未設定時のフィルター
const DEFAULT_FILTER: &str = "info";

/// JSON形式のログサブスクライバーを初期化する
///
/// `RUST_LOG`でフィルタリングし、未設定なら`info`。
/// 複数回呼び出しても最初の1回だけが有効。
pub fn init_logging() {
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        // 既に他のサブスクライバーが設定済みの場合（テスト等）は無視する
        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer(std::io::stdout))
            .try_init();
    });
}

/// 取り込みログ用のJSONレイヤー（CloudWatch/journald向け）
fn json_layer<S, W>(make_writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .json()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .flatten_event(true)
        .with_current_span(false)
        .with_writer(make_writer)
}

/// テスト用のログサブスクライバーを初期化する（人間が読みやすい形式）
#[cfg(test)]
pub fn init_test_logging() {
    static TEST_INIT: Once = Once::new();

    TEST_INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_test_writer()
            .with_target(true)
            .compact();

        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init();
    });
}
