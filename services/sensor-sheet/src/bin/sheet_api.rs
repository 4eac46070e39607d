//! センサー読み取り値を追記する常駐HTTPサーバー
//!
//! 本バイナリは以下の機能を提供する:
//! - 読み取り値の追記 (POST /)
//! - ヘルスチェック (GET /health)

use std::sync::Arc;

use sensor_sheet::application::IngestHandler;
use sensor_sheet::http::{AuthConfig, create_router};
use sensor_sheet::infrastructure::{SheetConfig, init_logging, open_sheet_store};
use tokio::signal;

/// シャットダウンシグナルを待機する
///
/// SIGTERMまたはCtrl+C (SIGINT) を待機し、いずれかを受信したらリターンする。
/// axum::serve の with_graceful_shutdown() と組み合わせて使用することで、
/// 新規リクエストの受付停止と処理中リクエストの完了待機を実現する。
async fn shutdown_signal() {
    // Ctrl+C (SIGINT) を待機
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Ctrl+C シグナルハンドラーの登録に失敗しました");
            std::future::pending::<()>().await;
        }
    };

    // SIGTERM を待機 (Unix系OSのみ)
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "SIGTERM シグナルハンドラーの登録に失敗しました");
                std::future::pending::<()>().await;
            }
        }
    };

    // Windows等の非Unix環境ではSIGTERMは利用不可
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C (SIGINT) を受信しました。graceful shutdownを開始します");
        }
        _ = terminate => {
            tracing::info!("SIGTERM を受信しました。graceful shutdownを開始します");
        }
    }
}

/// 設定を読み込み、シートを開いてサーバーを起動する
async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = SheetConfig::from_env()?;
    tracing::info!(
        backend = %config.backend,
        path = %config.path,
        table = %config.table,
        "設定を読み込みました"
    );

    let store = open_sheet_store(&config).await?;
    let handler = Arc::new(IngestHandler::new(store));

    let auth_config = AuthConfig::from_optional(config.api_token.clone());
    if auth_config.api_token.is_none() {
        tracing::warn!("API_TOKEN が未設定のため認証なしで起動します");
    }

    let app = create_router(auth_config, handler);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!("リッスン開始: {}", config.listen_addr);

    // graceful shutdownを有効にしてサーバーを起動
    // 処理中の追記が完了してからシートの接続がドロップされる
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// メイン関数
///
/// # 環境変数
/// - `SHEET_BACKEND`: `sqlite` または `csv`（デフォルト: sqlite）
/// - `SHEET_PATH`: 既存の保存先パス
/// - `SHEET_TABLE`: 追記先テーブル名（デフォルト: readings）
/// - `LISTEN_ADDR`: リッスンアドレス（デフォルト: 127.0.0.1:8080）
/// - `API_TOKEN`: 設定時のみBearer認証を有効化
/// - `RUST_LOG`: ログレベル（デフォルト: info）
#[tokio::main]
async fn main() {
    init_logging();

    tracing::info!("sheet-api サーバーを起動します");

    if let Err(e) = run().await {
        tracing::error!(error = %e, "サーバーの起動に失敗しました");
        std::process::exit(1);
    }

    tracing::info!("サーバーが正常に停止しました");
}
