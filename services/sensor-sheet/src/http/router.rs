//! HTTPルーター
//!
//! - 読み取り値の追記 (POST /)
//! - ヘルスチェック (GET /health)

use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::application::IngestHandler;
use crate::http::{ApiError, AuthConfig, auth_middleware};
use crate::infrastructure::SheetStore;

/// アプリケーション状態
///
/// ルーター全体で共有される状態を保持する。
pub struct AppState<S: SheetStore> {
    /// 取り込みハンドラー
    pub handler: Arc<IngestHandler<S>>,
}

impl<S: SheetStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
        }
    }
}

/// ヘルスチェックエンドポイント
///
/// サーバーの死活確認用。認証不要。シートにはアクセスしない。
async fn health() -> &'static str {
    "OK"
}

/// 読み取り値追記エンドポイント (POST /)
///
/// Content-Typeは問わず、ボディをそのままハンドラーに渡す。
///
/// # Returns
/// - 200 OK: `Data added successfully`（text/plain）
/// - 400 Bad Request: ボディがJSONとして不正、またはnull
/// - 500 Internal Server Error: シートへの追記に失敗
async fn ingest<S: SheetStore + 'static>(State(state): State<AppState<S>>, body: Bytes) -> Response {
    match state.handler.handle(&body).await {
        Ok(ack) => ack.into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// ルーターを構築する
///
/// 全エンドポイントのルーティングを定義し、認証ミドルウェアを適用する。
/// TraceLayerによりリクエスト/レスポンスの構造化ログを自動記録する。
///
/// # Arguments
/// * `auth_config` - 認証設定（トークン未設定なら認証なし）
/// * `handler` - 取り込みハンドラー
pub fn create_router<S: SheetStore + 'static>(
    auth_config: AuthConfig,
    handler: Arc<IngestHandler<S>>,
) -> Router {
    let state = AppState { handler };

    Router::new()
        .route("/health", get(health))
        .route("/", post(ingest::<S>))
        .layer(middleware::from_fn_with_state(auth_config, auth_middleware))
        // リクエストトレーシングレイヤー（method, path, status, latencyを自動記録）
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
