//! APIエラーハンドリング
//!
//! 統一されたエラーレスポンス形式を提供する。
//! すべてのエラーはJSON形式で返却され、`error`と`message`フィールドを含む。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::application::IngestError;

/// APIエラーレスポンスのボディ
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiErrorBody {
    /// エラー種別（例: "bad_request", "unauthorized", "internal_error"）
    pub error: String,
    /// 詳細なエラーメッセージ
    pub message: String,
}

/// APIエラー
///
/// ステータスコードとJSON形式のエラーボディを含む。
/// 常駐サーバー・Lambdaの両方で同じ対応付けを使う。
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    body: ApiErrorBody,
}

impl ApiError {
    /// 新しいApiErrorを作成
    pub fn new(status: StatusCode, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiErrorBody {
                error: error.into(),
                message: message.into(),
            },
        }
    }

    /// 400 Bad Requestエラーを作成
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }

    /// 401 Unauthorizedエラーを作成
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", message)
    }

    /// 405 Method Not Allowedエラーを作成
    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, "method_not_allowed", message)
    }

    /// 500 Internal Server Errorを作成
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
    }

    /// エラー種別を取得
    pub fn error(&self) -> &str {
        &self.body.error
    }

    /// エラーメッセージを取得
    pub fn message(&self) -> &str {
        &self.body.message
    }

    /// ステータスコードを取得
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// レスポンスボディを取得
    pub fn body(&self) -> &ApiErrorBody {
        &self.body
    }
}

/// 取り込みエラーをHTTPエラーに対応付ける
///
/// - パース失敗 → 400 Bad Request
/// - シート追記失敗 → 500 Internal Server Error
impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Parse(e) => ApiError::bad_request(e.to_string()),
            IngestError::Store(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
