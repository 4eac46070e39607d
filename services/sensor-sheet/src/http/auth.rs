//! 認証ミドルウェア
//!
//! APIトークンによる任意の認証を提供する。
//! - トークン未設定時は認証を行わない（すべてのリクエストを通す）
//! - 設定時はAuthorizationヘッダーのトークンと照合
//! - /healthエンドポイントは常に認証をバイパス
//! - 不正なトークン時は401 Unauthorized（JSON形式）を返却

use crate::http::ApiError;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

/// 認証設定
///
/// axumのStateとして共有される。Lambdaエントリポイントからも直接使用する。
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// APIトークン（Noneの場合は認証しない）
    pub api_token: Option<String>,
}

impl AuthConfig {
    /// トークン必須の認証設定を作成
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: Some(api_token.into()),
        }
    }

    /// 認証なしの設定を作成
    pub fn disabled() -> Self {
        Self { api_token: None }
    }

    /// 任意のトークンから作成（空文字は認証なし扱い）
    pub fn from_optional(api_token: Option<String>) -> Self {
        Self {
            api_token: api_token.filter(|t| !t.trim().is_empty()),
        }
    }

    /// Authorizationヘッダーの値を検証する
    ///
    /// # Authorization Header Format
    /// `Bearer <token>` または `<token>`
    ///
    /// # Returns
    /// - `Ok(())`: 認証成功、または認証が無効
    /// - `Err(ApiError)`: 401 Unauthorized
    pub fn authorize(&self, auth_header: Option<&str>) -> Result<(), ApiError> {
        let Some(expected) = self.api_token.as_deref() else {
            return Ok(());
        };

        let Some(header) = auth_header else {
            return Err(ApiError::unauthorized("Authorizationヘッダーが必要です"));
        };

        // "Bearer <token>" または "<token>" 形式をサポート
        let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();

        if token == expected {
            Ok(())
        } else {
            Err(ApiError::unauthorized("APIトークンが無効です"))
        }
    }
}

/// 認証ミドルウェア
///
/// リクエストのAuthorizationヘッダーを検証する。
/// /healthエンドポイントは認証をバイパスする。
pub async fn auth_middleware(
    State(config): State<AuthConfig>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    match config.authorize(auth_header) {
        Ok(()) => next.run(request).await,
        Err(e) => {
            tracing::warn!(
                path = %request.uri().path(),
                reason = e.message(),
                "認証に失敗"
            );
            e.into_response()
        }
    }
}
