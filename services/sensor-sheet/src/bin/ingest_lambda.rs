/// 読み取り値取り込みHTTP Lambdaエントリポイント
///
/// Lambda Function URL経由のHTTPリクエストを処理し、
/// ボディの読み取り値をシートに1行追記する。
/// ステータスコードとボディの対応付けは常駐サーバー（sheet-api）と同じ。
use std::sync::Arc;

use lambda_http::http::header::{AUTHORIZATION, CONTENT_TYPE};
use lambda_http::http::{Method, StatusCode};
use lambda_http::{Body, Error, Request, Response, run, service_fn};
use sensor_sheet::application::IngestHandler;
use sensor_sheet::http::{ApiError, AuthConfig};
use sensor_sheet::infrastructure::{SheetConfig, SheetStore, init_logging, open_sheet_store};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    info!("取り込みLambda関数を初期化");

    // コールドスタート時に一度だけシートを開く
    let config = SheetConfig::from_env()?;
    let store = open_sheet_store(&config).await?;
    let handler = Arc::new(IngestHandler::new(store));
    let auth_config = AuthConfig::from_optional(config.api_token.clone());

    run(service_fn(move |request: Request| {
        let handler = handler.clone();
        let auth_config = auth_config.clone();
        async move { handle_request(&handler, &auth_config, request).await }
    }))
    .await
}

/// HTTPリクエストハンドラー
///
/// # Returns
/// - 200: `Data added successfully`（text/plain）
/// - 400/401/405/500: JSON形式のエラーボディ
async fn handle_request<S: SheetStore>(
    handler: &IngestHandler<S>,
    auth_config: &AuthConfig,
    request: Request,
) -> Result<Response<Body>, Error> {
    info!(method = %request.method(), "取り込みリクエスト受信");

    if request.method() != Method::POST {
        return error_response(ApiError::method_not_allowed("POSTのみ受け付けます"));
    }

    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());
    if let Err(e) = auth_config.authorize(auth_header) {
        tracing::warn!(reason = e.message(), "認証に失敗");
        return error_response(e);
    }

    match handler.handle(request.body().as_ref()).await {
        Ok(ack) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(Body::Text(ack.to_string()))?),
        Err(e) => error_response(ApiError::from(e)),
    }
}

/// ApiErrorをJSONボディのLambdaレスポンスに変換
fn error_response(error: ApiError) -> Result<Response<Body>, Error> {
    let json = serde_json::to_string(error.body())?;
    Ok(Response::builder()
        .status(error.status())
        .header(CONTENT_TYPE, "application/json")
        .body(Body::Text(json))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_http::http::Request as HttpRequest;
    use sensor_sheet::http::ApiErrorBody;
    use sensor_sheet::infrastructure::SqliteSheetStore;
    use tempfile::tempdir;

    /// テスト用のAPIトークン
    const TEST_TOKEN: &str = "test-token-for-lambda-tests";

    /// テスト用のSQLiteシートを作成（オペレーターが用意する想定のテーブル）
    async fn create_sqlite_handler() -> (tempfile::TempDir, String, IngestHandler<SqliteSheetStore>) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sheet.db").to_string_lossy().to_string();
        rusqlite::Connection::open(&path)
            .unwrap()
            .execute_batch(
                "CREATE TABLE readings (timestamp TEXT NOT NULL, temperature, humidity, light, water);",
            )
            .unwrap();
        let store = SqliteSheetStore::open(&path, "readings").await.unwrap();
        (dir, path, IngestHandler::new(store))
    }

    fn row_count(path: &str) -> i64 {
        rusqlite::Connection::open(path)
            .unwrap()
            .query_row("SELECT COUNT(*) FROM readings", [], |row| row.get(0))
            .unwrap()
    }

    fn post(body: &str) -> Request {
        HttpRequest::builder()
            .method("POST")
            .uri("/")
            .header("Content-Type", "application/json")
            .body(Body::Text(body.to_string()))
            .unwrap()
    }

    fn body_text(response: &Response<Body>) -> String {
        match response.body() {
            Body::Text(text) => text.clone(),
            Body::Binary(bytes) => String::from_utf8(bytes.clone()).unwrap(),
            Body::Empty => String::new(),
            _ => panic!("予期しないBody型"),
        }
    }

    #[tokio::test]
    async fn test_handler_appends_row_and_returns_acknowledgement() {
        init_logging();
        let (_dir, path, handler) = create_sqlite_handler().await;

        let response = handle_request(
            &handler,
            &AuthConfig::disabled(),
            post(r#"{"temperature": 21.5, "humidity": 40, "light": 300, "water": 1}"#),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(body_text(&response), "Data added successfully");
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/plain; charset=utf-8"
        );
        assert_eq!(row_count(&path), 1);
    }

    /// バイナリボディ（Function URLのBase64エンコード経由）も処理できる
    #[tokio::test]
    async fn test_handler_accepts_binary_body() {
        init_logging();
        let (_dir, path, handler) = create_sqlite_handler().await;

        let request = HttpRequest::builder()
            .method("POST")
            .uri("/")
            .body(Body::Binary(br#"{"water": 2}"#.to_vec()))
            .unwrap();

        let response = handle_request(&handler, &AuthConfig::disabled(), request)
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(row_count(&path), 1);
    }

    #[tokio::test]
    async fn test_handler_malformed_json_returns_400_without_row() {
        init_logging();
        let (_dir, path, handler) = create_sqlite_handler().await;

        let response = handle_request(&handler, &AuthConfig::disabled(), post("not json"))
            .await
            .unwrap();

        assert_eq!(response.status(), 400);
        let error_body: ApiErrorBody = serde_json::from_str(&body_text(&response)).unwrap();
        assert_eq!(error_body.error, "bad_request");
        assert_eq!(row_count(&path), 0);
    }

    /// 空ボディはパースエラー
    #[tokio::test]
    async fn test_handler_empty_body_returns_400() {
        init_logging();
        let (_dir, path, handler) = create_sqlite_handler().await;

        let request = HttpRequest::builder()
            .method("POST")
            .uri("/")
            .body(Body::Empty)
            .unwrap();

        let response = handle_request(&handler, &AuthConfig::disabled(), request)
            .await
            .unwrap();

        assert_eq!(response.status(), 400);
        assert_eq!(row_count(&path), 0);
    }

    #[tokio::test]
    async fn test_handler_rejects_get_with_405() {
        init_logging();
        let (_dir, path, handler) = create_sqlite_handler().await;

        let request = HttpRequest::builder()
            .method("GET")
            .uri("/")
            .body(Body::Empty)
            .unwrap();

        let response = handle_request(&handler, &AuthConfig::disabled(), request)
            .await
            .unwrap();

        assert_eq!(response.status(), 405);
        assert_eq!(row_count(&path), 0);
    }

    #[tokio::test]
    async fn test_handler_requires_token_when_configured() {
        init_logging();
        let (_dir, path, handler) = create_sqlite_handler().await;
        let auth_config = AuthConfig::new(TEST_TOKEN);

        let unauthorized = handle_request(&handler, &auth_config, post(r#"{"water": 1}"#))
            .await
            .unwrap();
        assert_eq!(unauthorized.status(), 401);
        assert_eq!(row_count(&path), 0);

        let mut request = post(r#"{"water": 1}"#);
        request.headers_mut().insert(
            AUTHORIZATION,
            format!("Bearer {}", TEST_TOKEN).parse().unwrap(),
        );
        let authorized = handle_request(&handler, &auth_config, request).await.unwrap();
        assert_eq!(authorized.status(), 200);
        assert_eq!(row_count(&path), 1);
    }

    /// テーブルが外部で削除された場合は500
    #[tokio::test]
    async fn test_handler_store_failure_returns_500() {
        init_logging();
        let (_dir, path, handler) = create_sqlite_handler().await;
        rusqlite::Connection::open(&path)
            .unwrap()
            .execute_batch("DROP TABLE readings;")
            .unwrap();

        let response = handle_request(&handler, &AuthConfig::disabled(), post(r#"{"water": 1}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), 500);
        let error_body: ApiErrorBody = serde_json::from_str(&body_text(&response)).unwrap();
        assert_eq!(error_body.error, "internal_error");
    }
}
