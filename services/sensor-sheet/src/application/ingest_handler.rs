/// 取り込みハンドラー
///
/// リクエストボディ1件をシートの1行として追記し、固定の応答文を返す。
/// 処理順: パース → 受信時刻付与 → 追記 → 応答
use chrono::Utc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::domain::{Reading, ReadingParseError, Row};
use crate::infrastructure::{SheetStore, SheetStoreError};

/// 追記成功時の応答文
pub const ACKNOWLEDGEMENT: &str = "Data added successfully";

/// 取り込みハンドラーのエラー型
///
/// パース失敗とシート書き込み失敗を区別する（HTTP層で400/500に対応付ける）。
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IngestError {
    /// リクエストボディが不正（行は追記されない）
    #[error("リクエストボディが不正です: {0}")]
    Parse(#[from] ReadingParseError),

    /// シートへの追記に失敗
    #[error("シートへの追記に失敗しました: {0}")]
    Store(#[from] SheetStoreError),
}

/// 取り込みハンドラー
///
/// 追記先シートはコンストラクタで受け取る（テストではモックに差し替える）。
/// 冪等ではない: 同一ボディでも呼び出しごとに新しい行が追記される。
pub struct IngestHandler<S>
where
    S: SheetStore,
{
    /// 追記先シート
    store: S,
}

impl<S> IngestHandler<S>
where
    S: SheetStore,
{
    /// 新しいIngestHandlerを作成
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// リクエストボディを処理する
    ///
    /// # 処理フロー
    /// 1. ボディをJSONとしてパース（失敗時は追記せずにエラー）
    /// 2. 受信時刻を付与して行を構築（列順: timestamp, temperature, humidity, light, water）
    /// 3. シート末尾に追記
    /// 4. 固定の応答文を返却
    ///
    /// # 引数
    /// * `body` - リクエストボディ（UTF-8のJSONオブジェクト）
    ///
    /// # 戻り値
    /// * `Ok(ACKNOWLEDGEMENT)` - 追記成功
    /// * `Err(IngestError)` - パース失敗または追記失敗
    pub async fn handle(&self, body: &[u8]) -> Result<&'static str, IngestError> {
        let reading = Reading::from_json_slice(body).inspect_err(|e| {
            warn!(body_len = body.len(), error = %e, "リクエストボディのパースに失敗");
        })?;

        let row = Row::new(Utc::now(), reading);
        debug!(
            timestamp = %row.timestamp_text(),
            temperature = %row.temperature,
            humidity = %row.humidity,
            light = %row.light,
            water = %row.water,
            "追記する行"
        );

        self.store.append_row(&row).await.inspect_err(|e| {
            error!(timestamp = %row.timestamp_text(), error = %e, "シートへの追記に失敗");
        })?;

        info!(timestamp = %row.timestamp_text(), "行を追記しました");

        Ok(ACKNOWLEDGEMENT)
    }
}
