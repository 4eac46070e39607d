/// シート（追記専用の表形式ストア）の抽象化
///
/// ハンドラーは具体的な保存先を知らず、このトレイト経由で1行を追記する。
/// 保存先はプロセス外で事前に用意されている前提で、本クレートは作成もスキーマ変更も行わない。
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::Row;
use crate::infrastructure::{CsvSheetStore, SheetBackend, SheetConfig, SqliteSheetStore};

/// シート操作のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SheetStoreError {
    /// 保存先（ファイルやテーブル）が存在しない
    #[error("シートが見つかりません: {0}")]
    NotFound(String),

    /// 設定値が不正
    #[error("シート設定が不正です: {0}")]
    InvalidConfig(String),

    /// 追記に失敗
    #[error("書き込みエラー: {0}")]
    WriteError(String),

    /// ブロッキングタスクの実行に失敗
    #[error("タスク実行エラー: {0}")]
    TaskError(String),
}

/// 行追記用トレイト
///
/// 実装ごとに追記を直列化する。異なる実装を可能にする（SQLite、CSV、テスト用モック）。
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// シート末尾に1行を追記する
    ///
    /// 追記は全体が成功するか、何も書かれないかのどちらか。
    ///
    /// # 戻り値
    /// * 成功時は`Ok(())`
    /// * 失敗時は`Err(SheetStoreError)`
    async fn append_row(&self, row: &Row) -> Result<(), SheetStoreError>;
}

#[async_trait]
impl<T: SheetStore + ?Sized> SheetStore for Arc<T> {
    async fn append_row(&self, row: &Row) -> Result<(), SheetStoreError> {
        (**self).append_row(row).await
    }
}

/// 設定に従ってシートを開く
///
/// 保存先が存在しない場合は`SheetStoreError::NotFound`を返す（起動時に検出するため）。
pub async fn open_sheet_store(config: &SheetConfig) -> Result<Arc<dyn SheetStore>, SheetStoreError> {
    let store: Arc<dyn SheetStore> = match config.backend {
        SheetBackend::Sqlite => Arc::new(SqliteSheetStore::open(&config.path, &config.table).await?),
        SheetBackend::Csv => Arc::new(CsvSheetStore::open(&config.path).await?),
    };

    tracing::info!(
        backend = %config.backend,
        path = %config.path,
        "シートを開きました"
    );

    Ok(store)
}
