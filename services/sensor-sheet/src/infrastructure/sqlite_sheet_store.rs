//! SQLiteシート
//!
//! 既存のSQLiteデータベース内の既存テーブルを「シート」として扱い、行を追記する。
//! - 書き込み: 専用の単一接続（Arc<Mutex<Connection>>）
//! - データベースファイル・テーブルの作成やスキーマ変更は行わない

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::types::{ToSqlOutput, Value as SqlValue};
use rusqlite::{Connection, OpenFlags, ToSql};

use crate::domain::{Cell, Row};
use crate::infrastructure::{SheetStore, SheetStoreError};

/// 他プロセスの書き込みと競合した場合の待機時間
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

impl From<rusqlite::Error> for SheetStoreError {
    fn from(err: rusqlite::Error) -> Self {
        SheetStoreError::WriteError(err.to_string())
    }
}

/// セル値をSQLiteのストレージクラスに対応付ける
///
/// - Empty → NULL
/// - 整数 → INTEGER、それ以外の数値 → REAL（i64に収まらない整数はTEXT）
/// - 真偽値 → INTEGER (0/1)
/// - 文字列・JSON → TEXT
impl ToSql for Cell {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let value = match self {
            Cell::Empty => SqlValue::Null,
            Cell::Number(n) => {
                if let Some(i) = n.as_i64() {
                    SqlValue::Integer(i)
                } else if n.is_f64() {
                    SqlValue::Real(n.as_f64().unwrap_or_default())
                } else {
                    SqlValue::Text(n.to_string())
                }
            }
            Cell::Bool(b) => SqlValue::Integer(i64::from(*b)),
            Cell::Text(s) | Cell::Json(s) => return Ok(ToSqlOutput::from(s.as_str())),
        };
        Ok(ToSqlOutput::Owned(value))
    }
}

/// SQLiteシート
pub struct SqliteSheetStore {
    /// 書き込み専用接続
    write_conn: Arc<Mutex<Connection>>,
    /// 追記用INSERT文（テーブル名検証済み）
    insert_sql: String,
}

impl SqliteSheetStore {
    /// 既存のデータベースとテーブルを開く
    ///
    /// データベースファイルは作成しない（`SQLITE_OPEN_CREATE`を指定しない）。
    /// テーブルには`timestamp, temperature, humidity, light, water`列が必要。
    ///
    /// # Arguments
    /// * `db_path` - 既存データベースファイルのパス
    /// * `table` - 追記先テーブル名（英数字とアンダースコアのみ）
    ///
    /// # Returns
    /// * `Ok(SqliteSheetStore)` - 成功時
    /// * `Err(SheetStoreError::NotFound)` - ファイルまたはテーブルが存在しない
    /// * `Err(SheetStoreError::InvalidConfig)` - テーブル名が不正
    pub async fn open(db_path: &str, table: &str) -> Result<Self, SheetStoreError> {
        if !is_valid_table_name(table) {
            return Err(SheetStoreError::InvalidConfig(format!(
                "テーブル名に使用できない文字が含まれています: {}",
                table
            )));
        }

        let conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| SheetStoreError::NotFound(format!("{}: {}", db_path, e)))?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        // テーブルの存在確認（作成はしない）
        // SQLiteの識別子は大文字小文字を区別しないため比較もNOCASE
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE)",
            [table],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(SheetStoreError::NotFound(format!(
                "{} にテーブル {} がありません",
                db_path, table
            )));
        }

        Ok(Self {
            write_conn: Arc::new(Mutex::new(conn)),
            insert_sql: build_insert_sql(table),
        })
    }
}

#[async_trait]
impl SheetStore for SqliteSheetStore {
    /// 1行をINSERTする
    ///
    /// 単一のINSERT文のため、行は全体が書かれるか何も書かれないかのどちらか。
    async fn append_row(&self, row: &Row) -> Result<(), SheetStoreError> {
        let row = row.clone();
        let conn = self.write_conn.clone();
        let sql = self.insert_sql.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|_| {
                SheetStoreError::WriteError("書き込み接続のロック取得に失敗（Mutex poisoned）".to_string())
            })?;

            let timestamp = row.timestamp_text();
            conn.execute(
                &sql,
                rusqlite::params![timestamp, row.temperature, row.humidity, row.light, row.water],
            )?;

            Ok(())
        })
        .await
        .map_err(|e| SheetStoreError::TaskError(e.to_string()))?
    }
}

/// テーブル名がSQL識別子として安全かどうか
fn is_valid_table_name(table: &str) -> bool {
    !table.is_empty()
        && !table.starts_with(|c: char| c.is_ascii_digit())
        && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// 追記用INSERT文を構築
fn build_insert_sql(table: &str) -> String {
    let placeholders: Vec<String> = (1..=Row::COLUMNS.len()).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT INTO \"{}\" ({}) VALUES ({})",
        table,
        Row::COLUMNS.join(", "),
        placeholders.join(", ")
    )
}
