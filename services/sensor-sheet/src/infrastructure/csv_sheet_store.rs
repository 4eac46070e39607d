//! CSVシート
//!
//! 既存のCSVファイル末尾にレコードを1件ずつ追記する。
//! ファイルの作成やヘッダー行の管理は行わない。

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::Row;
use crate::infrastructure::{SheetStore, SheetStoreError};

impl From<csv::Error> for SheetStoreError {
    fn from(err: csv::Error) -> Self {
        SheetStoreError::WriteError(err.to_string())
    }
}

impl From<std::io::Error> for SheetStoreError {
    fn from(err: std::io::Error) -> Self {
        SheetStoreError::WriteError(err.to_string())
    }
}

/// CSVシート
pub struct CsvSheetStore {
    /// 追記先ファイル
    path: PathBuf,
    /// プロセス内の追記を直列化するロック
    write_lock: Arc<Mutex<()>>,
}

impl CsvSheetStore {
    /// 既存のCSVファイルを開く
    ///
    /// # Returns
    /// * `Ok(CsvSheetStore)` - 成功時
    /// * `Err(SheetStoreError::NotFound)` - ファイルが存在しない、または通常ファイルでない
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, SheetStoreError> {
        let path = path.as_ref().to_path_buf();

        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| SheetStoreError::NotFound(format!("{}: {}", path.display(), e)))?;
        if !metadata.is_file() {
            return Err(SheetStoreError::NotFound(format!(
                "{} は通常ファイルではありません",
                path.display()
            )));
        }

        Ok(Self {
            path,
            write_lock: Arc::new(Mutex::new(())),
        })
    }
}

/// 末尾が改行で終わっていないファイルに改行を補う
///
/// 手書きのヘッダー行や表計算ソフトが保存したファイルは最終行に改行が無いことがある。
fn terminate_last_line(file: &mut File) -> std::io::Result<()> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(());
    }

    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    if last[0] != b'\n' {
        // appendモードのため書き込みは常にファイル末尾
        file.write_all(b"\n")?;
    }
    Ok(())
}

#[async_trait]
impl SheetStore for CsvSheetStore {
    /// 1レコードを追記する
    ///
    /// レコードはバッファに書き切ってから1回のflushでファイルへ書き出す。
    async fn append_row(&self, row: &Row) -> Result<(), SheetStoreError> {
        let record = row.to_text_record();
        let path = self.path.clone();
        let lock = self.write_lock.clone();

        tokio::task::spawn_blocking(move || {
            let _guard = lock.lock().map_err(|_| {
                SheetStoreError::WriteError("CSV書き込みロック取得に失敗（Mutex poisoned）".to_string())
            })?;

            // createを指定しないため、ファイルが消えていた場合はエラーになる
            let mut file = OpenOptions::new().read(true).append(true).open(&path)?;
            terminate_last_line(&mut file)?;
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(file);
            writer.write_record(&record)?;
            writer.flush()?;

            Ok(())
        })
        .await
        .map_err(|e| SheetStoreError::TaskError(e.to_string()))?
    }
}
