// シート接続・サーバー設定
//
// 環境変数から保存先とサーバーの設定値を読み込み、
// 型安全に提供するインフラストラクチャ層コンポーネント。

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use thiserror::Error;

/// バックエンド種別の環境変数名
pub const SHEET_BACKEND_ENV: &str = "SHEET_BACKEND";
/// 保存先パスの環境変数名
pub const SHEET_PATH_ENV: &str = "SHEET_PATH";
/// テーブル名の環境変数名（SQLiteバックエンドのみ）
pub const SHEET_TABLE_ENV: &str = "SHEET_TABLE";
/// リッスンアドレスの環境変数名
pub const LISTEN_ADDR_ENV: &str = "LISTEN_ADDR";
/// APIトークンの環境変数名
pub const API_TOKEN_ENV: &str = "API_TOKEN";

/// デフォルトの保存先パス
pub const DEFAULT_SHEET_PATH: &str = "/var/lib/sensor-sheet/readings.db";
/// デフォルトのテーブル名
pub const DEFAULT_SHEET_TABLE: &str = "readings";
/// デフォルトのリッスンアドレス（リバースプロキシ配下を想定）
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";

/// 設定読み込みのエラー型
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// シートのバックエンド種別
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SheetBackend {
    /// SQLiteデータベースのテーブル
    #[default]
    Sqlite,
    /// CSVファイル
    Csv,
}

impl FromStr for SheetBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(SheetBackend::Sqlite),
            "csv" => Ok(SheetBackend::Csv),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for SheetBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetBackend::Sqlite => f.write_str("sqlite"),
            SheetBackend::Csv => f.write_str("csv"),
        }
    }
}

/// シート・サーバー設定
///
/// 環境変数:
/// - SHEET_BACKEND: `sqlite` または `csv`（デフォルト: sqlite）
/// - SHEET_PATH: 既存の保存先パス（デフォルト: /var/lib/sensor-sheet/readings.db）
/// - SHEET_TABLE: 追記先テーブル名（デフォルト: readings）
/// - LISTEN_ADDR: リッスンアドレス（デフォルト: 127.0.0.1:8080）
/// - API_TOKEN: 設定時のみBearer認証を有効化
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetConfig {
    pub backend: SheetBackend,
    pub path: String,
    pub table: String,
    pub listen_addr: SocketAddr,
    pub api_token: Option<String>,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            backend: SheetBackend::default(),
            path: DEFAULT_SHEET_PATH.to_string(),
            table: DEFAULT_SHEET_TABLE.to_string(),
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            api_token: None,
        }
    }
}

impl SheetConfig {
    /// 環境変数から設定を読み込み
    ///
    /// 未設定・空文字の項目はデフォルト値を使用する。
    /// 値が解釈できない場合は`ConfigError::InvalidValue`を返す。
    pub fn from_env() -> Result<Self, ConfigError> {
        // 文字列オプションを読み込むヘルパー（空文字はNone扱い）
        let get_optional_string = |key: &str| -> Option<String> {
            std::env::var(key)
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let backend = match get_optional_string(SHEET_BACKEND_ENV) {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                key: SHEET_BACKEND_ENV.to_string(),
                value,
            })?,
            None => SheetBackend::default(),
        };

        let listen_addr = get_optional_string(LISTEN_ADDR_ENV)
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = listen_addr
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidValue {
                key: LISTEN_ADDR_ENV.to_string(),
                value: listen_addr.clone(),
            })?;

        Ok(Self {
            backend,
            path: get_optional_string(SHEET_PATH_ENV).unwrap_or_else(|| DEFAULT_SHEET_PATH.to_string()),
            table: get_optional_string(SHEET_TABLE_ENV).unwrap_or_else(|| DEFAULT_SHEET_TABLE.to_string()),
            listen_addr,
            api_token: get_optional_string(API_TOKEN_ENV),
        })
    }
}
