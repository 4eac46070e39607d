/// センサー読み取り値
///
/// リクエストボディ（JSONオブジェクト）から取り出した4項目を保持する。
/// 値の型・範囲・必須チェックは行わない。未知のキーは無視する。
use serde_json::{Map, Value};
use thiserror::Error;

/// 読み取り値のパースエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReadingParseError {
    /// JSONとして不正（UTF-8不正、構文エラー、空ボディを含む）
    #[error("JSONの解析に失敗しました: {0}")]
    InvalidJson(String),

    /// ボディが`null`（フィールドを読み出せない）
    #[error("JSONがnullです")]
    NullBody,
}

/// センサー読み取り値
///
/// 各フィールドはリクエストにキーが無い場合、または値が`null`の場合に`None`となる。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reading {
    /// 温度
    pub temperature: Option<Value>,
    /// 湿度
    pub humidity: Option<Value>,
    /// 照度
    pub light: Option<Value>,
    /// 水分量
    pub water: Option<Value>,
}

impl Reading {
    /// リクエストボディのバイト列から読み取り値をパースする
    ///
    /// # Arguments
    /// * `body` - UTF-8のJSON（通常はオブジェクト）
    ///
    /// # Returns
    /// * `Ok(Reading)` - 成功時（欠けているキーは`None`、オブジェクト以外の値は全項目`None`）
    /// * `Err(ReadingParseError)` - JSONとして不正、または`null`の場合
    pub fn from_json_slice(body: &[u8]) -> Result<Self, ReadingParseError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ReadingParseError::InvalidJson(e.to_string()))?;

        match value {
            Value::Object(map) => Ok(Self::from_map(map)),
            Value::Null => Err(ReadingParseError::NullBody),
            // 配列・数値・文字列・真偽値には該当キーが無い
            _ => Ok(Self::default()),
        }
    }

    /// JSONオブジェクトから4項目を取り出す
    fn from_map(mut map: Map<String, Value>) -> Self {
        // nullはキー無しと同じ扱い
        let mut take = |key: &str| map.remove(key).filter(|v| !v.is_null());

        Self {
            temperature: take("temperature"),
            humidity: take("humidity"),
            light: take("light"),
            water: take("water"),
        }
    }
}
