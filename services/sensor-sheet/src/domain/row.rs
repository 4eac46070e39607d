/// シートに追記する1行
///
/// 列順は常に `timestamp, temperature, humidity, light, water` で固定。
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde_json::{Number, Value};
use std::fmt;

use super::Reading;

/// セル値
///
/// 受信したJSON値をシートに書ける形に変換したもの。
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// 空セル（キー無し、またはnull）
    Empty,
    /// 数値
    Number(Number),
    /// 文字列
    Text(String),
    /// 真偽値
    Bool(bool),
    /// 配列・オブジェクト（コンパクトなJSON文字列として保持）
    Json(String),
}

impl From<Option<Value>> for Cell {
    fn from(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => Cell::Empty,
            Some(Value::Bool(b)) => Cell::Bool(b),
            Some(Value::Number(n)) => Cell::Number(n),
            Some(Value::String(s)) => Cell::Text(s),
            Some(other @ (Value::Array(_) | Value::Object(_))) => Cell::Json(other.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Text(s) | Cell::Json(s) => f.write_str(s),
            Cell::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl Cell {
    /// 空セルかどうか
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

/// シートの1行
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// 受信時刻（サーバー側で付与、ミリ秒未満は切り捨て）
    pub timestamp: DateTime<Utc>,
    pub temperature: Cell,
    pub humidity: Cell,
    pub light: Cell,
    pub water: Cell,
}

impl Row {
    /// 列名（シート上の列順）
    pub const COLUMNS: [&'static str; 5] = ["timestamp", "temperature", "humidity", "light", "water"];

    /// 受信時刻と読み取り値から行を作成
    ///
    /// 受信時刻はシートに書く精度（ミリ秒）に切り捨てる。
    pub fn new(timestamp: DateTime<Utc>, reading: Reading) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(3),
            temperature: reading.temperature.into(),
            humidity: reading.humidity.into(),
            light: reading.light.into(),
            water: reading.water.into(),
        }
    }

    /// タイムスタンプの文字列表現（RFC 3339、ミリ秒、UTC `Z`表記）
    pub fn timestamp_text(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// 値セル（タイムスタンプを除く4列）を列順で返す
    pub fn cells(&self) -> [&Cell; 4] {
        [&self.temperature, &self.humidity, &self.light, &self.water]
    }

    /// 全列を文字列化したレコード（CSV等のテキスト形式用）
    pub fn to_text_record(&self) -> [String; 5] {
        let [temperature, humidity, light, water] = self.cells().map(|c| c.to_string());
        [self.timestamp_text(), temperature, humidity, light, water]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 15).unwrap()
    }

    #[test]
    fn test_cell_from_json_values() {
        assert_eq!(Cell::from(None), Cell::Empty);
        assert_eq!(Cell::from(Some(Value::Null)), Cell::Empty);
        assert_eq!(Cell::from(Some(json!(true))), Cell::Bool(true));
        assert_eq!(Cell::from(Some(json!(21.5))), Cell::Number(Number::from_f64(21.5).unwrap()));
        assert_eq!(Cell::from(Some(json!("wet"))), Cell::Text("wet".to_string()));
        assert_eq!(Cell::from(Some(json!([1, 2]))), Cell::Json("[1,2]".to_string()));
        assert_eq!(
            Cell::from(Some(json!({"ml": 5}))),
            Cell::Json(r#"{"ml":5}"#.to_string())
        );
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(Cell::Empty.to_string(), "");
        assert_eq!(Cell::Number(Number::from(40)).to_string(), "40");
        assert_eq!(Cell::Number(Number::from_f64(21.5).unwrap()).to_string(), "21.5");
        assert_eq!(Cell::Bool(false).to_string(), "false");
        assert_eq!(Cell::Text("dry".to_string()).to_string(), "dry");
    }

    /// 列順はtemperature, humidity, light, waterで固定
    #[test]
    fn test_row_keeps_fixed_column_order() {
        let reading = Reading {
            temperature: Some(json!(21.5)),
            humidity: Some(json!(40)),
            light: Some(json!(300)),
            water: Some(json!(1)),
        };
        let row = Row::new(fixed_time(), reading);

        assert_eq!(
            row.to_text_record(),
            [
                "2024-05-01T09:30:15.000Z".to_string(),
                "21.5".to_string(),
                "40".to_string(),
                "300".to_string(),
                "1".to_string(),
            ]
        );
    }

    #[test]
    fn test_row_with_missing_values_has_empty_cells() {
        let reading = Reading {
            light: Some(json!(120)),
            ..Default::default()
        };
        let row = Row::new(fixed_time(), reading);

        assert!(row.temperature.is_empty());
        assert!(row.humidity.is_empty());
        assert!(!row.light.is_empty());
        assert!(row.water.is_empty());
        assert_eq!(row.to_text_record()[1], "");
    }

    #[test]
    fn test_timestamp_text_is_rfc3339_utc() {
        let row = Row::new(fixed_time(), Reading::default());
        assert_eq!(row.timestamp_text(), "2024-05-01T09:30:15.000Z");
    }

    /// ミリ秒未満は切り捨てられ、文字列表現と一致する
    #[test]
    fn test_timestamp_is_truncated_to_millis() {
        let received = fixed_time() + chrono::Duration::nanoseconds(123_987_654);
        let row = Row::new(received, Reading::default());

        assert_eq!(row.timestamp_text(), "2024-05-01T09:30:15.123Z");
        assert_eq!(row.timestamp, fixed_time() + chrono::Duration::milliseconds(123));
        assert!(row.timestamp <= received);
    }

    #[test]
    fn test_columns_constant() {
        assert_eq!(Row::COLUMNS.len(), 5);
        assert_eq!(Row::COLUMNS[0], "timestamp");
    }
}
