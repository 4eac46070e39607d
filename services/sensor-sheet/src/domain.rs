// ドメイン層モジュール
pub mod reading;
pub mod row;

// 再エクスポート
pub use reading::{Reading, ReadingParseError};
pub use row::{Cell, Row};
