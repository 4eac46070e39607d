// ドメイン層モジュール
pub mod domain;

// アプリケーション層モジュール
pub mod application;

// インフラストラクチャ層モジュール
pub mod infrastructure;

// HTTP層モジュール（axumルーター、エラーレスポンス、認証）
pub mod http;
