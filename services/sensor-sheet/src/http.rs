// HTTP層モジュール
pub mod auth;
pub mod error;
pub mod router;

// 再エクスポート
pub use auth::{AuthConfig, auth_middleware};
pub use error::{ApiError, ApiErrorBody};
pub use router::{AppState, create_router};
