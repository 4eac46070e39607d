// Infrastructure layer modules
pub mod config;
pub mod csv_sheet_store;
pub mod logging;
pub mod sheet_store;
pub mod sqlite_sheet_store;

// Re-exports
pub use config::{ConfigError, SheetBackend, SheetConfig};
pub use csv_sheet_store::CsvSheetStore;
pub use logging::init_logging;
pub use sheet_store::{SheetStore, SheetStoreError, open_sheet_store};
pub use sqlite_sheet_store::SqliteSheetStore;
