pub mod config;
pub mod license;
pub mod manifest;
pub mod matcher;
pub mod output;
pub mod scanner;

// Re-export main types for easy access
pub use config::{Config, ConfigFileOutcome, LoadedConfig, SortOrder};
pub use license::{EmbeddedTexts, UNKNOWN_LICENSE};
pub use scanner::{PackageRecord, ScanReport, SkipReason, SkippedEntry};
