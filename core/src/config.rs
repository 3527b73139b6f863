//! Store configuration

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for opening the membership database
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the database file
    /// If None, an in-memory database is used
    pub db_path: Option<PathBuf>,

    /// How long a statement waits on a locked database before failing
    /// Default: 5 seconds
    pub busy_timeout: Duration,

    /// Enable WAL journal mode (file databases only)
    /// Default: true
    pub wal: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            busy_timeout: Duration::from_secs(5),
            wal: true,
        }
    }
}

impl StoreConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the database path
    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = Some(path.into());
        self
    }

    /// Set the busy timeout
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Disable WAL journal mode
    pub fn without_wal(mut self) -> Self {
        self.wal = false;
        self
    }

    /// In-memory database with a short busy timeout
    pub fn for_testing() -> Self {
        Self {
            db_path: None,
            busy_timeout: Duration::from_millis(500),
            wal: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert!(config.db_path.is_none());
        assert_eq!(config.busy_timeout, Duration::from_secs(5));
        assert!(config.wal);
    }

    #[test]
    fn test_builder() {
        let config = StoreConfig::new()
            .with_db_path("/tmp/multicast.db")
            .with_busy_timeout(Duration::from_secs(1))
            .without_wal();

        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/multicast.db")));
        assert_eq!(config.busy_timeout, Duration::from_secs(1));
        assert!(!config.wal);
    }

    #[test]
    fn test_for_testing() {
        let config = StoreConfig::for_testing();
        assert!(config.db_path.is_none());
        assert!(!config.wal);
    }
}
