//! Per-request context
//!
//! Carries the correlation id that ends up in log events and the caller's
//! cancellation token. Data-layer functions check the token before every
//! statement they run.

use rusqlite::ffi;
use tokio_util::sync::CancellationToken;

/// Context passed by the caller into every store operation
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    id: Option<String>,
    cancel: CancellationToken,
}

impl RequestContext {
    /// Context with no correlation id and a fresh token
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the correlation id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Use the caller's cancellation token
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Correlation id, logged as `ctx_id`
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Fail with the engine's interrupt error once the token is cancelled
    pub fn check_cancelled(&self) -> rusqlite::Result<()> {
        if self.cancel.is_cancelled() {
            return Err(rusqlite::Error::SqliteFailure(
                ffi::Error::new(ffi::SQLITE_INTERRUPT),
                Some("request cancelled".to_string()),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_context() {
        let ctx = RequestContext::new();
        assert_eq!(ctx.id(), None);
        assert!(!ctx.is_cancelled());
        assert!(ctx.check_cancelled().is_ok());
    }

    #[test]
    fn test_with_id() {
        let ctx = RequestContext::new().with_id("req-42");
        assert_eq!(ctx.id(), Some("req-42"));
    }

    #[test]
    fn test_cancelled_context_reports_interrupt() {
        let token = CancellationToken::new();
        let ctx = RequestContext::new().with_cancellation(token.clone());

        token.cancel();

        assert!(ctx.is_cancelled());
        let err = ctx.check_cancelled().unwrap_err();
        assert_eq!(
            err.sqlite_error_code(),
            Some(rusqlite::ErrorCode::OperationInterrupted)
        );
    }

    #[test]
    fn test_clones_share_token() {
        let ctx = RequestContext::new().with_id("a");
        let clone = ctx.clone();

        ctx.cancellation_token().cancel();
        assert!(clone.is_cancelled());
    }
}
