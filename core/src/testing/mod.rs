//! Testing utilities
//!
//! In-memory capture of log events, so tests can check what the data layer
//! reported and in which order.
//!
//! # Example
//!
//! ```ignore
//! let capture = LogCapture::new();
//! capture.with(|| add_device_to_multicast_group(&ctx, &conn, &dev_eui, &group_id))?;
//! assert_eq!(capture.events_with_message("device added to multicast-group").len(), 1);
//! ```

pub mod log_capture;

pub use log_capture::{CapturedEvent, LogCapture};
