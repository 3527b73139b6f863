//! Multicast Core
//!
//! Persistence for the many-to-many relationship between end-devices and
//! multicast groups in a network server.
//!
//! # Module Structure
//!
//! - `data/`: SQLite persistence (membership operations, schema, startup, errors)
//! - `context`: Per-request correlation id and cancellation
//! - `config`: Database configuration
//! - `logging`: Log subscriber setup
//! - `testing/`: Test utilities
//!
//! # Quick Start
//!
//! ```ignore
//! use multicast_core::{start_db, StoreConfig, RequestContext};
//! use multicast_core::data::{
//!     batch_add_devices_to_multicast_group, get_dev_euis_for_multicast_group,
//! };
//!
//! let mut conn = start_db(&StoreConfig::new().with_db_path("multicast.db"))?;
//! let ctx = RequestContext::new().with_id("req-1");
//!
//! batch_add_devices_to_multicast_group(&ctx, &mut conn, &dev_euis, &group_id)?;
//! let members = get_dev_euis_for_multicast_group(&ctx, &conn, &group_id)?;
//! ```

pub mod config;
pub mod context;
pub mod data;
pub mod logging;
pub mod testing;

// Re-export main API types for convenience
pub use config::StoreConfig;
pub use context::RequestContext;
pub use data::{
    start_db, start_memory_db, DevEui, DeviceMulticastGroup, KeyParseError, StartError,
    StoreError,
};
pub use logging::init_logging;
pub use uuid::Uuid;
