//! Data layer for the multicast membership DB
//!
//! Provides storage and retrieval for:
//! - Device to multicast-group membership
//!
//! Organized by domain:
//! - `multicast/` - Membership rows and the device key type
//! - `error` - Error taxonomy shared by every storage call
//! - `schema` / `start` - Table creation and database startup

pub mod error;
pub mod multicast;
pub mod schema;
pub mod start;

use std::time::{SystemTime, UNIX_EPOCH};

// Re-export commonly used items from multicast/
pub use multicast::{
    add_device_to_multicast_group, batch_add_devices_to_multicast_group,
    get_dev_euis_for_multicast_group, get_device_multicast_group,
    get_multicast_group_member_count, get_multicast_groups_for_dev_eui,
    is_device_in_multicast_group, remove_device_from_multicast_group, DevEui,
    DeviceMulticastGroup, KeyParseError,
};

// Re-export commonly used items from error
pub use error::{handle_sqlite_error, StoreError};

// Re-export commonly used items from schema
pub use schema::create_all_tables;

// Re-export commonly used items from start
pub use start::{start_db, start_memory_db, StartError};

/// Get current Unix timestamp in milliseconds
///
/// Returns 0 if system clock is before Unix epoch (should never happen
/// on properly configured systems, but avoids panic).
pub fn current_timestamp_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
