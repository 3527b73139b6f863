//! Multicast data layer
//!
//! Handles persistence for device to multicast-group membership.

pub mod dev_eui;
pub mod membership;

// Re-export commonly used items
pub use dev_eui::{DevEui, KeyParseError, DEV_EUI_LEN};
pub use membership::{
    add_device_to_multicast_group, batch_add_devices_to_multicast_group,
    get_dev_euis_for_multicast_group, get_device_multicast_group,
    get_multicast_group_member_count, get_multicast_groups_for_dev_eui,
    is_device_in_multicast_group, remove_device_from_multicast_group, DeviceMulticastGroup,
};
