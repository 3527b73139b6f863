//! Device EUI key
//!
//! An 8-byte end-device identifier. It is always bound to SQL as its raw
//! bytes and shown as lowercase hex.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Length of a DevEUI in bytes
pub const DEV_EUI_LEN: usize = 8;

/// 8-byte device identifier (EUI-64)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DevEui([u8; DEV_EUI_LEN]);

impl DevEui {
    pub const fn new(bytes: [u8; DEV_EUI_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw bytes, as stored in the `dev_eui` column
    pub fn as_bytes(&self) -> &[u8; DEV_EUI_LEN] {
        &self.0
    }

    /// Build from a stored blob, rejecting anything that isn't 8 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyParseError> {
        let arr: [u8; DEV_EUI_LEN] = bytes
            .try_into()
            .map_err(|_| KeyParseError::InvalidLength(bytes.len()))?;
        Ok(Self(arr))
    }
}

impl From<[u8; DEV_EUI_LEN]> for DevEui {
    fn from(bytes: [u8; DEV_EUI_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for DevEui {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for DevEui {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DevEui({})", hex::encode(self.0))
    }
}

impl FromStr for DevEui {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        Self::from_slice(&bytes)
    }
}

/// Errors from decoding a [`DevEui`]
#[derive(Debug, Error)]
pub enum KeyParseError {
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("expected 8 bytes, got {0}")]
    InvalidLength(usize),
}
