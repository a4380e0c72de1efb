//! (De)serializes [`U256`] as a decimal string.
//!
//! Wire amounts are decimal strings of non-negative integers in the
//! smallest native unit; the default [`U256`] serde form is 0x-hex, which
//! callers of the command surface do not speak.

use alloy::primitives::U256;
use serde::{Deserialize, Deserializer, Serializer, de::Error};

/// Serializes a [`U256`] as a decimal string.
pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Deserializes a decimal string into a [`U256`].
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
    let raw = String::deserialize(deserializer)?;
    U256::from_str_radix(raw.trim(), 10)
        .map_err(|err| D::Error::custom(format!("invalid decimal amount `{raw}`: {err}")))
}
