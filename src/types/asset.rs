//! Ledger addresses and asset selectors.

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::{fmt, str::FromStr};

/// An external-ledger account address in its chain-native string form.
///
/// For XRPL this is a classic address (`r…`); no structural validation
/// happens here, the ledger adapter is the authority on well-formedness.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedgerAddress(String);

impl LedgerAddress {
    /// Wraps a chain-native address string.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// The address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the address is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for LedgerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LedgerAddress {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

/// Asset selector: the ledger's native asset or an issued currency.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssetId {
    /// The native asset, denominated in its smallest unit (drops for XRP).
    Native,
    /// An issued currency identified by code and issuing account.
    Issued {
        /// Currency code, e.g. `USD`.
        currency: String,
        /// Issuing account.
        issuer: LedgerAddress,
    },
}

impl AssetId {
    /// The string sentinel selecting the native asset.
    pub const NATIVE: &str = "xrp";

    /// Whether this selects the native asset.
    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => f.write_str(Self::NATIVE),
            Self::Issued { currency, issuer } => write!(f, "{currency}/{issuer}"),
        }
    }
}

impl FromStr for AssetId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case(Self::NATIVE) {
            return Ok(Self::Native);
        }
        match s.split_once('/') {
            Some((currency, issuer)) if !currency.is_empty() && !issuer.is_empty() => {
                Ok(Self::Issued {
                    currency: currency.to_string(),
                    issuer: LedgerAddress::new(issuer),
                })
            }
            _ => Err(format!("invalid asset selector `{s}`, expected `xrp` or `CODE/issuer`")),
        }
    }
}

impl Serialize for AssetId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AssetId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
