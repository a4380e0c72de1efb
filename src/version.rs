//! Escrow relay version.

/// The version reported by the `escrow_health` method.
pub const SHORT_VERSION: &str = env!("CARGO_PKG_VERSION");
