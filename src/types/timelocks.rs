//! Packed timelock word shared with the EVM escrow contract.
//!
//! Seven 32-bit second-offsets plus a 32-bit deployment timestamp are
//! packed into a single 256-bit word. The bit layout is normative: it must
//! stay compatible with the counterpart contract on the EVM leg, which
//! reads the same word.

use crate::error::EscrowError;
use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

/// Number of phase offsets packed into the timelock word.
pub const STAGE_COUNT: usize = 7;

/// A phase of the escrow lifecycle.
///
/// The discriminant doubles as the index of the phase's 32-bit slot in the
/// packed word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    /// Taker may withdraw on the source chain.
    SrcWithdrawal = 0,
    /// Anyone may withdraw on the source chain.
    SrcPublicWithdrawal = 1,
    /// Taker may cancel on the source chain.
    SrcCancellation = 2,
    /// Anyone may cancel on the source chain.
    SrcPublicCancellation = 3,
    /// Taker may withdraw on the destination chain.
    DstWithdrawal = 4,
    /// Anyone may withdraw on the destination chain.
    DstPublicWithdrawal = 5,
    /// Taker may cancel on the destination chain.
    DstCancellation = 6,
}

impl Stage {
    /// All stages, in slot order.
    pub const ALL: [Self; STAGE_COUNT] = [
        Self::SrcWithdrawal,
        Self::SrcPublicWithdrawal,
        Self::SrcCancellation,
        Self::SrcPublicCancellation,
        Self::DstWithdrawal,
        Self::DstPublicWithdrawal,
        Self::DstCancellation,
    ];

    const fn bit_offset(self) -> usize {
        self as usize * 32
    }
}

/// The packed timelock word.
///
/// Bits `[32 * stage .. 32 * stage + 32)` hold the seconds offset of
/// `stage` relative to deployment; bits `[224..256)` hold the deployment
/// timestamp. The coordinator overwrites the embedded timestamp with a
/// freshly captured one at creation via [`Timelocks::with_deployed_at`];
/// the encoder-side value is never read back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timelocks(U256);

impl Timelocks {
    const DEPLOYED_AT_SHIFT: usize = 224;

    /// Wraps a packed word.
    pub const fn new(packed: U256) -> Self {
        Self(packed)
    }

    /// Builds a packed word from a deployment timestamp and per-stage
    /// offsets in slot order.
    pub fn from_offsets(deployed_at: u64, offsets: [u32; STAGE_COUNT]) -> Self {
        let mut packed = U256::ZERO;
        for (stage, offset) in Stage::ALL.into_iter().zip(offsets) {
            packed |= U256::from(offset) << stage.bit_offset();
        }
        Self(packed).with_deployed_at(deployed_at)
    }

    /// The raw 256-bit word.
    pub const fn packed(&self) -> U256 {
        self.0
    }

    /// Seconds offset of `stage` relative to deployment.
    pub fn offset(&self, stage: Stage) -> u32 {
        ((self.0 >> stage.bit_offset()) & U256::from(u32::MAX)).to::<u32>()
    }

    /// The deployment timestamp stored in the top 32 bits.
    pub fn deployed_at(&self) -> u64 {
        (self.0 >> Self::DEPLOYED_AT_SHIFT).to::<u64>()
    }

    /// Returns a copy with the top 32 bits replaced by `timestamp`.
    ///
    /// The lower 224 bits (the offsets) are preserved unchanged.
    pub fn with_deployed_at(self, timestamp: u64) -> Self {
        let offsets = self.0 & (U256::MAX >> 32);
        Self(offsets | (U256::from(timestamp & u64::from(u32::MAX)) << Self::DEPLOYED_AT_SHIFT))
    }

    /// Absolute Unix time at which `stage` opens.
    pub fn stage_time(&self, stage: Stage) -> u64 {
        self.deployed_at() + u64::from(self.offset(stage))
    }

    /// Checks that offsets are monotone within each side of the swap.
    ///
    /// Source phases must satisfy withdrawal ≤ public withdrawal ≤
    /// cancellation ≤ public cancellation, and destination phases
    /// withdrawal ≤ public withdrawal ≤ cancellation. Offsets across sides
    /// are independent.
    pub fn validate(&self) -> Result<(), EscrowError> {
        let ordered = |stages: &[Stage]| {
            stages.windows(2).all(|pair| self.offset(pair[0]) <= self.offset(pair[1]))
        };

        if !ordered(&[
            Stage::SrcWithdrawal,
            Stage::SrcPublicWithdrawal,
            Stage::SrcCancellation,
            Stage::SrcPublicCancellation,
        ]) {
            return Err(EscrowError::InvalidParameters(
                "source timelock offsets must be non-decreasing".to_string(),
            ));
        }
        if !ordered(&[Stage::DstWithdrawal, Stage::DstPublicWithdrawal, Stage::DstCancellation]) {
            return Err(EscrowError::InvalidParameters(
                "destination timelock offsets must be non-decreasing".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<U256> for Timelocks {
    fn from(packed: U256) -> Self {
        Self::new(packed)
    }
}

/// Absolute per-phase schedule derived from a packed word.
///
/// This is the wire view returned to callers; all values are Unix seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelockSchedule {
    /// Timestamp captured when the escrow was created.
    pub deployed_at: u64,
    /// Source-chain private withdrawal opens.
    pub src_withdrawal: u64,
    /// Source-chain public withdrawal opens.
    pub src_public_withdrawal: u64,
    /// Source-chain private cancellation opens.
    pub src_cancellation: u64,
    /// Source-chain public cancellation opens.
    pub src_public_cancellation: u64,
    /// Destination-chain private withdrawal opens.
    pub dst_withdrawal: u64,
    /// Destination-chain public withdrawal opens.
    pub dst_public_withdrawal: u64,
    /// Destination-chain cancellation opens.
    pub dst_cancellation: u64,
}

impl From<Timelocks> for TimelockSchedule {
    fn from(timelocks: Timelocks) -> Self {
        Self {
            deployed_at: timelocks.deployed_at(),
            src_withdrawal: timelocks.stage_time(Stage::SrcWithdrawal),
            src_public_withdrawal: timelocks.stage_time(Stage::SrcPublicWithdrawal),
            src_cancellation: timelocks.stage_time(Stage::SrcCancellation),
            src_public_cancellation: timelocks.stage_time(Stage::SrcPublicCancellation),
            dst_withdrawal: timelocks.stage_time(Stage::DstWithdrawal),
            dst_public_withdrawal: timelocks.stage_time(Stage::DstPublicWithdrawal),
            dst_cancellation: timelocks.stage_time(Stage::DstCancellation),
        }
    }
}
