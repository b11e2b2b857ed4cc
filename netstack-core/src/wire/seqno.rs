//! 32-bit wrapping sequence numbers and the absolute <-> wrapped conversions
//! every other module in the engine builds on.

use std::fmt;
use std::num::Wrapping;

/// A TCP sequence number: 32 bits, wraps silently, meaningless without an ISN.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct WrappingInt32(Wrapping<u32>);

impl WrappingInt32 {
    pub fn new(raw: u32) -> Self {
        Self(Wrapping(raw))
    }

    pub fn raw_value(self) -> u32 {
        self.0 .0
    }
}

impl fmt::Debug for WrappingInt32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WrappingInt32({})", self.raw_value())
    }
}

impl std::ops::Add<u64> for WrappingInt32 {
    type Output = WrappingInt32;
    fn add(self, rhs: u64) -> WrappingInt32 {
        WrappingInt32(self.0 + Wrapping(rhs as u32))
    }
}

impl std::ops::Add<u32> for WrappingInt32 {
    type Output = WrappingInt32;
    fn add(self, rhs: u32) -> WrappingInt32 {
        WrappingInt32(self.0 + Wrapping(rhs))
    }
}

/// `wrap(abs, isn) = isn + (abs mod 2^32)`.
pub fn wrap(absolute: u64, isn: WrappingInt32) -> WrappingInt32 {
    isn + absolute
}

/// Returns the absolute sequence number closest to `checkpoint` whose low 32
/// bits equal `seq - isn`.
pub fn unwrap(seq: WrappingInt32, isn: WrappingInt32, checkpoint: u64) -> u64 {
    let offset = seq.raw_value().wrapping_sub(isn.raw_value()) as u64;
    const MOD: u64 = 1u64 << 32;

    let base = checkpoint & !(MOD - 1);
    let candidates = [
        base.saturating_sub(MOD) + offset,
        base + offset,
        base + MOD + offset,
    ];

    candidates
        .into_iter()
        .min_by_key(|&c| checkpoint.abs_diff(c))
        .unwrap_or(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_unwrap_roundtrip() {
        let isn = WrappingInt32::new(1_000_000_000);
        for checkpoint in [0u64, 1, 1 << 31, (1u64 << 32) - 1, 1u64 << 33, u64::MAX / 2] {
            let seq = wrap(checkpoint, isn);
            assert_eq!(wrap(unwrap(seq, isn, checkpoint), isn), seq);
        }
    }

    #[test]
    fn unwrap_picks_closest_to_checkpoint() {
        let isn = WrappingInt32::new(0);
        // seq 0 wraps every 2^32; with checkpoint near 3*2^32 the closest
        // absolute value should be 3*2^32, not 0 or 2^32.
        let checkpoint = 3 * (1u64 << 32) + 17;
        let seq = WrappingInt32::new(5);
        assert_eq!(unwrap(seq, isn, checkpoint), 3 * (1u64 << 32) + 5);
    }

    #[test]
    fn wrap_then_unwrap_near_zero() {
        let isn = WrappingInt32::new(u32::MAX - 2);
        let seq = wrap(4, isn);
        assert_eq!(unwrap(seq, isn, 0), 4);
    }
}
