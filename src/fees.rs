//! Fee rates and the dust threshold.

use crate::value::Zatoshis;

pub mod zip317;

/// The serialized size of a P2PKH transaction output, in bytes: an 8-byte
/// value, a 1-byte script length, and a 25-byte script.
const P2PKH_TXOUT_SIZE: usize = 34;

/// The number of bytes added to an output's serialized size to account for
/// the input that will later spend it, when computing the dust threshold:
/// a 36-byte outpoint, a 107-byte scriptSig, and a 4-byte sequence, plus the
/// script length byte.
const SPEND_OVERHEAD_SIZE: usize = 32 + 4 + 1 + 107 + 4;

/// The default minimum relay fee rate, in zatoshis per 1000 bytes.
pub const DEFAULT_MIN_RELAY_FEE_RATE: FeeRate = FeeRate::per_kb(Zatoshis::const_from_u64(100));

/// A fee rate expressed in zatoshis per 1000 bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeeRate {
    per_kb: Zatoshis,
}

impl FeeRate {
    /// Constructs a fee rate paying the given number of zatoshis per 1000
    /// bytes of serialized transaction data.
    pub const fn per_kb(per_kb: Zatoshis) -> Self {
        FeeRate { per_kb }
    }

    /// Returns the fee for the given serialized size at this rate, rounding
    /// down, with a minimum of one zatoshi for a nonzero rate and size.
    pub fn fee_for_size(&self, size: usize) -> Zatoshis {
        let fee = self.per_kb.into_u64() * (size as u64) / 1000;
        if fee == 0 && size != 0 && self.per_kb.is_positive() {
            Zatoshis::const_from_u64(1)
        } else {
            // The quotient cannot exceed `per_kb * size`, which is bounded
            // well below MAX_MONEY for any serializable transaction.
            Zatoshis::from_u64(fee).expect("fee rate quotient is within the monetary range")
        }
    }
}

/// Returns the dust threshold for a hypothetical one-zatoshi P2PKH output at
/// the given minimum relay fee rate.
///
/// An output is uneconomic to spend when the fee for relaying it and the
/// input that consumes it exceeds a third of its value.
pub fn p2pkh_dust_threshold(min_relay_fee: FeeRate) -> Zatoshis {
    let relay_size = P2PKH_TXOUT_SIZE + SPEND_OVERHEAD_SIZE;
    (min_relay_fee.fee_for_size(relay_size) * 3)
        .expect("dust threshold is within the monetary range")
}

#[cfg(test)]
mod tests {
    use super::{p2pkh_dust_threshold, FeeRate, DEFAULT_MIN_RELAY_FEE_RATE};
    use crate::value::Zatoshis;

    #[test]
    fn fee_for_size_rounds_down_with_floor_of_one() {
        let rate = FeeRate::per_kb(Zatoshis::const_from_u64(1000));
        assert_eq!(rate.fee_for_size(182), Zatoshis::const_from_u64(182));

        let small = FeeRate::per_kb(Zatoshis::const_from_u64(1));
        assert_eq!(small.fee_for_size(182), Zatoshis::const_from_u64(1));

        let zero = FeeRate::per_kb(Zatoshis::ZERO);
        assert_eq!(zero.fee_for_size(182), Zatoshis::ZERO);
    }

    #[test]
    fn default_dust_threshold() {
        // 182 relay bytes at 100 zat/kB is 18 zatoshis, tripled.
        assert_eq!(
            p2pkh_dust_threshold(DEFAULT_MIN_RELAY_FEE_RATE),
            Zatoshis::const_from_u64(54)
        );
    }
}
