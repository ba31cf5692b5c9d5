//! The [ZIP 317] conventional fee calculation.
//!
//! The fee is a pure function of transaction shape: the serialized sizes of
//! the transparent inputs and outputs, and the counts of each kind of
//! shielded component.
//!
//! [ZIP 317]: https://zips.z.cash/zip-0317

use std::cmp::max;

use crate::value::{BalanceError, Zatoshis};

/// The standard [ZIP 317] marginal fee.
///
/// [ZIP 317]: https://zips.z.cash/zip-0317
pub const MARGINAL_FEE: Zatoshis = Zatoshis::const_from_u64(5_000);

/// The minimum number of logical actions that must be paid for according to
/// [ZIP 317].
///
/// [ZIP 317]: https://zips.z.cash/zip-0317
pub const GRACE_ACTIONS: usize = 2;

/// The standard size of a P2PKH input, in bytes, according to [ZIP 317].
///
/// [ZIP 317]: https://zips.z.cash/zip-0317
pub const P2PKH_STANDARD_INPUT_SIZE: usize = 150;

/// The standard size of a P2PKH output, in bytes, according to [ZIP 317].
///
/// [ZIP 317]: https://zips.z.cash/zip-0317
pub const P2PKH_STANDARD_OUTPUT_SIZE: usize = 34;

/// The minimum conventional fee computed from the standard [ZIP 317]
/// constants. Equivalent to `MARGINAL_FEE * GRACE_ACTIONS`.
///
/// [ZIP 317]: https://zips.z.cash/zip-0317
pub const MINIMUM_FEE: Zatoshis = Zatoshis::const_from_u64(10_000);

/// Computes the number of logical actions in a transaction with the given
/// shape.
///
/// Transparent contributions are measured in units of the standard P2PKH
/// sizes, rounding up; each joinsplit counts as two actions; Sapling spends
/// and outputs are netted against one another.
pub fn logical_action_count(
    tx_in_total_size: usize,
    tx_out_total_size: usize,
    joinsplit_count: usize,
    sapling_spend_count: usize,
    sapling_output_count: usize,
    orchard_action_count: usize,
) -> usize {
    let ceildiv = |num: usize, den: usize| (num + den - 1) / den;

    max(
        ceildiv(tx_in_total_size, P2PKH_STANDARD_INPUT_SIZE),
        ceildiv(tx_out_total_size, P2PKH_STANDARD_OUTPUT_SIZE),
    ) + 2 * joinsplit_count
        + max(sapling_spend_count, sapling_output_count)
        + orchard_action_count
}

/// Computes the conventional fee for a transaction with the given number of
/// logical actions: `MARGINAL_FEE` per action, with a floor of
/// `GRACE_ACTIONS` actions.
pub fn conventional_fee(logical_action_count: usize) -> Result<Zatoshis, BalanceError> {
    (MARGINAL_FEE * max(GRACE_ACTIONS, logical_action_count)).ok_or(BalanceError::Overflow)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{
        conventional_fee, logical_action_count, GRACE_ACTIONS, MARGINAL_FEE, MINIMUM_FEE,
        P2PKH_STANDARD_INPUT_SIZE, P2PKH_STANDARD_OUTPUT_SIZE,
    };
    use crate::value::Zatoshis;

    #[test]
    fn fee_has_grace_floor() {
        assert_eq!(conventional_fee(0), Ok(MINIMUM_FEE));
        assert_eq!(conventional_fee(1), Ok(MINIMUM_FEE));
        assert_eq!(conventional_fee(2), Ok(MINIMUM_FEE));
        assert_eq!(conventional_fee(3), Ok(Zatoshis::const_from_u64(15_000)));
    }

    #[test]
    fn transparent_sizes_round_up() {
        // One standard input and one standard output net to one logical action.
        assert_eq!(
            logical_action_count(
                P2PKH_STANDARD_INPUT_SIZE,
                P2PKH_STANDARD_OUTPUT_SIZE,
                0,
                0,
                0,
                0
            ),
            1
        );
        // A single extra byte of input data rounds up to a second action.
        assert_eq!(
            logical_action_count(P2PKH_STANDARD_INPUT_SIZE + 1, 0, 0, 0, 0, 0),
            2
        );
    }

    #[test]
    fn shielded_components() {
        // Sapling spends and outputs net against one another.
        assert_eq!(logical_action_count(0, 0, 0, 3, 2, 0), 3);
        assert_eq!(logical_action_count(0, 0, 0, 2, 3, 0), 3);
        // Joinsplits cost two actions apiece; Orchard actions cost one.
        assert_eq!(logical_action_count(0, 0, 2, 0, 0, 4), 8);
    }

    proptest! {
        #[test]
        fn fee_is_marginal_fee_times_actions(n in 0usize..100_000) {
            let expected = MARGINAL_FEE * core::cmp::max(GRACE_ACTIONS, n);
            prop_assert_eq!(conventional_fee(n).ok(), expected);
        }
    }
}
