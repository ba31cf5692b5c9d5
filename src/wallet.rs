//! Structs representing the wallet's spendable notes and UTXOs, and the
//! greedy selection that limits them to a target amount.

use std::collections::BTreeSet;
use std::fmt;

use crate::address::{
    OrchardRawAddress, PoolType, SaplingPaymentAddress, SproutPaymentAddress, TransparentAddress,
};
use crate::value::Zatoshis;

/// A transaction identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TxId(pub [u8; 32]);

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The (byte-flipped) hex string is more useful than the raw bytes,
        // because we can use it to look up the tx in a block explorer.
        for b in self.0.iter().rev() {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

/// A reference to a transparent transaction output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OutPoint {
    pub hash: TxId,
    pub n: u32,
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hash, self.n)
    }
}

/// A reference to a Sapling note commitment within a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SaplingOutPoint {
    pub hash: TxId,
    pub n: u32,
}

impl fmt::Display for SaplingOutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hash, self.n)
    }
}

/// A reference to a Sprout note: a joinsplit index and an output index within
/// that joinsplit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JsOutPoint {
    pub hash: TxId,
    pub js: u64,
    pub n: u8,
}

/// A reference to an Orchard note: the index of the action that created it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrchardOutPoint {
    pub hash: TxId,
    pub action: u32,
}

/// A transparent transaction output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxOut {
    pub value: Zatoshis,
    pub recipient_address: TransparentAddress,
}

impl TxOut {
    /// The serialized size of this output: an 8-byte value, a script length
    /// byte, and the script itself.
    pub fn serialized_size(&self) -> usize {
        match self.recipient_address {
            TransparentAddress::PublicKeyHash(_) => 8 + 1 + 25,
            TransparentAddress::ScriptHash(_) => 8 + 1 + 23,
        }
    }
}

/// A transparent UTXO spendable by the wallet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalletTransparentOutput {
    pub outpoint: OutPoint,
    pub txout: TxOut,
    pub is_coinbase: bool,
}

impl WalletTransparentOutput {
    pub fn value(&self) -> Zatoshis {
        self.txout.value
    }
}

/// A Sprout note spendable by the wallet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SproutNoteEntry {
    pub outpoint: JsOutPoint,
    pub address: SproutPaymentAddress,
    pub value: Zatoshis,
}

/// A Sapling note spendable by the wallet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaplingNoteEntry {
    pub outpoint: SaplingOutPoint,
    pub address: SaplingPaymentAddress,
    pub value: Zatoshis,
}

/// Metadata for an Orchard note spendable by the wallet. Spend authorization
/// data is looked up separately, against a specific anchor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrchardNoteMetadata {
    pub outpoint: OrchardOutPoint,
    pub address: OrchardRawAddress,
    pub value: Zatoshis,
}

/// A Merkle root of the Sapling note commitment tree at some block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaplingAnchor(pub [u8; 32]);

/// A Merkle root of the Sprout note commitment tree at some block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SproutAnchor(pub [u8; 32]);

/// A Merkle root of the Orchard note commitment tree at some block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrchardAnchor(pub [u8; 32]);

/// An authentication path for a Sapling note, valid against a corresponding
/// [`SaplingAnchor`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaplingWitness(pub [u8; 32]);

/// An authentication path for a Sprout note.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SproutWitness(pub [u8; 32]);

/// The data required to spend an Orchard note: its value and the Merkle path
/// to the anchor the spend will be proven against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrchardSpendInfo {
    value: Zatoshis,
    merkle_path: [u8; 32],
}

impl OrchardSpendInfo {
    pub fn from_parts(value: Zatoshis, merkle_path: [u8; 32]) -> Self {
        OrchardSpendInfo { value, merkle_path }
    }

    pub fn value(&self) -> Zatoshis {
        self.value
    }
}

/// The set of notes and UTXOs from which a transaction's inputs may be drawn,
/// segregated by pool.
#[derive(Clone, Debug, Default)]
pub struct SpendableInputs {
    pub utxos: Vec<WalletTransparentOutput>,
    pub sprout_notes: Vec<SproutNoteEntry>,
    pub sapling_notes: Vec<SaplingNoteEntry>,
    pub orchard_notes: Vec<OrchardNoteMetadata>,
}

fn pool_total(values: impl Iterator<Item = Zatoshis>) -> Zatoshis {
    values
        .sum::<Option<Zatoshis>>()
        .expect("spendable totals are within the valid monetary range")
}

impl SpendableInputs {
    /// Returns the total value spendable across all pools.
    pub fn total(&self) -> Zatoshis {
        pool_total(
            [
                self.transparent_total(),
                self.sprout_total(),
                self.sapling_total(),
                self.orchard_total(),
            ]
            .into_iter(),
        )
    }

    /// Returns the total value of the transparent UTXOs.
    pub fn transparent_total(&self) -> Zatoshis {
        pool_total(self.utxos.iter().map(|u| u.value()))
    }

    /// Returns the total value of the Sprout notes.
    pub fn sprout_total(&self) -> Zatoshis {
        pool_total(self.sprout_notes.iter().map(|n| n.value))
    }

    /// Returns the total value of the Sapling notes.
    pub fn sapling_total(&self) -> Zatoshis {
        pool_total(self.sapling_notes.iter().map(|n| n.value))
    }

    /// Returns the total value of the Orchard notes.
    pub fn orchard_total(&self) -> Zatoshis {
        pool_total(self.orchard_notes.iter().map(|n| n.value))
    }

    /// Returns whether any of the transparent UTXOs is a coinbase output.
    pub fn has_transparent_coinbase(&self) -> bool {
        self.utxos.iter().any(|u| u.is_coinbase)
    }

    /// Reduces this set to a subset whose total is at least `target`, while
    /// attempting to avoid selections that would produce a nonzero change
    /// amount below `dust_threshold`.
    ///
    /// The walk prefers inputs from pools that already appear among the
    /// transaction's recipients, so that value need not cross a pool
    /// boundary; it then drains the legacy Sprout pool, and finally shields
    /// opportunistically from the remaining pools in ascending privacy order.
    /// Larger notes are taken first within a pool.
    ///
    /// Returns `true` if a selection was found, in which case this set has
    /// been reduced to exactly that selection. Otherwise returns `false` and
    /// leaves the set unmodified.
    pub fn limit_to_amount(
        &mut self,
        target: Zatoshis,
        dust_threshold: Zatoshis,
        recipient_pools: &BTreeSet<PoolType>,
    ) -> bool {
        #[derive(Clone, Copy)]
        enum InputRef {
            Utxo(usize),
            Sprout(usize),
            Sapling(usize),
            Orchard(usize),
        }

        let mut pool_order: Vec<PoolType> = Vec::with_capacity(4);
        for pool in [PoolType::Orchard, PoolType::Sapling, PoolType::Transparent] {
            if recipient_pools.contains(&pool) {
                pool_order.push(pool);
            }
        }
        for pool in [
            PoolType::Sprout,
            PoolType::Transparent,
            PoolType::Sapling,
            PoolType::Orchard,
        ] {
            if !pool_order.contains(&pool) {
                pool_order.push(pool);
            }
        }

        let mut candidates: Vec<(InputRef, u64)> = Vec::new();
        for pool in pool_order {
            let mut entries: Vec<(InputRef, u64)> = match pool {
                PoolType::Transparent => self
                    .utxos
                    .iter()
                    .enumerate()
                    .map(|(i, u)| (InputRef::Utxo(i), u.value().into_u64()))
                    .collect(),
                PoolType::Sprout => self
                    .sprout_notes
                    .iter()
                    .enumerate()
                    .map(|(i, n)| (InputRef::Sprout(i), n.value.into_u64()))
                    .collect(),
                PoolType::Sapling => self
                    .sapling_notes
                    .iter()
                    .enumerate()
                    .map(|(i, n)| (InputRef::Sapling(i), n.value.into_u64()))
                    .collect(),
                PoolType::Orchard => self
                    .orchard_notes
                    .iter()
                    .enumerate()
                    .map(|(i, n)| (InputRef::Orchard(i), n.value.into_u64()))
                    .collect(),
            };
            entries.sort_by(|(_, a), (_, b)| b.cmp(a));
            candidates.extend(entries);
        }

        let target = target.into_u64();
        let dust = dust_threshold.into_u64();

        let mut selected_total: u64 = 0;
        let mut selected_count = 0;
        for (_, value) in &candidates {
            if selected_total >= target {
                let change = selected_total - target;
                if change == 0 || change >= dust {
                    break;
                }
                // The prospective change is dust; consume further inputs
                // until it grows past the threshold.
            }
            selected_total += value;
            selected_count += 1;
        }

        if selected_total < target {
            return false;
        }
        let change = selected_total - target;
        if change != 0 && change < dust {
            return false;
        }

        let mut keep_utxos = vec![false; self.utxos.len()];
        let mut keep_sprout = vec![false; self.sprout_notes.len()];
        let mut keep_sapling = vec![false; self.sapling_notes.len()];
        let mut keep_orchard = vec![false; self.orchard_notes.len()];
        for (input, _) in candidates.into_iter().take(selected_count) {
            match input {
                InputRef::Utxo(i) => keep_utxos[i] = true,
                InputRef::Sprout(i) => keep_sprout[i] = true,
                InputRef::Sapling(i) => keep_sapling[i] = true,
                InputRef::Orchard(i) => keep_orchard[i] = true,
            }
        }

        let mut utxos = keep_utxos.into_iter();
        self.utxos.retain(|_| utxos.next().unwrap_or(false));
        let mut sprout = keep_sprout.into_iter();
        self.sprout_notes.retain(|_| sprout.next().unwrap_or(false));
        let mut sapling = keep_sapling.into_iter();
        self.sapling_notes
            .retain(|_| sapling.next().unwrap_or(false));
        let mut orchard = keep_orchard.into_iter();
        self.orchard_notes
            .retain(|_| orchard.next().unwrap_or(false));

        true
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crate::address::{
        OrchardRawAddress, PoolType, SaplingPaymentAddress, TransparentAddress,
    };
    use crate::value::Zatoshis;

    use super::{
        OrchardNoteMetadata, OrchardOutPoint, OutPoint, SaplingNoteEntry, SaplingOutPoint,
        SpendableInputs, TxId, TxOut, WalletTransparentOutput,
    };

    fn utxo(seed: u8, value: u64, is_coinbase: bool) -> WalletTransparentOutput {
        WalletTransparentOutput {
            outpoint: OutPoint {
                hash: TxId([seed; 32]),
                n: 0,
            },
            txout: TxOut {
                value: Zatoshis::const_from_u64(value),
                recipient_address: TransparentAddress::PublicKeyHash([seed; 20]),
            },
            is_coinbase,
        }
    }

    fn sapling_note(seed: u8, value: u64) -> SaplingNoteEntry {
        SaplingNoteEntry {
            outpoint: SaplingOutPoint {
                hash: TxId([seed; 32]),
                n: 0,
            },
            address: SaplingPaymentAddress([seed; 43]),
            value: Zatoshis::const_from_u64(value),
        }
    }

    fn orchard_note(seed: u8, value: u64) -> OrchardNoteMetadata {
        OrchardNoteMetadata {
            outpoint: OrchardOutPoint {
                hash: TxId([seed; 32]),
                action: 0,
            },
            address: OrchardRawAddress([seed; 43]),
            value: Zatoshis::const_from_u64(value),
        }
    }

    #[test]
    fn totals() {
        let spendable = SpendableInputs {
            utxos: vec![utxo(1, 10_000, false), utxo(2, 20_000, true)],
            sapling_notes: vec![sapling_note(3, 5_000)],
            orchard_notes: vec![orchard_note(4, 7_000)],
            ..Default::default()
        };
        assert_eq!(spendable.transparent_total(), Zatoshis::const_from_u64(30_000));
        assert_eq!(spendable.sapling_total(), Zatoshis::const_from_u64(5_000));
        assert_eq!(spendable.orchard_total(), Zatoshis::const_from_u64(7_000));
        assert_eq!(spendable.total(), Zatoshis::const_from_u64(42_000));
        assert!(spendable.has_transparent_coinbase());
    }

    #[test]
    fn limit_prefers_recipient_pools() {
        let mut spendable = SpendableInputs {
            utxos: vec![utxo(1, 100_000, false)],
            sapling_notes: vec![sapling_note(2, 100_000)],
            ..Default::default()
        };
        let recipient_pools: BTreeSet<PoolType> = [PoolType::Sapling].into_iter().collect();
        assert!(spendable.limit_to_amount(
            Zatoshis::const_from_u64(50_000),
            Zatoshis::const_from_u64(54),
            &recipient_pools,
        ));
        // The Sapling note alone covers the target, so the UTXO is dropped.
        assert!(spendable.utxos.is_empty());
        assert_eq!(spendable.sapling_notes.len(), 1);
    }

    #[test]
    fn limit_takes_larger_notes_first() {
        let mut spendable = SpendableInputs {
            sapling_notes: vec![
                sapling_note(1, 10_000),
                sapling_note(2, 80_000),
                sapling_note(3, 40_000),
            ],
            ..Default::default()
        };
        assert!(spendable.limit_to_amount(
            Zatoshis::const_from_u64(100_000),
            Zatoshis::const_from_u64(54),
            &BTreeSet::new(),
        ));
        assert_eq!(spendable.sapling_notes.len(), 2);
        assert_eq!(
            spendable.sapling_total(),
            Zatoshis::const_from_u64(120_000)
        );
    }

    #[test]
    fn limit_consumes_extra_inputs_to_escape_dust_change() {
        let mut spendable = SpendableInputs {
            sapling_notes: vec![sapling_note(1, 100_010), sapling_note(2, 1_000)],
            ..Default::default()
        };
        // Selecting only the first note leaves 10 zatoshis of change, which
        // is below the dust threshold; the walk must take the second note.
        assert!(spendable.limit_to_amount(
            Zatoshis::const_from_u64(100_000),
            Zatoshis::const_from_u64(54),
            &BTreeSet::new(),
        ));
        assert_eq!(spendable.sapling_notes.len(), 2);
    }

    #[test]
    fn limit_fails_without_sufficient_funds() {
        let mut spendable = SpendableInputs {
            sapling_notes: vec![sapling_note(1, 10_000)],
            ..Default::default()
        };
        let before = spendable.clone();
        assert!(!spendable.limit_to_amount(
            Zatoshis::const_from_u64(10_001),
            Zatoshis::const_from_u64(54),
            &BTreeSet::new(),
        ));
        // Failure leaves the set untouched.
        assert_eq!(spendable.sapling_notes, before.sapling_notes);
    }

    #[test]
    fn limit_fails_when_change_is_unavoidably_dust() {
        let mut spendable = SpendableInputs {
            sapling_notes: vec![sapling_note(1, 100_010)],
            ..Default::default()
        };
        assert!(!spendable.limit_to_amount(
            Zatoshis::const_from_u64(100_000),
            Zatoshis::const_from_u64(54),
            &BTreeSet::new(),
        ));
        assert_eq!(spendable.sapling_notes.len(), 1);
    }

    #[test]
    fn limit_exact_consumption_is_valid() {
        let mut spendable = SpendableInputs {
            utxos: vec![utxo(1, 100_000, true)],
            ..Default::default()
        };
        assert!(spendable.limit_to_amount(
            Zatoshis::const_from_u64(100_000),
            Zatoshis::const_from_u64(54),
            &BTreeSet::new(),
        ));
        assert_eq!(spendable.utxos.len(), 1);
    }
}
