//! Traits through which the planner observes the chain and the wallet.
//!
//! The planner owns no persistent state; everything it learns about spendable
//! funds, keys, and anchors comes through these interfaces, and the only
//! state it mutates is the wallet's input-lock set.

use std::collections::BTreeSet;

use crate::address::{
    PoolType, RecipientAddress, SaplingPaymentAddress, SproutPaymentAddress, UnifiedAddress,
};
use crate::consensus::BlockHeight;
use crate::keys::{
    AccountId, AccountKey, OrchardSpendingKey, SaplingExtendedSpendingKey, SproutSpendingKey,
    UnifiedFullViewingKey, ZtxoSelector,
};
use crate::wallet::{
    JsOutPoint, OrchardAnchor, OrchardNoteMetadata, OrchardSpendInfo, OutPoint, SaplingAnchor,
    SaplingOutPoint, SaplingWitness, SpendableInputs, SproutAnchor, SproutWitness,
};

/// The index entry for a single block in the main chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockIndex {
    hash_final_orchard_root: OrchardAnchor,
}

impl BlockIndex {
    pub fn from_parts(hash_final_orchard_root: OrchardAnchor) -> Self {
        BlockIndex {
            hash_final_orchard_root,
        }
    }

    /// Returns the root of the Orchard note commitment tree as of the end of
    /// this block.
    pub fn hash_final_orchard_root(&self) -> &OrchardAnchor {
        &self.hash_final_orchard_root
    }
}

/// A read-only view of the main chain.
pub trait ChainView {
    /// Returns the height of the chain tip.
    fn height(&self) -> BlockHeight;

    /// Returns the block index entry at the given height, if the height is
    /// within the main chain.
    fn block_index(&self, height: BlockHeight) -> Option<&BlockIndex>;
}

/// Read-only operations the planner requires of the wallet.
pub trait WalletRead {
    /// Returns the transaction version the wallet prefers to produce.
    ///
    /// Versions at or beyond the ZIP 225 version can carry Orchard bundles.
    fn preferred_tx_version(&self) -> u32;

    /// Returns the notes and UTXOs matching the given selector that have at
    /// least `min_depth` confirmations, optionally as of a past chain state.
    fn find_spendable_inputs(
        &self,
        selector: &ZtxoSelector,
        min_depth: u32,
        as_of_height: Option<BlockHeight>,
    ) -> SpendableInputs;

    /// Returns the account to which the funds matched by the given selector
    /// belong, if they belong to a single known account.
    fn find_account_for_selector(&self, selector: &ZtxoSelector) -> Option<AccountId>;

    /// Returns the unified full viewing key from which the given address was
    /// derived, if the wallet recognizes the address.
    fn get_ufvk_for_address(&self, addr: &UnifiedAddress) -> Option<UnifiedFullViewingKey>;

    /// Returns the unified full viewing key for the given account, if any.
    fn get_unified_full_viewing_key_by_account(
        &self,
        account: AccountId,
    ) -> Option<UnifiedFullViewingKey>;

    /// Returns the key for the legacy account.
    fn get_legacy_account_key(&self) -> AccountKey;

    /// Returns the extended spending key for the given Sapling address, if
    /// the wallet holds it.
    fn get_sapling_extended_spending_key(
        &self,
        addr: &SaplingPaymentAddress,
    ) -> Option<SaplingExtendedSpendingKey>;

    /// Returns the spending key for the given Sprout address, if the wallet
    /// holds it.
    fn get_sprout_spending_key(&self, addr: &SproutPaymentAddress) -> Option<SproutSpendingKey>;

    /// Returns witnesses for the given Sapling notes at the given
    /// confirmation depth, together with the anchor they authenticate
    /// against. Returns `None` if the wallet cannot produce witnesses at that
    /// depth at all; individual notes whose witnesses are missing are `None`
    /// within the returned vector.
    fn get_sapling_note_witnesses(
        &self,
        outpoints: &[SaplingOutPoint],
        confirmations: u32,
    ) -> Option<(Vec<Option<SaplingWitness>>, SaplingAnchor)>;

    /// Returns witnesses for the given Sprout notes at the given confirmation
    /// depth, together with the anchor they authenticate against.
    fn get_sprout_note_witnesses(
        &self,
        outpoints: &[JsOutPoint],
        confirmations: u32,
    ) -> Option<(Vec<Option<SproutWitness>>, SproutAnchor)>;

    /// Returns spending keys and spend information for the given Orchard
    /// notes, with Merkle paths computed against the given anchor.
    fn get_orchard_spend_info(
        &self,
        notes: &[OrchardNoteMetadata],
        anchor: &OrchardAnchor,
    ) -> Vec<(OrchardSpendingKey, OrchardSpendInfo)>;
}

/// Operations that mutate wallet state.
pub trait WalletWrite: WalletRead {
    /// Generates a fresh change address for the given account, restricted to
    /// the given pools.
    ///
    /// Returns `None` if the account cannot produce a receiver in any of the
    /// allowed pools.
    fn generate_change_address_for_account(
        &mut self,
        account: AccountId,
        allowed_pools: &BTreeSet<PoolType>,
    ) -> Option<RecipientAddress>;

    /// Marks a transparent UTXO as reserved for a pending transaction.
    fn lock_coin(&mut self, outpoint: &OutPoint);

    /// Releases a transparent UTXO reserved with [`WalletWrite::lock_coin`].
    fn unlock_coin(&mut self, outpoint: &OutPoint);

    /// Marks a Sprout note as reserved for a pending transaction.
    fn lock_sprout_note(&mut self, outpoint: &JsOutPoint);

    /// Releases a Sprout note reserved with [`WalletWrite::lock_sprout_note`].
    fn unlock_sprout_note(&mut self, outpoint: &JsOutPoint);

    /// Marks a Sapling note as reserved for a pending transaction.
    fn lock_sapling_note(&mut self, outpoint: &SaplingOutPoint);

    /// Releases a Sapling note reserved with
    /// [`WalletWrite::lock_sapling_note`].
    fn unlock_sapling_note(&mut self, outpoint: &SaplingOutPoint);
}
