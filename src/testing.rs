//! Mock implementations of the chain, wallet, and transaction-builder
//! contracts, for use in tests.

use std::collections::{BTreeMap, BTreeSet};

use crate::address::{
    OrchardRawAddress, PoolType, RecipientAddress, SaplingPaymentAddress, SproutPaymentAddress,
    TransparentAddress, UnifiedAddress,
};
use crate::builder::TxBuilder;
use crate::consensus::{BlockHeight, Parameters};
use crate::data_api::{BlockIndex, ChainView, WalletRead, WalletWrite};
use crate::keys::{
    AccountId, AccountKey, AccountPubKey, OrchardFullViewingKey, OrchardSpendingKey,
    OutgoingViewingKey, SaplingDiversifiableFullViewingKey, SaplingExtendedFullViewingKey,
    SaplingExtendedSpendingKey, SproutSpendingKey, UnifiedFullViewingKey, ZtxoSelector,
};
use crate::memo::MemoBytes;
use crate::value::Zatoshis;
use crate::wallet::{
    JsOutPoint, OrchardAnchor, OrchardNoteMetadata, OrchardOutPoint, OrchardSpendInfo, OutPoint,
    SaplingAnchor, SaplingNoteEntry, SaplingOutPoint, SaplingWitness, SpendableInputs,
    SproutAnchor, SproutNoteEntry, SproutWitness, TxId, TxOut, WalletTransparentOutput,
};

pub fn ovk(seed: u8) -> OutgoingViewingKey {
    OutgoingViewingKey([seed; 32])
}

/// A spendable P2PKH UTXO with a value and a deterministic outpoint.
pub fn utxo(seed: u8, value: u64, is_coinbase: bool) -> WalletTransparentOutput {
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

pub fn sprout_note(seed: u8, value: u64) -> SproutNoteEntry {
    SproutNoteEntry {
        outpoint: JsOutPoint {
            hash: TxId([seed; 32]),
            js: 0,
            n: 0,
        },
        address: SproutPaymentAddress([seed; 64]),
        value: Zatoshis::const_from_u64(value),
    }
}

pub fn sapling_note(seed: u8, value: u64) -> SaplingNoteEntry {
    SaplingNoteEntry {
        outpoint: SaplingOutPoint {
            hash: TxId([seed; 32]),
            n: 0,
        },
        address: SaplingPaymentAddress([seed; 43]),
        value: Zatoshis::const_from_u64(value),
    }
}

pub fn orchard_note(seed: u8, value: u64) -> OrchardNoteMetadata {
    OrchardNoteMetadata {
        outpoint: OrchardOutPoint {
            hash: TxId([seed; 32]),
            action: 0,
        },
        address: OrchardRawAddress([seed; 43]),
        value: Zatoshis::const_from_u64(value),
    }
}

/// A unified full viewing key with transparent, Sapling, and Orchard
/// components, derived deterministically from the seed.
pub fn full_ufvk(seed: u8) -> UnifiedFullViewingKey {
    UnifiedFullViewingKey::from_components(
        Some(AccountPubKey::from_parts(
            ovk(seed.wrapping_add(1)),
            ovk(seed.wrapping_add(2)),
            TransparentAddress::PublicKeyHash([seed.wrapping_add(3); 20]),
        )),
        Some(SaplingDiversifiableFullViewingKey::from_parts(
            ovk(seed.wrapping_add(4)),
            ovk(seed.wrapping_add(5)),
            SaplingPaymentAddress([seed.wrapping_add(6); 43]),
        )),
        Some(OrchardFullViewingKey::from_parts(
            ovk(seed.wrapping_add(7)),
            ovk(seed.wrapping_add(8)),
            OrchardRawAddress([seed.wrapping_add(9); 43]),
        )),
    )
    .expect("components are present")
}

/// A sending unified address with Orchard, Sapling, and P2PKH receivers.
pub fn sender_ua(seed: u8) -> UnifiedAddress {
    UnifiedAddress::from_receivers(
        Some(OrchardRawAddress([seed; 43])),
        Some(SaplingPaymentAddress([seed.wrapping_add(1); 43])),
        None,
        Some(TransparentAddress::PublicKeyHash([
            seed.wrapping_add(2);
            20
        ])),
    )
    .expect("receivers are present")
}

/// A chain view with a fixed tip whose every block carries the same final
/// Orchard root.
pub struct MockChain {
    tip: BlockHeight,
    block: BlockIndex,
}

impl MockChain {
    pub fn new(tip: BlockHeight) -> Self {
        MockChain {
            tip,
            block: BlockIndex::from_parts(OrchardAnchor([0x0A; 32])),
        }
    }
}

impl ChainView for MockChain {
    fn height(&self) -> BlockHeight {
        self.tip
    }

    fn block_index(&self, height: BlockHeight) -> Option<&BlockIndex> {
        (height <= self.tip).then_some(&self.block)
    }
}

/// An in-memory wallet for planner tests.
///
/// Key lookups are derived deterministically from the address being queried,
/// so the wallet implicitly "holds" keys for every note handed to the
/// planner. Witness availability can be degraded through the public fields.
pub struct MockWallet {
    pub spendable: SpendableInputs,
    pub selector_account: Option<AccountId>,
    pub address_ufvks: Vec<(UnifiedAddress, UnifiedFullViewingKey)>,
    pub account_ufvks: BTreeMap<AccountId, UnifiedFullViewingKey>,
    pub legacy_key: AccountKey,
    pub preferred_tx_version: u32,
    pub sapling_witnesses_unavailable: bool,
    pub sapling_witness_holes: BTreeSet<SaplingOutPoint>,
    pub sprout_witnesses_unavailable: bool,
    /// Every set of pools passed to `generate_change_address_for_account`.
    pub change_requests: Vec<BTreeSet<PoolType>>,
    pub locked_coins: BTreeSet<OutPoint>,
    pub locked_sprout: BTreeSet<JsOutPoint>,
    pub locked_sapling: BTreeSet<SaplingOutPoint>,
}

impl Default for MockWallet {
    fn default() -> Self {
        MockWallet {
            spendable: SpendableInputs::default(),
            selector_account: None,
            address_ufvks: Vec::new(),
            account_ufvks: BTreeMap::new(),
            legacy_key: AccountKey::from_pubkey(AccountPubKey::from_parts(
                ovk(0xA0),
                ovk(0xA1),
                TransparentAddress::PublicKeyHash([0xA2; 20]),
            )),
            preferred_tx_version: crate::builder::ZIP225_TX_VERSION,
            sapling_witnesses_unavailable: false,
            sapling_witness_holes: BTreeSet::new(),
            sprout_witnesses_unavailable: false,
            change_requests: Vec::new(),
            locked_coins: BTreeSet::new(),
            locked_sprout: BTreeSet::new(),
            locked_sapling: BTreeSet::new(),
        }
    }
}

impl WalletRead for MockWallet {
    fn preferred_tx_version(&self) -> u32 {
        self.preferred_tx_version
    }

    fn find_spendable_inputs(
        &self,
        _selector: &ZtxoSelector,
        _min_depth: u32,
        _as_of_height: Option<BlockHeight>,
    ) -> SpendableInputs {
        self.spendable.clone()
    }

    fn find_account_for_selector(&self, _selector: &ZtxoSelector) -> Option<AccountId> {
        self.selector_account
    }

    fn get_ufvk_for_address(&self, addr: &UnifiedAddress) -> Option<UnifiedFullViewingKey> {
        self.address_ufvks
            .iter()
            .find(|(ua, _)| ua == addr)
            .map(|(_, ufvk)| ufvk.clone())
    }

    fn get_unified_full_viewing_key_by_account(
        &self,
        account: AccountId,
    ) -> Option<UnifiedFullViewingKey> {
        self.account_ufvks.get(&account).cloned()
    }

    fn get_legacy_account_key(&self) -> AccountKey {
        self.legacy_key.clone()
    }

    fn get_sapling_extended_spending_key(
        &self,
        addr: &SaplingPaymentAddress,
    ) -> Option<SaplingExtendedSpendingKey> {
        Some(SaplingExtendedSpendingKey::from_xfvk(
            SaplingExtendedFullViewingKey::from_parts(
                ovk(addr.0[0].wrapping_add(1)),
                ovk(addr.0[0].wrapping_add(2)),
                *addr,
            ),
        ))
    }

    fn get_sprout_spending_key(&self, addr: &SproutPaymentAddress) -> Option<SproutSpendingKey> {
        Some(SproutSpendingKey([addr.0[0]; 32]))
    }

    fn get_sapling_note_witnesses(
        &self,
        outpoints: &[SaplingOutPoint],
        _confirmations: u32,
    ) -> Option<(Vec<Option<SaplingWitness>>, SaplingAnchor)> {
        if self.sapling_witnesses_unavailable {
            return None;
        }
        let witnesses = outpoints
            .iter()
            .map(|op| {
                (!self.sapling_witness_holes.contains(op)).then(|| SaplingWitness([0x11; 32]))
            })
            .collect();
        Some((witnesses, SaplingAnchor([0x22; 32])))
    }

    fn get_sprout_note_witnesses(
        &self,
        outpoints: &[JsOutPoint],
        _confirmations: u32,
    ) -> Option<(Vec<Option<SproutWitness>>, SproutAnchor)> {
        if self.sprout_witnesses_unavailable {
            return None;
        }
        let witnesses = outpoints
            .iter()
            .map(|_| Some(SproutWitness([0x33; 32])))
            .collect();
        Some((witnesses, SproutAnchor([0x44; 32])))
    }

    fn get_orchard_spend_info(
        &self,
        notes: &[OrchardNoteMetadata],
        _anchor: &OrchardAnchor,
    ) -> Vec<(OrchardSpendingKey, OrchardSpendInfo)> {
        notes
            .iter()
            .map(|note| {
                (
                    OrchardSpendingKey([note.address.0[0]; 32]),
                    OrchardSpendInfo::from_parts(note.value, [0x55; 32]),
                )
            })
            .collect()
    }
}

impl WalletWrite for MockWallet {
    fn generate_change_address_for_account(
        &mut self,
        _account: AccountId,
        allowed_pools: &BTreeSet<PoolType>,
    ) -> Option<RecipientAddress> {
        self.change_requests.push(allowed_pools.clone());
        if allowed_pools.contains(&PoolType::Orchard) {
            Some(RecipientAddress::Orchard(OrchardRawAddress([0xC0; 43])))
        } else if allowed_pools.contains(&PoolType::Sapling) {
            Some(RecipientAddress::Sapling(SaplingPaymentAddress([0xC1; 43])))
        } else if allowed_pools.contains(&PoolType::Transparent) {
            Some(RecipientAddress::Transparent(
                TransparentAddress::PublicKeyHash([0xC2; 20]),
            ))
        } else {
            None
        }
    }

    fn lock_coin(&mut self, outpoint: &OutPoint) {
        self.locked_coins.insert(*outpoint);
    }

    fn unlock_coin(&mut self, outpoint: &OutPoint) {
        self.locked_coins.remove(outpoint);
    }

    fn lock_sprout_note(&mut self, outpoint: &JsOutPoint) {
        self.locked_sprout.insert(*outpoint);
    }

    fn unlock_sprout_note(&mut self, outpoint: &JsOutPoint) {
        self.locked_sprout.remove(outpoint);
    }

    fn lock_sapling_note(&mut self, outpoint: &SaplingOutPoint) {
        self.locked_sapling.insert(*outpoint);
    }

    fn unlock_sapling_note(&mut self, outpoint: &SaplingOutPoint) {
        self.locked_sapling.remove(outpoint);
    }
}

/// A Sapling output recorded by [`MockBuilder`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaplingOutputRecord {
    pub ovk: OutgoingViewingKey,
    pub to: SaplingPaymentAddress,
    pub value: Zatoshis,
    pub memo: MemoBytes,
}

/// An Orchard output recorded by [`MockBuilder`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrchardOutputRecord {
    pub ovk: OutgoingViewingKey,
    pub to: OrchardRawAddress,
    pub value: Zatoshis,
    pub memo: Option<MemoBytes>,
}

/// A transaction builder that records everything fed to it and returns
/// itself as the "built transaction".
#[derive(Clone, Debug, Default)]
pub struct MockBuilder {
    pub next_block_height: u32,
    pub orchard_anchor: Option<OrchardAnchor>,
    pub fee: Option<Zatoshis>,
    pub orchard_spends: Vec<Zatoshis>,
    pub sapling_spends: Vec<Zatoshis>,
    pub sprout_spends: Vec<Zatoshis>,
    pub transparent_inputs: Vec<(OutPoint, TxOut)>,
    pub transparent_outputs: Vec<(TransparentAddress, Zatoshis)>,
    pub sapling_outputs: Vec<SaplingOutputRecord>,
    pub orchard_outputs: Vec<OrchardOutputRecord>,
    pub sprout_change: Option<SproutPaymentAddress>,
}

impl MockBuilder {
    /// Returns the total value of all recorded spends.
    pub fn total_in(&self) -> u64 {
        self.orchard_spends
            .iter()
            .chain(&self.sapling_spends)
            .chain(&self.sprout_spends)
            .map(|v| v.into_u64())
            .chain(self.transparent_inputs.iter().map(|(_, c)| c.value.into_u64()))
            .sum()
    }

    /// Returns the total value of all recorded outputs, excluding any Sprout
    /// change the real builder would compute itself.
    pub fn total_out(&self) -> u64 {
        self.transparent_outputs
            .iter()
            .map(|(_, v)| v.into_u64())
            .chain(self.sapling_outputs.iter().map(|o| o.value.into_u64()))
            .chain(self.orchard_outputs.iter().map(|o| o.value.into_u64()))
            .sum()
    }
}

impl TxBuilder for MockBuilder {
    type Transaction = MockBuilder;
    type Error = String;

    fn new<P: Parameters>(
        _params: &P,
        next_block_height: BlockHeight,
        orchard_anchor: Option<OrchardAnchor>,
    ) -> Self {
        MockBuilder {
            next_block_height: next_block_height.into(),
            orchard_anchor,
            ..Default::default()
        }
    }

    fn set_fee(&mut self, fee: Zatoshis) {
        self.fee = Some(fee);
    }

    fn orchard_anchor(&self) -> Option<&OrchardAnchor> {
        self.orchard_anchor.as_ref()
    }

    fn add_orchard_spend(
        &mut self,
        _sk: OrchardSpendingKey,
        spend_info: OrchardSpendInfo,
    ) -> Result<(), Self::Error> {
        self.orchard_spends.push(spend_info.value());
        Ok(())
    }

    fn add_sapling_spend(
        &mut self,
        _extsk: &SaplingExtendedSpendingKey,
        value: Zatoshis,
        _anchor: &SaplingAnchor,
        _witness: SaplingWitness,
    ) {
        self.sapling_spends.push(value);
    }

    fn add_sprout_input(
        &mut self,
        _sk: &SproutSpendingKey,
        value: Zatoshis,
        _witness: SproutWitness,
    ) {
        self.sprout_spends.push(value);
    }

    fn add_transparent_input(&mut self, outpoint: OutPoint, coin: TxOut) {
        self.transparent_inputs.push((outpoint, coin));
    }

    fn add_transparent_output(&mut self, to: &TransparentAddress, value: Zatoshis) {
        self.transparent_outputs.push((*to, value));
    }

    fn add_sapling_output(
        &mut self,
        ovk: OutgoingViewingKey,
        to: &SaplingPaymentAddress,
        value: Zatoshis,
        memo: MemoBytes,
    ) {
        self.sapling_outputs.push(SaplingOutputRecord {
            ovk,
            to: *to,
            value,
            memo,
        });
    }

    fn add_orchard_output(
        &mut self,
        ovk: OutgoingViewingKey,
        to: &OrchardRawAddress,
        value: Zatoshis,
        memo: Option<MemoBytes>,
    ) {
        self.orchard_outputs.push(OrchardOutputRecord {
            ovk,
            to: *to,
            value,
            memo,
        });
    }

    fn send_change_to_sprout(&mut self, addr: &SproutPaymentAddress) {
        self.sprout_change = Some(*addr);
    }

    fn build(self) -> Result<Self::Transaction, Self::Error> {
        Ok(self)
    }
}
