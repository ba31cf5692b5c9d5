//! The contract of the low-level transaction builder that assembles and
//! signs the planned transaction.

use std::fmt;

use crate::address::{
    OrchardRawAddress, SaplingPaymentAddress, SproutPaymentAddress, TransparentAddress,
};
use crate::consensus::{BlockHeight, Parameters};
use crate::keys::{
    OrchardSpendingKey, OutgoingViewingKey, SaplingExtendedSpendingKey, SproutSpendingKey,
};
use crate::memo::MemoBytes;
use crate::value::Zatoshis;
use crate::wallet::{
    OrchardAnchor, OrchardSpendInfo, OutPoint, SaplingAnchor, SaplingWitness, SproutWitness, TxOut,
};

/// The transaction version introduced by [ZIP 225], the first to carry
/// Orchard bundles.
///
/// [ZIP 225]: https://zips.z.cash/zip-0225
pub const ZIP225_TX_VERSION: u32 = 5;

/// A builder that accumulates the spends and outputs of a planned transaction
/// and produces signed transaction bytes.
///
/// The planner drives this interface but never inspects the transaction being
/// assembled; balance and change decisions are made before the builder is
/// constructed.
pub trait TxBuilder: Sized {
    /// The type of the built transaction.
    type Transaction;
    /// The type of errors the builder may produce while adding components or
    /// building.
    type Error: fmt::Display;

    /// Constructs a builder for a transaction to be mined at
    /// `next_block_height`. If `orchard_anchor` is provided, the transaction
    /// may contain Orchard spends and outputs anchored at it.
    fn new<P: Parameters>(
        params: &P,
        next_block_height: BlockHeight,
        orchard_anchor: Option<OrchardAnchor>,
    ) -> Self;

    /// Sets the fee the transaction will pay.
    fn set_fee(&mut self, fee: Zatoshis);

    /// Returns the Orchard anchor this builder was constructed with, if any.
    fn orchard_anchor(&self) -> Option<&OrchardAnchor>;

    /// Adds an Orchard note to be spent.
    fn add_orchard_spend(
        &mut self,
        sk: OrchardSpendingKey,
        spend_info: OrchardSpendInfo,
    ) -> Result<(), Self::Error>;

    /// Adds a Sapling note to be spent, witnessed against the given anchor.
    fn add_sapling_spend(
        &mut self,
        extsk: &SaplingExtendedSpendingKey,
        value: Zatoshis,
        anchor: &SaplingAnchor,
        witness: SaplingWitness,
    );

    /// Adds a Sprout note to be spent.
    fn add_sprout_input(&mut self, sk: &SproutSpendingKey, value: Zatoshis, witness: SproutWitness);

    /// Adds a transparent coin to be spent.
    fn add_transparent_input(&mut self, outpoint: OutPoint, coin: TxOut);

    /// Adds a transparent output.
    fn add_transparent_output(&mut self, to: &TransparentAddress, value: Zatoshis);

    /// Adds a Sapling output, recoverable with the given outgoing viewing
    /// key.
    fn add_sapling_output(
        &mut self,
        ovk: OutgoingViewingKey,
        to: &SaplingPaymentAddress,
        value: Zatoshis,
        memo: MemoBytes,
    );

    /// Adds an Orchard output, recoverable with the given outgoing viewing
    /// key.
    fn add_orchard_output(
        &mut self,
        ovk: OutgoingViewingKey,
        to: &OrchardRawAddress,
        value: Zatoshis,
        memo: Option<MemoBytes>,
    );

    /// Directs the builder to compute the transaction's change itself and
    /// send it to the given Sprout address.
    fn send_change_to_sprout(&mut self, addr: &SproutPaymentAddress);

    /// Assembles, proves, and signs the transaction.
    fn build(self) -> Result<Self::Transaction, Self::Error>;
}
