//! The immutable transaction plan, and its verification and execution
//! against the low-level transaction builder.

use std::sync::Mutex;

use tracing::debug;

use crate::address::{ChangeAddress, RecipientAddress};
use crate::builder::{TxBuilder, ZIP225_TX_VERSION};
use crate::consensus::{BlockHeight, Parameters};
use crate::data_api::{ChainView, WalletRead, WalletWrite};
use crate::keys::OutgoingViewingKey;
use crate::memo::MemoBytes;
use crate::strategy::{PrivacyPolicy, TransactionStrategy};
use crate::value::Zatoshis;
use crate::wallet::{JsOutPoint, SaplingOutPoint, SpendableInputs};

use super::error::BuildError;
use super::lock2;
use super::resolve::Payments;

/// The complete, immutable plan for a transaction: the inputs it will
/// consume, the payments (including change) it will make, the fee it will
/// pay, and the keys and anchor it will be built with.
///
/// A plan is produced by [`WalletTxBuilder::prepare_transaction`] with its
/// inputs already locked in the wallet, and is consumed exactly once by
/// [`TransactionEffects::approve_and_build`]. The input locks survive build
/// failures; callers release them with
/// [`TransactionEffects::unlock_spendable`].
///
/// [`WalletTxBuilder::prepare_transaction`]: super::WalletTxBuilder::prepare_transaction
#[derive(Clone, Debug)]
pub struct TransactionEffects {
    anchor_confirmations: u32,
    spendable: SpendableInputs,
    payments: Payments,
    change_addr: Option<ChangeAddress>,
    fee: Zatoshis,
    internal_ovk: OutgoingViewingKey,
    external_ovk: OutgoingViewingKey,
    anchor_height: BlockHeight,
}

impl TransactionEffects {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        anchor_confirmations: u32,
        spendable: SpendableInputs,
        payments: Payments,
        change_addr: Option<ChangeAddress>,
        fee: Zatoshis,
        internal_ovk: OutgoingViewingKey,
        external_ovk: OutgoingViewingKey,
        anchor_height: BlockHeight,
    ) -> Self {
        TransactionEffects {
            anchor_confirmations,
            spendable,
            payments,
            change_addr,
            fee,
            internal_ovk,
            external_ovk,
            anchor_height,
        }
    }

    pub fn anchor_confirmations(&self) -> u32 {
        self.anchor_confirmations
    }

    /// Returns the snapshot of inputs this plan will consume.
    pub fn spendable(&self) -> &SpendableInputs {
        &self.spendable
    }

    /// Returns the resolved payments, including any change output.
    pub fn payments(&self) -> &Payments {
        &self.payments
    }

    pub fn change_address(&self) -> Option<&ChangeAddress> {
        self.change_addr.as_ref()
    }

    pub fn fee(&self) -> Zatoshis {
        self.fee
    }

    pub fn internal_ovk(&self) -> OutgoingViewingKey {
        self.internal_ovk
    }

    pub fn external_ovk(&self) -> OutgoingViewingKey {
        self.external_ovk
    }

    pub fn anchor_height(&self) -> BlockHeight {
        self.anchor_height
    }

    /// Returns whether this transaction touches the Orchard pool on either
    /// side.
    pub fn involves_orchard(&self) -> bool {
        self.spendable.orchard_total().is_positive() || self.payments.has_orchard_recipient()
    }

    /// Computes the weakest privacy policy under which this plan could be
    /// permitted.
    pub fn required_privacy_policy(&self) -> PrivacyPolicy {
        if !self.spendable.utxos.is_empty() {
            // TODO: `AllowFullyTransparent` is the correct policy when there
            // are also transparent recipients, but it is a breaking change
            // from previous behavior, so enable it separately.
            PrivacyPolicy::AllowRevealedSenders
        } else if self.payments.has_transparent_recipient() {
            PrivacyPolicy::AllowRevealedRecipients
        } else if (!self.spendable.orchard_notes.is_empty()
            && self.payments.has_sapling_recipient())
            || (!self.spendable.sapling_notes.is_empty() && self.payments.has_orchard_recipient())
            || (!self.spendable.sprout_notes.is_empty() && self.payments.has_sapling_recipient())
        {
            // TODO: This should only trigger when there is a nonzero value
            // balance.
            PrivacyPolicy::AllowRevealedAmounts
        } else {
            PrivacyPolicy::FullPrivacy
        }
    }

    /// Verifies the plan against the caller's strategy, snapshots the anchors
    /// and witnesses it depends on, and drives the transaction builder to a
    /// signed transaction.
    ///
    /// On failure the plan's inputs remain locked; the caller decides whether
    /// to retry or to release them.
    pub fn approve_and_build<P, C, W, B>(
        &self,
        params: &P,
        chain: &Mutex<C>,
        wallet: &Mutex<W>,
        strategy: &TransactionStrategy,
    ) -> Result<B::Transaction, BuildError<B::Error>>
    where
        P: Parameters,
        C: ChainView,
        W: WalletRead,
        B: TxBuilder,
    {
        let required_privacy = self.required_privacy_policy();
        if !strategy.is_compatible_with(required_privacy) {
            return Err(BuildError::IncompatiblePrivacyPolicy {
                required: required_privacy,
                actual: strategy.requested_level(),
            });
        }

        let preferred_tx_version = wallet.lock().unwrap().preferred_tx_version();

        // Allow Orchard recipients by setting an Orchard anchor. The anchor
        // is pinned to the height fixed at planning time, so the witnesses
        // fetched below remain consistent with it even if the chain has
        // advanced since.
        let (next_block_height, orchard_anchor) = {
            let chain = chain.lock().unwrap();
            let next_block_height = chain.height() + 1;
            let orchard_anchor = if self.spendable.sprout_notes.is_empty()
                && (self.involves_orchard() || preferred_tx_version >= ZIP225_TX_VERSION)
                && self.anchor_confirmations > 0
            {
                let anchor_block = chain
                    .block_index(self.anchor_height)
                    .expect("the anchor height is within the main chain");
                debug!(
                    anchor_height = u32::from(self.anchor_height),
                    "pinning Orchard anchor"
                );
                Some(*anchor_block.hash_final_orchard_root())
            } else {
                None
            };
            (next_block_height, orchard_anchor)
        };

        let mut builder = B::new(params, next_block_height, orchard_anchor);
        builder.set_fee(self.fee);

        // Track the total value added to the builder. This shouldn't
        // strictly be necessary, given that the spendable set was limited to
        // the target amount at planning time.
        let mut total_spend: u64 = 0;

        // Fetch the Sapling spending keys, witnesses, and anchor, plus the
        // Orchard spend information, under the wallet lock so that arriving
        // blocks cannot move the witnesses while we copy them.
        let sapling_outpoints: Vec<SaplingOutPoint> = self
            .spendable
            .sapling_notes
            .iter()
            .map(|note| note.outpoint)
            .collect();
        let (sapling_keys, sapling_witnesses, sapling_anchor, orchard_spend_info) = {
            let wallet = wallet.lock().unwrap();
            let sapling_keys: Vec<_> = self
                .spendable
                .sapling_notes
                .iter()
                .map(|note| {
                    wallet
                        .get_sapling_extended_spending_key(&note.address)
                        .expect("the wallet holds the spending key for each selected note")
                })
                .collect();

            let (witnesses, anchor) = match wallet
                .get_sapling_note_witnesses(&sapling_outpoints, self.anchor_confirmations)
            {
                Some(result) => result,
                // This error should not appear once we are
                // `anchor_confirmations` blocks past Sapling activation.
                None => return Err(BuildError::InsufficientSaplingWitnesses),
            };

            let orchard_spend_info = match builder.orchard_anchor() {
                Some(anchor) => {
                    wallet.get_orchard_spend_info(&self.spendable.orchard_notes, anchor)
                }
                None => vec![],
            };

            (sapling_keys, witnesses, anchor, orchard_spend_info)
        };

        // Add Orchard spends.
        for (sk, spend_info) in orchard_spend_info {
            total_spend += spend_info.value().into_u64();
            builder
                .add_orchard_spend(sk, spend_info)
                .map_err(BuildError::Builder)?;
        }

        // Add Sapling spends.
        for (i, note) in self.spendable.sapling_notes.iter().enumerate() {
            let witness = sapling_witnesses[i]
                .clone()
                .ok_or(BuildError::MissingSaplingWitness(note.outpoint))?;
            builder.add_sapling_spend(&sapling_keys[i], note.value, &sapling_anchor, witness);
            total_spend += note.value.into_u64();
        }

        // Add transparent inputs.
        for utxo in &self.spendable.utxos {
            builder.add_transparent_input(utxo.outpoint, utxo.txout.clone());
            total_spend += utxo.value().into_u64();
        }

        // Take the Sprout witness snapshot under both locks: the treestate
        // changes as blocks containing joinsplits arrive, and building a
        // chained joinsplit can take longer than the block interval.
        let sprout_spends = {
            let (_chain, wallet) = lock2(chain, wallet);
            let outpoints: Vec<JsOutPoint> = self
                .spendable
                .sprout_notes
                .iter()
                .map(|note| note.outpoint)
                .collect();
            // The input anchor is not needed for Sprout spends; each witness
            // carries its own.
            let (witnesses, _anchor) = match wallet
                .get_sprout_note_witnesses(&outpoints, self.anchor_confirmations)
            {
                Some(result) => result,
                None => return Err(BuildError::InsufficientSproutWitnesses),
            };

            self.spendable
                .sprout_notes
                .iter()
                .zip(witnesses)
                .map(|(note, witness)| {
                    let sk = wallet
                        .get_sprout_spending_key(&note.address)
                        .expect("the wallet holds the spending key for each selected note");
                    let witness =
                        witness.expect("Sprout witnesses are present at the required depth");
                    (sk, note.value, witness)
                })
                .collect::<Vec<_>>()
        };

        // Add Sprout spends.
        for (sk, value, witness) in sprout_spends {
            builder.add_sprout_input(&sk, value, witness);
            total_spend += value.into_u64();
        }

        // Add outputs.
        for payment in self.payments.payments() {
            match payment.address() {
                RecipientAddress::Transparent(addr) => {
                    if payment.memo().is_some() {
                        return Err(BuildError::MemoForbidden);
                    }
                    builder.add_transparent_output(addr, payment.amount());
                }
                RecipientAddress::Sapling(addr) => {
                    builder.add_sapling_output(
                        self.output_ovk(payment.is_internal()),
                        addr,
                        payment.amount(),
                        payment.memo().cloned().unwrap_or_else(MemoBytes::empty),
                    );
                }
                RecipientAddress::Orchard(addr) => {
                    builder.add_orchard_output(
                        self.output_ovk(payment.is_internal()),
                        addr,
                        payment.amount(),
                        payment.memo().cloned(),
                    );
                }
            }
        }

        match &self.change_addr {
            // The builder computes Sprout change itself.
            Some(ChangeAddress::Sprout(addr)) => builder.send_change_to_sprout(addr),
            Some(ChangeAddress::Resolved(_)) => {
                let balanced = (self.payments.total() + self.fee)
                    .expect("the plan total is within the valid monetary range");
                assert_eq!(total_spend, balanced.into_u64());
            }
            None => {}
        }

        builder.build().map_err(BuildError::Builder)
    }

    fn output_ovk(&self, is_internal: bool) -> OutgoingViewingKey {
        if is_internal {
            self.internal_ovk
        } else {
            self.external_ovk
        }
    }

    /// Marks every input in the plan's snapshot as reserved in the wallet.
    pub fn lock_spendable<W: WalletWrite>(&self, wallet: &Mutex<W>) {
        self.lock_spendable_inner(&mut *wallet.lock().unwrap());
    }

    // TODO: Orchard note locking is not yet supported by the wallet.
    pub(crate) fn lock_spendable_inner<W: WalletWrite>(&self, wallet: &mut W) {
        for utxo in &self.spendable.utxos {
            wallet.lock_coin(&utxo.outpoint);
        }
        for note in &self.spendable.sprout_notes {
            wallet.lock_sprout_note(&note.outpoint);
        }
        for note in &self.spendable.sapling_notes {
            wallet.lock_sapling_note(&note.outpoint);
        }
    }

    /// Releases every input lock taken by [`TransactionEffects::lock_spendable`].
    pub fn unlock_spendable<W: WalletWrite>(&self, wallet: &Mutex<W>) {
        let mut wallet = wallet.lock().unwrap();
        for utxo in &self.spendable.utxos {
            wallet.unlock_coin(&utxo.outpoint);
        }
        for note in &self.spendable.sprout_notes {
            wallet.unlock_sprout_note(&note.outpoint);
        }
        for note in &self.spendable.sapling_notes {
            wallet.unlock_sapling_note(&note.outpoint);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use assert_matches::assert_matches;

    use crate::address::{
        ChangeAddress, OrchardRawAddress, RecipientAddress, SaplingPaymentAddress,
        SproutPaymentAddress, TransparentAddress,
    };
    use crate::consensus::{BlockHeight, MAIN_NETWORK};
    use crate::keys::OutgoingViewingKey;
    use crate::memo::MemoBytes;
    use crate::planner::error::BuildError;
    use crate::planner::resolve::{Payments, ResolvedPayment};
    use crate::strategy::{PrivacyPolicy, TransactionStrategy};
    use crate::testing::{
        orchard_note, sapling_note, sprout_note, utxo, MockBuilder, MockChain, MockWallet,
    };
    use crate::value::Zatoshis;
    use crate::wallet::SpendableInputs;

    use super::TransactionEffects;

    const TIP: BlockHeight = BlockHeight::from_u32(2_000_000);

    fn zat(v: u64) -> Zatoshis {
        Zatoshis::const_from_u64(v)
    }

    fn effects(
        spendable: SpendableInputs,
        payments: Payments,
        change_addr: Option<ChangeAddress>,
        fee: Zatoshis,
    ) -> TransactionEffects {
        TransactionEffects::from_parts(
            10,
            spendable,
            payments,
            change_addr,
            fee,
            OutgoingViewingKey([0xAA; 32]),
            OutgoingViewingKey([0xBB; 32]),
            TIP + 1 - 10,
        )
    }

    fn external_payment(address: RecipientAddress, amount: u64) -> ResolvedPayment {
        ResolvedPayment::new(None, address, zat(amount), None, false)
    }

    #[test]
    fn required_policy_reveals_senders_for_utxo_inputs() {
        // Transparent inputs with no transparent recipient still require
        // only AllowRevealedSenders; this mirrors longstanding behavior even
        // though a fully-transparent policy would arguably be correct.
        let plan = effects(
            SpendableInputs {
                utxos: vec![utxo(1, 100_000, false)],
                ..Default::default()
            },
            Payments::new(vec![external_payment(
                RecipientAddress::Sapling(SaplingPaymentAddress([1; 43])),
                90_000,
            )]),
            None,
            zat(10_000),
        );
        assert_eq!(
            plan.required_privacy_policy(),
            PrivacyPolicy::AllowRevealedSenders
        );

        let plan = effects(
            SpendableInputs {
                utxos: vec![utxo(1, 100_000, false)],
                ..Default::default()
            },
            Payments::new(vec![external_payment(
                RecipientAddress::Transparent(TransparentAddress::PublicKeyHash([2; 20])),
                90_000,
            )]),
            None,
            zat(10_000),
        );
        assert_eq!(
            plan.required_privacy_policy(),
            PrivacyPolicy::AllowRevealedSenders
        );
    }

    #[test]
    fn required_policy_reveals_recipients_for_transparent_outputs() {
        let plan = effects(
            SpendableInputs {
                sapling_notes: vec![sapling_note(1, 100_000)],
                ..Default::default()
            },
            Payments::new(vec![external_payment(
                RecipientAddress::Transparent(TransparentAddress::PublicKeyHash([2; 20])),
                90_000,
            )]),
            None,
            zat(10_000),
        );
        assert_eq!(
            plan.required_privacy_policy(),
            PrivacyPolicy::AllowRevealedRecipients
        );
    }

    #[test]
    fn required_policy_reveals_amounts_for_cross_pool_flows() {
        // Orchard in, Sapling out.
        let plan = effects(
            SpendableInputs {
                orchard_notes: vec![orchard_note(1, 100_000)],
                ..Default::default()
            },
            Payments::new(vec![external_payment(
                RecipientAddress::Sapling(SaplingPaymentAddress([2; 43])),
                90_000,
            )]),
            None,
            zat(10_000),
        );
        assert_eq!(
            plan.required_privacy_policy(),
            PrivacyPolicy::AllowRevealedAmounts
        );

        // Sapling in, Orchard out.
        let plan = effects(
            SpendableInputs {
                sapling_notes: vec![sapling_note(1, 100_000)],
                ..Default::default()
            },
            Payments::new(vec![external_payment(
                RecipientAddress::Orchard(OrchardRawAddress([2; 43])),
                90_000,
            )]),
            None,
            zat(10_000),
        );
        assert_eq!(
            plan.required_privacy_policy(),
            PrivacyPolicy::AllowRevealedAmounts
        );

        // Sprout in, Sapling out.
        let plan = effects(
            SpendableInputs {
                sprout_notes: vec![sprout_note(1, 100_000)],
                ..Default::default()
            },
            Payments::new(vec![external_payment(
                RecipientAddress::Sapling(SaplingPaymentAddress([2; 43])),
                90_000,
            )]),
            None,
            zat(10_000),
        );
        assert_eq!(
            plan.required_privacy_policy(),
            PrivacyPolicy::AllowRevealedAmounts
        );
    }

    #[test]
    fn required_policy_is_full_privacy_within_a_pool() {
        let plan = effects(
            SpendableInputs {
                sapling_notes: vec![sapling_note(1, 100_000)],
                ..Default::default()
            },
            Payments::new(vec![external_payment(
                RecipientAddress::Sapling(SaplingPaymentAddress([2; 43])),
                90_000,
            )]),
            None,
            zat(10_000),
        );
        assert_eq!(plan.required_privacy_policy(), PrivacyPolicy::FullPrivacy);
    }

    #[test]
    fn incompatible_strategy_is_rejected_with_the_required_policy() {
        let plan = effects(
            SpendableInputs {
                utxos: vec![utxo(1, 100_000, false)],
                ..Default::default()
            },
            Payments::new(vec![external_payment(
                RecipientAddress::Sapling(SaplingPaymentAddress([2; 43])),
                90_000,
            )]),
            None,
            zat(10_000),
        );
        let chain = Mutex::new(MockChain::new(TIP));
        let wallet = Mutex::new(MockWallet::default());

        let result = plan.approve_and_build::<_, _, _, MockBuilder>(
            &MAIN_NETWORK,
            &chain,
            &wallet,
            &TransactionStrategy::new(PrivacyPolicy::FullPrivacy),
        );
        assert_matches!(
            result,
            Err(BuildError::IncompatiblePrivacyPolicy {
                required: PrivacyPolicy::AllowRevealedSenders,
                actual: PrivacyPolicy::FullPrivacy,
            })
        );
    }

    #[test]
    fn orchard_anchor_is_not_set_when_sprout_is_spent() {
        let plan = effects(
            SpendableInputs {
                sprout_notes: vec![sprout_note(1, 100_000)],
                ..Default::default()
            },
            Payments::new(vec![external_payment(
                RecipientAddress::Sapling(SaplingPaymentAddress([2; 43])),
                90_000,
            )]),
            None,
            zat(10_000),
        );
        let chain = Mutex::new(MockChain::new(TIP));
        let wallet = Mutex::new(MockWallet::default());

        let built = plan
            .approve_and_build::<_, _, _, MockBuilder>(
                &MAIN_NETWORK,
                &chain,
                &wallet,
                &TransactionStrategy::new(PrivacyPolicy::AllowRevealedAmounts),
            )
            .unwrap();
        assert!(built.orchard_anchor.is_none());
        assert_eq!(built.sprout_spends.len(), 1);
    }

    #[test]
    fn orchard_involvement_pins_the_anchor() {
        let plan = effects(
            SpendableInputs {
                orchard_notes: vec![orchard_note(1, 100_000)],
                ..Default::default()
            },
            Payments::new(vec![external_payment(
                RecipientAddress::Orchard(OrchardRawAddress([2; 43])),
                90_000,
            )]),
            None,
            zat(10_000),
        );
        let chain = Mutex::new(MockChain::new(TIP));
        let wallet = Mutex::new(MockWallet::default());

        let built = plan
            .approve_and_build::<_, _, _, MockBuilder>(
                &MAIN_NETWORK,
                &chain,
                &wallet,
                &TransactionStrategy::new(PrivacyPolicy::FullPrivacy),
            )
            .unwrap();
        assert!(built.orchard_anchor.is_some());
        assert_eq!(built.orchard_spends.len(), 1);
        assert_eq!(built.fee, Some(zat(10_000)));
    }

    #[test]
    fn missing_sapling_witnesses_fail_the_build() {
        let note = sapling_note(1, 100_000);
        let plan = effects(
            SpendableInputs {
                sapling_notes: vec![note.clone()],
                ..Default::default()
            },
            Payments::new(vec![external_payment(
                RecipientAddress::Sapling(SaplingPaymentAddress([2; 43])),
                90_000,
            )]),
            None,
            zat(10_000),
        );
        let chain = Mutex::new(MockChain::new(TIP));

        let mut wallet = MockWallet::default();
        wallet.sapling_witnesses_unavailable = true;
        let wallet = Mutex::new(wallet);
        let result = plan.approve_and_build::<_, _, _, MockBuilder>(
            &MAIN_NETWORK,
            &chain,
            &wallet,
            &TransactionStrategy::new(PrivacyPolicy::FullPrivacy),
        );
        assert_matches!(result, Err(BuildError::InsufficientSaplingWitnesses));

        let mut wallet = MockWallet::default();
        wallet.sapling_witness_holes.insert(note.outpoint);
        let wallet = Mutex::new(wallet);
        let result = plan.approve_and_build::<_, _, _, MockBuilder>(
            &MAIN_NETWORK,
            &chain,
            &wallet,
            &TransactionStrategy::new(PrivacyPolicy::FullPrivacy),
        );
        assert_matches!(
            result,
            Err(BuildError::MissingSaplingWitness(op)) if op == note.outpoint
        );
    }

    #[test]
    fn sprout_change_is_delegated_to_the_builder() {
        let origin = SproutPaymentAddress([9; 64]);
        let plan = effects(
            SpendableInputs {
                sprout_notes: vec![sprout_note(1, 100_000)],
                ..Default::default()
            },
            Payments::new(vec![external_payment(
                RecipientAddress::Sapling(SaplingPaymentAddress([2; 43])),
                50_000,
            )]),
            Some(ChangeAddress::Sprout(origin)),
            zat(10_000),
        );
        let chain = Mutex::new(MockChain::new(TIP));
        let wallet = Mutex::new(MockWallet::default());

        let built = plan
            .approve_and_build::<_, _, _, MockBuilder>(
                &MAIN_NETWORK,
                &chain,
                &wallet,
                &TransactionStrategy::new(PrivacyPolicy::AllowRevealedAmounts),
            )
            .unwrap();
        assert_eq!(built.sprout_change, Some(origin));
    }

    #[test]
    fn missing_memos_become_the_canonical_pattern_for_sapling_only() {
        let plan = effects(
            SpendableInputs {
                sapling_notes: vec![sapling_note(1, 200_000)],
                ..Default::default()
            },
            Payments::new(vec![
                external_payment(RecipientAddress::Sapling(SaplingPaymentAddress([2; 43])), 90_000),
                ResolvedPayment::new(
                    None,
                    RecipientAddress::Orchard(OrchardRawAddress([3; 43])),
                    zat(100_000),
                    None,
                    false,
                ),
            ]),
            None,
            zat(10_000),
        );
        let chain = Mutex::new(MockChain::new(TIP));
        let wallet = Mutex::new(MockWallet::default());

        let built = plan
            .approve_and_build::<_, _, _, MockBuilder>(
                &MAIN_NETWORK,
                &chain,
                &wallet,
                &TransactionStrategy::new(PrivacyPolicy::AllowRevealedAmounts),
            )
            .unwrap();
        assert_eq!(built.sapling_outputs.len(), 1);
        assert_eq!(built.sapling_outputs[0].memo, MemoBytes::empty());
        assert_eq!(built.orchard_outputs.len(), 1);
        assert_eq!(built.orchard_outputs[0].memo, None);
    }

    #[test]
    fn internal_outputs_use_the_internal_ovk() {
        let plan = effects(
            SpendableInputs {
                sapling_notes: vec![sapling_note(1, 200_000)],
                ..Default::default()
            },
            Payments::new(vec![
                external_payment(RecipientAddress::Sapling(SaplingPaymentAddress([2; 43])), 90_000),
                ResolvedPayment::new(
                    None,
                    RecipientAddress::Sapling(SaplingPaymentAddress([3; 43])),
                    zat(100_000),
                    None,
                    true,
                ),
            ]),
            Some(ChangeAddress::Resolved(RecipientAddress::Sapling(
                SaplingPaymentAddress([3; 43]),
            ))),
            zat(10_000),
        );
        let chain = Mutex::new(MockChain::new(TIP));
        let wallet = Mutex::new(MockWallet::default());

        let built = plan
            .approve_and_build::<_, _, _, MockBuilder>(
                &MAIN_NETWORK,
                &chain,
                &wallet,
                &TransactionStrategy::new(PrivacyPolicy::FullPrivacy),
            )
            .unwrap();
        assert_eq!(built.sapling_outputs[0].ovk, OutgoingViewingKey([0xBB; 32]));
        assert_eq!(built.sapling_outputs[1].ovk, OutgoingViewingKey([0xAA; 32]));
    }
}
