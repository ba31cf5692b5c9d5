//! Transaction planning: turning a payment request and a set of spendable
//! funds into an immutable, buildable plan.

use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use crate::consensus::{BlockHeight, Parameters};
use crate::data_api::{ChainView, WalletRead, WalletWrite};
use crate::fees::{p2pkh_dust_threshold, FeeRate};
use crate::keys::{ZtxoSelector, ZCASH_LEGACY_ACCOUNT};
use crate::strategy::TransactionStrategy;
use crate::value::{Zatoshis, MAX_MONEY};
use crate::wallet::SpendableInputs;

pub mod effects;
pub mod error;
pub mod resolve;

mod change;
mod ovk;

pub use effects::TransactionEffects;
pub use error::{
    ActionSide, AddressResolutionError, BuildError, ChangeNotAllowedError,
    ExcessOrchardActionsError, InputSelectionError, InvalidFundsError, InvalidFundsReason,
};
pub use resolve::{Payment, Payments, ResolvedPayment};

/// The default bound on the number of Orchard actions on either side of a
/// transaction, limiting proving memory usage.
pub const DEFAULT_MAX_ORCHARD_ACTIONS: usize = 50;

/// Acquires the chain and wallet locks, in that order.
///
/// Every code path that needs both locks goes through this helper, so the
/// acquisition order cannot be inverted.
pub(crate) fn lock2<'a, C, W>(
    chain: &'a Mutex<C>,
    wallet: &'a Mutex<W>,
) -> (MutexGuard<'a, C>, MutexGuard<'a, W>) {
    let chain = chain.lock().unwrap();
    let wallet = wallet.lock().unwrap();
    (chain, wallet)
}

/// Returns the height whose treestate the transaction's anchors will be
/// pinned to.
fn get_anchor_height<C: ChainView>(chain: &C, anchor_confirmations: u32) -> BlockHeight {
    let next_block_height = chain.height() + 1;
    next_block_height - anchor_confirmations
}

/// The transaction planner.
///
/// Holds the chain parameters and the planning limits; all wallet and chain
/// state is read through the collaborator traits at call time.
pub struct WalletTxBuilder<'a, P> {
    params: &'a P,
    min_relay_fee: FeeRate,
    max_orchard_actions: usize,
}

impl<'a, P: Parameters> WalletTxBuilder<'a, P> {
    /// Constructs a planner with the default Orchard action limit.
    pub fn new(params: &'a P, min_relay_fee: FeeRate) -> Self {
        WalletTxBuilder {
            params,
            min_relay_fee,
            max_orchard_actions: DEFAULT_MAX_ORCHARD_ACTIONS,
        }
    }

    /// Constructs a planner with an explicit Orchard action limit.
    pub fn with_max_orchard_actions(
        params: &'a P,
        min_relay_fee: FeeRate,
        max_orchard_actions: usize,
    ) -> Self {
        WalletTxBuilder {
            params,
            min_relay_fee,
            max_orchard_actions,
        }
    }

    /// Returns the dust threshold of a hypothetical one-zatoshi P2PKH output
    /// at the configured minimum relay fee rate.
    pub fn default_dust_threshold(&self) -> Zatoshis {
        p2pkh_dust_threshold(self.min_relay_fee)
    }

    /// Discovers all of the wallet's spendable inputs matching the selector,
    /// at the given minimum confirmation depth.
    pub fn find_all_spendable_inputs<C, W>(
        &self,
        chain: &Mutex<C>,
        wallet: &Mutex<W>,
        selector: &ZtxoSelector,
        min_depth: u32,
    ) -> SpendableInputs
    where
        C: ChainView,
        W: WalletRead,
    {
        let (_chain, wallet) = lock2(chain, wallet);
        wallet.find_spendable_inputs(selector, min_depth, None)
    }

    /// Plans a transaction: resolves the payments to concrete receivers,
    /// limits the spendable set to the payment total plus fee, plans change
    /// and outgoing viewing keys, and locks the selected inputs in the
    /// wallet.
    ///
    /// On success the returned [`TransactionEffects`] owns the authoritative
    /// snapshot of inputs for the build step. On failure nothing is locked.
    #[allow(clippy::too_many_arguments)]
    pub fn prepare_transaction<C, W>(
        &self,
        chain: &Mutex<C>,
        wallet: &Mutex<W>,
        selector: &ZtxoSelector,
        mut spendable: SpendableInputs,
        payments: &[Payment],
        strategy: &TransactionStrategy,
        fee: Zatoshis,
        anchor_confirmations: u32,
    ) -> Result<TransactionEffects, InputSelectionError>
    where
        C: ChainView,
        W: WalletWrite,
    {
        assert!(fee.into_u64() < MAX_MONEY);

        let (chain_guard, mut wallet_guard) = lock2(chain, wallet);
        let anchor_height = get_anchor_height(&*chain_guard, anchor_confirmations);

        let mut resolved = self.resolve_inputs_and_payments(
            &mut spendable,
            payments,
            strategy,
            fee,
            anchor_height,
        )?;

        // We do not set a change address if there is no change.
        let change_amount = ((spendable.total() - resolved.total())
            .expect("the selection covers the payment total")
            - fee)
            .expect("the selection covers the fee");
        let change_addr = change_amount.is_positive().then(|| {
            // Determine the account we're sending from.
            let send_from_account = wallet_guard
                .find_account_for_selector(selector)
                .unwrap_or(ZCASH_LEGACY_ACCOUNT);
            change::add_change_payment(
                self.params,
                &mut *wallet_guard,
                selector,
                &spendable,
                &mut resolved,
                strategy,
                anchor_height,
                change_amount,
                send_from_account,
            )
        });

        let (internal_ovk, external_ovk) = ovk::select_ovks(&*wallet_guard, selector, &spendable);

        let effects = TransactionEffects::from_parts(
            anchor_confirmations,
            spendable,
            resolved,
            change_addr,
            fee,
            internal_ovk,
            external_ovk,
            anchor_height,
        );
        effects.lock_spendable_inner(&mut *wallet_guard);
        Ok(effects)
    }

    /// Resolves payments and reduces the spendable set to a selection
    /// covering the payment total plus fee, applying the coinbase and
    /// Orchard-action rules to the result.
    fn resolve_inputs_and_payments(
        &self,
        spendable: &mut SpendableInputs,
        payments: &[Payment],
        strategy: &TransactionStrategy,
        fee: Zatoshis,
        anchor_height: BlockHeight,
    ) -> Result<Payments, InputSelectionError> {
        let send_amount = payments
            .iter()
            .map(|p| p.amount())
            .sum::<Option<Zatoshis>>()
            .expect("the payment total is within the valid monetary range");
        let target_amount = (send_amount + fee)
            .expect("the payment total plus fee is within the valid monetary range");

        let (resolved, orchard_outputs) = resolve::resolve_payments(
            self.params,
            spendable,
            payments,
            strategy,
            anchor_height,
            target_amount,
        )?;

        if orchard_outputs > self.max_orchard_actions {
            return Err(ExcessOrchardActionsError {
                side: ActionSide::Output,
                orchard_actions: orchard_outputs,
                max_actions: self.max_orchard_actions,
            }
            .into());
        }

        // Set the dust threshold so that we can select enough inputs to
        // avoid creating dust change amounts.
        let dust_threshold = self.default_dust_threshold();

        if !spendable.limit_to_amount(target_amount, dust_threshold, resolved.recipient_pools()) {
            let available = spendable.total();
            let reason = match available - target_amount {
                Some(change) if change.is_positive() && change < dust_threshold => {
                    InvalidFundsReason::DustThreshold {
                        dust_threshold,
                        change_amount: change,
                    }
                }
                _ => InvalidFundsReason::InsufficientFunds {
                    required: target_amount,
                },
            };
            return Err(InvalidFundsError { available, reason }.into());
        }

        debug!(
            target_amount = target_amount.into_u64(),
            selected_total = spendable.total().into_u64(),
            "limited spendable inputs to the target amount"
        );

        // When spending transparent coinbase outputs, the inputs must be
        // fully consumed, and may only be sent to shielded recipients.
        if spendable.has_transparent_coinbase() {
            if spendable.total() != target_amount {
                return Err(ChangeNotAllowedError {
                    available: spendable.total(),
                    required: target_amount,
                }
                .into());
            } else if resolved.has_transparent_recipient() {
                return Err(AddressResolutionError::TransparentRecipientNotAllowed.into());
            }
        }

        if spendable.orchard_notes.len() > self.max_orchard_actions {
            return Err(ExcessOrchardActionsError {
                side: ActionSide::Input,
                orchard_actions: spendable.orchard_notes.len(),
                max_actions: self.max_orchard_actions,
            }
            .into());
        }

        Ok(resolved)
    }
}
