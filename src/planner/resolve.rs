//! Resolution of abstract payments to concrete receivers within valid pools.

use std::collections::BTreeSet;

use crate::address::{Address, PoolType, RecipientAddress, UnifiedAddress};
use crate::consensus::{BlockHeight, NetworkUpgrade, Parameters};
use crate::memo::MemoBytes;
use crate::strategy::TransactionStrategy;
use crate::value::Zatoshis;
use crate::wallet::SpendableInputs;

use super::error::AddressResolutionError;

/// A requested payment: a recipient, an amount, and an optional memo.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payment {
    recipient_address: Address,
    amount: Zatoshis,
    memo: Option<MemoBytes>,
}

impl Payment {
    /// Constructs a payment.
    ///
    /// Returns `None` if a memo is given for a transparent recipient, which
    /// cannot carry one.
    pub fn new(
        recipient_address: Address,
        amount: Zatoshis,
        memo: Option<MemoBytes>,
    ) -> Option<Self> {
        if memo.is_some() && recipient_address.is_transparent() {
            None
        } else {
            Some(Payment {
                recipient_address,
                amount,
                memo,
            })
        }
    }

    pub fn recipient_address(&self) -> &Address {
        &self.recipient_address
    }

    pub fn amount(&self) -> Zatoshis {
        self.amount
    }

    pub fn memo(&self) -> Option<&MemoBytes> {
        self.memo.as_ref()
    }
}

/// A payment that has been bound to a concrete receiver in a single pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedPayment {
    ua: Option<UnifiedAddress>,
    address: RecipientAddress,
    amount: Zatoshis,
    memo: Option<MemoBytes>,
    is_internal: bool,
}

impl ResolvedPayment {
    pub fn new(
        ua: Option<UnifiedAddress>,
        address: RecipientAddress,
        amount: Zatoshis,
        memo: Option<MemoBytes>,
        is_internal: bool,
    ) -> Self {
        ResolvedPayment {
            ua,
            address,
            amount,
            memo,
            is_internal,
        }
    }

    /// Returns the unified address this payment was resolved from, if it was
    /// requested via one.
    pub fn unified_address(&self) -> Option<&UnifiedAddress> {
        self.ua.as_ref()
    }

    pub fn address(&self) -> &RecipientAddress {
        &self.address
    }

    pub fn amount(&self) -> Zatoshis {
        self.amount
    }

    pub fn memo(&self) -> Option<&MemoBytes> {
        self.memo.as_ref()
    }

    /// Returns whether this output is wallet-internal change.
    pub fn is_internal(&self) -> bool {
        self.is_internal
    }

    /// Returns the pool this payment's receiver belongs to.
    pub fn pool_type(&self) -> PoolType {
        self.address.pool_type()
    }
}

/// The ordered collection of a transaction's resolved payments, together with
/// summaries derived from them.
#[derive(Clone, Debug)]
pub struct Payments {
    payments: Vec<ResolvedPayment>,
    recipient_pools: BTreeSet<PoolType>,
    has_transparent_recipient: bool,
    has_sapling_recipient: bool,
    has_orchard_recipient: bool,
    total: Zatoshis,
}

impl Default for Payments {
    fn default() -> Self {
        Payments {
            payments: Vec::new(),
            recipient_pools: BTreeSet::new(),
            has_transparent_recipient: false,
            has_sapling_recipient: false,
            has_orchard_recipient: false,
            total: Zatoshis::ZERO,
        }
    }
}

impl Payments {
    pub fn new(payments: Vec<ResolvedPayment>) -> Self {
        let mut result = Payments::default();
        for payment in payments {
            result.add_payment(payment);
        }
        result
    }

    /// Appends a payment, updating the derived summaries.
    pub fn add_payment(&mut self, payment: ResolvedPayment) {
        match payment.pool_type() {
            PoolType::Transparent => self.has_transparent_recipient = true,
            PoolType::Sapling => self.has_sapling_recipient = true,
            PoolType::Orchard => self.has_orchard_recipient = true,
            PoolType::Sprout => unreachable!("Sprout is not a recipient pool"),
        }
        self.recipient_pools.insert(payment.pool_type());
        self.total = (self.total + payment.amount())
            .expect("payment totals are within the valid monetary range");
        self.payments.push(payment);
    }

    /// Returns the resolved payments, in request order, with any change
    /// output last.
    pub fn payments(&self) -> &[ResolvedPayment] {
        &self.payments
    }

    /// Returns the total value of all payments, including change.
    pub fn total(&self) -> Zatoshis {
        self.total
    }

    /// Returns the set of pools receiving outputs.
    pub fn recipient_pools(&self) -> &BTreeSet<PoolType> {
        &self.recipient_pools
    }

    pub fn has_transparent_recipient(&self) -> bool {
        self.has_transparent_recipient
    }

    pub fn has_sapling_recipient(&self) -> bool {
        self.has_sapling_recipient
    }

    pub fn has_orchard_recipient(&self) -> bool {
        self.has_orchard_recipient
    }
}

/// Resolves each requested payment to a concrete receiver, in request order,
/// short-circuiting on the first failure.
///
/// Returns the resolved payments and the number of Orchard outputs among
/// them.
///
/// This is a simple greedy algorithm that attempts to preserve requested
/// transactional privacy while moving as much value to the most recent pool
/// as possible.
pub(crate) fn resolve_payments<P: Parameters>(
    params: &P,
    spendable: &SpendableInputs,
    payments: &[Payment],
    strategy: &TransactionStrategy,
    anchor_height: BlockHeight,
    target_amount: Zatoshis,
) -> Result<(Payments, usize), AddressResolutionError> {
    let mut max_sapling_available = spendable.sapling_total();
    let mut max_orchard_available = spendable.orchard_total();
    let mut orchard_outputs: usize = 0;

    // Orchard receivers may only be selected when there are sufficient
    // non-Sprout funds to cover the payment total: Sprout value cannot reach
    // the Orchard pool without Sapling intermediation.
    let can_resolve_orchard = params.is_nu_active(NetworkUpgrade::Nu5, anchor_height)
        && (spendable.total() - spendable.sprout_total())
            .expect("Sprout total does not exceed the overall total")
            >= target_amount;

    let mut resolved: Vec<ResolvedPayment> = Vec::with_capacity(payments.len());
    for payment in payments {
        match payment.recipient_address() {
            Address::Transparent(addr) => {
                if strategy.allow_revealed_recipients() {
                    resolved.push(ResolvedPayment::new(
                        None,
                        RecipientAddress::Transparent(*addr),
                        payment.amount(),
                        payment.memo().cloned(),
                        false,
                    ));
                } else {
                    return Err(AddressResolutionError::TransparentRecipientNotAllowed);
                }
            }
            Address::Sprout(_) => {
                return Err(AddressResolutionError::SproutRecipientsNotSupported);
            }
            Address::Sapling(addr) => {
                if strategy.allow_revealed_amounts() || payment.amount() <= max_sapling_available {
                    resolved.push(ResolvedPayment::new(
                        None,
                        RecipientAddress::Sapling(*addr),
                        payment.amount(),
                        payment.memo().cloned(),
                        false,
                    ));
                    if !strategy.allow_revealed_amounts() {
                        max_sapling_available = (max_sapling_available - payment.amount())
                            .expect("gated on the payment amount above");
                    }
                } else {
                    return Err(AddressResolutionError::RevealingSaplingAmountNotAllowed);
                }
            }
            Address::Unified(ua) => {
                if can_resolve_orchard
                    && ua.orchard().is_some()
                    && (strategy.allow_revealed_amounts()
                        || payment.amount() <= max_orchard_available)
                {
                    resolved.push(ResolvedPayment::new(
                        Some(ua.clone()),
                        RecipientAddress::Orchard(*ua.orchard().expect("checked above")),
                        payment.amount(),
                        payment.memo().cloned(),
                        false,
                    ));
                    if !strategy.allow_revealed_amounts() {
                        max_orchard_available = (max_orchard_available - payment.amount())
                            .expect("gated on the payment amount above");
                    }
                    orchard_outputs += 1;
                } else if ua.sapling().is_some()
                    && (strategy.allow_revealed_amounts()
                        || payment.amount() <= max_sapling_available)
                {
                    resolved.push(ResolvedPayment::new(
                        Some(ua.clone()),
                        RecipientAddress::Sapling(*ua.sapling().expect("checked above")),
                        payment.amount(),
                        payment.memo().cloned(),
                        false,
                    ));
                    if !strategy.allow_revealed_amounts() {
                        max_sapling_available = (max_sapling_available - payment.amount())
                            .expect("gated on the payment amount above");
                    }
                } else if strategy.allow_revealed_recipients() {
                    // Fall back to a transparent receiver, which cannot carry
                    // the memo.
                    if let Some(addr) = ua.p2sh() {
                        resolved.push(ResolvedPayment::new(
                            Some(ua.clone()),
                            RecipientAddress::Transparent(*addr),
                            payment.amount(),
                            None,
                            false,
                        ));
                    } else if let Some(addr) = ua.p2pkh() {
                        resolved.push(ResolvedPayment::new(
                            Some(ua.clone()),
                            RecipientAddress::Transparent(*addr),
                            payment.amount(),
                            None,
                            false,
                        ));
                    } else {
                        // This occurs only for an Orchard-only unified
                        // address when Orchard cannot be resolved, meaning
                        // either insufficient non-Sprout funds or pre-NU5.
                        return Err(AddressResolutionError::CouldNotResolveReceiver);
                    }
                } else if strategy.allow_revealed_amounts() {
                    return Err(AddressResolutionError::TransparentReceiverNotAllowed);
                } else {
                    return Err(AddressResolutionError::RevealingReceiverAmountsNotAllowed);
                }
            }
        }
    }

    Ok((Payments::new(resolved), orchard_outputs))
}
