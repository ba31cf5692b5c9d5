//! Selection of the change destination and the pools it may occupy.

use std::collections::BTreeSet;

use crate::address::{
    ChangeAddress, PoolType, ReceiverType, RecipientAddress, SaplingPaymentAddress,
};
use crate::consensus::{BlockHeight, NetworkUpgrade, Parameters};
use crate::data_api::WalletWrite;
use crate::keys::{AccountId, ZtxoSelector, ZCASH_LEGACY_ACCOUNT};
use crate::strategy::TransactionStrategy;
use crate::value::Zatoshis;
use crate::wallet::SpendableInputs;

use super::resolve::{Payments, ResolvedPayment};

/// Computes the pools to which change may be sent, given the receiver types
/// the selector spends from.
#[allow(clippy::too_many_arguments)]
fn allowed_change_pools<P: Parameters>(
    params: &P,
    receiver_types: &BTreeSet<ReceiverType>,
    spendable: &SpendableInputs,
    recipient_pools: &BTreeSet<PoolType>,
    strategy: &TransactionStrategy,
    anchor_height: BlockHeight,
    send_from_account: AccountId,
) -> BTreeSet<PoolType> {
    let mut result = recipient_pools.clone();
    // We always allow shielded change when not sending from the legacy
    // account.
    if send_from_account != ZCASH_LEGACY_ACCOUNT {
        result.insert(PoolType::Sapling);
    }
    for rtype in receiver_types {
        match rtype {
            ReceiverType::P2pkh | ReceiverType::P2sh => {
                // TODO: Tightening this to `strategy.allow_revealed_recipients()`
                // alone is the correct policy, but it is a breaking change
                // from previous behavior, so enable it separately.
                if !spendable.utxos.is_empty() || strategy.allow_revealed_recipients() {
                    result.insert(PoolType::Transparent);
                }
            }
            ReceiverType::Sapling => {
                if !spendable.sapling_notes.is_empty() || strategy.allow_revealed_amounts() {
                    result.insert(PoolType::Sapling);
                }
            }
            ReceiverType::Orchard => {
                if params.is_nu_active(NetworkUpgrade::Nu5, anchor_height)
                    && (!spendable.orchard_notes.is_empty() || strategy.allow_revealed_amounts())
                {
                    result.insert(PoolType::Orchard);
                }
            }
        }
    }
    result
}

fn push_change(
    payments: &mut Payments,
    change_amount: Zatoshis,
    send_to: RecipientAddress,
) -> ChangeAddress {
    payments.add_payment(ResolvedPayment::new(
        None,
        send_to.clone(),
        change_amount,
        None,
        true,
    ));
    ChangeAddress::Resolved(send_to)
}

/// Chooses the change destination for the transaction and, unless change
/// returns to Sprout, appends the change output to `payments`.
///
/// Callers must only invoke this when the change amount is positive.
#[allow(clippy::too_many_arguments)]
pub(crate) fn add_change_payment<P: Parameters, W: WalletWrite>(
    params: &P,
    wallet: &mut W,
    selector: &ZtxoSelector,
    spendable: &SpendableInputs,
    payments: &mut Payments,
    strategy: &TransactionStrategy,
    anchor_height: BlockHeight,
    change_amount: Zatoshis,
    send_from_account: AccountId,
) -> ChangeAddress {
    let recipient_pools = payments.recipient_pools().clone();
    let allowed = |receiver_types: &BTreeSet<ReceiverType>| {
        allowed_change_pools(
            params,
            receiver_types,
            spendable,
            &recipient_pools,
            strategy,
            anchor_height,
            send_from_account,
        )
    };

    let account_change = |payments: &mut Payments,
                          wallet: &mut W,
                          account: AccountId,
                          pools: BTreeSet<PoolType>| {
        let send_to = wallet
            .generate_change_address_for_account(account, &pools)
            .expect("the account can generate a change address for an allowed pool");
        push_change(payments, change_amount, send_to)
    };

    // For Sapling, a legacy address returns change to the originating
    // address; otherwise change goes to the account's internal Sapling
    // address.
    let sapling_change =
        |payments: &mut Payments, wallet: &mut W, addr: SaplingPaymentAddress| {
            if send_from_account == ZCASH_LEGACY_ACCOUNT {
                push_change(payments, change_amount, RecipientAddress::Sapling(addr))
            } else {
                let pools = allowed(&[ReceiverType::Sapling].into_iter().collect());
                account_change(payments, wallet, send_from_account, pools)
            }
        };

    match selector {
        ZtxoSelector::TransparentPubKeyHash(_) => {
            let pools = allowed(&[ReceiverType::P2pkh].into_iter().collect());
            account_change(payments, wallet, send_from_account, pools)
        }
        ZtxoSelector::TransparentScriptHash(_) => {
            let pools = allowed(&[ReceiverType::P2sh].into_iter().collect());
            account_change(payments, wallet, send_from_account, pools)
        }
        // For Sprout, change returns to the originating address via the
        // transaction builder.
        ZtxoSelector::Sprout(addr) => ChangeAddress::Sprout(*addr),
        ZtxoSelector::SproutViewingKey(vk) => ChangeAddress::Sprout(*vk.address()),
        ZtxoSelector::Sapling(addr) => sapling_change(payments, wallet, *addr),
        ZtxoSelector::SaplingExtendedFullViewingKey(xfvk) => {
            sapling_change(payments, wallet, *xfvk.default_address())
        }
        ZtxoSelector::Unified(ua) => {
            let ufvk = wallet
                .get_ufvk_for_address(ua)
                .expect("spending key checks ensured a UFVK exists for this address");
            let send_to = ufvk
                .change_address(&allowed(&ua.receiver_types()))
                .expect("the UFVK can derive a change address for an allowed pool");
            push_change(payments, change_amount, send_to)
        }
        ZtxoSelector::UnifiedFullViewingKey(ufvk) => {
            let send_to = ufvk
                .change_address(&allowed(&ufvk.receiver_types()))
                .expect("the UFVK can derive a change address for an allowed pool");
            push_change(payments, change_amount, send_to)
        }
        ZtxoSelector::Account(pattern) => {
            let pools = allowed(pattern.receiver_types());
            account_change(payments, wallet, pattern.account_id(), pools)
        }
    }
}
