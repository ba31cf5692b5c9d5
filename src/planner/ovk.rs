//! Selection of the outgoing viewing keys for internal and external outputs.

use crate::data_api::WalletRead;
use crate::keys::{OutgoingViewingKey, UnifiedFullViewingKey, ZtxoSelector, ZCASH_LEGACY_ACCOUNT};
use crate::wallet::SpendableInputs;

/// Returns the `(internal, external)` OVK pair for a UFVK, chosen by the pool
/// that contributes inputs: Orchard first, then Sapling, then transparent.
///
/// Panics if the spendable set is empty; input selection guarantees it is not.
pub(crate) fn ovks_for_ufvk(
    ufvk: &UnifiedFullViewingKey,
    spendable: &SpendableInputs,
) -> (OutgoingViewingKey, OutgoingViewingKey) {
    if !spendable.orchard_notes.is_empty() {
        // Orchard notes will not have been selected if the UFVK does not
        // contain an Orchard key.
        let fvk = ufvk
            .orchard()
            .expect("Orchard inputs imply an Orchard key in the UFVK");
        (fvk.to_internal_ovk(), fvk.to_external_ovk())
    } else if !spendable.sapling_notes.is_empty() {
        // Sapling notes will not have been selected if the UFVK does not
        // contain a Sapling key.
        ufvk.sapling()
            .expect("Sapling inputs imply a Sapling key in the UFVK")
            .ovks()
    } else if !spendable.utxos.is_empty() {
        // Transparent UTXOs will not have been selected if the UFVK does not
        // contain a transparent key.
        ufvk.transparent()
            .expect("transparent inputs imply a transparent key in the UFVK")
            .ovks_for_shielding()
    } else {
        unreachable!("input selection produced no spendable inputs")
    }
}

/// Returns the `(internal, external)` OVK pair to use for the transaction's
/// change and external outputs respectively, determined by the selector the
/// funds are being spent from.
pub(crate) fn select_ovks<W: WalletRead>(
    wallet: &W,
    selector: &ZtxoSelector,
    spendable: &SpendableInputs,
) -> (OutgoingViewingKey, OutgoingViewingKey) {
    match selector {
        ZtxoSelector::TransparentPubKeyHash(_)
        | ZtxoSelector::TransparentScriptHash(_)
        | ZtxoSelector::Sprout(_)
        | ZtxoSelector::SproutViewingKey(_) => wallet
            .get_legacy_account_key()
            .to_account_pubkey()
            .ovks_for_shielding(),
        ZtxoSelector::Sapling(addr) => wallet
            .get_sapling_extended_spending_key(addr)
            .expect("the wallet holds the spending key for the selector address")
            .to_xfvk()
            .ovks(),
        ZtxoSelector::SaplingExtendedFullViewingKey(xfvk) => xfvk.ovks(),
        ZtxoSelector::Unified(ua) => {
            // Spending key checks have ensured that we have a UFVK
            // corresponding to this address.
            let ufvk = wallet
                .get_ufvk_for_address(ua)
                .expect("the wallet holds a UFVK for the selector address");
            ovks_for_ufvk(&ufvk, spendable)
        }
        ZtxoSelector::UnifiedFullViewingKey(ufvk) => ovks_for_ufvk(ufvk, spendable),
        ZtxoSelector::Account(pattern) => {
            if pattern.account_id() == ZCASH_LEGACY_ACCOUNT {
                wallet
                    .get_legacy_account_key()
                    .to_account_pubkey()
                    .ovks_for_shielding()
            } else {
                // By definition, we have a UFVK for every known non-legacy
                // account.
                let ufvk = wallet
                    .get_unified_full_viewing_key_by_account(pattern.account_id())
                    .expect("every non-legacy account has a UFVK");
                ovks_for_ufvk(&ufvk, spendable)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crate::keys::{AccountId, AccountPattern, ZtxoSelector, ZCASH_LEGACY_ACCOUNT};
    use crate::testing::{full_ufvk, orchard_note, sapling_note, utxo, MockWallet};
    use crate::wallet::SpendableInputs;

    use super::{ovks_for_ufvk, select_ovks};

    #[test]
    fn ufvk_ovks_follow_the_contributing_pool() {
        let ufvk = full_ufvk(1);

        let orchard = SpendableInputs {
            orchard_notes: vec![orchard_note(1, 1000)],
            sapling_notes: vec![sapling_note(2, 1000)],
            utxos: vec![utxo(3, 1000, false)],
            ..Default::default()
        };
        assert_eq!(
            ovks_for_ufvk(&ufvk, &orchard),
            (
                ufvk.orchard().unwrap().to_internal_ovk(),
                ufvk.orchard().unwrap().to_external_ovk()
            )
        );

        let sapling = SpendableInputs {
            sapling_notes: vec![sapling_note(2, 1000)],
            utxos: vec![utxo(3, 1000, false)],
            ..Default::default()
        };
        assert_eq!(ovks_for_ufvk(&ufvk, &sapling), ufvk.sapling().unwrap().ovks());

        let transparent = SpendableInputs {
            utxos: vec![utxo(3, 1000, false)],
            ..Default::default()
        };
        assert_eq!(
            ovks_for_ufvk(&ufvk, &transparent),
            ufvk.transparent().unwrap().ovks_for_shielding()
        );
    }

    #[test]
    #[should_panic]
    fn ufvk_ovks_panic_on_empty_spendable_set() {
        ovks_for_ufvk(&full_ufvk(1), &SpendableInputs::default());
    }

    #[test]
    fn transparent_and_sprout_selectors_use_the_legacy_account() {
        let wallet = MockWallet::default();
        let spendable = SpendableInputs {
            utxos: vec![utxo(1, 1000, false)],
            ..Default::default()
        };
        let expected = wallet
            .legacy_key
            .to_account_pubkey()
            .ovks_for_shielding();

        assert_eq!(
            select_ovks(
                &wallet,
                &ZtxoSelector::TransparentPubKeyHash([1; 20]),
                &spendable
            ),
            expected
        );
        assert_eq!(
            select_ovks(
                &wallet,
                &ZtxoSelector::Sprout(crate::address::SproutPaymentAddress([2; 64])),
                &spendable
            ),
            expected
        );
    }

    #[test]
    fn legacy_account_pattern_uses_the_legacy_account_key() {
        let wallet = MockWallet::default();
        let spendable = SpendableInputs {
            sapling_notes: vec![sapling_note(1, 1000)],
            ..Default::default()
        };
        let selector = ZtxoSelector::Account(AccountPattern::from_parts(
            ZCASH_LEGACY_ACCOUNT,
            BTreeSet::new(),
        ));
        assert_eq!(
            select_ovks(&wallet, &selector, &spendable),
            wallet.legacy_key.to_account_pubkey().ovks_for_shielding()
        );
    }

    #[test]
    fn account_pattern_uses_the_account_ufvk() {
        let mut wallet = MockWallet::default();
        let account = AccountId::from(7);
        let ufvk = full_ufvk(7);
        wallet.account_ufvks.insert(account, ufvk.clone());

        let spendable = SpendableInputs {
            sapling_notes: vec![sapling_note(1, 1000)],
            ..Default::default()
        };
        let selector = ZtxoSelector::Account(AccountPattern::from_parts(account, BTreeSet::new()));
        assert_eq!(
            select_ovks(&wallet, &selector, &spendable),
            ufvk.sapling().unwrap().ovks()
        );
    }
}
