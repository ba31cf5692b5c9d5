//! Key and viewing-key models, and the selectors that describe where a
//! transaction may draw funds from.
//!
//! Key material here is opaque to the planner: it is looked up from the
//! wallet, carried to the transaction builder, and never inspected. Each
//! viewing-key model exposes only what planning requires of it: its outgoing
//! viewing keys, and the internal receiver to which it would direct change.

use memuse::DynamicUsage;
use std::collections::BTreeSet;
use std::fmt;

use crate::address::{
    OrchardRawAddress, PoolType, ReceiverType, RecipientAddress, SaplingPaymentAddress,
    SproutPaymentAddress, TransparentAddress, UnifiedAddress,
};

/// A ZIP 32 account identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountId(u32);

memuse::impl_no_dynamic_usage!(AccountId);

/// The account identifier reserved for keys that predate unified accounts.
pub const ZCASH_LEGACY_ACCOUNT: AccountId = AccountId(0x7FFF_FFFF);

impl AccountId {
    pub const fn const_from_u32(id: u32) -> Self {
        AccountId(id)
    }
}

impl From<u32> for AccountId {
    fn from(id: u32) -> Self {
        AccountId(id)
    }
}

impl From<AccountId> for u32 {
    fn from(id: AccountId) -> u32 {
        id.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An outgoing viewing key: the 32-byte key that lets the sender of an output
/// recover it after the fact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutgoingViewingKey(pub [u8; 32]);

/// The public components of a transparent account key, sufficient to derive
/// the OVKs used when shielding transparent funds and an internal change
/// address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountPubKey {
    internal_ovk: OutgoingViewingKey,
    external_ovk: OutgoingViewingKey,
    internal_address: TransparentAddress,
}

impl AccountPubKey {
    pub fn from_parts(
        internal_ovk: OutgoingViewingKey,
        external_ovk: OutgoingViewingKey,
        internal_address: TransparentAddress,
    ) -> Self {
        AccountPubKey {
            internal_ovk,
            external_ovk,
            internal_address,
        }
    }

    /// Returns the `(internal, external)` OVK pair used for outputs created
    /// when shielding funds held by this key.
    pub fn ovks_for_shielding(&self) -> (OutgoingViewingKey, OutgoingViewingKey) {
        (self.internal_ovk, self.external_ovk)
    }

    /// Returns the transparent address to which this key directs change.
    pub fn internal_address(&self) -> &TransparentAddress {
        &self.internal_address
    }
}

/// A transparent account spending key.
#[derive(Clone, Debug)]
pub struct AccountKey {
    pubkey: AccountPubKey,
}

impl AccountKey {
    pub fn from_pubkey(pubkey: AccountPubKey) -> Self {
        AccountKey { pubkey }
    }

    pub fn to_account_pubkey(&self) -> &AccountPubKey {
        &self.pubkey
    }
}

/// A Sapling extended full viewing key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaplingExtendedFullViewingKey {
    internal_ovk: OutgoingViewingKey,
    external_ovk: OutgoingViewingKey,
    default_address: SaplingPaymentAddress,
}

impl SaplingExtendedFullViewingKey {
    pub fn from_parts(
        internal_ovk: OutgoingViewingKey,
        external_ovk: OutgoingViewingKey,
        default_address: SaplingPaymentAddress,
    ) -> Self {
        SaplingExtendedFullViewingKey {
            internal_ovk,
            external_ovk,
            default_address,
        }
    }

    /// Returns the `(internal, external)` OVK pair for this key.
    pub fn ovks(&self) -> (OutgoingViewingKey, OutgoingViewingKey) {
        (self.internal_ovk, self.external_ovk)
    }

    pub fn default_address(&self) -> &SaplingPaymentAddress {
        &self.default_address
    }
}

/// A Sapling extended spending key.
///
/// Only the viewing component is ever examined by the planner; the key itself
/// is passed through to the transaction builder for spend authorization.
#[derive(Clone, Debug)]
pub struct SaplingExtendedSpendingKey {
    xfvk: SaplingExtendedFullViewingKey,
}

impl SaplingExtendedSpendingKey {
    pub fn from_xfvk(xfvk: SaplingExtendedFullViewingKey) -> Self {
        SaplingExtendedSpendingKey { xfvk }
    }

    pub fn to_xfvk(&self) -> &SaplingExtendedFullViewingKey {
        &self.xfvk
    }
}

/// The Sapling component of a unified full viewing key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaplingDiversifiableFullViewingKey {
    internal_ovk: OutgoingViewingKey,
    external_ovk: OutgoingViewingKey,
    internal_address: SaplingPaymentAddress,
}

impl SaplingDiversifiableFullViewingKey {
    pub fn from_parts(
        internal_ovk: OutgoingViewingKey,
        external_ovk: OutgoingViewingKey,
        internal_address: SaplingPaymentAddress,
    ) -> Self {
        SaplingDiversifiableFullViewingKey {
            internal_ovk,
            external_ovk,
            internal_address,
        }
    }

    /// Returns the `(internal, external)` OVK pair for this key.
    pub fn ovks(&self) -> (OutgoingViewingKey, OutgoingViewingKey) {
        (self.internal_ovk, self.external_ovk)
    }

    /// Returns the Sapling address to which this key directs change.
    pub fn internal_address(&self) -> &SaplingPaymentAddress {
        &self.internal_address
    }
}

/// The Orchard component of a unified full viewing key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrchardFullViewingKey {
    internal_ovk: OutgoingViewingKey,
    external_ovk: OutgoingViewingKey,
    internal_address: OrchardRawAddress,
}

impl OrchardFullViewingKey {
    pub fn from_parts(
        internal_ovk: OutgoingViewingKey,
        external_ovk: OutgoingViewingKey,
        internal_address: OrchardRawAddress,
    ) -> Self {
        OrchardFullViewingKey {
            internal_ovk,
            external_ovk,
            internal_address,
        }
    }

    pub fn to_internal_ovk(&self) -> OutgoingViewingKey {
        self.internal_ovk
    }

    pub fn to_external_ovk(&self) -> OutgoingViewingKey {
        self.external_ovk
    }

    /// Returns the Orchard address to which this key directs change.
    pub fn internal_address(&self) -> &OrchardRawAddress {
        &self.internal_address
    }
}

/// An Orchard spending key, passed through to the transaction builder.
#[derive(Clone, Debug)]
pub struct OrchardSpendingKey(pub [u8; 32]);

/// A Sprout spending key, passed through to the transaction builder.
#[derive(Clone, Debug)]
pub struct SproutSpendingKey(pub [u8; 32]);

/// A Sprout incoming viewing key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SproutViewingKey {
    address: SproutPaymentAddress,
}

impl SproutViewingKey {
    pub fn for_address(address: SproutPaymentAddress) -> Self {
        SproutViewingKey { address }
    }

    /// Returns the payment address corresponding to this viewing key.
    pub fn address(&self) -> &SproutPaymentAddress {
        &self.address
    }
}

/// A unified full viewing key: a bundle of per-pool viewing keys under a
/// single account identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnifiedFullViewingKey {
    transparent: Option<AccountPubKey>,
    sapling: Option<SaplingDiversifiableFullViewingKey>,
    orchard: Option<OrchardFullViewingKey>,
}

impl UnifiedFullViewingKey {
    /// Constructs a UFVK from its per-pool components.
    ///
    /// Returns `None` if no components are provided.
    pub fn from_components(
        transparent: Option<AccountPubKey>,
        sapling: Option<SaplingDiversifiableFullViewingKey>,
        orchard: Option<OrchardFullViewingKey>,
    ) -> Option<Self> {
        if transparent.is_none() && sapling.is_none() && orchard.is_none() {
            None
        } else {
            Some(UnifiedFullViewingKey {
                transparent,
                sapling,
                orchard,
            })
        }
    }

    pub fn transparent(&self) -> Option<&AccountPubKey> {
        self.transparent.as_ref()
    }

    pub fn sapling(&self) -> Option<&SaplingDiversifiableFullViewingKey> {
        self.sapling.as_ref()
    }

    pub fn orchard(&self) -> Option<&OrchardFullViewingKey> {
        self.orchard.as_ref()
    }

    /// Returns the receiver types for which this key can derive addresses.
    pub fn receiver_types(&self) -> BTreeSet<ReceiverType> {
        let mut result = BTreeSet::new();
        if self.orchard.is_some() {
            result.insert(ReceiverType::Orchard);
        }
        if self.sapling.is_some() {
            result.insert(ReceiverType::Sapling);
        }
        if self.transparent.is_some() {
            result.insert(ReceiverType::P2pkh);
        }
        result
    }

    /// Returns the change address for this UFVK over the given set of allowed
    /// pools, preferring the most recent pool for which this key has a
    /// component: Orchard, then Sapling, then transparent.
    pub fn change_address(&self, allowed_pools: &BTreeSet<PoolType>) -> Option<RecipientAddress> {
        if allowed_pools.contains(&PoolType::Orchard) {
            if let Some(fvk) = &self.orchard {
                return Some(RecipientAddress::Orchard(*fvk.internal_address()));
            }
        }
        if allowed_pools.contains(&PoolType::Sapling) {
            if let Some(dfvk) = &self.sapling {
                return Some(RecipientAddress::Sapling(*dfvk.internal_address()));
            }
        }
        if allowed_pools.contains(&PoolType::Transparent) {
            if let Some(tfvk) = &self.transparent {
                return Some(RecipientAddress::Transparent(*tfvk.internal_address()));
            }
        }
        None
    }
}

/// A selector describing which of a wallet's notes and UTXOs a transaction
/// may spend.
#[derive(Clone, Debug)]
pub enum ZtxoSelector {
    /// Spend funds held by a single transparent P2PKH address.
    TransparentPubKeyHash([u8; 20]),
    /// Spend funds held by a single transparent P2SH address.
    TransparentScriptHash([u8; 20]),
    /// Spend notes received by a Sprout payment address.
    Sprout(SproutPaymentAddress),
    /// Spend notes visible to a Sprout viewing key.
    SproutViewingKey(SproutViewingKey),
    /// Spend notes received by a Sapling payment address.
    Sapling(SaplingPaymentAddress),
    /// Spend notes visible to a Sapling extended full viewing key.
    SaplingExtendedFullViewingKey(SaplingExtendedFullViewingKey),
    /// Spend funds received by any receiver of a unified address.
    Unified(UnifiedAddress),
    /// Spend funds visible to a unified full viewing key.
    UnifiedFullViewingKey(UnifiedFullViewingKey),
    /// Spend funds belonging to an account, restricted to the given receiver
    /// types.
    Account(AccountPattern),
}

/// The account-based selector pattern: an account identifier plus the
/// receiver types whose funds are eligible for spending.
#[derive(Clone, Debug)]
pub struct AccountPattern {
    account_id: AccountId,
    receiver_types: BTreeSet<ReceiverType>,
}

impl AccountPattern {
    pub fn from_parts(account_id: AccountId, receiver_types: BTreeSet<ReceiverType>) -> Self {
        AccountPattern {
            account_id,
            receiver_types,
        }
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn receiver_types(&self) -> &BTreeSet<ReceiverType> {
        &self.receiver_types
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crate::address::{
        OrchardRawAddress, PoolType, RecipientAddress, SaplingPaymentAddress, TransparentAddress,
    };

    use super::{
        AccountPubKey, OrchardFullViewingKey, OutgoingViewingKey,
        SaplingDiversifiableFullViewingKey, UnifiedFullViewingKey,
    };

    fn ovk(b: u8) -> OutgoingViewingKey {
        OutgoingViewingKey([b; 32])
    }

    fn full_ufvk() -> UnifiedFullViewingKey {
        UnifiedFullViewingKey::from_components(
            Some(AccountPubKey::from_parts(
                ovk(1),
                ovk(2),
                TransparentAddress::PublicKeyHash([3; 20]),
            )),
            Some(SaplingDiversifiableFullViewingKey::from_parts(
                ovk(4),
                ovk(5),
                SaplingPaymentAddress([6; 43]),
            )),
            Some(OrchardFullViewingKey::from_parts(
                ovk(7),
                ovk(8),
                OrchardRawAddress([9; 43]),
            )),
        )
        .unwrap()
    }

    #[test]
    fn ufvk_requires_a_component() {
        assert!(UnifiedFullViewingKey::from_components(None, None, None).is_none());
    }

    #[test]
    fn change_address_prefers_most_recent_pool() {
        let ufvk = full_ufvk();

        let all: BTreeSet<PoolType> =
            [PoolType::Transparent, PoolType::Sapling, PoolType::Orchard]
                .into_iter()
                .collect();
        assert_eq!(
            ufvk.change_address(&all),
            Some(RecipientAddress::Orchard(OrchardRawAddress([9; 43])))
        );

        let no_orchard: BTreeSet<PoolType> = [PoolType::Transparent, PoolType::Sapling]
            .into_iter()
            .collect();
        assert_eq!(
            ufvk.change_address(&no_orchard),
            Some(RecipientAddress::Sapling(SaplingPaymentAddress([6; 43])))
        );

        let transparent_only: BTreeSet<PoolType> = [PoolType::Transparent].into_iter().collect();
        assert_eq!(
            ufvk.change_address(&transparent_only),
            Some(RecipientAddress::Transparent(
                TransparentAddress::PublicKeyHash([3; 20])
            ))
        );

        assert_eq!(ufvk.change_address(&BTreeSet::new()), None);
    }
}
