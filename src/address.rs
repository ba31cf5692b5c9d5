//! Address and value-pool types for payment recipients and change destinations.

use memuse::DynamicUsage;
use std::collections::BTreeSet;
use std::fmt;

/// A value pool in the Zcash protocol.
///
/// Sprout is legacy: notes held in the Sprout pool may be spent, but Sprout
/// addresses are never valid payment recipients.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum PoolType {
    /// The transparent value pool.
    Transparent,
    /// The Sprout shielded value pool.
    Sprout,
    /// The Sapling shielded value pool.
    Sapling,
    /// The Orchard shielded value pool.
    Orchard,
}

memuse::impl_no_dynamic_usage!(PoolType);

impl fmt::Display for PoolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolType::Transparent => write!(f, "Transparent"),
            PoolType::Sprout => write!(f, "Sprout"),
            PoolType::Sapling => write!(f, "Sapling"),
            PoolType::Orchard => write!(f, "Orchard"),
        }
    }
}

/// The kind of receiver that may appear within a unified address, or that a
/// selector may restrict spending to.
///
/// Each receiver type maps to exactly one [`PoolType`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReceiverType {
    P2pkh,
    P2sh,
    Sapling,
    Orchard,
}

memuse::impl_no_dynamic_usage!(ReceiverType);

impl ReceiverType {
    /// Returns the value pool that outputs to this kind of receiver enter.
    pub fn pool_type(&self) -> PoolType {
        match self {
            ReceiverType::P2pkh | ReceiverType::P2sh => PoolType::Transparent,
            ReceiverType::Sapling => PoolType::Sapling,
            ReceiverType::Orchard => PoolType::Orchard,
        }
    }
}

/// A transparent address: the hash of a public key, or of a script.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TransparentAddress {
    PublicKeyHash([u8; 20]),
    ScriptHash([u8; 20]),
}

impl TransparentAddress {
    pub fn receiver_type(&self) -> ReceiverType {
        match self {
            TransparentAddress::PublicKeyHash(_) => ReceiverType::P2pkh,
            TransparentAddress::ScriptHash(_) => ReceiverType::P2sh,
        }
    }
}

/// A Sprout shielded payment address.
///
/// Sprout addresses may appear in payment requests (where they are always
/// rejected) and as the originating address of Sprout change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SproutPaymentAddress(pub [u8; 64]);

/// A Sapling shielded payment address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SaplingPaymentAddress(pub [u8; 43]);

/// An Orchard raw payment address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrchardRawAddress(pub [u8; 43]);

/// A unified address: a bundle of receivers under a single identity, with at
/// most one receiver per [`ReceiverType`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnifiedAddress {
    orchard: Option<OrchardRawAddress>,
    sapling: Option<SaplingPaymentAddress>,
    p2sh: Option<TransparentAddress>,
    p2pkh: Option<TransparentAddress>,
}

impl UnifiedAddress {
    /// Constructs a unified address from its constituent receivers.
    ///
    /// Returns `None` if the receiver set is empty, or if a transparent
    /// receiver is provided in the wrong position.
    pub fn from_receivers(
        orchard: Option<OrchardRawAddress>,
        sapling: Option<SaplingPaymentAddress>,
        p2sh: Option<TransparentAddress>,
        p2pkh: Option<TransparentAddress>,
    ) -> Option<Self> {
        if orchard.is_none() && sapling.is_none() && p2sh.is_none() && p2pkh.is_none() {
            return None;
        }
        match (&p2sh, &p2pkh) {
            (Some(TransparentAddress::PublicKeyHash(_)), _)
            | (_, Some(TransparentAddress::ScriptHash(_))) => None,
            _ => Some(UnifiedAddress {
                orchard,
                sapling,
                p2sh,
                p2pkh,
            }),
        }
    }

    /// Returns the Orchard receiver within this unified address, if any.
    pub fn orchard(&self) -> Option<&OrchardRawAddress> {
        self.orchard.as_ref()
    }

    /// Returns the Sapling receiver within this unified address, if any.
    pub fn sapling(&self) -> Option<&SaplingPaymentAddress> {
        self.sapling.as_ref()
    }

    /// Returns the P2SH receiver within this unified address, if any.
    pub fn p2sh(&self) -> Option<&TransparentAddress> {
        self.p2sh.as_ref()
    }

    /// Returns the P2PKH receiver within this unified address, if any.
    pub fn p2pkh(&self) -> Option<&TransparentAddress> {
        self.p2pkh.as_ref()
    }

    /// Returns the set of receiver types for which this address contains a receiver.
    pub fn receiver_types(&self) -> BTreeSet<ReceiverType> {
        let mut result = BTreeSet::new();
        if self.orchard.is_some() {
            result.insert(ReceiverType::Orchard);
        }
        if self.sapling.is_some() {
            result.insert(ReceiverType::Sapling);
        }
        if self.p2sh.is_some() {
            result.insert(ReceiverType::P2sh);
        }
        if self.p2pkh.is_some() {
            result.insert(ReceiverType::P2pkh);
        }
        result
    }
}

/// An address to which a transaction output can be sent directly: a receiver
/// within a single pool.
///
/// Sprout does not appear here; it is not a valid output pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecipientAddress {
    Transparent(TransparentAddress),
    Sapling(SaplingPaymentAddress),
    Orchard(OrchardRawAddress),
}

impl RecipientAddress {
    /// Returns the pool into which an output to this address would be paid.
    pub fn pool_type(&self) -> PoolType {
        match self {
            RecipientAddress::Transparent(_) => PoolType::Transparent,
            RecipientAddress::Sapling(_) => PoolType::Sapling,
            RecipientAddress::Orchard(_) => PoolType::Orchard,
        }
    }

    /// Returns whether this is a transparent address.
    pub fn is_transparent(&self) -> bool {
        matches!(self, RecipientAddress::Transparent(_))
    }
}

impl From<TransparentAddress> for RecipientAddress {
    fn from(addr: TransparentAddress) -> Self {
        RecipientAddress::Transparent(addr)
    }
}

impl From<SaplingPaymentAddress> for RecipientAddress {
    fn from(addr: SaplingPaymentAddress) -> Self {
        RecipientAddress::Sapling(addr)
    }
}

impl From<OrchardRawAddress> for RecipientAddress {
    fn from(addr: OrchardRawAddress) -> Self {
        RecipientAddress::Orchard(addr)
    }
}

/// A payment recipient address, as provided by a caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Address {
    Transparent(TransparentAddress),
    Sprout(SproutPaymentAddress),
    Sapling(SaplingPaymentAddress),
    Unified(UnifiedAddress),
}

impl Address {
    /// Returns whether this address can only be paid by revealing the
    /// recipient on-chain.
    pub fn is_transparent(&self) -> bool {
        matches!(self, Address::Transparent(_))
    }
}

/// The destination of a transaction's change output, when one exists.
///
/// Sprout change is handled by the transaction builder rather than as a
/// resolved payment, so it is represented by the originating address alone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChangeAddress {
    Sprout(SproutPaymentAddress),
    Resolved(RecipientAddress),
}
