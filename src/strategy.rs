//! Privacy policies and the transaction strategy that enforces them.

use memuse::DynamicUsage;
use std::fmt;

/// A privacy policy: an upper bound on the information a transaction is
/// permitted to reveal on-chain.
///
/// Policies form a totally ordered lattice, ascending in permissiveness. The
/// ordinal of each policy is part of the public contract:
///
/// | ordinal | policy |
/// |---------|--------|
/// | 0 | `FullPrivacy` |
/// | 1 | `AllowRevealedAmounts` |
/// | 2 | `AllowRevealedRecipients` |
/// | 3 | `AllowRevealedSenders` |
/// | 4 | `AllowRevealedSendersAndRecipients` |
/// | 5 | `AllowFullyTransparent` |
/// | 6 | `AllowLinkingAccountAddresses` |
/// | 7 | `NoPrivacy` |
///
/// A strategy at ordinal *n* permits everything any policy at ordinal *m ≤ n*
/// permits. Each policy subsumes the ones below it: revealing recipients or
/// senders necessarily reveals the amounts involved, and a fully transparent
/// transaction reveals senders and recipients both.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum PrivacyPolicy {
    /// Do not reveal any information about spends or outputs.
    FullPrivacy,
    /// Permit a nonzero value balance that reveals the amount crossing
    /// between pools.
    AllowRevealedAmounts,
    /// Permit transparent recipients, revealing the destination and amount
    /// of those outputs.
    AllowRevealedRecipients,
    /// Permit transparent inputs, revealing the sending addresses and
    /// amounts.
    AllowRevealedSenders,
    /// Permit transparent inputs and transparent recipients in the same
    /// transaction.
    AllowRevealedSendersAndRecipients,
    /// Permit a transaction in which every input and output is transparent.
    AllowFullyTransparent,
    /// Permit spending transparent funds received by multiple addresses of
    /// the same account, linking those addresses to one another.
    AllowLinkingAccountAddresses,
    /// Permit any transaction, whatever it reveals.
    NoPrivacy,
}

memuse::impl_no_dynamic_usage!(PrivacyPolicy);

impl PrivacyPolicy {
    fn ordinal(&self) -> u8 {
        match self {
            PrivacyPolicy::FullPrivacy => 0,
            PrivacyPolicy::AllowRevealedAmounts => 1,
            PrivacyPolicy::AllowRevealedRecipients => 2,
            PrivacyPolicy::AllowRevealedSenders => 3,
            PrivacyPolicy::AllowRevealedSendersAndRecipients => 4,
            PrivacyPolicy::AllowFullyTransparent => 5,
            PrivacyPolicy::AllowLinkingAccountAddresses => 6,
            PrivacyPolicy::NoPrivacy => 7,
        }
    }
}

impl fmt::Display for PrivacyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrivacyPolicy::FullPrivacy => write!(f, "FullPrivacy"),
            PrivacyPolicy::AllowRevealedAmounts => write!(f, "AllowRevealedAmounts"),
            PrivacyPolicy::AllowRevealedRecipients => write!(f, "AllowRevealedRecipients"),
            PrivacyPolicy::AllowRevealedSenders => write!(f, "AllowRevealedSenders"),
            PrivacyPolicy::AllowRevealedSendersAndRecipients => {
                write!(f, "AllowRevealedSendersAndRecipients")
            }
            PrivacyPolicy::AllowFullyTransparent => write!(f, "AllowFullyTransparent"),
            PrivacyPolicy::AllowLinkingAccountAddresses => {
                write!(f, "AllowLinkingAccountAddresses")
            }
            PrivacyPolicy::NoPrivacy => write!(f, "NoPrivacy"),
        }
    }
}

/// The caller-requested bound on what a planned transaction may reveal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransactionStrategy {
    requested_level: PrivacyPolicy,
}

memuse::impl_no_dynamic_usage!(TransactionStrategy);

impl TransactionStrategy {
    pub const fn new(requested_level: PrivacyPolicy) -> Self {
        TransactionStrategy { requested_level }
    }

    /// Returns the privacy policy this strategy was constructed with.
    pub fn requested_level(&self) -> PrivacyPolicy {
        self.requested_level
    }

    /// Returns whether this strategy permits everything the given policy
    /// requires.
    pub fn is_compatible_with(&self, policy: PrivacyPolicy) -> bool {
        self.requested_level.ordinal() >= policy.ordinal()
    }

    /// Returns whether a nonzero cross-pool value balance may be revealed.
    pub fn allow_revealed_amounts(&self) -> bool {
        self.is_compatible_with(PrivacyPolicy::AllowRevealedAmounts)
    }

    /// Returns whether transparent recipients are permitted.
    pub fn allow_revealed_recipients(&self) -> bool {
        self.is_compatible_with(PrivacyPolicy::AllowRevealedRecipients)
    }

    /// Returns whether transparent inputs are permitted.
    pub fn allow_revealed_senders(&self) -> bool {
        self.is_compatible_with(PrivacyPolicy::AllowRevealedSenders)
    }
}

impl From<PrivacyPolicy> for TransactionStrategy {
    fn from(policy: PrivacyPolicy) -> Self {
        TransactionStrategy::new(policy)
    }
}
