//! *Transaction planning for shielded Zcash wallets.*
//!
//! `zcash_tx_planner` decides, for a set of intended payments and a wallet's
//! spendable notes and UTXOs across the transparent, Sprout, Sapling, and
//! Orchard pools, which inputs to consume, how to resolve each recipient to a
//! concrete receiver within a valid pool, where to send change, and which
//! outgoing viewing keys to use, while enforcing a caller-supplied privacy
//! policy. The resulting plan is executed against a low-level transaction
//! builder supplied by the caller.
//!
//! The crate owns no persistent state: the wallet, the chain view, and the
//! transaction builder are collaborators reached through the traits in
//! [`data_api`] and [`builder`].

// Catch documentation errors caused by code changes.
#![deny(rustdoc::broken_intra_doc_links)]

pub mod address;
pub mod builder;
pub mod consensus;
pub mod data_api;
pub mod fees;
pub mod keys;
pub mod memo;
pub mod planner;
pub mod strategy;
pub mod value;
pub mod wallet;

#[cfg(any(test, feature = "test-dependencies"))]
pub mod testing;

pub use planner::{TransactionEffects, WalletTxBuilder};
pub use strategy::{PrivacyPolicy, TransactionStrategy};
