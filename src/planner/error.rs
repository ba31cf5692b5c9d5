//! Error types for transaction planning and building.

use std::fmt;

use crate::strategy::PrivacyPolicy;
use crate::value::Zatoshis;
use crate::wallet::SaplingOutPoint;

/// Errors that can occur when resolving a payment to a concrete receiver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressResolutionError {
    /// The payment names a transparent recipient, and the transaction
    /// strategy does not permit revealing recipients.
    TransparentRecipientNotAllowed,
    /// A unified address could only be resolved to a transparent receiver,
    /// and the transaction strategy does not permit revealing recipients.
    TransparentReceiverNotAllowed,
    /// Sending to Sprout addresses is no longer supported.
    SproutRecipientsNotSupported,
    /// Paying the Sapling receiver would reveal an amount crossing into the
    /// Sapling pool, and the transaction strategy does not permit revealing
    /// amounts.
    RevealingSaplingAmountNotAllowed,
    /// No receiver of a unified address could be paid without revealing an
    /// amount, and the transaction strategy does not permit revealing
    /// amounts.
    RevealingReceiverAmountsNotAllowed,
    /// No receiver of a unified address could be resolved under the
    /// transaction strategy and the available funds.
    CouldNotResolveReceiver,
}

impl fmt::Display for AddressResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressResolutionError::TransparentRecipientNotAllowed => {
                write!(
                    f,
                    "This transaction would have transparent recipients, which is not enabled by default because it will publicly reveal transaction recipients and amounts."
                )
            }
            AddressResolutionError::TransparentReceiverNotAllowed => {
                write!(
                    f,
                    "This transaction would send to a transparent receiver of a unified address, which is not enabled by default because it will publicly reveal transaction recipients and amounts."
                )
            }
            AddressResolutionError::SproutRecipientsNotSupported => {
                write!(f, "Sending funds into the Sprout pool is no longer supported.")
            }
            AddressResolutionError::RevealingSaplingAmountNotAllowed => {
                write!(
                    f,
                    "Sending from the Orchard shielded pool to the Sapling shielded pool is not enabled by default because it will publicly reveal the transaction amount."
                )
            }
            AddressResolutionError::RevealingReceiverAmountsNotAllowed => {
                write!(
                    f,
                    "Could not send to a shielded receiver of a unified address without spending non-Sapling funds, which would reveal transaction amounts."
                )
            }
            AddressResolutionError::CouldNotResolveReceiver => {
                write!(f, "Could not resolve receiver.")
            }
        }
    }
}

impl std::error::Error for AddressResolutionError {}

/// The distinction between funds that are merely insufficient and funds that
/// cannot be selected without creating dust change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidFundsReason {
    /// Selecting enough inputs to reach the target would leave a change
    /// amount below the dust threshold.
    DustThreshold {
        dust_threshold: Zatoshis,
        change_amount: Zatoshis,
    },
    /// The wallet does not hold enough spendable value to reach the target.
    InsufficientFunds { required: Zatoshis },
}

/// The spendable funds matched by the selector cannot satisfy the payment
/// request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidFundsError {
    pub available: Zatoshis,
    pub reason: InvalidFundsReason,
}

impl fmt::Display for InvalidFundsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            InvalidFundsReason::DustThreshold {
                dust_threshold,
                change_amount,
            } => write!(
                f,
                "Insufficient funds: the transaction would leave {} zatoshis in change, which is less than the dust threshold of {} zatoshis",
                change_amount.into_u64(),
                dust_threshold.into_u64(),
            ),
            InvalidFundsReason::InsufficientFunds { required } => write!(
                f,
                "Insufficient funds: have {}, need {} zatoshis",
                self.available.into_u64(),
                required.into_u64(),
            ),
        }
    }
}

impl std::error::Error for InvalidFundsError {}

/// When spending transparent coinbase outputs, the transaction must consume
/// the selected inputs exactly, with no change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChangeNotAllowedError {
    pub available: Zatoshis,
    pub required: Zatoshis,
}

impl fmt::Display for ChangeNotAllowedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "When shielding coinbase funds, the wallet does not allow any change. The proposed transaction would result in {} zatoshis in change.",
            (self.available.into_u64()).saturating_sub(self.required.into_u64()),
        )
    }
}

impl std::error::Error for ChangeNotAllowedError {}

/// Which side of the transaction exceeded the Orchard action limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionSide {
    Input,
    Output,
}

/// The transaction would contain more Orchard actions than the configured
/// limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExcessOrchardActionsError {
    pub side: ActionSide,
    pub orchard_actions: usize,
    pub max_actions: usize,
}

impl fmt::Display for ExcessOrchardActionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.side {
            ActionSide::Input => "inputs",
            ActionSide::Output => "outputs",
        };
        write!(
            f,
            "Including {} Orchard {} would exceed the current limit of {} notes, which exists to prevent memory exhaustion.",
            self.orchard_actions, side, self.max_actions,
        )
    }
}

impl std::error::Error for ExcessOrchardActionsError {}

/// Errors that can occur in input selection and payment resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputSelectionError {
    Resolution(AddressResolutionError),
    InvalidFunds(InvalidFundsError),
    ChangeNotAllowed(ChangeNotAllowedError),
    ExcessOrchardActions(ExcessOrchardActionsError),
}

impl fmt::Display for InputSelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSelectionError::Resolution(e) => e.fmt(f),
            InputSelectionError::InvalidFunds(e) => e.fmt(f),
            InputSelectionError::ChangeNotAllowed(e) => e.fmt(f),
            InputSelectionError::ExcessOrchardActions(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for InputSelectionError {}

impl From<AddressResolutionError> for InputSelectionError {
    fn from(e: AddressResolutionError) -> Self {
        InputSelectionError::Resolution(e)
    }
}

impl From<InvalidFundsError> for InputSelectionError {
    fn from(e: InvalidFundsError) -> Self {
        InputSelectionError::InvalidFunds(e)
    }
}

impl From<ChangeNotAllowedError> for InputSelectionError {
    fn from(e: ChangeNotAllowedError) -> Self {
        InputSelectionError::ChangeNotAllowed(e)
    }
}

impl From<ExcessOrchardActionsError> for InputSelectionError {
    fn from(e: ExcessOrchardActionsError) -> Self {
        InputSelectionError::ExcessOrchardActions(e)
    }
}

/// Errors that can occur while verifying and building a planned transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BuildError<E> {
    /// The caller-supplied strategy does not permit what the planned
    /// transaction would reveal.
    IncompatiblePrivacyPolicy {
        required: PrivacyPolicy,
        actual: PrivacyPolicy,
    },
    /// The wallet could not produce Sapling witnesses at the required depth.
    InsufficientSaplingWitnesses,
    /// The wallet could not produce Sprout witnesses at the required depth.
    InsufficientSproutWitnesses,
    /// A witness for a specific selected Sapling note was missing.
    MissingSaplingWitness(SaplingOutPoint),
    /// A memo was attached to a transparent output.
    MemoForbidden,
    /// The transaction builder produced an error.
    Builder(E),
}

impl<E: fmt::Display> fmt::Display for BuildError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::IncompatiblePrivacyPolicy { required, actual } => {
                let weaker = if *required == PrivacyPolicy::NoPrivacy {
                    ""
                } else {
                    " or weaker"
                };
                write!(
                    f,
                    "The specified privacy policy, {}, does not permit the creation of the requested transaction. Select {}{} to allow this transaction to be constructed.",
                    actual, required, weaker,
                )
            }
            BuildError::InsufficientSaplingWitnesses => {
                write!(f, "Insufficient Sapling witnesses.")
            }
            BuildError::InsufficientSproutWitnesses => {
                write!(f, "Insufficient Sprout witnesses.")
            }
            BuildError::MissingSaplingWitness(op) => {
                write!(f, "Missing witness for Sapling note at outpoint {}", op)
            }
            BuildError::MemoForbidden => {
                write!(f, "Memos cannot be sent to transparent addresses.")
            }
            BuildError::Builder(e) => e.fmt(f),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for BuildError<E> {}
