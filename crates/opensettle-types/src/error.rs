//! Error types for the OpenSettle settlement engine.
//!
//! All errors use the `OS_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Input errors
//! - 2xx: Ledger / transfer errors
//! - 3xx: Value conversion errors
//! - 4xx: Level / tier errors
//! - 5xx: Bid book errors
//! - 6xx: Listing state errors
//! - 8xx: Boundary errors
//! - 9xx: General / internal errors
//!
//! Every failure aborts the enclosing operation with prior state untouched;
//! the engine never retries on the caller's behalf.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::AssetId;

/// Central error enum for all OpenSettle operations.
#[derive(Debug, Error)]
pub enum SettleError {
    // =================================================================
    // Input Errors (1xx)
    // =================================================================
    /// The bidder is the null actor.
    #[error("OS_ERR_100: Bidder is the null actor")]
    ZeroBidder,

    /// The recipient is the null actor.
    #[error("OS_ERR_101: Recipient is the null actor")]
    ZeroRecipient,

    /// An amount that must be positive was zero or negative.
    #[error("OS_ERR_102: Amount must be positive")]
    ZeroAmount,

    /// The item lot failed structural validation.
    #[error("OS_ERR_103: Invalid lot: {reason}")]
    InvalidLot { reason: String },

    /// The discount failed structural validation.
    #[error("OS_ERR_104: Invalid discount: {reason}")]
    InvalidDiscount { reason: String },

    // =================================================================
    // Ledger / Transfer Errors (2xx)
    // =================================================================
    /// The external transfer primitive rejected a transfer.
    #[error("OS_ERR_200: Transfer failed: {reason}")]
    TransferFailed { reason: String },

    /// Not enough balance to perform the transfer.
    #[error("OS_ERR_201: Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Decimal, available: Decimal },

    // =================================================================
    // Value Conversion Errors (3xx)
    // =================================================================
    /// The currency has no known rate into the common settlement unit.
    #[error("OS_ERR_300: No value mapping for {0}")]
    NoValueMapping(AssetId),

    /// The bid converts to zero common-unit value (or its currency is
    /// unmapped); such a bid is rejected, never treated as fatal.
    #[error("OS_ERR_301: Bid has no spend value")]
    NoSpendValue,

    // =================================================================
    // Level / Tier Errors (4xx)
    // =================================================================
    /// A discount referenced a tier label the registry doesn't know.
    #[error("OS_ERR_400: Unknown level: {label}")]
    UnknownLevel { label: String },

    /// The spender's balance is below the requirement's threshold.
    #[error("OS_ERR_401: Level {label} not met: need {required}, have {actual}")]
    LevelNotMet {
        label: String,
        required: Decimal,
        actual: Decimal,
    },

    /// No tier is satisfied by the given balance.
    #[error("OS_ERR_402: No level found for balance {balance}")]
    LevelNotFound { balance: Decimal },

    // =================================================================
    // Bid Book Errors (5xx)
    // =================================================================
    /// No active bid exists for the (listing, bidder) slot.
    #[error("OS_ERR_500: No active bid for this bidder")]
    EmptyBid,

    /// The expected bid doesn't match the stored bid exactly.
    #[error("OS_ERR_501: Bid mismatch: stored bid differs from expected")]
    BidMismatch,

    /// The listing has no sellable inventory.
    #[error("OS_ERR_502: No inventory for listing")]
    NoInventory,

    // =================================================================
    // Listing State Errors (6xx)
    // =================================================================
    /// An operation required an active item lot that isn't there.
    #[error("OS_ERR_600: No active lot for listing")]
    NoActiveLot,

    /// A set-once field was already configured for this listing.
    #[error("OS_ERR_601: Already configured: {what}")]
    AlreadyConfigured { what: String },

    // =================================================================
    // Boundary Errors (8xx)
    // =================================================================
    /// The caller is not the trusted listing registry.
    #[error("OS_ERR_800: Unauthorized origin")]
    UnauthorizedOrigin,

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("OS_ERR_900: Internal error: {0}")]
    Internal(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, SettleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let err = SettleError::EmptyBid;
        let msg = format!("{err}");
        assert!(msg.starts_with("OS_ERR_500"), "Got: {msg}");
    }

    #[test]
    fn level_not_met_display() {
        let err = SettleError::LevelNotMet {
            label: "gold".into(),
            required: Decimal::new(100, 0),
            actual: Decimal::new(50, 0),
        };
        let msg = format!("{err}");
        assert!(msg.contains("OS_ERR_401"));
        assert!(msg.contains("gold"));
        assert!(msg.contains("100"));
        assert!(msg.contains("50"));
    }

    #[test]
    fn all_errors_have_os_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(SettleError::ZeroBidder),
            Box::new(SettleError::NoSpendValue),
            Box::new(SettleError::NoInventory),
            Box::new(SettleError::UnauthorizedOrigin),
            Box::new(SettleError::NoValueMapping(AssetId(1))),
            Box::new(SettleError::Internal("test".into())),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("OS_ERR_"),
                "Error missing OS_ERR_ prefix: {msg}"
            );
        }
    }
}
