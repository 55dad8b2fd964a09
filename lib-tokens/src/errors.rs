//! Token Ledger Errors

use lib_types::{Address, Amount, Bps};
use thiserror::Error;

/// Error during token operations
///
/// Every variant aborts the whole operation; no ledger state has changed when
/// one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Unauthorized: {caller} is not the owner")]
    Unauthorized { caller: Address },

    #[error("Invalid tax range: require {min} <= {rate} <= {max} <= 10000")]
    InvalidRange { min: Bps, rate: Bps, max: Bps },

    #[error("Invalid max holding percent: {0} bps")]
    InvalidHoldingPercent(Bps),

    #[error("Zero address not allowed")]
    ZeroAddress,

    #[error("Address is blocked: {0}")]
    Blocked(Address),

    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: Amount, need: Amount },

    #[error("Insufficient allowance: have {have}, need {need}")]
    InsufficientAllowance { have: Amount, need: Amount },

    #[error("Max holding reached for {account}: would have {would_have}, limit {limit}")]
    MaxHoldingReached {
        account: Address,
        would_have: Amount,
        limit: Amount,
    },

    #[error("Reentrant call rejected")]
    Reentrant,

    #[error("Token is paused")]
    Paused,

    #[error("Arithmetic overflow")]
    Overflow,
}

/// Result type for token operations
pub type TokenResult<T> = Result<T, TokenError>;
