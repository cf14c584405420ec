//! Error types for bondmarket-core

use thiserror::Error;

use crate::utils::Address;

/// Result type alias for bondmarket operations
pub type Result<T> = std::result::Result<T, MarketError>;

/// Broad failure classes callers can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad arguments, rejected before any state is read.
    Validation,
    /// The operation is not legal in the current lifecycle state.
    State,
    /// A balance, allowance or reserve could not cover the operation.
    Economic,
    /// Oracle report or dispute rules were violated.
    Dispute,
    /// The caller does not hold the required role.
    Authorization,
    /// Snapshot encoding or decoding failed.
    Serialization,
}

/// Error types for market operations
#[derive(Error, Debug)]
pub enum MarketError {
    /// Serde JSON errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Hex decoding errors
    #[error("Hex decoding error: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Market parameter validation errors
    #[error("Invalid market: {0}")]
    InvalidMarket(String),

    /// Trade argument errors
    #[error("Invalid trade: {0}")]
    InvalidTrade(String),

    #[error("Zero address is not allowed for {0}")]
    ZeroAddress(&'static str),

    #[error("Unknown outcome index {index} (market has {count} outcomes)")]
    UnknownOutcome { index: usize, count: usize },

    #[error("Market key {0} is already used by this factory")]
    DuplicateMarketKey(String),

    #[error("Arithmetic overflow in {0}")]
    Overflow(&'static str),

    /// Lifecycle errors
    #[error("Invalid state: expected {expected}, market is {actual}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Trading window closed at {now} (window is [{start}, {end}))")]
    TradingWindowClosed { now: u64, start: u64, end: u64 },

    #[error("Market cannot close before end time {end_time} (now {now})")]
    MarketNotEnded { now: u64, end_time: u64 },

    #[error("Surplus already withdrawn")]
    SurplusWithdrawn,

    #[error("Invalid curation transition: cannot {action} a {status} market")]
    InvalidTransition {
        action: &'static str,
        status: &'static str,
    },

    #[error("Market {0} is already registered")]
    AlreadyRegistered(Address),

    #[error("Market {0} not found")]
    MarketNotFound(String),

    /// Collateral and share accounting errors
    #[error("Insufficient balance: {account} holds {available}, needs {required}")]
    InsufficientBalance {
        account: Address,
        available: u128,
        required: u128,
    },

    #[error("Insufficient allowance: {spender} may spend {available}, needs {required}")]
    InsufficientAllowance {
        spender: Address,
        available: u128,
        required: u128,
    },

    #[error("Insufficient shares of outcome {outcome}: holder has {available}, needs {required}")]
    InsufficientShares {
        outcome: usize,
        available: u128,
        required: u128,
    },

    #[error("Market holds {available} collateral, needs {required}")]
    InsufficientCollateral { available: u128, required: u128 },

    #[error("Outcome {0} supply would reach zero")]
    SupplyExhausted(usize),

    #[error("Slippage exceeded: trade settles at {actual}, limit is {limit}")]
    SlippageExceeded { actual: u128, limit: u128 },

    #[error("Nothing to redeem for {0}")]
    NothingToRedeem(Address),

    #[error("No fees pending distribution")]
    NothingToDistribute,

    /// Oracle errors
    #[error("Oracle error: {0}")]
    Oracle(String),

    #[error("Invalid report: {0}")]
    InvalidReport(String),

    #[error("A report is already live for market {0}")]
    ReportExists(Address),

    #[error("No report for market {0}")]
    NoReport(Address),

    #[error("Dispute window closed at {deadline} (now {now})")]
    DisputeWindowClosed { now: u64, deadline: u64 },

    #[error("Liveness has not elapsed: report can finalize at {ready_at} (now {now})")]
    LivenessNotElapsed { now: u64, ready_at: u64 },

    #[error("Report for market {0} is disputed and awaits adjudication")]
    ReportDisputed(Address),

    #[error("Report for market {0} is not disputed")]
    NotDisputed(Address),

    #[error("Report for market {0} is already finalized")]
    AlreadyFinalized(Address),

    /// Authorization errors
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Generic error for other cases
    #[error("Market error: {0}")]
    Other(String),
}

impl MarketError {
    /// Classify the error into the failure taxonomy.
    pub fn kind(&self) -> ErrorKind {
        use MarketError::*;
        match self {
            Json(_) | Hex(_) => ErrorKind::Serialization,
            InvalidMarket(_)
            | InvalidTrade(_)
            | ZeroAddress(_)
            | UnknownOutcome { .. }
            | DuplicateMarketKey(_)
            | Overflow(_)
            | MarketNotFound(_)
            | Other(_) => ErrorKind::Validation,
            InvalidState { .. }
            | TradingWindowClosed { .. }
            | MarketNotEnded { .. }
            | SurplusWithdrawn
            | InvalidTransition { .. }
            | AlreadyRegistered(_) => ErrorKind::State,
            InsufficientBalance { .. }
            | InsufficientAllowance { .. }
            | InsufficientShares { .. }
            | InsufficientCollateral { .. }
            | SupplyExhausted(_)
            | SlippageExceeded { .. }
            | NothingToRedeem(_)
            | NothingToDistribute => ErrorKind::Economic,
            Oracle(_)
            | InvalidReport(_)
            | ReportExists(_)
            | NoReport(_)
            | DisputeWindowClosed { .. }
            | LivenessNotElapsed { .. }
            | ReportDisputed(_)
            | NotDisputed(_)
            | AlreadyFinalized(_) => ErrorKind::Dispute,
            Unauthorized(_) => ErrorKind::Authorization,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let market = Address::from_label("market");
        let cases = [
            (MarketError::InvalidTrade("zero shares".to_string()), ErrorKind::Validation),
            (
                MarketError::InvalidState {
                    expected: "open",
                    actual: "closed",
                },
                ErrorKind::State,
            ),
            (
                MarketError::SlippageExceeded {
                    actual: 21,
                    limit: 20,
                },
                ErrorKind::Economic,
            ),
            (
                MarketError::DisputeWindowClosed {
                    now: 10,
                    deadline: 5,
                },
                ErrorKind::Dispute,
            ),
            (MarketError::AlreadyFinalized(market), ErrorKind::Dispute),
            (MarketError::Unauthorized("not admin".to_string()), ErrorKind::Authorization),
        ];
        for (error, kind) in cases {
            assert_eq!(error.kind(), kind, "{error}");
        }

        let json = serde_json::from_str::<u8>("nope").unwrap_err();
        assert_eq!(MarketError::from(json).kind(), ErrorKind::Serialization);
    }

    #[test]
    fn test_real_failures_are_classified() {
        let err = "0xnothex".parse::<Address>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Serialization);
        assert_eq!(
            crate::utils::parse_amount("-1").unwrap_err().kind(),
            ErrorKind::Validation
        );
    }
}
