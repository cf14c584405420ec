//! # Bondmarket Core
//!
//! Core Rust library for bonding-curve prediction markets settled by an
//! optimistic oracle.
//!
//! This library provides the building blocks for markets where:
//! - Traders buy and sell outcome shares against a deterministic bonding curve
//! - Collateral is custodied per market and conserved across every trade
//! - A bonded, disputable report decides the outcome
//! - A curation council approves or flags markets for display
//!
//! ## Features
//!
//! - **Market Variants**: binary (YES/NO), multi-outcome and scalar (LONG/SHORT)
//! - **Bonding Curve**: `shares * K * L / q` pricing with a per-market trading fee
//! - **Optimistic Oracle**: report, dispute within liveness, finalize or adjudicate
//! - **Curation**: Pending / Approved / Flagged review queue run by a council
//! - **Fee Routing**: per-market fee attribution and distribution to a treasury
//! - **Snapshots**: the whole protocol state round-trips through JSON
//!
//! ## Examples
//!
//! ```rust
//! use bondmarket_core::{Address, Protocol, ProtocolConfig, UNIT, YES};
//!
//! let config = ProtocolConfig::default();
//! let mut protocol = Protocol::new(config)?;
//!
//! let creator = Address::from_label("creator");
//! protocol.deposit(creator, 1_000 * UNIT)?;
//! let factory = protocol.factory(bondmarket_core::FactoryKind::Binary).address;
//! protocol.approve(creator, factory, 100 * UNIT)?;
//!
//! let params = bondmarket_core::MarketParams {
//!     question: "Will BTC close above 100k?".to_string(),
//!     metadata_uri: "ipfs://btc-100k".to_string(),
//!     creator,
//!     oracle_adapter: protocol.adapter("crypto").unwrap().address,
//!     fee_router: protocol.fees.address,
//!     market_key: bondmarket_core::MarketKey::from_label("btc-100k"),
//!     fee_bps: 100,
//!     liquidity: 100 * UNIT,
//!     start_time: 1_735_689_600,
//!     end_time: 1_738_368_000,
//!     resolution_deadline: 1_738_972_800,
//! };
//! let (_, market) = protocol.create_binary(params, 1_735_689_600)?;
//!
//! // 10 YES at q = 100 costs 20 plus a 1% fee
//! let quote = protocol.market(&market)?.quote_buy(YES, 10 * UNIT)?;
//! assert_eq!(quote.total, 20_200_000);
//! Ok::<(), bondmarket_core::MarketError>(())
//! ```

pub mod collateral;
pub mod config;
pub mod curation;
pub mod curve;
pub mod error;
pub mod factory;
pub mod fees;
pub mod market;
pub mod oracle;
pub mod outcome_token;
pub mod protocol;
pub mod utils;

#[cfg(test)]
pub mod test_utils;

pub use collateral::CollateralToken;
pub use config::ProtocolConfig;
pub use curation::{CouncilRegistry, Curation, CurationRecord, CurationStatus};
pub use curve::TradeQuote;
pub use error::{ErrorKind, MarketError, Result};
pub use factory::{FactoryKind, MarketFactory};
pub use fees::FeeRouter;
pub use market::{
    Market, MarketParams, MarketState, MarketVariant, Resolution, Settlement, LONG, NO, SHORT, YES,
};
pub use oracle::{
    AdapterConfig, Arbitrator, DesignatedArbitrator, OracleAdapter, OracleReport, Party,
    ReportStatus, Ruling, ValueDomain,
};
pub use outcome_token::OutcomeTokenLedger;
pub use protocol::Protocol;
pub use utils::*;

/// Decimal places of collateral and share amounts
pub const UNIT_DECIMALS: u32 = 6;

/// One whole collateral unit or share (`10^UNIT_DECIMALS`)
pub const UNIT: u128 = 1_000_000;

/// Basis points in 100%
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Highest trading fee a market may charge, in basis points
pub const MAX_FEE_BPS: u16 = 10_000;
