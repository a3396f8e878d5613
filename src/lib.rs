// sweep-core: multi-marketplace NFT sweep engine.
// accounting-first architecture: custody reconciliation and refunds take priority.
// all computation is deterministic with no external I/O.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: Address, Selector, Amount, Bps, Currency, Timestamp
//   2.x  order.rs: canonical marketplace-agnostic order format
//   2.1x trade.rs: trade descriptors, token legs, per-trade state machine
//   3.x  ledger.rs: balances, allowances, asset ownership (mocked chain state)
//   4.x  adapter.rs: marketplace adapter trait + call context
//   4.1x adapters/: fixed-price listing and swap-pool venues
//   5.x  registry.rs: adapter function registry
//   5.1  fees.rs: per-adapter fee schedule with protocol ceiling
//   6.x  engine/: core engine: batch dispatch, accounting, admin surface
//   7.x  gateway.rs: token-pull front door for fungible-token settlement
//   8.x  events.rs: state transition events for audit

// core modules
pub mod adapter;
pub mod engine;
pub mod events;
pub mod fees;
pub mod ledger;
pub mod order;
pub mod registry;
pub mod trade;
pub mod types;

// marketplace families and settlement plumbing
pub mod adapters;
pub mod gateway;

// re exports for convenience
pub use adapter::{AdapterCall, AdapterError, MarketplaceAdapter};
pub use adapters::{ListingMarket, Pool, PoolQuote, SwapPoolMarket};
pub use engine::{Engine, EngineConfig, EngineError, SweepResult, TradeFailure, TradeOutcome};
pub use events::{Event, EventId, EventPayload, SweepEvent};
pub use fees::{FeeInfo, FeeSchedule, MAX_FEE_BP};
pub use gateway::TokenGateway;
pub use ledger::{Ledger, LedgerError, LedgerSnapshot};
pub use order::{CanonicalOrder, CollectionKind, OrderError};
pub use trade::{TokenTransfer, TradeDescriptor, TradeError, TradeState};
pub use types::*;
