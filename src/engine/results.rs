// 6.0.2: result types and errors for engine operations.

use crate::adapter::AdapterError;
use crate::ledger::LedgerError;
use crate::trade::{TradeError, TradeState};
use crate::types::{Address, Amount, Bps, Selector};

// why a non-atomic trade was recorded as failed
#[derive(Debug, Clone)]
pub enum TradeFailure {
    // computed rate exceeded the caller's declared cap; no dispatch attempted
    FeeCapExceeded { fee_bp: Bps, max_fee_bp: Bps },
    // the adapter call reverted; its earmarked value was rolled back
    Reverted(AdapterError),
}

#[derive(Debug, Clone)]
pub struct TradeOutcome {
    pub adapter: Address,
    pub value: Amount,
    pub state: TradeState,
    pub failure: Option<TradeFailure>,
}

// per-batch summary returned to the caller. the Sweep event carries the same
// counts; failures here are informational and never propagated as errors in
// non-atomic mode.
#[derive(Debug, Clone)]
pub struct SweepResult {
    pub sweeper: Address,
    pub trade_count: usize,
    pub success_count: usize,
    pub refunded_native: Amount,
    pub outcomes: Vec<TradeOutcome>,
}

impl SweepResult {
    pub fn all_succeeded(&self) -> bool {
        self.success_count == self.trade_count
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error("caller {0} is not the owner")]
    NotOwner(Address),

    #[error("no trades supplied")]
    EmptyBatch,

    #[error("trade {index}: {source}")]
    Trade {
        index: usize,
        #[source]
        source: TradeError,
    },

    #[error("function not registered: adapter {adapter} selector {selector}")]
    FunctionNotRegistered { adapter: Address, selector: Selector },

    #[error("fee {bp} exceeds ceiling {max}")]
    FeeAboveProtocolMax { bp: Bps, max: Bps },

    #[error("fee {fee_bp} exceeds caller cap {max_fee_bp} for adapter {adapter}")]
    FeeTooHigh {
        adapter: Address,
        fee_bp: Bps,
        max_fee_bp: Bps,
    },

    #[error("insufficient value: held {held}, required {required}")]
    InsufficientValue { held: Amount, required: Amount },

    #[error("token transfers require the gateway; called by {0}")]
    GatewayRequired(Address),

    #[error("gateway already set to {0}")]
    GatewayAlreadySet(Address),

    #[error("adapter {adapter} reverted: {source}")]
    TradeReverted {
        adapter: Address,
        #[source]
        source: AdapterError,
    },

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}
