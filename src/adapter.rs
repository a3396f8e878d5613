// 4.0: the marketplace adapter boundary. one implementation per marketplace
// family, selected at dispatch time from the engine's registry. the engine
// knows nothing about venue protocols; adapters know nothing about batches.

use crate::ledger::{Ledger, LedgerError};
use crate::order::{CanonicalOrder, OrderError};
use crate::types::{Address, Amount, Bytes, Currency, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    #[error("order {index} not live at {now:?}")]
    OrderNotLive { index: usize, now: Timestamp },

    #[error("order {index} priced in {expected}, venue settles {got}")]
    CurrencyMismatch {
        index: usize,
        expected: Currency,
        got: Currency,
    },

    #[error("order {index} has no signature")]
    MissingSignature { index: usize },

    #[error("order {index}: native budget exhausted: remaining {remaining}, needed {needed}")]
    BudgetExhausted {
        index: usize,
        remaining: Amount,
        needed: Amount,
    },

    #[error("order {index}: pool quote {quote} exceeds ceiling {ceiling}")]
    QuoteAboveCeiling {
        index: usize,
        quote: Amount,
        ceiling: Amount,
    },

    #[error("malformed extra data: {0}")]
    MalformedExtraData(String),

    #[error("order {index}: {source}")]
    Order {
        index: usize,
        #[source]
        source: OrderError,
    },

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("adapter rejected the trade: {0}")]
    Rejected(String),
}

/** 4.1: one adapter invocation. value has already been credited to the
adapter's address (the payable convention); engine is the return address for
unspent budget and the custody account for fungible-token pulls. */
#[derive(Debug)]
pub struct AdapterCall<'a> {
    pub orders: &'a [CanonicalOrder],
    pub orders_extra_data: &'a [Bytes],
    pub extra_data: &'a Bytes,
    pub recipient: Address,
    pub value: Amount,
    pub engine: Address,
    pub now: Timestamp,
}

// Contract: return Ok only if every order fully executed or was explicitly
// skippable per the venue's own semantics; Err signals trade-level failure.
// Partial fulfillment inside one call is the adapter's contract to honor, not
// the engine's concern. Unspent native budget must be swept back to the
// engine address before returning Ok.
pub trait MarketplaceAdapter {
    // identity under which the adapter holds budget and allowances
    fn address(&self) -> Address;

    // venue name for logs
    fn name(&self) -> &str;

    fn execute(&mut self, ledger: &mut Ledger, call: AdapterCall<'_>) -> Result<(), AdapterError>;
}
