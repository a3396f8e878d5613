// 2.1x: trade descriptors: one per-marketplace slice of a batch. the caller
// builds these off-chain and submits the whole batch in one call.

use serde::{Deserialize, Serialize};

use crate::order::{CanonicalOrder, OrderError};
use crate::types::{Address, Amount, Bps, Bytes, Currency, Selector};

// one fungible-token leg consumed by a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenTransfer {
    pub amount: Amount,
    pub currency: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TradeError {
    #[error("trade has no orders")]
    NoOrders,

    #[error("orders / extra data arrays differ in length: {orders} vs {extra}")]
    MismatchedExtraData { orders: usize, extra: usize },

    #[error("order {index}: {source}")]
    Order {
        index: usize,
        #[source]
        source: OrderError,
    },
}

/** 2.2: everything the engine needs to route one trade to one adapter */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeDescriptor {
    pub adapter: Address,
    pub selector: Selector,
    // native currency earmarked for this trade; the adapter's whole budget
    pub value: Amount,
    // caller's fee tolerance; None accepts any registered rate
    pub max_fee_bp: Option<Bps>,
    pub orders: Vec<CanonicalOrder>,
    // parallel to orders, schema known only to the adapter
    pub orders_extra_data: Vec<Bytes>,
    // batch-level blob, e.g. fulfillment-matching instructions
    pub extra_data: Bytes,
    pub token_transfers: Vec<TokenTransfer>,
}

impl TradeDescriptor {
    pub fn validate(&self) -> Result<(), TradeError> {
        if self.orders.is_empty() {
            return Err(TradeError::NoOrders);
        }
        if self.orders.len() != self.orders_extra_data.len() {
            return Err(TradeError::MismatchedExtraData {
                orders: self.orders.len(),
                extra: self.orders_extra_data.len(),
            });
        }
        for (index, order) in self.orders.iter().enumerate() {
            order
                .validate()
                .map_err(|source| TradeError::Order { index, source })?;
        }
        Ok(())
    }

    // token currencies consumed by this trade, for custody reconciliation
    pub fn leg_currencies(&self) -> impl Iterator<Item = Address> + '_ {
        self.token_transfers.iter().map(|t| t.currency)
    }
}

// per-trade state machine: Pending -> Dispatched -> Succeeded | Failed.
// the batch reducer requires all Succeeded in atomic mode and tolerates any
// mix otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeState {
    Pending,
    Dispatched,
    Succeeded,
    Failed,
}

impl TradeState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TradeState::Succeeded | TradeState::Failed)
    }
}

// convenience for building token legs against Currency values
impl TokenTransfer {
    pub fn new(amount: Amount, currency: Address) -> Self {
        Self { amount, currency }
    }

    pub fn as_currency(&self) -> Currency {
        Currency::Token(self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::CollectionKind;
    use crate::types::{Timestamp, TokenId};
    use rust_decimal_macros::dec;

    fn trade() -> TradeDescriptor {
        TradeDescriptor {
            adapter: Address(1),
            selector: Selector(0xdeadbeef),
            value: Amount::new(dec!(10)),
            max_fee_bp: None,
            orders: vec![CanonicalOrder {
                signer: Address(10),
                recipient: Address(20),
                collection: Address(30),
                collection_kind: CollectionKind::Erc721,
                token_ids: vec![TokenId(1)],
                amounts: vec![1],
                price: Amount::new(dec!(10)),
                currency: Currency::Native,
                start_time: Timestamp::from_millis(0),
                end_time: Timestamp::from_millis(0),
                signature: Bytes::empty(),
            }],
            orders_extra_data: vec![Bytes::empty()],
            extra_data: Bytes::empty(),
            token_transfers: Vec::new(),
        }
    }

    #[test]
    fn valid_trade_passes() {
        assert!(trade().validate().is_ok());
    }

    #[test]
    fn no_orders_rejected() {
        let mut t = trade();
        t.orders.clear();
        t.orders_extra_data.clear();
        assert_eq!(t.validate(), Err(TradeError::NoOrders));
    }

    #[test]
    fn mismatched_extra_data_rejected() {
        let mut t = trade();
        t.orders_extra_data.push(Bytes::empty());
        assert!(matches!(
            t.validate(),
            Err(TradeError::MismatchedExtraData { orders: 1, extra: 2 })
        ));
    }

    #[test]
    fn bad_order_surfaces_index() {
        let mut t = trade();
        t.orders[0].amounts[0] = 0;
        assert!(matches!(t.validate(), Err(TradeError::Order { index: 0, .. })));
    }

    #[test]
    fn state_machine_terminals() {
        assert!(!TradeState::Pending.is_terminal());
        assert!(!TradeState::Dispatched.is_terminal());
        assert!(TradeState::Succeeded.is_terminal());
        assert!(TradeState::Failed.is_terminal());
    }
}
