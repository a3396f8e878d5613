// 4.2: fixed-price listing venue. makers sign listings off-chain; the adapter
// settles maker-priced orders against the maker's holdings. closest analogue
// to order-book marketplaces where each order names a seller.

use serde::{Deserialize, Serialize};

use crate::adapter::{AdapterCall, AdapterError, MarketplaceAdapter};
use crate::ledger::{Ledger, LedgerError};
use crate::order::{CanonicalOrder, CollectionKind};
use crate::types::{Address, Amount, Bytes, Currency};

// per-order blob: the maker's signed price, checked against the canonical
// order to catch stale quotes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingOrderParams {
    pub price: Amount,
}

// batch-level blob: whether orders failing venue checks are silently skipped
// (the venue's own partial-fill semantics) or fail the whole trade
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingBatchParams {
    pub allow_partial: bool,
}

pub struct ListingMarket {
    address: Address,
    name: String,
}

impl ListingMarket {
    pub fn new(address: Address, name: impl Into<String>) -> Self {
        Self {
            address,
            name: name.into(),
        }
    }

    pub fn encode_order_params(price: Amount) -> Bytes {
        // schema is private to this venue; serde_json is the wire codec
        Bytes(serde_json::to_vec(&ListingOrderParams { price }).unwrap_or_default())
    }

    pub fn encode_batch_params(allow_partial: bool) -> Bytes {
        Bytes(serde_json::to_vec(&ListingBatchParams { allow_partial }).unwrap_or_default())
    }

    fn decode_batch_params(extra_data: &Bytes) -> Result<ListingBatchParams, AdapterError> {
        if extra_data.is_empty() {
            return Ok(ListingBatchParams::default());
        }
        serde_json::from_slice(extra_data.as_slice())
            .map_err(|e| AdapterError::MalformedExtraData(e.to_string()))
    }

    // venue checks that decide whether an order is fillable, before any
    // state is touched for it
    fn check_order(
        &self,
        ledger: &Ledger,
        index: usize,
        order: &CanonicalOrder,
        order_extra: &Bytes,
        remaining_budget: Amount,
        call: &AdapterCall<'_>,
    ) -> Result<(), AdapterError> {
        order
            .validate()
            .map_err(|source| AdapterError::Order { index, source })?;

        if !order.is_live(call.now) {
            return Err(AdapterError::OrderNotLive { index, now: call.now });
        }
        if order.signature.is_empty() {
            return Err(AdapterError::MissingSignature { index });
        }
        if !order_extra.is_empty() {
            let params: ListingOrderParams = serde_json::from_slice(order_extra.as_slice())
                .map_err(|e| AdapterError::MalformedExtraData(e.to_string()))?;
            if params.price != order.price {
                return Err(AdapterError::Rejected(format!(
                    "order {}: maker price {} does not match canonical price {}",
                    index, params.price, order.price
                )));
            }
        }

        // seller must hold everything the order promises
        for (token_id, units) in order.token_ids.iter().zip(order.amounts.iter()) {
            match order.collection_kind {
                CollectionKind::Erc721 => {
                    if ledger.asset_owner(order.collection, *token_id) != Some(order.signer) {
                        return Err(AdapterError::Ledger(LedgerError::AssetNotHeld {
                            collection: order.collection,
                            token_id: *token_id,
                            holder: order.signer,
                        }));
                    }
                }
                CollectionKind::Erc1155 => {
                    let held = ledger.asset_units(order.collection, *token_id, order.signer);
                    if held < *units {
                        return Err(AdapterError::Ledger(LedgerError::InsufficientUnits {
                            collection: order.collection,
                            token_id: *token_id,
                            held,
                            requested: *units,
                        }));
                    }
                }
            }
        }

        if order.currency.is_native() && remaining_budget < order.price {
            return Err(AdapterError::BudgetExhausted {
                index,
                remaining: remaining_budget,
                needed: order.price,
            });
        }
        Ok(())
    }

    fn settle_order(
        &self,
        ledger: &mut Ledger,
        order: &CanonicalOrder,
        call: &AdapterCall<'_>,
    ) -> Result<(), AdapterError> {
        match order.currency {
            Currency::Native => {
                ledger.native_transfer(self.address, order.signer, order.price)?;
            }
            Currency::Token(currency) => {
                // draws on the engine's custody; requires a standing approval
                ledger.token_transfer_from(
                    self.address,
                    currency,
                    call.engine,
                    order.signer,
                    order.price,
                )?;
            }
        }
        for (token_id, units) in order.token_ids.iter().zip(order.amounts.iter()) {
            ledger.transfer_asset(
                order.collection,
                *token_id,
                order.signer,
                call.recipient,
                *units,
            )?;
        }
        Ok(())
    }
}

impl MarketplaceAdapter for ListingMarket {
    fn address(&self) -> Address {
        self.address
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&mut self, ledger: &mut Ledger, call: AdapterCall<'_>) -> Result<(), AdapterError> {
        let batch_params = Self::decode_batch_params(call.extra_data)?;
        let mut remaining = call.value;

        for (index, order) in call.orders.iter().enumerate() {
            let order_extra = call
                .orders_extra_data
                .get(index)
                .cloned()
                .unwrap_or_default();

            match self.check_order(ledger, index, order, &order_extra, remaining, &call) {
                Ok(()) => {}
                Err(err) => {
                    if batch_params.allow_partial {
                        tracing::debug!(venue = %self.name, index, %err, "skipping unfillable order");
                        continue;
                    }
                    return Err(err);
                }
            }

            self.settle_order(ledger, order, &call)?;
            if order.currency.is_native() {
                remaining = remaining.sub(order.price);
            }
        }

        // unspent budget goes back to the engine for refund accounting
        ledger.native_transfer(self.address, call.engine, remaining)?;
        Ok(())
    }
}
