// 4.3: swap-pool venue. assets sit in per-collection pools priced by a linear
// bonding curve; there is no maker and no signature. order.price is the
// caller's ceiling for the whole order, quoted off-chain and re-derived here.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::adapter::{AdapterCall, AdapterError, MarketplaceAdapter};
use crate::ledger::Ledger;
use crate::types::{Address, Amount, Currency};

// linear curve: the i-th unit bought in one call costs spot + i * delta,
// and spot ratchets up by delta per unit sold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool {
    // account that holds the pool's assets and receives payment
    pub owner: Address,
    pub spot_price: Amount,
    pub delta: Decimal,
}

impl Pool {
    // quote for buying `units` in one call
    pub fn buy_quote(&self, units: u64) -> Amount {
        let mut total = Amount::zero();
        for i in 0..units {
            total = total.add(self.spot_price.add(Amount::new(self.delta * Decimal::from(i))));
        }
        total
    }

    fn advance(&mut self, units: u64) {
        self.spot_price = self
            .spot_price
            .add(Amount::new(self.delta * Decimal::from(units)));
    }
}

// read-only quote surface, mirrored by off-chain clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolQuote {
    pub units: u64,
    pub total: Amount,
}

pub struct SwapPoolMarket {
    address: Address,
    name: String,
    pools: HashMap<Address, Pool>,
}

impl SwapPoolMarket {
    pub fn new(address: Address, name: impl Into<String>) -> Self {
        Self {
            address,
            name: name.into(),
            pools: HashMap::new(),
        }
    }

    pub fn add_pool(&mut self, collection: Address, pool: Pool) {
        self.pools.insert(collection, pool);
    }

    pub fn quote(&self, collection: Address, units: u64) -> Option<PoolQuote> {
        self.pools.get(&collection).map(|pool| PoolQuote {
            units,
            total: pool.buy_quote(units),
        })
    }
}

impl MarketplaceAdapter for SwapPoolMarket {
    fn address(&self) -> Address {
        self.address
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&mut self, ledger: &mut Ledger, call: AdapterCall<'_>) -> Result<(), AdapterError> {
        let mut remaining = call.value;

        for (index, order) in call.orders.iter().enumerate() {
            order
                .validate()
                .map_err(|source| AdapterError::Order { index, source })?;

            if !order.currency.is_native() {
                return Err(AdapterError::CurrencyMismatch {
                    index,
                    expected: order.currency,
                    got: Currency::Native,
                });
            }

            let pool = self
                .pools
                .get_mut(&order.collection)
                .ok_or_else(|| AdapterError::Rejected(format!("no pool for {}", order.collection)))?;

            let units: u64 = order.amounts.iter().sum();
            let quote = pool.buy_quote(units);
            if quote > order.price {
                return Err(AdapterError::QuoteAboveCeiling {
                    index,
                    quote,
                    ceiling: order.price,
                });
            }
            if remaining < quote {
                return Err(AdapterError::BudgetExhausted {
                    index,
                    remaining,
                    needed: quote,
                });
            }

            let pool_owner = pool.owner;
            ledger.native_transfer(self.address, pool_owner, quote)?;
            for (token_id, amount) in order.token_ids.iter().zip(order.amounts.iter()) {
                ledger.transfer_asset(
                    order.collection,
                    *token_id,
                    pool_owner,
                    call.recipient,
                    *amount,
                )?;
            }
            pool.advance(units);
            remaining = remaining.sub(quote);
        }

        ledger.native_transfer(self.address, call.engine, remaining)?;
        Ok(())
    }
}
