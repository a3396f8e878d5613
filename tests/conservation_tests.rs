//! Currency conservation invariant tests.
//!
//! Every unit of value attached to a batch must be accounted for: consumed by
//! a successful trade, paid as a fee, or refunded. The engine must hold
//! nothing across calls, whatever the adapters do.

use proptest::prelude::*;
use rust_decimal::Decimal;
use sweep_core::*;

const OWNER: Address = Address(1);
const ENGINE: Address = Address(2);
const FEE_RECIPIENT: Address = Address(9);
const SINK: Address = Address(10);
const BUYER: Address = Address(20);
const VENUE: Address = Address(100);
const VENUE_SELECTOR: Selector = Selector(0xaabb_ccdd);

fn amt(val: Decimal) -> Amount {
    Amount::new(val)
}

// minimal venue for accounting properties: takes payment per order, no asset
// delivery. an order with an empty signature makes the whole call revert.
struct SinkVenue {
    address: Address,
}

impl MarketplaceAdapter for SinkVenue {
    fn address(&self) -> Address {
        self.address
    }

    fn name(&self) -> &str {
        "sink"
    }

    fn execute(&mut self, ledger: &mut Ledger, call: AdapterCall<'_>) -> Result<(), AdapterError> {
        let mut remaining = call.value;
        for (index, order) in call.orders.iter().enumerate() {
            if order.signature.is_empty() {
                return Err(AdapterError::Rejected("unsigned order".to_string()));
            }
            if remaining < order.price {
                return Err(AdapterError::BudgetExhausted {
                    index,
                    remaining,
                    needed: order.price,
                });
            }
            ledger.native_transfer(self.address, order.signer, order.price)?;
            remaining = remaining.sub(order.price);
        }
        ledger.native_transfer(self.address, call.engine, remaining)?;
        Ok(())
    }
}

// venue that spends only half its earmark and sweeps the rest back, to prove
// adapter-returned residue flows into the caller refund
struct HalfSpendVenue {
    address: Address,
}

impl MarketplaceAdapter for HalfSpendVenue {
    fn address(&self) -> Address {
        self.address
    }

    fn name(&self) -> &str {
        "half-spend"
    }

    fn execute(&mut self, ledger: &mut Ledger, call: AdapterCall<'_>) -> Result<(), AdapterError> {
        let spend = call.value.mul(Decimal::new(5, 1));
        if let Some(order) = call.orders.first() {
            ledger.native_transfer(self.address, order.signer, spend)?;
        }
        ledger.native_transfer(self.address, call.engine, call.value.sub(spend))?;
        Ok(())
    }
}

fn order(price: Amount, signed: bool) -> CanonicalOrder {
    CanonicalOrder {
        signer: SINK,
        recipient: BUYER,
        collection: Address(30),
        collection_kind: CollectionKind::Erc721,
        token_ids: vec![TokenId(1)],
        amounts: vec![1],
        price,
        currency: Currency::Native,
        start_time: Timestamp::from_millis(0),
        end_time: Timestamp::from_millis(0),
        signature: if signed { Bytes(vec![0x1b; 65]) } else { Bytes::empty() },
    }
}

fn trade(price: Amount, succeeds: bool) -> TradeDescriptor {
    TradeDescriptor {
        adapter: VENUE,
        selector: VENUE_SELECTOR,
        value: price,
        max_fee_bp: None,
        orders: vec![order(price, succeeds)],
        orders_extra_data: vec![Bytes::empty()],
        extra_data: Bytes::empty(),
        token_transfers: Vec::new(),
    }
}

fn deploy(fee_bp: u32, adapter: Box<dyn MarketplaceAdapter>) -> Engine {
    let mut engine = Engine::new(OWNER, ENGINE, EngineConfig::default());
    engine.add_function(OWNER, adapter, VENUE_SELECTOR).unwrap();
    if fee_bp > 0 {
        engine
            .set_fee(OWNER, VENUE, Bps(fee_bp), FEE_RECIPIENT)
            .unwrap();
    }
    engine
}

proptest! {
    /// attached = consumed values + fees + refund, and the engine retains
    /// nothing, for any mix of successful and reverting trades.
    #[test]
    fn value_fully_accounted_non_atomic(
        outcomes in proptest::collection::vec((1i64..100_000i64, any::<bool>()), 1..8),
        fee_bp in 0u32..=250u32,
        surplus in 0i64..10_000i64,
    ) {
        let mut engine = deploy(fee_bp, Box::new(SinkVenue { address: VENUE }));

        let trades: Vec<TradeDescriptor> = outcomes
            .iter()
            .map(|(cents, succeeds)| trade(amt(Decimal::new(*cents, 2)), *succeeds))
            .collect();

        let fee_fraction = Bps(fee_bp).as_fraction();
        let required: Amount = trades
            .iter()
            .map(|t| t.value.add(t.value.mul(fee_fraction)))
            .sum();
        let attached = required.add(amt(Decimal::new(surplus, 2)));

        engine.ledger_mut().mint_native(BUYER, attached);
        let before = engine.ledger().native_balance(BUYER);
        let total_before = engine.ledger().total_native();

        let result = engine
            .execute(BUYER, attached, &[], &trades, BUYER, BUYER, false)
            .unwrap();

        let expected_successes = outcomes.iter().filter(|(_, s)| *s).count();
        prop_assert_eq!(result.trade_count, trades.len());
        prop_assert_eq!(result.success_count, expected_successes);

        let consumed: Amount = outcomes
            .iter()
            .filter(|(_, s)| *s)
            .map(|(cents, _)| {
                let value = amt(Decimal::new(*cents, 2));
                value.add(value.mul(fee_fraction))
            })
            .sum();

        let ledger = engine.ledger();
        // buyer paid exactly for the successes
        prop_assert_eq!(before.sub(ledger.native_balance(BUYER)), consumed);
        // nothing stuck anywhere in the middle
        prop_assert_eq!(ledger.native_balance(ENGINE), Amount::ZERO);
        prop_assert_eq!(ledger.native_balance(VENUE), Amount::ZERO);
        // global conservation
        prop_assert_eq!(ledger.total_native(), total_before);

        // sink and fee recipient split the consumed amount
        let values: Amount = outcomes
            .iter()
            .filter(|(_, s)| *s)
            .map(|(cents, _)| amt(Decimal::new(*cents, 2)))
            .sum();
        prop_assert_eq!(ledger.native_balance(SINK), values);
        prop_assert_eq!(ledger.native_balance(FEE_RECIPIENT), consumed.sub(values));
    }

    /// atomic batches are all-or-nothing: any revert restores every balance.
    #[test]
    fn atomic_is_all_or_nothing(
        outcomes in proptest::collection::vec((1i64..100_000i64, any::<bool>()), 1..8),
        fee_bp in 0u32..=250u32,
    ) {
        let mut engine = deploy(fee_bp, Box::new(SinkVenue { address: VENUE }));

        let trades: Vec<TradeDescriptor> = outcomes
            .iter()
            .map(|(cents, succeeds)| trade(amt(Decimal::new(*cents, 2)), *succeeds))
            .collect();

        let fee_fraction = Bps(fee_bp).as_fraction();
        let attached: Amount = trades
            .iter()
            .map(|t| t.value.add(t.value.mul(fee_fraction)))
            .sum();

        engine.ledger_mut().mint_native(BUYER, attached);
        let before = engine.ledger().native_balance(BUYER);
        let total_before = engine.ledger().total_native();

        let any_failure = outcomes.iter().any(|(_, s)| !*s);
        let result = engine.execute(BUYER, attached, &[], &trades, BUYER, BUYER, true);

        let ledger = engine.ledger();
        if any_failure {
            prop_assert!(result.is_err());
            // full rollback: as if the call never happened
            prop_assert_eq!(ledger.native_balance(BUYER), before);
            prop_assert_eq!(ledger.native_balance(SINK), Amount::ZERO);
            prop_assert_eq!(ledger.native_balance(FEE_RECIPIENT), Amount::ZERO);
        } else {
            let result = result.unwrap();
            prop_assert_eq!(result.success_count, trades.len());
            prop_assert_eq!(ledger.native_balance(BUYER), Amount::ZERO);
        }
        prop_assert_eq!(ledger.native_balance(ENGINE), Amount::ZERO);
        prop_assert_eq!(ledger.total_native(), total_before);
    }

    /// a reverting trade never blocks its successors, and its earmark is
    /// fully refundable.
    #[test]
    fn non_atomic_failures_are_isolated(
        prices in proptest::collection::vec(1i64..100_000i64, 3..8),
        failing_index in 0usize..8,
    ) {
        let failing_index = failing_index % prices.len();
        let mut engine = deploy(0, Box::new(SinkVenue { address: VENUE }));

        let trades: Vec<TradeDescriptor> = prices
            .iter()
            .enumerate()
            .map(|(i, cents)| trade(amt(Decimal::new(*cents, 2)), i != failing_index))
            .collect();
        let attached: Amount = trades.iter().map(|t| t.value).sum();

        engine.ledger_mut().mint_native(BUYER, attached);

        let result = engine
            .execute(BUYER, attached, &[], &trades, BUYER, BUYER, false)
            .unwrap();

        prop_assert_eq!(result.success_count, prices.len() - 1);
        // every trade after the failure still ran
        for (i, outcome) in result.outcomes.iter().enumerate() {
            let expected = if i == failing_index {
                TradeState::Failed
            } else {
                TradeState::Succeeded
            };
            prop_assert_eq!(outcome.state, expected);
        }
        // the failed earmark came straight back
        let failed_value = amt(Decimal::new(prices[failing_index], 2));
        prop_assert_eq!(result.refunded_native, failed_value);
        prop_assert_eq!(engine.ledger().native_balance(BUYER), failed_value);
    }

    /// adapter-returned residue flows into the caller refund: the caller pays
    /// what the venue actually spent, plus the configured fee.
    #[test]
    fn adapter_residue_is_refunded(
        cents in 2i64..100_000i64,
        fee_bp in 0u32..=250u32,
    ) {
        let mut engine = deploy(fee_bp, Box::new(HalfSpendVenue { address: VENUE }));

        let value = amt(Decimal::new(cents, 2));
        let fee = value.mul(Bps(fee_bp).as_fraction());
        let attached = value.add(fee);
        let trades = vec![trade(value, true)];

        engine.ledger_mut().mint_native(BUYER, attached);
        let before = engine.ledger().native_balance(BUYER);

        let result = engine
            .execute(BUYER, attached, &[], &trades, BUYER, BUYER, false)
            .unwrap();
        prop_assert_eq!(result.success_count, 1);

        let spent = value.mul(Decimal::new(5, 1));
        let ledger = engine.ledger();
        prop_assert_eq!(before.sub(ledger.native_balance(BUYER)), spent.add(fee));
        prop_assert_eq!(ledger.native_balance(SINK), spent);
        prop_assert_eq!(ledger.native_balance(ENGINE), Amount::ZERO);
        prop_assert_eq!(ledger.native_balance(VENUE), Amount::ZERO);
    }
}
