// 6.3: batch dispatch. the whole point of the engine lives here: earmarked
// budgets, per-trade and whole-batch rollback boundaries, fee application,
// refunds, and the single sweep event.
//
// accounting discipline: value is debited to the adapter before dispatch and
// never topped up mid-trade; an adapter can never draw native currency beyond
// its earmark. every unit pulled in is disbursed to adapters, fee recipients
// or refunded before this call returns.

use tracing::debug;

use super::core::Engine;
use super::results::{EngineError, SweepResult, TradeFailure, TradeOutcome};
use crate::adapter::AdapterCall;
use crate::events::{EventPayload, SweepEvent};
use crate::trade::{TokenTransfer, TradeDescriptor, TradeState};
use crate::types::{Address, Amount};

impl Engine {
    /// Execute a batch of trades against registered adapters.
    ///
    /// `caller` supplies the attached native `value` (and, via the gateway,
    /// any `token_legs` already approved to the engine). `atomic` picks the
    /// failure boundary: the whole batch, or each trade.
    #[allow(clippy::too_many_arguments)]
    pub fn execute(
        &mut self,
        caller: Address,
        value: Amount,
        token_legs: &[TokenTransfer],
        trades: &[TradeDescriptor],
        originator: Address,
        recipient: Address,
        atomic: bool,
    ) -> Result<SweepResult, EngineError> {
        // configuration errors fail the whole batch before any custody moves,
        // regardless of atomicity
        if trades.is_empty() {
            return Err(EngineError::EmptyBatch);
        }
        for (index, trade) in trades.iter().enumerate() {
            trade
                .validate()
                .map_err(|source| EngineError::Trade { index, source })?;
            if !self.registry.is_registered(trade.adapter, trade.selector) {
                return Err(EngineError::FunctionNotRegistered {
                    adapter: trade.adapter,
                    selector: trade.selector,
                });
            }
        }

        // token legs are only trusted from the registered gateway; anyone
        // else sweeps under their own identity
        let originator = if self.gateway == Some(caller) {
            originator
        } else {
            if !token_legs.is_empty() {
                return Err(EngineError::GatewayRequired(caller));
            }
            caller
        };

        let batch_snapshot = self.ledger.snapshot();
        match self.run_batch(caller, value, token_legs, trades, originator, recipient, atomic) {
            Ok(result) => Ok(result),
            Err(err) => {
                // unwind to the whole-batch boundary
                self.ledger.restore(batch_snapshot);
                Err(err)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn run_batch(
        &mut self,
        caller: Address,
        value: Amount,
        token_legs: &[TokenTransfer],
        trades: &[TradeDescriptor],
        originator: Address,
        recipient: Address,
        atomic: bool,
    ) -> Result<SweepResult, EngineError> {
        let engine_addr = self.address;
        let now = self.current_time;

        // take custody: attached native value, then any declared token legs
        self.ledger.native_transfer(caller, engine_addr, value)?;
        for leg in token_legs {
            self.ledger
                .token_transfer_from(engine_addr, leg.currency, caller, engine_addr, leg.amount)?;
        }

        // accounting shortfall is fatal before any dispatch begins
        let required: Amount = trades
            .iter()
            .map(|t| t.value.add(self.fees.fee_for(t.adapter, t.value)))
            .sum();
        let held = self.ledger.native_balance(engine_addr);
        if held < required {
            return Err(EngineError::InsufficientValue { held, required });
        }

        let mut outcomes = Vec::with_capacity(trades.len());
        let mut success_count = 0usize;

        for (index, trade) in trades.iter().enumerate() {
            let fee_bp = self.fees.rate(trade.adapter);
            let fee = self.fees.fee_for(trade.adapter, trade.value);

            // fee check happens before any external call
            if let Some(max_fee_bp) = trade.max_fee_bp {
                if fee_bp > max_fee_bp {
                    if atomic {
                        return Err(EngineError::FeeTooHigh {
                            adapter: trade.adapter,
                            fee_bp,
                            max_fee_bp,
                        });
                    }
                    debug!(index, %fee_bp, %max_fee_bp, "skipping trade: fee cap exceeded");
                    outcomes.push(TradeOutcome {
                        adapter: trade.adapter,
                        value: trade.value,
                        state: TradeState::Failed,
                        failure: Some(TradeFailure::FeeCapExceeded { fee_bp, max_fee_bp }),
                    });
                    continue;
                }
            }

            // per-trade boundary; only used in non-atomic mode
            let trade_snapshot = (!atomic).then(|| self.ledger.snapshot());

            // earmark and debit before dispatch
            self.ledger
                .native_transfer(engine_addr, trade.adapter, trade.value)?;

            let call = AdapterCall {
                orders: &trade.orders,
                orders_extra_data: &trade.orders_extra_data,
                extra_data: &trade.extra_data,
                recipient,
                value: trade.value,
                engine: engine_addr,
                now,
            };

            // disjoint field borrows: registry for the implementation,
            // ledger for the call
            let adapter_impl = self
                .registry
                .adapter_mut(trade.adapter)
                .ok_or(EngineError::FunctionNotRegistered {
                    adapter: trade.adapter,
                    selector: trade.selector,
                })?;
            let dispatched = adapter_impl.execute(&mut self.ledger, call);

            match dispatched {
                Ok(()) => {
                    if !fee.is_zero() {
                        // fee is paid from the engine's retained share, never
                        // from the adapter's budget
                        if let Some(info) = self.fees.get(trade.adapter) {
                            self.ledger.native_transfer(engine_addr, info.recipient, fee)?;
                        }
                    }
                    debug!(index, adapter = %trade.adapter, value = %trade.value, %fee, "trade succeeded");
                    success_count += 1;
                    outcomes.push(TradeOutcome {
                        adapter: trade.adapter,
                        value: trade.value,
                        state: TradeState::Succeeded,
                        failure: None,
                    });
                }
                Err(err) => {
                    if atomic {
                        return Err(EngineError::TradeReverted {
                            adapter: trade.adapter,
                            source: err,
                        });
                    }
                    // unwind to the per-trade boundary; the earmark returns
                    // to custody for refund
                    if let Some(snapshot) = trade_snapshot {
                        self.ledger.restore(snapshot);
                    }
                    debug!(index, adapter = %trade.adapter, %err, "trade reverted, continuing");
                    outcomes.push(TradeOutcome {
                        adapter: trade.adapter,
                        value: trade.value,
                        state: TradeState::Failed,
                        failure: Some(TradeFailure::Reverted(err)),
                    });
                }
            }
        }

        // return whatever was not consumed; the engine holds nothing across calls
        let refunded_native = self.ledger.native_balance(engine_addr);
        self.ledger
            .native_transfer(engine_addr, originator, refunded_native)?;
        for leg in token_legs {
            let leftover = self.ledger.token_balance(leg.currency, engine_addr);
            self.ledger
                .token_transfer(leg.currency, engine_addr, originator, leftover)?;
        }
        debug_assert!(self.ledger.native_balance(engine_addr).is_zero());

        self.emit_event(EventPayload::Sweep(SweepEvent {
            sweeper: originator,
            trade_count: trades.len(),
            success_count,
        }));
        tracing::info!(
            sweeper = %originator,
            trade_count = trades.len(),
            success_count,
            %refunded_native,
            "sweep complete"
        );

        Ok(SweepResult {
            sweeper: originator,
            trade_count: trades.len(),
            success_count,
            refunded_native,
            outcomes,
        })
    }
}
