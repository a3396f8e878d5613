// 7.0: token-pull front door. callers settling with fungible tokens approve
// this contract only, per batch, for exact amounts; the engine draws on the
// gateway's custody through a short-lived allowance that is revoked before
// this call returns.

use tracing::debug;

use crate::engine::{Engine, EngineError, SweepResult};
use crate::trade::{TokenTransfer, TradeDescriptor};
use crate::types::{Address, Amount};

#[derive(Debug, Clone, Copy)]
pub struct TokenGateway {
    address: Address,
}

impl TokenGateway {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Same shape as `Engine::execute`, with upfront token pulling. The
    /// engine must have this gateway registered via `set_gateway`.
    #[allow(clippy::too_many_arguments)]
    pub fn execute(
        &self,
        engine: &mut Engine,
        caller: Address,
        value: Amount,
        token_legs: &[TokenTransfer],
        trades: &[TradeDescriptor],
        recipient: Address,
        atomic: bool,
    ) -> Result<SweepResult, EngineError> {
        let engine_addr = engine.address();

        // pull declared legs into gateway custody, then grant the engine an
        // exact-amount allowance; repeated currencies accumulate
        for leg in token_legs {
            engine.ledger_mut().token_transfer_from(
                self.address,
                leg.currency,
                caller,
                self.address,
                leg.amount,
            )?;
            let granted = engine.ledger().allowance(leg.currency, self.address, engine_addr);
            engine
                .ledger_mut()
                .approve(leg.currency, self.address, engine_addr, granted.add(leg.amount));
        }
        // attached native value travels with the call
        engine
            .ledger_mut()
            .native_transfer(caller, self.address, value)?;

        let result = engine.execute(
            self.address,
            value,
            token_legs,
            trades,
            caller,
            recipient,
            atomic,
        );

        // whatever the outcome: revoke leftover allowances and return any
        // residue sitting in gateway custody
        for leg in token_legs {
            engine
                .ledger_mut()
                .approve(leg.currency, self.address, engine_addr, Amount::ZERO);
            let leftover = engine.ledger().token_balance(leg.currency, self.address);
            if !leftover.is_zero() {
                debug!(currency = %leg.currency, %leftover, "returning leftover tokens");
                engine
                    .ledger_mut()
                    .token_transfer(leg.currency, self.address, caller, leftover)?;
            }
        }
        let native_residue = engine.ledger().native_balance(self.address);
        if !native_residue.is_zero() {
            engine
                .ledger_mut()
                .native_transfer(self.address, caller, native_residue)?;
        }

        result
    }
}
