// 6.2: administrator surface. owner-gated configuration with no batch-time
// effect; every mutation lands in the event log.

use tracing::info;

use super::core::Engine;
use super::results::EngineError;
use crate::adapter::MarketplaceAdapter;
use crate::events::{
    CurrencyApprovedEvent, CurrencyRevokedEvent, EventPayload, FeeUpdatedEvent, FunctionAddedEvent,
    FunctionRemovedEvent, GatewaySetEvent,
};
use crate::fees::FeeInfo;
use crate::types::{Address, Amount, Bps, Selector};

impl Engine {
    fn ensure_owner(&self, caller: Address) -> Result<(), EngineError> {
        if caller != self.owner {
            return Err(EngineError::NotOwner(caller));
        }
        Ok(())
    }

    // idempotent: registering an existing (adapter, selector) pair is a no-op
    pub fn add_function(
        &mut self,
        caller: Address,
        adapter: Box<dyn MarketplaceAdapter>,
        selector: Selector,
    ) -> Result<(), EngineError> {
        self.ensure_owner(caller)?;
        let address = adapter.address();
        let name = adapter.name().to_string();
        self.registry.add_function(adapter, selector);
        self.emit_event(EventPayload::FunctionAdded(FunctionAddedEvent {
            adapter: address,
            selector,
        }));
        info!(adapter = %address, %selector, venue = %name, "function registered");
        Ok(())
    }

    pub fn remove_function(
        &mut self,
        caller: Address,
        adapter: Address,
        selector: Selector,
    ) -> Result<(), EngineError> {
        self.ensure_owner(caller)?;
        self.registry.remove_function(adapter, selector);
        self.emit_event(EventPayload::FunctionRemoved(FunctionRemovedEvent {
            adapter,
            selector,
        }));
        info!(%adapter, %selector, "function removed");
        Ok(())
    }

    pub fn set_fee(
        &mut self,
        caller: Address,
        adapter: Address,
        bp: Bps,
        recipient: Address,
    ) -> Result<(), EngineError> {
        self.ensure_owner(caller)?;
        let ceiling = self.config.fee_ceiling();
        if bp > ceiling {
            return Err(EngineError::FeeAboveProtocolMax { bp, max: ceiling });
        }
        self.fees.set(adapter, FeeInfo { bp, recipient });
        self.emit_event(EventPayload::FeeUpdated(FeeUpdatedEvent {
            adapter,
            bp,
            recipient,
        }));
        info!(%adapter, %bp, %recipient, "fee updated");
        Ok(())
    }

    // standing permission for an adapter to move a token currency out of
    // engine custody
    pub fn approve(
        &mut self,
        caller: Address,
        adapter: Address,
        currency: Address,
    ) -> Result<(), EngineError> {
        self.ensure_owner(caller)?;
        self.ledger
            .approve(currency, self.address, adapter, Amount::unlimited());
        self.emit_event(EventPayload::CurrencyApproved(CurrencyApprovedEvent {
            adapter,
            currency,
        }));
        info!(%adapter, %currency, "currency approved");
        Ok(())
    }

    pub fn revoke(
        &mut self,
        caller: Address,
        adapter: Address,
        currency: Address,
    ) -> Result<(), EngineError> {
        self.ensure_owner(caller)?;
        self.ledger
            .approve(currency, self.address, adapter, Amount::ZERO);
        self.emit_event(EventPayload::CurrencyRevoked(CurrencyRevokedEvent {
            adapter,
            currency,
        }));
        info!(%adapter, %currency, "currency revoked");
        Ok(())
    }

    // set-once: the token-transfer trust boundary cannot be re-pointed
    pub fn set_gateway(&mut self, caller: Address, gateway: Address) -> Result<(), EngineError> {
        self.ensure_owner(caller)?;
        if let Some(existing) = self.gateway {
            return Err(EngineError::GatewayAlreadySet(existing));
        }
        self.gateway = Some(gateway);
        self.emit_event(EventPayload::GatewaySet(GatewaySetEvent { gateway }));
        info!(%gateway, "gateway set");
        Ok(())
    }
}
