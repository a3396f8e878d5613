// 6.1 engine/core.rs: main engine struct. owns the registries, the event log
// and the chain-state substrate. all custody flows through `address`.

use super::config::EngineConfig;
use crate::events::{Event, EventId, EventPayload};
use crate::fees::FeeSchedule;
use crate::ledger::Ledger;
use crate::registry::AdapterRegistry;
use crate::types::{Address, Selector, Timestamp};

#[derive(Debug)]
pub struct Engine {
    pub(super) config: EngineConfig,
    pub(super) owner: Address,
    // the engine's own custody account on the ledger
    pub(super) address: Address,
    pub(super) registry: AdapterRegistry,
    pub(super) fees: FeeSchedule,
    pub(super) gateway: Option<Address>,
    pub(super) ledger: Ledger,
    pub(super) events: Vec<Event>,
    pub(super) next_event_id: u64,
    pub(super) current_time: Timestamp,
}

impl Engine {
    pub fn new(owner: Address, address: Address, config: EngineConfig) -> Self {
        Self {
            config,
            owner,
            address,
            registry: AdapterRegistry::new(),
            fees: FeeSchedule::new(),
            gateway: None,
            ledger: Ledger::new(),
            events: Vec::new(),
            next_event_id: 1,
            current_time: Timestamp::from_millis(0),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn gateway(&self) -> Option<Address> {
        self.gateway
    }

    pub fn set_time(&mut self, timestamp: Timestamp) {
        self.current_time = timestamp;
    }

    pub fn time(&self) -> Timestamp {
        self.current_time
    }

    pub fn advance_time(&mut self, millis: i64) {
        self.current_time = Timestamp::from_millis(self.current_time.as_millis() + millis);
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    // test/simulation access for seeding balances and assets
    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn fee_schedule(&self) -> &FeeSchedule {
        &self.fees
    }

    pub fn is_registered(&self, adapter: Address, selector: Selector) -> bool {
        self.registry.is_registered(adapter, selector)
    }

    pub(super) fn emit_event(&mut self, payload: EventPayload) {
        if self.events.len() >= self.config.max_events {
            self.events.remove(0);
        }
        let id = EventId(self.next_event_id);
        self.next_event_id += 1;
        self.events.push(Event::new(id, self.current_time, payload));
    }
}
