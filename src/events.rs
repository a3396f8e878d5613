// 8.0: every state change produces an event. used for audit trails and
// notifying external systems. the EventPayload enum lists all event types.

use serde::{Deserialize, Serialize};

use crate::types::{Address, Bps, Selector, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: Timestamp,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(id: EventId, timestamp: Timestamp, payload: EventPayload) -> Self {
        Self {
            id,
            timestamp,
            payload,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    // batch outcome, exactly one per execute call
    Sweep(SweepEvent),

    // admin events
    FunctionAdded(FunctionAddedEvent),
    FunctionRemoved(FunctionRemovedEvent),
    FeeUpdated(FeeUpdatedEvent),
    CurrencyApproved(CurrencyApprovedEvent),
    CurrencyRevoked(CurrencyRevokedEvent),
    GatewaySet(GatewaySetEvent),
}

// the outcome record: trade count vs success count, never mutated once emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepEvent {
    pub sweeper: Address,
    pub trade_count: usize,
    pub success_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionAddedEvent {
    pub adapter: Address,
    pub selector: Selector,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRemovedEvent {
    pub adapter: Address,
    pub selector: Selector,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeUpdatedEvent {
    pub adapter: Address,
    pub bp: Bps,
    pub recipient: Address,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyApprovedEvent {
    pub adapter: Address,
    pub currency: Address,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyRevokedEvent {
    pub adapter: Address,
    pub currency: Address,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewaySetEvent {
    pub gateway: Address,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_event_shape() {
        let event = Event::new(
            EventId(1),
            Timestamp::from_millis(1_000),
            EventPayload::Sweep(SweepEvent {
                sweeper: Address(20),
                trade_count: 6,
                success_count: 3,
            }),
        );

        match event.payload {
            EventPayload::Sweep(sweep) => {
                assert_eq!(sweep.trade_count, 6);
                assert_eq!(sweep.success_count, 3);
            }
            _ => panic!("expected sweep payload"),
        }
    }
}
