// 5.1: per-adapter fee schedule. rates are engine-enforced, never seen by
// adapters; the protocol ceiling bounds configuration mistakes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::{Address, Amount, Bps};

// hard protocol ceiling on any configured rate
pub const MAX_FEE_BP: Bps = Bps(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeInfo {
    pub bp: Bps,
    pub recipient: Address,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeeSchedule {
    rates: HashMap<Address, FeeInfo>,
}

impl FeeSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, adapter: Address, info: FeeInfo) {
        if info.bp.is_zero() {
            self.rates.remove(&adapter);
        } else {
            self.rates.insert(adapter, info);
        }
    }

    pub fn get(&self, adapter: Address) -> Option<FeeInfo> {
        self.rates.get(&adapter).copied()
    }

    pub fn rate(&self, adapter: Address) -> Bps {
        self.get(adapter).map(|info| info.bp).unwrap_or(Bps(0))
    }

    // fee = value * bp / 10000, on top of the trade value
    pub fn fee_for(&self, adapter: Address, value: Amount) -> Amount {
        value.mul(self.rate(adapter).as_fraction())
    }
}
