//! Engine configuration options.

use crate::fees::MAX_FEE_BP;
use crate::types::Bps;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Highest fee rate `set_fee` will accept. Clamped to the protocol
    /// ceiling; deployments may only lower it.
    pub max_fee_bp: Bps,
    /// Maximum number of events to retain in memory.
    pub max_events: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_fee_bp: MAX_FEE_BP,
            max_events: 100_000,
        }
    }
}

impl EngineConfig {
    pub fn fee_ceiling(&self) -> Bps {
        self.max_fee_bp.min(MAX_FEE_BP)
    }
}
