// 5.0: adapter function registry. dispatch goes through an address ->
// implementation table plus an (address, selector) whitelist; the engine
// refuses to route anything not present in both.

use std::collections::{HashMap, HashSet};

use crate::adapter::MarketplaceAdapter;
use crate::types::{Address, Selector};

#[derive(Default)]
pub struct AdapterRegistry {
    adapters: HashMap<Address, Box<dyn MarketplaceAdapter>>,
    functions: HashSet<(Address, Selector)>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // idempotent: re-adding an existing pair changes nothing
    pub fn add_function(&mut self, adapter: Box<dyn MarketplaceAdapter>, selector: Selector) {
        let address = adapter.address();
        self.adapters.entry(address).or_insert(adapter);
        self.functions.insert((address, selector));
    }

    // idempotent; the implementation stays resident while any selector remains
    pub fn remove_function(&mut self, adapter: Address, selector: Selector) {
        self.functions.remove(&(adapter, selector));
        if !self.functions.iter().any(|(a, _)| *a == adapter) {
            self.adapters.remove(&adapter);
        }
    }

    pub fn is_registered(&self, adapter: Address, selector: Selector) -> bool {
        self.functions.contains(&(adapter, selector))
    }

    pub fn adapter_mut(&mut self, adapter: Address) -> Option<&mut Box<dyn MarketplaceAdapter>> {
        self.adapters.get_mut(&adapter)
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("adapters", &self.adapters.keys().collect::<Vec<_>>())
            .field("functions", &self.functions)
            .finish()
    }
}
