// 3.0 ledger.rs: MOCKED chain state. native balances, fungible-token balances
// and allowances, asset ownership. in-memory, would be real transfers in prod.
//
// snapshot/restore is the transactional boundary: the engine snapshots before
// the batch and before each trade, and restores on the matching failure. a
// failed trade's mutations unwind exactly to the nearest enclosing snapshot.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::order::CollectionKind;
use crate::types::{Address, Amount, TokenId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("insufficient native balance for {holder}: available {available}, requested {requested}")]
    InsufficientNative {
        holder: Address,
        available: Amount,
        requested: Amount,
    },

    #[error("insufficient {currency} balance for {holder}: available {available}, requested {requested}")]
    InsufficientToken {
        currency: Address,
        holder: Address,
        available: Amount,
        requested: Amount,
    },

    #[error("insufficient {currency} allowance from {owner} to {spender}: available {available}, requested {requested}")]
    InsufficientAllowance {
        currency: Address,
        owner: Address,
        spender: Address,
        available: Amount,
        requested: Amount,
    },

    #[error("collection {0} not registered")]
    UnknownCollection(Address),

    #[error("asset {collection}/{token_id} not held by {holder}")]
    AssetNotHeld {
        collection: Address,
        token_id: TokenId,
        holder: Address,
    },

    #[error("asset {collection}/{token_id}: requested {requested} units, held {held}")]
    InsufficientUnits {
        collection: Address,
        token_id: TokenId,
        held: u64,
        requested: u64,
    },

    #[error("negative amount")]
    NegativeAmount,
}

/** 3.1: full chain-state mock. Clone is the snapshot. */
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    native: HashMap<Address, Amount>,
    // (currency, holder) -> balance
    tokens: HashMap<(Address, Address), Amount>,
    // (currency, owner, spender) -> allowance
    allowances: HashMap<(Address, Address, Address), Amount>,
    collections: HashMap<Address, CollectionKind>,
    // (collection, token id) -> owner
    erc721: HashMap<(Address, TokenId), Address>,
    // (collection, token id, holder) -> units
    erc1155: HashMap<(Address, TokenId, Address), u64>,
}

// opaque handle; only this module can restore from it
#[derive(Debug, Clone)]
pub struct LedgerSnapshot(Ledger);

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot(self.clone())
    }

    pub fn restore(&mut self, snapshot: LedgerSnapshot) {
        *self = snapshot.0;
    }

    // ---- native currency ----

    pub fn native_balance(&self, holder: Address) -> Amount {
        self.native.get(&holder).copied().unwrap_or(Amount::ZERO)
    }

    pub fn mint_native(&mut self, holder: Address, amount: Amount) {
        let balance = self.native.entry(holder).or_insert(Amount::ZERO);
        *balance = balance.add(amount);
    }

    pub fn native_transfer(
        &mut self,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        if amount.value() < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount);
        }
        if amount.is_zero() {
            return Ok(());
        }
        let available = self.native_balance(from);
        if available < amount {
            return Err(LedgerError::InsufficientNative {
                holder: from,
                available,
                requested: amount,
            });
        }
        self.native.insert(from, available.sub(amount));
        let to_balance = self.native.entry(to).or_insert(Amount::ZERO);
        *to_balance = to_balance.add(amount);
        Ok(())
    }

    // ---- fungible tokens ----

    pub fn token_balance(&self, currency: Address, holder: Address) -> Amount {
        self.tokens
            .get(&(currency, holder))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    pub fn mint_token(&mut self, currency: Address, holder: Address, amount: Amount) {
        let balance = self.tokens.entry((currency, holder)).or_insert(Amount::ZERO);
        *balance = balance.add(amount);
    }

    pub fn token_transfer(
        &mut self,
        currency: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        if amount.value() < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount);
        }
        if amount.is_zero() {
            return Ok(());
        }
        let available = self.token_balance(currency, from);
        if available < amount {
            return Err(LedgerError::InsufficientToken {
                currency,
                holder: from,
                available,
                requested: amount,
            });
        }
        self.tokens.insert((currency, from), available.sub(amount));
        let to_balance = self.tokens.entry((currency, to)).or_insert(Amount::ZERO);
        *to_balance = to_balance.add(amount);
        Ok(())
    }

    pub fn allowance(&self, currency: Address, owner: Address, spender: Address) -> Amount {
        self.allowances
            .get(&(currency, owner, spender))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    pub fn approve(&mut self, currency: Address, owner: Address, spender: Address, amount: Amount) {
        if amount.is_zero() {
            self.allowances.remove(&(currency, owner, spender));
        } else {
            self.allowances.insert((currency, owner, spender), amount);
        }
    }

    // ERC20 transferFrom semantics: spender draws on owner's balance within
    // the standing allowance. unlimited allowances are not decremented.
    pub fn token_transfer_from(
        &mut self,
        spender: Address,
        currency: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        if amount.is_zero() {
            return Ok(());
        }
        let allowed = self.allowance(currency, from, spender);
        if allowed < amount {
            return Err(LedgerError::InsufficientAllowance {
                currency,
                owner: from,
                spender,
                available: allowed,
                requested: amount,
            });
        }
        self.token_transfer(currency, from, to, amount)?;
        if !allowed.is_unlimited() {
            self.approve(currency, from, spender, allowed.sub(amount));
        }
        Ok(())
    }

    // ---- assets ----

    pub fn register_collection(&mut self, collection: Address, kind: CollectionKind) {
        self.collections.insert(collection, kind);
    }

    pub fn collection_kind(&self, collection: Address) -> Option<CollectionKind> {
        self.collections.get(&collection).copied()
    }

    pub fn mint_asset(
        &mut self,
        collection: Address,
        token_id: TokenId,
        holder: Address,
        units: u64,
    ) -> Result<(), LedgerError> {
        match self.collection_kind(collection) {
            Some(CollectionKind::Erc721) => {
                self.erc721.insert((collection, token_id), holder);
            }
            Some(CollectionKind::Erc1155) => {
                *self.erc1155.entry((collection, token_id, holder)).or_insert(0) += units;
            }
            None => return Err(LedgerError::UnknownCollection(collection)),
        }
        Ok(())
    }

    pub fn asset_owner(&self, collection: Address, token_id: TokenId) -> Option<Address> {
        self.erc721.get(&(collection, token_id)).copied()
    }

    pub fn asset_units(&self, collection: Address, token_id: TokenId, holder: Address) -> u64 {
        self.erc1155
            .get(&(collection, token_id, holder))
            .copied()
            .unwrap_or(0)
    }

    // number of single-unit assets of a collection held by an address
    pub fn holdings(&self, collection: Address, holder: Address) -> usize {
        self.erc721
            .iter()
            .filter(|((c, _), owner)| *c == collection && **owner == holder)
            .count()
    }

    pub fn transfer_asset(
        &mut self,
        collection: Address,
        token_id: TokenId,
        from: Address,
        to: Address,
        units: u64,
    ) -> Result<(), LedgerError> {
        match self.collection_kind(collection) {
            Some(CollectionKind::Erc721) => {
                let owner = self
                    .erc721
                    .get(&(collection, token_id))
                    .copied()
                    .ok_or(LedgerError::AssetNotHeld {
                        collection,
                        token_id,
                        holder: from,
                    })?;
                if owner != from {
                    return Err(LedgerError::AssetNotHeld {
                        collection,
                        token_id,
                        holder: from,
                    });
                }
                self.erc721.insert((collection, token_id), to);
                Ok(())
            }
            Some(CollectionKind::Erc1155) => {
                let held = self.asset_units(collection, token_id, from);
                if held < units {
                    return Err(LedgerError::InsufficientUnits {
                        collection,
                        token_id,
                        held,
                        requested: units,
                    });
                }
                if held == units {
                    self.erc1155.remove(&(collection, token_id, from));
                } else {
                    self.erc1155.insert((collection, token_id, from), held - units);
                }
                *self.erc1155.entry((collection, token_id, to)).or_insert(0) += units;
                Ok(())
            }
            None => Err(LedgerError::UnknownCollection(collection)),
        }
    }

    // total native currency across all holders; conserved by every transfer
    pub fn total_native(&self) -> Amount {
        self.native.values().sum()
    }

    pub fn total_token(&self, currency: Address) -> Amount {
        self.tokens
            .iter()
            .filter(|((c, _), _)| *c == currency)
            .map(|(_, amount)| amount)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn amt(val: i64) -> Amount {
        Amount::new(Decimal::from(val))
    }

    #[test]
    fn native_transfer_flow() {
        let mut ledger = Ledger::new();
        ledger.mint_native(Address(1), amt(100));

        ledger.native_transfer(Address(1), Address(2), amt(40)).unwrap();
        assert_eq!(ledger.native_balance(Address(1)), amt(60));
        assert_eq!(ledger.native_balance(Address(2)), amt(40));

        let result = ledger.native_transfer(Address(1), Address(2), amt(100));
        assert!(matches!(result, Err(LedgerError::InsufficientNative { .. })));
    }

    #[test]
    fn transfer_conserves_total() {
        let mut ledger = Ledger::new();
        ledger.mint_native(Address(1), amt(100));
        ledger.mint_native(Address(2), amt(50));

        ledger.native_transfer(Address(1), Address(2), amt(33)).unwrap();
        assert_eq!(ledger.total_native(), amt(150));
    }

    #[test]
    fn token_transfer_from_respects_allowance() {
        let mut ledger = Ledger::new();
        let usdc = Address(99);
        ledger.mint_token(usdc, Address(1), amt(1000));

        // no allowance yet
        let result = ledger.token_transfer_from(Address(5), usdc, Address(1), Address(2), amt(100));
        assert!(matches!(result, Err(LedgerError::InsufficientAllowance { .. })));

        ledger.approve(usdc, Address(1), Address(5), amt(150));
        ledger
            .token_transfer_from(Address(5), usdc, Address(1), Address(2), amt(100))
            .unwrap();
        assert_eq!(ledger.token_balance(usdc, Address(2)), amt(100));
        assert_eq!(ledger.allowance(usdc, Address(1), Address(5)), amt(50));

        // exceeds the remaining allowance
        let result = ledger.token_transfer_from(Address(5), usdc, Address(1), Address(2), amt(60));
        assert!(matches!(result, Err(LedgerError::InsufficientAllowance { .. })));
    }

    #[test]
    fn unlimited_allowance_not_decremented() {
        let mut ledger = Ledger::new();
        let usdc = Address(99);
        ledger.mint_token(usdc, Address(1), amt(1000));
        ledger.approve(usdc, Address(1), Address(5), Amount::unlimited());

        ledger
            .token_transfer_from(Address(5), usdc, Address(1), Address(2), amt(600))
            .unwrap();
        assert!(ledger.allowance(usdc, Address(1), Address(5)).is_unlimited());
    }

    #[test]
    fn erc721_transfer_requires_ownership() {
        let mut ledger = Ledger::new();
        let bayc = Address(30);
        ledger.register_collection(bayc, CollectionKind::Erc721);
        ledger.mint_asset(bayc, TokenId(2491), Address(1), 1).unwrap();

        let result = ledger.transfer_asset(bayc, TokenId(2491), Address(9), Address(2), 1);
        assert!(matches!(result, Err(LedgerError::AssetNotHeld { .. })));

        ledger.transfer_asset(bayc, TokenId(2491), Address(1), Address(2), 1).unwrap();
        assert_eq!(ledger.asset_owner(bayc, TokenId(2491)), Some(Address(2)));
        assert_eq!(ledger.holdings(bayc, Address(2)), 1);
    }

    #[test]
    fn erc1155_units_move_partially() {
        let mut ledger = Ledger::new();
        let coll = Address(31);
        ledger.register_collection(coll, CollectionKind::Erc1155);
        ledger.mint_asset(coll, TokenId(7), Address(1), 10).unwrap();

        ledger.transfer_asset(coll, TokenId(7), Address(1), Address(2), 4).unwrap();
        assert_eq!(ledger.asset_units(coll, TokenId(7), Address(1)), 6);
        assert_eq!(ledger.asset_units(coll, TokenId(7), Address(2)), 4);

        let result = ledger.transfer_asset(coll, TokenId(7), Address(1), Address(2), 7);
        assert!(matches!(result, Err(LedgerError::InsufficientUnits { held: 6, .. })));
    }

    #[test]
    fn snapshot_restore_unwinds_everything() {
        let mut ledger = Ledger::new();
        let bayc = Address(30);
        let usdc = Address(99);
        ledger.register_collection(bayc, CollectionKind::Erc721);
        ledger.mint_native(Address(1), amt(100));
        ledger.mint_token(usdc, Address(1), amt(500));
        ledger.mint_asset(bayc, TokenId(1), Address(1), 1).unwrap();

        let snapshot = ledger.snapshot();

        ledger.native_transfer(Address(1), Address(2), amt(100)).unwrap();
        ledger.token_transfer(usdc, Address(1), Address(2), amt(500)).unwrap();
        ledger.transfer_asset(bayc, TokenId(1), Address(1), Address(2), 1).unwrap();
        assert_eq!(ledger.native_balance(Address(1)), Amount::ZERO);

        ledger.restore(snapshot);
        assert_eq!(ledger.native_balance(Address(1)), amt(100));
        assert_eq!(ledger.token_balance(usdc, Address(1)), amt(500));
        assert_eq!(ledger.asset_owner(bayc, TokenId(1)), Some(Address(1)));
    }

    #[test]
    fn zero_transfers_are_noops() {
        let mut ledger = Ledger::new();
        ledger.native_transfer(Address(1), Address(2), Amount::ZERO).unwrap();
        ledger
            .token_transfer(Address(9), Address(1), Address(2), Amount::ZERO)
            .unwrap();
        assert_eq!(ledger.total_native(), Amount::ZERO);
    }

    #[test]
    fn negative_amounts_rejected() {
        let mut ledger = Ledger::new();
        ledger.mint_native(Address(1), amt(10));
        let result = ledger.native_transfer(Address(1), Address(2), Amount::new(dec!(-1)));
        assert_eq!(result, Err(LedgerError::NegativeAmount));
    }
}
