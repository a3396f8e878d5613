// 2.0: the canonical order: one purchasable listing, described the same way for
// every marketplace. adapters translate this into their venue's native call.

use serde::{Deserialize, Serialize};

use crate::types::{Address, Amount, Bytes, Currency, Timestamp, TokenId};

// single-unit (ERC721-style) vs multi-unit (ERC1155-style) asset family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    Erc721,
    Erc1155,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("order has no items")]
    NoItems,

    #[error("token id / amount arrays differ in length: {token_ids} vs {amounts}")]
    MismatchedItemArrays { token_ids: usize, amounts: usize },

    #[error("zero amount at item index {index}")]
    ZeroAmount { index: usize },
}

/** 2.1: marketplace-agnostic description of one listing to purchase */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalOrder {
    // expected counterparty (seller); zero for pool venues with no maker
    pub signer: Address,
    pub recipient: Address,
    pub collection: Address,
    pub collection_kind: CollectionKind,
    // parallel arrays, same non-zero length
    pub token_ids: Vec<TokenId>,
    pub amounts: Vec<u64>,
    // in the order's declared currency
    pub price: Amount,
    pub currency: Currency,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub signature: Bytes,
}

impl CanonicalOrder {
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.token_ids.is_empty() {
            return Err(OrderError::NoItems);
        }
        if self.token_ids.len() != self.amounts.len() {
            return Err(OrderError::MismatchedItemArrays {
                token_ids: self.token_ids.len(),
                amounts: self.amounts.len(),
            });
        }
        if let Some(index) = self.amounts.iter().position(|a| *a == 0) {
            return Err(OrderError::ZeroAmount { index });
        }
        Ok(())
    }

    // end_time of zero means no expiry (pool listings carry no window)
    pub fn is_live(&self, now: Timestamp) -> bool {
        if now < self.start_time {
            return false;
        }
        self.end_time.as_millis() == 0 || now <= self.end_time
    }

    pub fn item_count(&self) -> usize {
        self.token_ids.len()
    }
}
