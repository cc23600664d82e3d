//! Events emitted by the registrar. Indexers use them to follow configuration
//! changes, name lifecycles and treasury movements.

use anchor_lang::prelude::*;

use crate::pricing::{PriceUnit, Pricer};

/// How the fee of a registration or renewal was settled
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Settlement {
    /// Paid by the caller; `surplus` is the part of the supplied lamports left with the caller
    Direct { surplus: u64 },
    /// Debited from the prepaid ledger and paid out of the treasury in `payout_unit`
    Balance { payout_unit: PriceUnit, payout_amount: u64 },
}

#[event]
pub struct DomainConfigured {
    pub parent_node: [u8; 32],
    pub pricer: Pricer,
    pub beneficiary: Pubkey,
    pub active: bool,
}

#[event]
pub struct NameRegistered {
    pub parent_node: [u8; 32],
    pub node: [u8; 32],
    pub label: String,
    pub owner: Pubkey,
    pub payer: Pubkey,
    pub unit: PriceUnit,
    pub fee: u64,
    pub settlement: Settlement,
    pub expiry: i64,
}

#[event]
pub struct NameRenewed {
    pub parent_node: [u8; 32],
    pub node: [u8; 32],
    pub label: String,
    pub payer: Pubkey,
    pub unit: PriceUnit,
    pub fee: u64,
    pub settlement: Settlement,
    pub old_expiry: i64,
    pub new_expiry: i64,
}

#[event]
pub struct BalanceDeposited {
    pub account: Pubkey,
    pub unit: PriceUnit,
    pub supplied: u64,
    pub credited: u64,
    pub balance: u64,
}

#[event]
pub struct TreasuryWithdrawn {
    pub authority: Pubkey,
    pub unit: PriceUnit,
    pub amount: u64,
}

#[event]
pub struct ParentRegistered {
    pub node: [u8; 32],
    pub label: String,
    pub owner: Pubkey,
    pub expiry: i64,
    pub top_level: bool,
}

#[event]
pub struct NameTransferred {
    pub node: [u8; 32],
    pub previous_owner: Pubkey,
    pub new_owner: Pubkey,
}

#[event]
pub struct ParentExpiryUpdated {
    pub node: [u8; 32],
    pub label: String,
    pub old_expiry: i64,
    pub new_expiry: i64,
}
