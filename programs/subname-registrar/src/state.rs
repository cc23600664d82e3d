//! Program state definitions for Subname-Registrar.
//!
//! This module defines the accounts the program persists: the global program
//! state, the per-parent domain configuration, the prepaid balance ledger and
//! the name records of the registry. Includes the expiry helpers every
//! registration and renewal path relies on.

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::SubnameRegistrarError;
use crate::pricing::Pricer;

/// Global program state - singleton PDA
#[account]
#[derive(InitSpace)]
pub struct ProgramState {
    /// Controlling authority: registers top-level parents and sweeps the treasury
    pub authority: Pubkey,

    /// Mint of the stable token (6 decimals)
    pub stable_mint: Pubkey,

    /// Grace period in seconds granted to protected top-level parents
    pub grace_period_seconds: i64,

    /// Total number of child names registered
    pub names_registered: u64,

    /// Bump seed for PDA derivation
    pub bump: u8,

    pub vault_bump: u8,

    pub treasury_bump: u8,
}

impl ProgramState {
    pub fn record_registrations(&mut self, count: u64) -> Result<()> {
        self.names_registered = self
            .names_registered
            .checked_add(count)
            .ok_or(error!(SubnameRegistrarError::MathOverflow))?;
        Ok(())
    }
}

/// Per-parent rental settings, written only by whoever controls the parent
#[account]
#[derive(InitSpace)]
pub struct DomainConfig {
    pub parent_node: [u8; 32],

    /// Strategy used to quote registration and renewal fees
    pub pricer: Pricer,

    /// Wallet receiving every fee paid for names under this parent
    pub beneficiary: Pubkey,

    pub active: bool,

    pub bump: u8,
}

/// Prepaid balance of one depositor, in stable minor units
#[account]
#[derive(InitSpace)]
pub struct UserBalance {
    pub owner: Pubkey,

    pub amount: u64,

    pub bump: u8,
}

impl UserBalance {
    pub fn credit(&mut self, amount: u64) -> Result<()> {
        self.amount = self
            .amount
            .checked_add(amount)
            .ok_or(error!(SubnameRegistrarError::MathOverflow))?;
        Ok(())
    }

    /// Spend exactly `amount`, failing without change when the balance is short
    pub fn debit(&mut self, amount: u64) -> Result<()> {
        require!(
            self.amount >= amount,
            SubnameRegistrarError::InsufficientBalance
        );
        self.amount -= amount;
        Ok(())
    }
}

/// A name in the registry, either a top-level parent or a rented child
#[account]
#[derive(InitSpace)]
pub struct NameRecord {
    /// Namehash of this name
    pub node: [u8; 32],

    /// Namehash of the parent, `ROOT_NODE` for top-level names
    pub parent: [u8; 32],

    #[max_len(32)]
    pub label: String,

    pub owner: Pubkey,

    /// Resolver program records are dispatched to
    pub resolver: Pubkey,

    pub fuses: u32,

    /// Timestamp when the name expires (seconds since Unix epoch)
    pub expiry_timestamp: i64,

    /// Timestamp of the latest (re)registration
    pub registration_timestamp: i64,

    /// Bump seed for PDA derivation
    pub bump: u8,
}

impl NameRecord {
    /// A freshly allocated record has never been written
    pub fn is_vacant(&self) -> bool {
        self.node == [0u8; 32]
    }

    pub fn is_expired(&self, current_time: i64) -> bool {
        current_time > self.expiry_timestamp
    }

    pub fn is_available(&self, current_time: i64) -> bool {
        self.is_vacant() || self.is_expired(current_time)
    }

    pub fn is_top_level(&self) -> bool {
        self.fuses & IS_TOP_LEVEL != 0
    }

    /// Expiry used when this name acts as a parent. Protected top-level names
    /// report an expiry that already includes the grace period.
    pub fn effective_expiry(&self, grace_period_seconds: i64) -> i64 {
        if self.is_top_level() {
            self.expiry_timestamp.saturating_sub(grace_period_seconds)
        } else {
            self.expiry_timestamp
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::error_code;

    fn record(expiry: i64, fuses: u32) -> NameRecord {
        NameRecord {
            node: [7u8; 32],
            parent: ROOT_NODE,
            label: "parent".to_string(),
            owner: Pubkey::new_unique(),
            resolver: Pubkey::default(),
            fuses,
            expiry_timestamp: expiry,
            registration_timestamp: 0,
            bump: 255,
        }
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let record = record(1_000, 0);
        assert!(!record.is_expired(1_000));
        assert!(record.is_expired(1_001));
        assert!(!record.is_available(1_000));
        assert!(record.is_available(1_001));
    }

    #[test]
    fn vacant_record_is_available() {
        let mut record = record(i64::MAX, 0);
        record.node = [0u8; 32];
        assert!(record.is_available(0));
    }

    #[test]
    fn grace_only_applies_to_top_level_names() {
        let grace = 100;
        assert_eq!(record(1_000, IS_TOP_LEVEL).effective_expiry(grace), 900);
        assert_eq!(record(1_000, PARENT_CANNOT_CONTROL).effective_expiry(grace), 1_000);
    }

    #[test]
    fn debit_is_exact_and_never_overdraws() {
        let mut balance = UserBalance {
            owner: Pubkey::new_unique(),
            amount: 0,
            bump: 255,
        };
        balance.credit(1_000_000).unwrap();
        balance.debit(400_000).unwrap();
        assert_eq!(balance.amount, 600_000);

        let err = balance.debit(600_001).unwrap_err();
        assert_eq!(
            error_code(err),
            error_code(SubnameRegistrarError::InsufficientBalance.into())
        );
        assert_eq!(balance.amount, 600_000);

        balance.debit(600_000).unwrap();
        assert_eq!(balance.amount, 0);
    }

    #[test]
    fn registration_counter_is_checked() {
        let mut state = ProgramState {
            authority: Pubkey::new_unique(),
            stable_mint: Pubkey::new_unique(),
            grace_period_seconds: DEFAULT_GRACE_PERIOD_SECONDS,
            names_registered: u64::MAX - 2,
            bump: 255,
            vault_bump: 254,
            treasury_bump: 253,
        };
        state.record_registrations(2).unwrap();
        assert_eq!(state.names_registered, u64::MAX);

        let err = state.record_registrations(1).unwrap_err();
        assert_eq!(
            error_code(err),
            error_code(SubnameRegistrarError::MathOverflow.into())
        );
        assert_eq!(state.names_registered, u64::MAX);
    }
}
