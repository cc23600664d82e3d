//! Constants used throughout the Subname-Registrar program.
//!
//! This module defines the PDA seeds, price feed configuration, unit decimals,
//! registry fuse bits and time-related constants shared by every instruction.

pub const ANCHOR_DISCRIMINATOR: usize = 8;

// PDA Seeds
pub const PROGRAM_STATE_SEED: &[u8] = b"state";
pub const NAME_RECORD_SEED: &[u8] = b"name";
pub const DOMAIN_CONFIG_SEED: &[u8] = b"config";
pub const USER_BALANCE_SEED: &[u8] = b"balance";
pub const NATIVE_VAULT_SEED: &[u8] = b"vault";
pub const STABLE_TREASURY_SEED: &[u8] = b"treasury";

/// Parent node of every top-level name
pub const ROOT_NODE: [u8; 32] = [0u8; 32];

// Pyth price feed IDs
// SOL/USD feed ID - from Pyth network (source: https://pyth.network/price-feeds/crypto-sol-usd)
pub const SOL_USD_PRICE_FEED_ID: &str = "0xef0d8b6fda2ceba41da15d4095d1da392a0d2f8ed0c6c7bc0f4cfac8c280b56d";

// Maximum age of price data
pub const PYTH_PRICE_FEED_MAX_AGE: u64 = 60; // 60 seconds

/// Native asset decimals (1 SOL = 10^9 lamports)
pub const NATIVE_DECIMALS: u32 = 9;

/// Stable unit decimals (1 USDC = 1_000_000 minor units)
pub const STABLE_DECIMALS: u32 = 6;

/// Pricing granularity, every duration must be a multiple of one week
pub const PERIOD_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Default grace period applied to protected top-level parents (90 days)
pub const DEFAULT_GRACE_PERIOD_SECONDS: i64 = 90 * 24 * 60 * 60;

// Registry fuses
pub const CANNOT_UNWRAP: u32 = 1;
pub const PARENT_CANNOT_CONTROL: u32 = 1 << 16;
pub const IS_TOP_LEVEL: u32 = 1 << 17;

/// Labels double as PDA seeds, which are capped at 32 bytes
pub const MAX_LABEL_LENGTH: usize = 32;

/// Width of the instruction discriminator that prefixes every resolver record
pub const RECORD_SELECTOR_LENGTH: usize = 8;

/// Upper bound on resolver records dispatched by one registration
pub const MAX_RECORDS_PER_NAME: usize = 8;
