//! Error definitions for the Subname-Registrar program.
//!
//! Every instruction aborts with one of these codes; the runtime rolls back all
//! account writes and transfers of the failed transaction.

use anchor_lang::prelude::*;

#[error_code]
pub enum SubnameRegistrarError {
    #[msg("Parent name has no active domain configuration")]
    ParentNameNotSetup,

    #[msg("Balance-funded operations require a pricer quoting in the stable unit")]
    PricerNotUSDC,

    #[msg("Pricer cannot quote in the requested unit")]
    UnsupportedUnit,

    #[msg("A required account was not supplied")]
    MissingAccount,

    #[msg("Stable mint must use 6 decimals")]
    InvalidStableMint,

    #[msg("Beneficiary account does not match the domain configuration")]
    BeneficiaryMismatch,

    #[msg("Caller is not authorised to modify the parent name")]
    Unauthorised,

    #[msg("Only the program authority can perform this action")]
    NotProgramAuthority,

    #[msg("Parent name is expired")]
    ParentExpired,

    #[msg("Requested duration outlives the parent name")]
    DurationTooLong,

    #[msg("Name is not registered or has expired")]
    NameNotRegistered,

    #[msg("Name is not available for registration")]
    Unavailable,

    #[msg("Duration must be a positive multiple of one week")]
    InvalidDuration,

    #[msg("Invalid label length")]
    InvalidLabel,

    #[msg("Insufficient payment")]
    InsufficientPayment,

    #[msg("Insufficient prepaid balance")]
    InsufficientBalance,

    #[msg("Treasury cannot cover the payout in either asset")]
    InsufficientTreasury,

    #[msg("Token or lamport transfer failed")]
    TransferFailed,

    #[msg("Deposit converts to zero stable units")]
    AmountTooSmall,

    #[msg("Price feed reported an invalid or stale rate")]
    InvalidRate,

    #[msg("Resolver record does not target the registered name")]
    NamehashMismatch,

    #[msg("Batch input lengths do not match")]
    DataMissing,

    #[msg("Parent name record is missing or unreadable")]
    ParentNotWrapped,

    #[msg("Calculation overflow")]
    MathOverflow,
}
