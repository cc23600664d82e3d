//! Subname Registrar Program
//!
//! This program lets the owner of a parent name rent out subnames beneath it.
//! Each parent carries its own pricing strategy and beneficiary. Fees are paid
//! in lamports or in a stable token, either directly or from a prepaid balance
//! held in the program treasury.
//!
//! Lamport prices are derived from the Pyth SOL/USD feed, so parents can keep
//! their prices in USD while buyers pay in SOL.

#![allow(unexpected_cfgs)]

use anchor_lang::prelude::*;

use instructions::*;
use pricing::{PriceQuote, PriceUnit, Pricer};
use state::*;

pub mod constants;
pub mod error;
pub mod events;
pub mod instructions;
pub mod pricing;
pub mod registry;
pub mod state;

#[cfg(test)]
mod test_utils;

declare_id!("6HL7ConfAQa2DVRxRrLmwJ7g2Kz3qzFANpBNRB3kFkGb");

#[program]
pub mod subname_registrar {
    use super::*;

    pub fn initialize(
        context: Context<InitializeAccountConstraints>,
        grace_period_seconds: i64,
    ) -> Result<()> {
        initialize_handler(context, grace_period_seconds)
    }

    pub fn update_authority(context: Context<UpdateAuthorityAccountConstraints>) -> Result<()> {
        update_authority_handler(context)
    }

    pub fn update_grace_period(
        context: Context<UpdateGracePeriodAccountConstraints>,
        grace_period_seconds: i64,
    ) -> Result<()> {
        update_grace_period_handler(context, grace_period_seconds)
    }

    pub fn register_parent(
        context: Context<RegisterParentAccountConstraints>,
        label: String,
        owner: Pubkey,
        expiry_timestamp: i64,
        top_level: bool,
    ) -> Result<()> {
        register_parent_handler(context, label, owner, expiry_timestamp, top_level)
    }

    pub fn update_parent_expiry(
        context: Context<UpdateParentExpiryAccountConstraints>,
        _label: String,
        new_expiry_timestamp: i64,
    ) -> Result<()> {
        update_parent_expiry_handler(context, new_expiry_timestamp)
    }

    pub fn withdraw_native(
        context: Context<WithdrawTreasuryAccountConstraints>,
        amount: u64,
    ) -> Result<()> {
        withdraw_native_handler(context, amount)
    }

    pub fn withdraw_stable(
        context: Context<WithdrawTreasuryAccountConstraints>,
        amount: u64,
    ) -> Result<()> {
        withdraw_stable_handler(context, amount)
    }

    pub fn setup_domain(
        context: Context<SetupDomainAccountConstraints>,
        parent_node: [u8; 32],
        pricer: Pricer,
        beneficiary: Pubkey,
        active: bool,
    ) -> Result<()> {
        setup_domain_handler(context, parent_node, pricer, beneficiary, active)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn register<'info>(
        context: Context<'_, '_, '_, 'info, RegisterNameAccountConstraints<'info>>,
        parent_node: [u8; 32],
        label: String,
        owner: Pubkey,
        resolver: Pubkey,
        duration: i64,
        records: Vec<Vec<u8>>,
        supplied_lamports: u64,
    ) -> Result<()> {
        register_name_handler(
            context,
            parent_node,
            label,
            owner,
            resolver,
            duration,
            records,
            None,
            supplied_lamports,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn register_with_token<'info>(
        context: Context<'_, '_, '_, 'info, RegisterNameAccountConstraints<'info>>,
        parent_node: [u8; 32],
        label: String,
        owner: Pubkey,
        resolver: Pubkey,
        duration: i64,
        records: Vec<Vec<u8>>,
        unit: PriceUnit,
        supplied_lamports: u64,
    ) -> Result<()> {
        register_name_handler(
            context,
            parent_node,
            label,
            owner,
            resolver,
            duration,
            records,
            Some(unit),
            supplied_lamports,
        )
    }

    pub fn renew(
        context: Context<RenewNameAccountConstraints>,
        parent_node: [u8; 32],
        label: String,
        duration: i64,
        supplied_lamports: u64,
    ) -> Result<()> {
        renew_name_handler(context, parent_node, label, duration, None, supplied_lamports)
    }

    pub fn renew_with_token(
        context: Context<RenewNameAccountConstraints>,
        parent_node: [u8; 32],
        label: String,
        duration: i64,
        unit: PriceUnit,
        supplied_lamports: u64,
    ) -> Result<()> {
        renew_name_handler(context, parent_node, label, duration, Some(unit), supplied_lamports)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn batch_register<'info>(
        context: Context<'_, '_, '_, 'info, BatchRegisterAccountConstraints<'info>>,
        parent_node: [u8; 32],
        labels: Vec<String>,
        owners: Vec<Pubkey>,
        durations: Vec<i64>,
        resolver: Pubkey,
        records: Vec<Vec<Vec<u8>>>,
        supplied_lamports: u64,
    ) -> Result<()> {
        batch_register_handler(
            context,
            parent_node,
            labels,
            owners,
            durations,
            resolver,
            records,
            None,
            supplied_lamports,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn batch_register_with_token<'info>(
        context: Context<'_, '_, '_, 'info, BatchRegisterAccountConstraints<'info>>,
        parent_node: [u8; 32],
        labels: Vec<String>,
        owners: Vec<Pubkey>,
        durations: Vec<i64>,
        resolver: Pubkey,
        records: Vec<Vec<Vec<u8>>>,
        unit: PriceUnit,
        supplied_lamports: u64,
    ) -> Result<()> {
        batch_register_handler(
            context,
            parent_node,
            labels,
            owners,
            durations,
            resolver,
            records,
            Some(unit),
            supplied_lamports,
        )
    }

    pub fn batch_renew<'info>(
        context: Context<'_, '_, '_, 'info, BatchRenewAccountConstraints<'info>>,
        parent_node: [u8; 32],
        labels: Vec<String>,
        durations: Vec<i64>,
        supplied_lamports: u64,
    ) -> Result<()> {
        batch_renew_handler(context, parent_node, labels, durations, None, supplied_lamports)
    }

    pub fn batch_renew_with_token<'info>(
        context: Context<'_, '_, '_, 'info, BatchRenewAccountConstraints<'info>>,
        parent_node: [u8; 32],
        labels: Vec<String>,
        durations: Vec<i64>,
        unit: PriceUnit,
        supplied_lamports: u64,
    ) -> Result<()> {
        batch_renew_handler(
            context,
            parent_node,
            labels,
            durations,
            Some(unit),
            supplied_lamports,
        )
    }

    pub fn deposit_stable(context: Context<DepositStableAccountConstraints>, amount: u64) -> Result<()> {
        deposit_stable_handler(context, amount)
    }

    pub fn deposit_native(context: Context<DepositNativeAccountConstraints>, lamports: u64) -> Result<()> {
        deposit_native_handler(context, lamports)
    }

    pub fn register_from_balance<'info>(
        context: Context<'_, '_, '_, 'info, RegisterFromBalanceAccountConstraints<'info>>,
        parent_node: [u8; 32],
        label: String,
        owner: Pubkey,
        resolver: Pubkey,
        duration: i64,
        records: Vec<Vec<u8>>,
    ) -> Result<()> {
        register_from_balance_handler(context, parent_node, label, owner, resolver, duration, records)
    }

    pub fn renew_from_balance(
        context: Context<RenewFromBalanceAccountConstraints>,
        parent_node: [u8; 32],
        label: String,
        duration: i64,
    ) -> Result<()> {
        renew_from_balance_handler(context, parent_node, label, duration)
    }

    pub fn transfer_name(
        context: Context<TransferNameAccountConstraints>,
        new_owner: Pubkey,
    ) -> Result<()> {
        transfer_name_handler(context, new_owner)
    }

    pub fn available(
        context: Context<AvailableAccountConstraints>,
        _parent_node: [u8; 32],
        label: String,
    ) -> Result<bool> {
        available_handler(context, label)
    }

    pub fn balance_of(context: Context<BalanceOfAccountConstraints>, _wallet: Pubkey) -> Result<u64> {
        balance_of_handler(context)
    }

    pub fn quote(
        context: Context<QuoteAccountConstraints>,
        _parent_node: [u8; 32],
        duration: i64,
        unit: Option<PriceUnit>,
    ) -> Result<PriceQuote> {
        quote_handler(context, duration, unit)
    }

    pub fn get_domain_config(
        context: Context<GetDomainConfigAccountConstraints>,
        _parent_node: [u8; 32],
    ) -> Result<DomainConfig> {
        get_domain_config_handler(context)
    }
}
