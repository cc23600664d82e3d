#![allow(unexpected_cfgs)]

use anchor_lang::prelude::*;
use pyth_solana_receiver_sdk::price_update::PriceUpdateV2;

use crate::constants::*;
use crate::error::SubnameRegistrarError;
use crate::instructions::register::utils::load_active_config;
use crate::instructions::utils::*;
use crate::pricing::{PriceQuote, PriceUnit, PythRateSource};
use crate::registry;
use crate::state::*;

/// Read-only lookup of a child record
#[derive(Accounts)]
#[instruction(parent_node: [u8; 32], label: String)]
pub struct AvailableAccountConstraints<'info> {
    /// CHECK: may not exist yet, which means the name is free
    #[account(
        seeds = [NAME_RECORD_SEED, parent_node.as_ref(), label.as_bytes()],
        bump
    )]
    pub name_record: UncheckedAccount<'info>,
}

/// Whether `label` under `parent_node` can be registered right now
pub fn available_handler(
    context: Context<AvailableAccountConstraints>,
    label: String,
) -> Result<bool> {
    registry::validate_label(&label)?;
    let current_timestamp = get_current_timestamp()?;
    let available = registry::child_info(&context.accounts.name_record, context.program_id)?
        .map_or(true, |record| record.is_available(current_timestamp));
    Ok(available)
}

#[derive(Accounts)]
#[instruction(wallet: Pubkey)]
pub struct BalanceOfAccountConstraints<'info> {
    /// CHECK: missing until the account's first deposit
    #[account(
        seeds = [USER_BALANCE_SEED, wallet.as_ref()],
        bump
    )]
    pub user_balance: UncheckedAccount<'info>,
}

/// Prepaid balance of `wallet` in stable minor units
pub fn balance_of_handler(context: Context<BalanceOfAccountConstraints>) -> Result<u64> {
    let balance = registry::load_program_account::<UserBalance>(
        &context.accounts.user_balance,
        context.program_id,
    )?;
    Ok(balance.map_or(0, |balance| balance.amount))
}

#[derive(Accounts)]
#[instruction(parent_node: [u8; 32])]
pub struct QuoteAccountConstraints<'info> {
    /// CHECK: deserialized by the handler so a missing config fails with ParentNameNotSetup
    #[account(
        seeds = [DOMAIN_CONFIG_SEED, parent_node.as_ref()],
        bump,
    )]
    pub domain_config: UncheckedAccount<'info>,

    /// Needed whenever the quote ends up in lamports
    pub pyth_price_update: Option<Account<'info, PriceUpdateV2>>,
}

/// Fee for `duration` seconds under the parent, in `unit` or the pricer's default
pub fn quote_handler(
    context: Context<QuoteAccountConstraints>,
    duration: i64,
    unit: Option<PriceUnit>,
) -> Result<PriceQuote> {
    let config = load_active_config(&context.accounts.domain_config, context.program_id)?;
    let rates = PythRateSource::new(context.accounts.pyth_price_update.as_deref());
    config.pricer.quote_in(duration, unit, &rates)
}

#[derive(Accounts)]
#[instruction(parent_node: [u8; 32])]
pub struct GetDomainConfigAccountConstraints<'info> {
    /// CHECK: deserialized by the handler
    #[account(
        seeds = [DOMAIN_CONFIG_SEED, parent_node.as_ref()],
        bump,
    )]
    pub domain_config: UncheckedAccount<'info>,
}

/// Stored configuration of a parent, active or not
pub fn get_domain_config_handler(
    context: Context<GetDomainConfigAccountConstraints>,
) -> Result<DomainConfig> {
    registry::load_program_account::<DomainConfig>(
        &context.accounts.domain_config,
        context.program_id,
    )?
    .ok_or(error!(SubnameRegistrarError::ParentNameNotSetup))
}
